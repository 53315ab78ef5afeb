use super::cartera::CarteraRow;
use serde::{Deserialize, Serialize};

/// 账龄区间汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingBucket {
    pub range: String,
    pub amount: f64,
    pub count: usize,
    pub percentage: f64,
}

/// 账龄报表
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingReport {
    pub buckets: Vec<AgingBucket>,
    pub total: f64,
    pub detail: Vec<CarteraRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

/// 余额总览
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarteraSummary {
    pub total: f64,
    /// 已逾期 (Dias > 0)
    pub overdue: f64,
    /// 未到期
    pub current: f64,
    pub internal: f64,
    pub external: f64,
    pub clients: usize,
    pub documents: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

/// 按办公室/客户分组的汇总项
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal {
    pub key: String,
    pub label: String,
    pub amount: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    pub groups: Vec<GroupTotal>,
    pub total: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

/// 月度收款趋势点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total_collected: f64,
    pub payments: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendReport {
    pub months: Vec<MonthlyTrendPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

/// 周收款汇总 (逾期 vs 按时)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub iso_year: i32,
    pub week: u32,
    pub label: String,
    pub overdue: f64,
    pub on_time: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub weeks: Vec<WeeklySummary>,
    pub totals: WeeklyTotals,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

/// 月开票汇总 (已开票 vs 待开票)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyInvoicing {
    pub month: u32,
    pub label: String,
    pub invoiced: f64,
    pub pending: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicingReport {
    pub year: i32,
    pub months: Vec<MonthlyInvoicing>,
    pub totals: InvoicingTotals,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotals {
    pub overdue: f64,
    pub on_time: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicingTotals {
    pub invoiced: f64,
    pub pending: f64,
    pub total: f64,
}
