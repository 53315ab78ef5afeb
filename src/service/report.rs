use super::aging::{aging_buckets, bucket_total, round2};
use super::clients::ClientFilter;
use super::fanout::run_batched;
use super::grouping::{group_by_office, groups_total, top_clients};
use super::periods::{
    group_by_iso_week, group_invoicing_by_month, invoicing_totals, month_bounds, month_label,
    trailing_months, weekly_totals,
};
use crate::config::FanoutConfig;
use crate::db::{self, query_as, CutoffFilter, QueryExecutor, YearFilter};
use crate::error::QueryError;
use crate::models::{
    AgingReport, CarteraRow, CarteraSummary, CobroRow, FacturacionRow, GroupReport,
    InvoicingReport, MonthTotalRow, MonthlyTrendPoint, MonthlyTrendReport, WeeklyReport,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// 月度趋势覆盖的月数 (截止月往前)
pub const TREND_MONTHS: u32 = 6;

/// 报表服务: 拼SQL -> 远程查询 -> 内存汇总
///
/// 上游失败不会使整个报表失败: 对应部分按空/0处理, 并记入 degraded
pub struct ReportService {
    executor: Arc<dyn QueryExecutor>,
    filter: ClientFilter,
    fanout: FanoutConfig,
}

impl ReportService {
    pub fn new(executor: Arc<dyn QueryExecutor>, filter: ClientFilter, fanout: FanoutConfig) -> Self {
        Self {
            executor,
            filter,
            fanout,
        }
    }

    pub fn client_filter(&self) -> &ClientFilter {
        &self.filter
    }

    async fn fetch_cartera(&self, filter: &CutoffFilter) -> Result<Vec<CarteraRow>, QueryError> {
        let sql = db::cartera_sql(filter);
        query_as::<CarteraRow>(self.executor.as_ref(), &sql).await
    }

    /// 对外客户的余额明细 (CSV 导出用, 失败直接返回错误)
    pub async fn external_cartera(&self, filter: &CutoffFilter) -> Result<Vec<CarteraRow>, QueryError> {
        let rows = self.fetch_cartera(filter).await?;
        Ok(self.filter.external_only(rows))
    }

    /// 外部客户余额; 失败时返回空集并记录 degraded
    async fn external_cartera_or_empty(
        &self,
        filter: &CutoffFilter,
        degraded: &mut Vec<String>,
    ) -> Vec<CarteraRow> {
        match self.external_cartera(filter).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    "Cartera query failed (empresa {}, corte {}): {}",
                    filter.company,
                    filter.cutoff,
                    e
                );
                degraded.push("cartera".to_string());
                Vec::new()
            }
        }
    }

    /// 账龄报表
    pub async fn aging_report(&self, filter: &CutoffFilter) -> AgingReport {
        let mut degraded = Vec::new();
        let rows = self.external_cartera_or_empty(filter, &mut degraded).await;
        let buckets = aging_buckets(&rows);
        let total = bucket_total(&buckets);

        tracing::info!(
            "Aging report: empresa {}, corte {}, {} rows, total {}",
            filter.company,
            filter.cutoff,
            rows.len(),
            total
        );

        AgingReport {
            buckets,
            total,
            detail: rows,
            degraded,
        }
    }

    /// 余额总览 (含内部客户)
    pub async fn summary(&self, filter: &CutoffFilter) -> CarteraSummary {
        let rows = match self.fetch_cartera(filter).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Summary query failed (empresa {}): {}", filter.company, e);
                return CarteraSummary {
                    degraded: vec!["cartera".to_string()],
                    ..CarteraSummary::default()
                };
            }
        };

        let mut summary = CarteraSummary::default();
        let mut clients: HashSet<String> = HashSet::new();

        for row in &rows {
            let Some(balance) = row.balance() else {
                continue;
            };
            summary.total += balance;
            summary.documents += 1;
            if row.dias.unwrap_or(0) > 0 {
                summary.overdue += balance;
            } else {
                summary.current += balance;
            }
            if self.filter.is_internal(row) {
                summary.internal += balance;
            } else {
                summary.external += balance;
            }
            let rfc = row.rfc.trim().to_uppercase();
            if !rfc.is_empty() {
                clients.insert(rfc);
            }
        }

        summary.clients = clients.len();
        summary.total = round2(summary.total);
        summary.overdue = round2(summary.overdue);
        summary.current = round2(summary.current);
        summary.internal = round2(summary.internal);
        summary.external = round2(summary.external);
        summary
    }

    /// 按办公室分组 (外部客户)
    pub async fn office_report(&self, filter: &CutoffFilter) -> GroupReport {
        let mut degraded = Vec::new();
        let rows = self.external_cartera_or_empty(filter, &mut degraded).await;
        GroupReport {
            groups: group_by_office(&rows),
            total: groups_total(&rows),
            degraded,
        }
    }

    /// 余额最高的外部客户
    pub async fn client_report(&self, filter: &CutoffFilter, limit: usize) -> GroupReport {
        let mut degraded = Vec::new();
        let rows = self.external_cartera_or_empty(filter, &mut degraded).await;
        GroupReport {
            groups: top_clients(&rows, limit),
            total: groups_total(&rows),
            degraded,
        }
    }

    async fn month_point(
        &self,
        filter: &CutoffFilter,
        year: i32,
        month: u32,
    ) -> (MonthlyTrendPoint, Option<String>) {
        let label = format!("{} {}", month_label(month), year);
        let mut point = MonthlyTrendPoint {
            year,
            month,
            label: label.clone(),
            total_collected: 0.0,
            payments: 0,
        };

        let Some((start, end)) = month_bounds(year, month) else {
            return (point, Some(label));
        };
        let sql = db::month_collected_sql(filter.company, &filter.office, start, end);

        match query_as::<MonthTotalRow>(self.executor.as_ref(), &sql).await {
            Ok(rows) => {
                let row = rows.into_iter().next().unwrap_or_default();
                point.total_collected = round2(row.total_cobrado.unwrap_or(0.0));
                point.payments = row.pagos.unwrap_or(0);
                (point, None)
            }
            Err(e) => {
                tracing::warn!("Monthly collection query failed for {}: {}", label, e);
                (point, Some(label))
            }
        }
    }

    /// 月度收款趋势: 截止月往前 6 个月, 分批并发查询; 失败月份记 0
    pub async fn monthly_trend(&self, filter: &CutoffFilter) -> MonthlyTrendReport {
        let months = trailing_months(filter.cutoff, TREND_MONTHS);
        let pause = Duration::from_millis(self.fanout.batch_pause_ms);

        let results = run_batched(&months, self.fanout.batch_size, pause, |(year, month)| {
            self.month_point(filter, year, month)
        })
        .await;

        let mut points = Vec::with_capacity(results.len());
        let mut degraded = Vec::new();
        for (point, failed) in results {
            points.push(point);
            degraded.extend(failed);
        }

        if !degraded.is_empty() {
            tracing::warn!(
                "Monthly trend degraded: {}/{} months failed ({})",
                degraded.len(),
                points.len(),
                degraded.join(", ")
            );
        }

        MonthlyTrendReport {
            months: points,
            degraded,
        }
    }

    /// 周收款: 逾期 vs 按时 (外部客户)
    pub async fn weekly_collections(&self, filter: &YearFilter) -> WeeklyReport {
        let sql = db::cobros_year_sql(filter);
        let mut degraded = Vec::new();
        let rows = match query_as::<CobroRow>(self.executor.as_ref(), &sql).await {
            Ok(rows) => self.filter.external_only(rows),
            Err(e) => {
                tracing::warn!("Weekly collections query failed ({}): {}", filter.year, e);
                degraded.push("cobros".to_string());
                Vec::new()
            }
        };

        let weeks = group_by_iso_week(&rows);
        let totals = weekly_totals(&weeks);
        WeeklyReport {
            weeks,
            totals,
            degraded,
        }
    }

    /// 月开票: 已开票 vs 待开票, 12 个月
    pub async fn monthly_invoicing(&self, filter: &YearFilter) -> InvoicingReport {
        let sql = db::facturacion_year_sql(filter);
        let mut degraded = Vec::new();
        let rows = match query_as::<FacturacionRow>(self.executor.as_ref(), &sql).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Invoicing query failed ({}): {}", filter.year, e);
                degraded.push("facturacion".to_string());
                Vec::new()
            }
        };

        let months = group_invoicing_by_month(&rows, filter.year);
        let totals = invoicing_totals(&months);
        InvoicingReport {
            year: filter.year,
            months,
            totals,
            degraded,
        }
    }
}
