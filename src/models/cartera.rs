use super::de::{lenient_date, lenient_f64, lenient_i64, lenient_string};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 带客户标识的行 (用于内部客户过滤)
pub trait ClientRow {
    fn rfc(&self) -> &str;
    fn client_name(&self) -> &str;
}

/// 应收余额明细 (Cartera): 上游列名 PascalCase, 输出 camelCase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "camelCase"))]
pub struct CarteraRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rfc: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cliente: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub oficina: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unidad: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub factura: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub fecha_vencimiento: Option<NaiveDate>,
    /// 截止日相对到期日的天数
    #[serde(default, deserialize_with = "lenient_i64")]
    pub dias: Option<i64>,
    /// 余额
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total: Option<f64>,
}

impl CarteraRow {
    /// 有效余额 (null 与 0 视为无余额)
    pub fn balance(&self) -> Option<f64> {
        self.total.filter(|t| *t != 0.0)
    }
}

impl ClientRow for CarteraRow {
    fn rfc(&self) -> &str {
        &self.rfc
    }

    fn client_name(&self) -> &str {
        &self.cliente
    }
}

/// 付款明细 (Cobros)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "camelCase"))]
pub struct CobroRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rfc: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cliente: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub fecha: Option<NaiveDate>,
    /// 付款日晚于到期日的天数
    #[serde(default, deserialize_with = "lenient_i64")]
    pub dias_atraso: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub importe: Option<f64>,
}

impl ClientRow for CobroRow {
    fn rfc(&self) -> &str {
        &self.rfc
    }

    fn client_name(&self) -> &str {
        &self.cliente
    }
}

/// 开票明细 (Facturacion)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "camelCase"))]
pub struct FacturacionRow {
    #[serde(default, deserialize_with = "lenient_date")]
    pub fecha: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub facturado: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pendiente: Option<f64>,
}

/// 单月收款汇总 (单行结果)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "PascalCase", serialize = "camelCase"))]
pub struct MonthTotalRow {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_cobrado: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pagos: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_pascal_case_and_writes_camel_case() {
        let row: CarteraRow = serde_json::from_value(json!({
            "Rfc": "AAA010101AAA",
            "Cliente": "Alfa",
            "FechaVencimiento": "2024-05-01",
            "Dias": 60,
            "Total": "10.5"
        }))
        .unwrap();
        assert_eq!(row.dias, Some(60));

        let out = serde_json::to_value(&row).unwrap();
        assert_eq!(out["rfc"], "AAA010101AAA");
        assert_eq!(out["fechaVencimiento"], "2024-05-01");
        assert_eq!(out["total"], 10.5);
        assert!(out.get("FechaVencimiento").is_none());
    }
}
