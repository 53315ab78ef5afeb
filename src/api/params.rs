use crate::db::guard::is_safe_literal;
use crate::db::{CutoffFilter, YearFilter};
use crate::error::ApiError;
use crate::models::de::parse_date;
use crate::service::grouping::{DEFAULT_TOP_CLIENTS, MAX_TOP_CLIENTS};
use serde::Deserialize;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// 报表查询参数 (全部按字符串接收, 统一校验)
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub fecha_corte: Option<String>,
    pub anio: Option<String>,
    pub empresa: Option<String>,
    pub oficina: Option<String>,
    pub unidad: Option<String>,
    pub limite: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 办公室/业务单元筛选值: 含分号或禁用关键字的值会被只读检查拒绝, 提前返回 400
fn literal_filter(value: &Option<String>, message: &'static str) -> Result<Option<String>, ApiError> {
    match non_empty(value) {
        Some(v) if !is_safe_literal(&v) => Err(ApiError::InvalidParams(message)),
        other => Ok(other),
    }
}

impl ReportParams {
    fn office(&self) -> Result<Option<String>, ApiError> {
        literal_filter(&self.oficina, "oficina contains characters or keywords that are not allowed")
    }

    fn unit(&self) -> Result<Option<String>, ApiError> {
        literal_filter(&self.unidad, "unidad contains characters or keywords that are not allowed")
    }

    fn company(&self) -> Result<i64, ApiError> {
        let raw = non_empty(&self.empresa).ok_or(ApiError::InvalidParams("empresa is required"))?;
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ApiError::InvalidParams("empresa must be a positive integer")),
        }
    }

    pub fn cutoff_filter(&self) -> Result<CutoffFilter, ApiError> {
        let raw = non_empty(&self.fecha_corte)
            .ok_or(ApiError::InvalidParams("fecha_corte is required"))?;
        let cutoff = parse_date(&raw)
            .ok_or(ApiError::InvalidParams("fecha_corte must be a date (YYYY-MM-DD)"))?;

        Ok(CutoffFilter {
            cutoff,
            company: self.company()?,
            office: self.office()?,
            unit: self.unit()?,
        })
    }

    pub fn year_filter(&self) -> Result<YearFilter, ApiError> {
        let raw = non_empty(&self.anio).ok_or(ApiError::InvalidParams("anio is required"))?;
        let year = match raw.parse::<i32>() {
            Ok(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => y,
            Ok(_) => return Err(ApiError::InvalidParams("anio is out of range")),
            Err(_) => return Err(ApiError::InvalidParams("anio must be numeric")),
        };

        Ok(YearFilter {
            year,
            company: self.company()?,
            office: self.office()?,
            unit: self.unit()?,
        })
    }

    /// 前 N 名客户, 默认 10, 上限 100
    pub fn limit(&self) -> Result<usize, ApiError> {
        match non_empty(&self.limite) {
            None => Ok(DEFAULT_TOP_CLIENTS),
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n.min(MAX_TOP_CLIENTS)),
                _ => Err(ApiError::InvalidParams("limite must be a positive integer")),
            },
        }
    }
}
