use super::params::ReportParams;
use crate::error::ApiError;
use crate::models::{
    AgingReport, CarteraRow, CarteraSummary, GroupReport, InvoicingReport, MonthlyTrendReport,
    WeeklyReport,
};
use crate::service::ReportService;
use axum::{
    extract::{Json, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 账龄分布
pub async fn aging_report(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<AgingReport>, ApiError> {
    let filter = params.cutoff_filter()?;
    Ok(Json(service.aging_report(&filter).await))
}

/// 余额总览
pub async fn cartera_summary(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<CarteraSummary>, ApiError> {
    let filter = params.cutoff_filter()?;
    Ok(Json(service.summary(&filter).await))
}

/// 按办公室分组
pub async fn office_report(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<GroupReport>, ApiError> {
    let filter = params.cutoff_filter()?;
    Ok(Json(service.office_report(&filter).await))
}

/// 余额最高客户
pub async fn client_report(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<GroupReport>, ApiError> {
    let filter = params.cutoff_filter()?;
    let limit = params.limit()?;
    Ok(Json(service.client_report(&filter, limit).await))
}

/// 月度收款趋势
pub async fn monthly_trend(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<MonthlyTrendReport>, ApiError> {
    let filter = params.cutoff_filter()?;
    Ok(Json(service.monthly_trend(&filter).await))
}

/// 周收款
pub async fn weekly_collections(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<WeeklyReport>, ApiError> {
    let filter = params.year_filter()?;
    Ok(Json(service.weekly_collections(&filter).await))
}

/// 月开票
pub async fn monthly_invoicing(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<InvoicingReport>, ApiError> {
    let filter = params.year_filter()?;
    Ok(Json(service.monthly_invoicing(&filter).await))
}

/// 账龄明细导出 CSV; 上游失败返回 502 (不输出空文件)
pub async fn aging_csv(
    State(service): State<Arc<ReportService>>,
    Query(params): Query<ReportParams>,
) -> Result<Response, ApiError> {
    let filter = params.cutoff_filter()?;
    let rows = service.external_cartera(&filter).await?;
    let body = cartera_to_csv(&rows).map_err(|e| ApiError::Export(e.to_string()))?;

    tracing::info!(
        "CSV export: empresa {}, corte {}, {} rows",
        filter.company,
        filter.cutoff,
        rows.len()
    );

    let filename = format!(
        "attachment; filename=\"antiguedad_{}_{}.csv\"",
        filter.company,
        filter.cutoff.format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        body,
    )
        .into_response())
}

fn option_to_csv<T: ToString>(val: &Option<T>) -> String {
    val.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// 余额明细转 CSV
pub fn cartera_to_csv(rows: &[CarteraRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Rfc",
        "Cliente",
        "Oficina",
        "Unidad",
        "Factura",
        "FechaVencimiento",
        "Dias",
        "Total",
    ])?;

    for row in rows {
        writer.write_record(&[
            row.rfc.clone(),
            row.cliente.clone(),
            row.oficina.clone(),
            row.unidad.clone(),
            row.factura.clone(),
            option_to_csv(&row.fecha_vencimiento),
            option_to_csv(&row.dias),
            option_to_csv(&row.total),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn csv_has_header_and_escapes_commas() {
        let rows = vec![CarteraRow {
            rfc: "AAA010101AAA".to_string(),
            cliente: "Alfa, S.A.".to_string(),
            oficina: "CDMX".to_string(),
            unidad: String::new(),
            factura: "F-10".to_string(),
            fecha_vencimiento: NaiveDate::from_ymd_opt(2024, 5, 1),
            dias: Some(60),
            total: None,
        }];
        let text = String::from_utf8(cartera_to_csv(&rows).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Rfc,Cliente,Oficina,Unidad,Factura,FechaVencimiento,Dias,Total")
        );
        assert_eq!(
            lines.next(),
            Some("AAA010101AAA,\"Alfa, S.A.\",CDMX,,F-10,2024-05-01,60,")
        );
    }
}
