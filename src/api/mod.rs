pub mod handlers;
pub mod params;

pub use handlers::*;
pub use params::ReportParams;

use crate::service::ReportService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// 报表路由
pub fn router(service: Arc<ReportService>) -> Router {
    let report_routes = Router::new()
        .route("/api/cobranza/antiguedad", get(aging_report))
        .route("/api/cobranza/antiguedad/csv", get(aging_csv))
        .route("/api/cobranza/resumen", get(cartera_summary))
        .route("/api/cobranza/oficinas", get(office_report))
        .route("/api/cobranza/clientes", get(client_report))
        .route("/api/cobranza/tendencia", get(monthly_trend))
        .route("/api/cobranza/semanal", get(weekly_collections))
        .route("/api/facturacion/mensual", get(monthly_invoicing))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(report_routes)
}
