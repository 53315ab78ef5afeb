use cobranza_report_rust::{api, AppConfig, ClientFilter, QueryClient, ReportService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式, RUST_LOG 控制级别 (默认 info)
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);
    if config.upstream.username.is_empty() {
        tracing::warn!("SQL_API_USERNAME is not set, upstream calls will likely be rejected");
    }

    // 远程查询客户端 (令牌在此计算一次)
    let client = QueryClient::new(&config.upstream)?;
    info!("Query client ready: {}", config.upstream.endpoint);

    let service = Arc::new(ReportService::new(
        Arc::new(client),
        ClientFilter::new(&config.clients),
        config.fanout.clone(),
    ));

    let app = api::router(service).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET /api/cobranza/antiguedad      - aging buckets + detail");
    info!("  GET /api/cobranza/antiguedad/csv  - aging detail as CSV");
    info!("  GET /api/cobranza/resumen         - balance summary");
    info!("  GET /api/cobranza/oficinas        - balance by office");
    info!("  GET /api/cobranza/clientes        - top clients");
    info!("  GET /api/cobranza/tendencia       - 6-month collection trend");
    info!("  GET /api/cobranza/semanal         - weekly collections");
    info!("  GET /api/facturacion/mensual      - monthly invoicing");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
