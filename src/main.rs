use esg_tax_recon::{api, AppConfig};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置: 默认值 -> recon.toml -> 环境变量
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let matcher_base = config.matcher.resolve_base_url(config.server.port);
    let state = api::AppState::new(matcher_base.clone());
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/compare     - upload esg_file + tax_file, run comparison");
    info!("  GET  /api/result      - current comparison view");
    info!("  GET  /api/result.csv  - export last result as CSV");
    info!("  POST /api/sheets      - list sheet names of a workbook");
    info!("Matching service: {}", matcher_base);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
