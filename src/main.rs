use poem::listener::TcpListener;
use poem::EndpointExt;
use poem_openapi::OpenApiService;

use registry_manager::api::{HealthApi, LogsApi};
use registry_manager::config::{Config, LogConfig};
use registry_manager::logging;
use registry_manager::observability::RequestTracingMiddleware;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_config = LogConfig::from_env();
    let _log_guard = logging::init_or_exit(&log_config);

    let config = Config::from_env();

    let api_service = OpenApiService::new(
        (
            HealthApi::new(&log_config.log_file),
            LogsApi::new(&log_config.log_file),
        ),
        "Registry Manager API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("http://localhost:{}", config.port));

    let ui = api_service.swagger_ui();
    let spec = api_service.spec_endpoint();

    let app = poem::Route::new()
        .nest("/", api_service)
        .nest("/docs", ui)
        .nest("/spec", spec)
        .with(RequestTracingMiddleware);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting registry manager on {}", addr);

    poem::Server::new(TcpListener::bind(&addr))
        .run(app)
        .await?;

    Ok(())
}
