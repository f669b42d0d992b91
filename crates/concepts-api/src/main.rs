//! concepts-api - HTTP server for concept search

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use concepts_api::{build_router, AppState, Cli};
use concepts_backend::{spawn_backend_connector, BackendHandle, Dispatcher};
use concepts_search::ConceptSearchService;

const DEFAULT_LOG_FILTER: &str =
    "concepts_api=debug,concepts_search=debug,concepts_backend=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, daily rotation)
    //   LOG_ANSI    - "true"/"false" override ANSI colors
    //   RUST_LOG    - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("concepts-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let cli = Cli::parse();
    let addr = cli.bind_addr()?;
    let limits = cli.limits()?;
    let backend_config = cli.backend_config()?;
    let indices = cli.indices();

    info!(
        endpoint = %backend_config.endpoint,
        auth = %cli.auth,
        default_index = %indices.default,
        extended_index = %indices.extended,
        search_result_limit = limits.search_result_limit,
        autocomplete_result_limit = limits.autocomplete_result_limit,
        max_ids_limit = limits.max_ids_limit,
        "Configuration loaded"
    );

    // The server accepts requests before the cluster is reachable; backend
    // operations answer 503 until the connector installs a client.
    let handle = BackendHandle::empty();
    let connector = spawn_backend_connector(
        handle.clone(),
        backend_config,
        cli.connect_interval(),
    );

    let search = ConceptSearchService::new(Dispatcher::new(handle, indices), limits);
    let state = AppState::new(search).with_identity(&cli.app_system_code, &cli.app_name);
    let app = build_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    connector.abort();
    info!("Server shutdown complete");
    Ok(())
}
