use page_ranking::api::ranking::AppState;
use page_ranking::config::Config;
use page_ranking::ranking::report::HttpReportingBackend;
use page_ranking::server;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "page_ranking=info,tower_http=info".into());
    if std::env::var("RANKING_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(std::path::Path::new));

    tracing::info!(
        host = %config.host,
        port = config.port,
        view_id = %config.view_id,
        credential_configured = config.credential.is_some(),
        "Starting page ranking service"
    );
    if config.view_id.is_empty() {
        tracing::warn!("No ANALYTICS_API_VIEW_ID set; ranking requests will be rejected upstream");
    }

    let backend = HttpReportingBackend::new(&config).expect("Failed to build HTTP client");
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState {
        config,
        backend: Arc::new(backend),
    });

    let app = server::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(addr = %addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
