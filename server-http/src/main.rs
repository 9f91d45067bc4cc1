use pulse::persistence::SledStore;
use pulse::service::{CacheService, FetchPolicy};
use pulse::upstream::HttpUpstream;
use server_http::{build_router, AppState};
use shared::config::Config;
use shared::TtlSeconds;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting Pulse cache server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    // An unreachable cache directory at startup is fatal; at runtime the
    // service degrades instead.
    let store = SledStore::open(std::path::Path::new(&config.data_dir).join("responses.sled"))
        .expect("Failed to open cache store");

    let upstream = HttpUpstream::new(
        &config.upstream_url,
        &config.upstream_token,
        Duration::from_secs(config.upstream_timeout_secs),
    )
    .expect("Failed to build upstream client");

    let policy = FetchPolicy {
        default_ttl: TtlSeconds(config.default_ttl_secs),
        negative_ttl: TtlSeconds(config.negative_ttl_secs),
        max_retries: config.max_retries,
        backoff: Duration::from_millis(config.backoff_ms),
    };

    let service = CacheService::new(Arc::new(store), Arc::new(upstream), policy);
    let state = AppState::new(service);

    let router = build_router(state, &config);

    let addr = format!("{}:{}", config.host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("HTTP Server listening on http://{}", addr);
    info!("Try: curl http://{}/api/health", addr);

    // Graceful shutdown handler
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
