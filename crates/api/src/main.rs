use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use massval_api::config::ServerConfig;
use massval_api::router::build_app_router;
use massval_api::state::AppState;
use massval_pipeline::{retention, InMemoryJobStore, Verifier};
use massval_registry::RegistryClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "massval_api=debug,massval_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Registry ---
    let registry =
        RegistryClient::new(config.registry.clone()).expect("Failed to build registry client");
    tracing::info!(
        url = %config.registry.url,
        index = %config.registry.index,
        "Registry client ready",
    );

    // --- Verification ---
    let jobs = Arc::new(InMemoryJobStore::new());
    let verifier = Verifier::new(Arc::new(registry), jobs.clone(), config.verification.clone());

    // --- Background: job retention ---
    tokio::spawn(retention::run(
        jobs.clone(),
        config.verification.job_retention,
        retention::CLEANUP_INTERVAL,
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        jobs,
        verifier,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). Verification jobs
/// still running are dropped with the runtime.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
