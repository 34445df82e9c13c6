//! CAS server binary

use cas_core::CasService;
use cas_server::{build_router, Args, AppState, Config};
use clap::Parser;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("cas_server=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    tracing::info!("Starting CAS server");

    // Load configuration
    let config = Config::from_env(&args)?;
    tracing::info!(
        bind = %config.bind_addr,
        base_url = %config.cas.base_url,
        public_dir = %config.public_dir.display(),
        "Configuration loaded"
    );
    if config.cas.session_secret.is_none() {
        tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
    }

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create protocol engine
    let cas = CasService::from_config(config.cas.clone())?;

    let addr = config.bind_addr;
    let state = AppState::new(cas, config);
    let app = build_router(state, metrics_handle);

    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        "cas_logins_total",
        "Interactive login requests by result"
    );
    metrics::describe_counter!(
        "cas_validations_total",
        "Service ticket validations by result"
    );
    metrics::describe_counter!("cas_logouts_total", "Total logouts");

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
