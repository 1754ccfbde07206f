use std::net::SocketAddr;
use std::sync::Arc;

use clinic_lead_api::config::Config;
use clinic_lead_api::handlers::AppState;
use clinic_lead_api::lead_store;
use clinic_lead_api::mailer::ResendClient;
use clinic_lead_api::pipeline::LeadPipeline;
use clinic_lead_api::server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, connects the lead store and the
/// email client, then serves the router until Ctrl-C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_lead_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let store = lead_store::connect(&config).await?;

    let notifier = ResendClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize Resend client: {}", e))?;
    tracing::info!("✓ Resend client initialized: {}", config.resend_base_url);

    // Build application state
    let app_state = Arc::new(AppState {
        pipeline: LeadPipeline::new(store, Arc::new(notifier)),
        environment: config.environment.clone(),
    });

    let app = server::build_app(app_state, &config.allowed_origin)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("OREN backend listening on {}", addr);
    tracing::info!("Environment: {}", config.environment);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
