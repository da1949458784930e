//! MindTrack prediction server binary

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mindtrack_server::config::Config;
use mindtrack_server::inference::ModelRegistry;
use mindtrack_server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(config.is_production());

    for setting in &config.rejected {
        tracing::warn!("Ignoring invalid {}", setting);
    }
    tracing::info!("MindTrack server starting (mode: {})...", config.serve_mode);

    // Load model artifacts
    let required = config.serve_mode.required_slots();
    let registry = ModelRegistry::load(&config.artifacts, required);
    registry.log_status();
    if !registry.is_ready(required) {
        tracing::warn!("Not every model is loaded; dependent endpoints will answer with errors");
    }

    let addr = config.bind_address();
    let state = AppState {
        registry: Arc::new(registry),
        config,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Human-readable logs in development, JSON lines in production
fn init_tracing(production: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mindtrack_server=debug,tower_http=debug".into());

    let (json, pretty) = if production {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
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

    tracing::info!("Shutdown signal received");
}
