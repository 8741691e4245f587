//! memory-guard - Validating admission webhook for Deployment memory settings.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads configuration from the environment
//! - Builds the schema registry once and injects it into the handler
//! - Starts the health server and the TLS webhook server

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info};

use memory_guard::admission::{Decoder, Scheme};
use memory_guard::health::{HealthState, run_health_server};
use memory_guard::{AdmissionHandler, WebhookConfig, WebhookState, run_webhook_server};

/// Grace period for in-flight reviews to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 2;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memory_guard=info".parse()?),
        )
        .json()
        .init();

    info!("Starting memory-guard");

    let config = WebhookConfig::from_env()?;
    info!(
        port = config.port,
        health_port = config.health_port,
        cert_path = %config.cert_path.display(),
        key_path = %config.key_path.display(),
        "Loaded configuration"
    );

    // Registry is built once and shared by every request through the handler
    let handler = AdmissionHandler::new(Decoder::new(Scheme::admission()));

    let health_state = Arc::new(HealthState::new());

    // Probes should answer even while the webhook is still starting
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    if !config.tls_files_present() {
        error!(
            cert_path = %config.cert_path.display(),
            key_path = %config.key_path.display(),
            "Webhook certificates not found"
        );
        return Err("webhook TLS certificate or key not found".into());
    }

    let state = Arc::new(
        WebhookState::new(handler, config.max_body_bytes).with_health(health_state.clone()),
    );
    let webhook_handle = tokio::spawn(async move {
        run_webhook_server(state, config.port, &config.cert_path, &config.key_path).await
    });

    tokio::select! {
        result = webhook_handle => {
            match result {
                Ok(Ok(())) => info!("Webhook server stopped"),
                Ok(Err(e)) => {
                    error!("Webhook server error: {}", e);
                    return Err(e.into());
                }
                Err(e) => error!("Webhook server task panicked: {}", e),
            }
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Stop receiving new reviews
            health_state.set_ready(false);
            info!("Marked webhook as not ready");

            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;
            info!("Grace period complete, shutting down");
        }
    }

    info!("memory-guard stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Signal handler setup failures are fatal: the process cannot shut down
/// gracefully without them.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
