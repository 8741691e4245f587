//! Admission webhook server.
//!
//! Provides the HTTP endpoint the API server calls for Deployment admission.
//!
//! To enable the webhook:
//! 1. Provision a TLS certificate for the webhook service
//! 2. Create a ValidatingWebhookConfiguration pointing at `/validate`
//! 3. Mount the certificate and key at the configured paths (default /etc/ssl/certs/)

use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_server::tls_rustls::RustlsConfig;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::admission::{AdmissionError, Failure, Stage};
use crate::health::HealthState;
use crate::webhooks::handler::AdmissionHandler;

/// Path the API server posts admission reviews to
pub const VALIDATE_PATH: &str = "/validate";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub handler: AdmissionHandler,
    /// Largest request body accepted, in bytes
    pub max_body_bytes: usize,
    /// Metrics sink, absent in tests that don't need one
    pub health: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(handler: AdmissionHandler, max_body_bytes: usize) -> Self {
        Self {
            handler,
            max_body_bytes,
            health: None,
        }
    }

    pub fn with_health(mut self, health: Arc<HealthState>) -> Self {
        self.health = Some(health);
        self
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(VALIDATE_PATH, post(validate).fallback(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Validate a Deployment admission review
async fn validate(State(state): State<Arc<WebhookState>>, request: Request<Body>) -> Response {
    let started = Instant::now();

    let body = match to_bytes(request.into_body(), state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            let failure = Failure::new(Stage::ReadBody, AdmissionError::BodyRead(e.to_string()));
            return fail(&state, failure, started);
        }
    };
    debug!(bytes = body.len(), "Request body read successfully");

    match state.handler.review(&body) {
        Ok(reviewed) => {
            if let Some(health) = &state.health {
                health
                    .metrics
                    .record_verdict(&reviewed.verdict, started.elapsed().as_secs_f64());
            }
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                reviewed.body,
            )
                .into_response()
        }
        Err(failure) => fail(&state, failure, started),
    }
}

/// Only POST carries an admission review; other methods get a 405 with a body
async fn method_not_allowed(method: Method) -> Response {
    let message = format!(
        "method {} not allowed, POST an AdmissionReview to {}",
        method, VALIDATE_PATH
    );
    debug!(%method, "Rejected non-POST request");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [
            (header::ALLOW, "POST"),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        message,
    )
        .into_response()
}

fn fail(state: &WebhookState, failure: Failure, started: Instant) -> Response {
    error!(
        stage = %failure.stage,
        status = failure.status_code().as_u16(),
        error = %failure.error,
        "Admission review failed"
    );
    if let Some(health) = &state.health {
        health
            .metrics
            .record_failure(failure.stage, started.elapsed().as_secs_f64());
    }
    failure.into_response()
}

/// Errors that can occur when running the webhook server
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Listener could not be bound
    #[error("failed to bind webhook listener: {0}")]
    Bind(String),
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on `port` and serves the /validate endpoint. Readiness is
/// only reported once the listener is bound and the certificate is loaded.
///
/// # Arguments
/// * `state` - Handler and metrics shared by all requests
/// * `port` - Listener port
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    port: u16,
    cert_path: &Path,
    key_path: &Path,
) -> Result<(), WebhookError> {
    let health = state.health.clone();
    let app = create_webhook_router(state);

    let listener = bind_listener(port)?;

    let config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    info!(port, path = VALIDATE_PATH, "Webhook server listening with TLS");

    if let Some(health) = health {
        health.set_ready(true);
    }

    axum_server::from_tcp_rustls(listener, config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}

fn bind_listener(port: u16) -> Result<TcpListener, WebhookError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).map_err(|e| WebhookError::Bind(e.to_string()))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| WebhookError::Bind(e.to_string()))?;
    Ok(listener)
}
