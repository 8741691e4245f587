//! Webhook module for validating Deployment admission requests.
//!
//! - `handler`: the pure review pipeline over a request body
//! - `policies`: validation policies run against the decoded workload
//! - `server`: HTTP endpoint and TLS serving

pub mod handler;
pub mod policies;
mod server;

pub use handler::{AdmissionHandler, Reviewed, check_resource_kind};
pub use policies::{Verdict, validate_all};
pub use server::{
    VALIDATE_PATH, WebhookError, WebhookState, create_webhook_router, run_webhook_server,
};
