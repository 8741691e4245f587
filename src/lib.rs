//! memory-guard library crate
//!
//! A validating admission webhook that denies Deployments whose containers do
//! not declare memory requests and limits.

pub mod admission;
pub mod config;
pub mod health;
pub mod webhooks;
pub mod workload;

pub use config::{ConfigError, WebhookConfig};
pub use health::HealthState;
pub use webhooks::{
    AdmissionHandler, Verdict, WebhookError, WebhookState, create_webhook_router,
    run_webhook_server,
};
