//! Runtime configuration.
//!
//! All settings come from environment variables with defaults suitable for an
//! in-cluster deployment.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Default webhook TLS port
pub const DEFAULT_WEBHOOK_PORT: u16 = 7443;
/// Default path to webhook TLS certificate
pub const DEFAULT_CERT_PATH: &str = "/etc/ssl/certs/tls.crt";
/// Default path to webhook TLS private key
pub const DEFAULT_KEY_PATH: &str = "/etc/ssl/certs/tls.key";
/// Default health/metrics port
pub const DEFAULT_HEALTH_PORT: u16 = 8080;
/// Default request body cap (the API server's own request size limit)
pub const DEFAULT_MAX_BODY_BYTES: usize = 3 * 1024 * 1024;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Settings for the webhook process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    pub port: u16,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub health_port: u16,
    pub max_body_bytes: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_WEBHOOK_PORT,
            cert_path: PathBuf::from(DEFAULT_CERT_PATH),
            key_path: PathBuf::from(DEFAULT_KEY_PATH),
            health_port: DEFAULT_HEALTH_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl WebhookConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            port: parse_or(&lookup, "WEBHOOK_PORT", defaults.port)?,
            cert_path: lookup("WEBHOOK_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cert_path),
            key_path: lookup("WEBHOOK_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_path),
            health_port: parse_or(&lookup, "HEALTH_PORT", defaults.health_port)?,
            max_body_bytes: parse_or(&lookup, "WEBHOOK_MAX_BODY_BYTES", defaults.max_body_bytes)?,
        })
    }

    /// Whether both TLS files exist on disk
    pub fn tls_files_present(&self) -> bool {
        self.cert_path.exists() && self.key_path.exists()
    }
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
