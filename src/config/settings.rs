use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::constants::{DEFAULT_FCM_URL, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_IID_URL, DEFAULT_TOKEN_URL};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Path to the service-account key JSON document.
    pub credentials_path: PathBuf,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// ================================
/// Transport
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Per-request timeout, applies to every item of a batch separately.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: default_timeout_ms() }
    }
}

/// ================================
/// API endpoints
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EndpointsConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_fcm_url")]
    pub fcm_url: String,
    #[serde(default = "default_iid_url")]
    pub iid_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            fcm_url: default_fcm_url(),
            iid_url: default_iid_url(),
        }
    }
}

/// ================================
/// Token store
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CacheConfig {
    #[default]
    Memory,
    File { path: PathBuf },
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_fcm_url() -> String {
    DEFAULT_FCM_URL.to_string()
}

fn default_iid_url() -> String {
    DEFAULT_IID_URL.to_string()
}
