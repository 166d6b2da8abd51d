//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for codex-link.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LinkConfig {
    /// Backend location and probe settings.
    pub backend: BackendConfig,

    /// Real/mock mode policy.
    pub connectivity: ConnectivityConfig,

    /// Local status API.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Primary backend URL, used when no candidate answers.
    pub base_url: String,

    /// Additional candidate URLs, probed in order after the primary
    /// (emulator loopback, LAN address, ...).
    pub candidates: Vec<String>,

    /// Path probed for health checks.
    pub health_path: String,

    /// Health check timeout in milliseconds.
    pub health_timeout_ms: u64,

    /// Timeout for data requests (proposals, learning) in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            candidates: vec![
                "http://10.0.2.2:4000".to_string(),
                "http://127.0.0.1:4000".to_string(),
            ],
            health_path: "/health".to_string(),
            health_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

/// Mode policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Consecutive failed probes before switching to mock mode.
    pub failure_threshold: u32,

    /// Interval between automatic probes in milliseconds.
    pub poll_interval_ms: u64,

    /// Daily window in which real mode is permitted.
    pub operational_window: WindowConfig,

    /// Data domains, one controller each.
    pub domains: Vec<String>,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            poll_interval_ms: 30_000,
            operational_window: WindowConfig::default(),
            domains: vec!["proposals".to_string(), "ai_learning".to_string()],
        }
    }
}

/// Operational window, local time, "HH:MM" 24h format.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: "05:00".to_string(),
            end: "21:00".to_string(),
        }
    }
}

/// Status API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the status API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Status API bind address.
    pub bind_address: String,

    /// Mount the force-mode route. Never enable in production.
    pub debug_hooks: bool,

    /// Request timeout for the status API in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
            debug_hooks: false,
            request_timeout_secs: 15,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
