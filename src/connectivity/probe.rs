//! Backend health probing.
//!
//! # Responsibilities
//! - Issue one bounded-timeout request to the health endpoint
//! - Classify the outcome (timeout, connection error, non-success status)
//!
//! # Design Decisions
//! - Any 2xx is healthy, the body is ignored
//! - The URL is parsed once at construction; a malformed URL never
//!   reaches the probe loop

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use url::Url;

use crate::connectivity::ConnectivityError;

/// Failure of a single health probe. All variants count toward the
/// consecutive-failure threshold.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// No response within the probe timeout.
    #[error("health check timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// DNS failure, refused connection, reset, ...
    #[error("health check connection error: {0}")]
    Connect(String),

    /// Backend answered with a non-success status.
    #[error("health check returned status {0}")]
    Status(u16),
}

impl ProbeError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Timeout(_) => "timeout",
            ProbeError::Connect(_) => "connect",
            ProbeError::Status(_) => "status",
        }
    }
}

/// A health signal for one backend.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Run one probe. Must respect its own timeout.
    async fn check(&self) -> Result<(), ProbeError>;

    /// Base URL of the backend this probe targets.
    fn backend_url(&self) -> &str;
}

/// HTTP `GET {base}{health_path}` probe.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    base_url: String,
    health_url: Url,
    timeout: Duration,
}

impl HttpHealthProbe {
    pub fn new(
        base_url: &str,
        health_path: &str,
        timeout: Duration,
    ) -> Result<Self, ConnectivityError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConnectivityError::Client(e.to_string()))?;
        Self::with_client(client, base_url, health_path, timeout)
    }

    /// Reuse an existing client (connection pool) for the probe.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        health_path: &str,
        timeout: Duration,
    ) -> Result<Self, ConnectivityError> {
        let mut base: Url = base_url
            .parse()
            .map_err(|e| ConnectivityError::InvalidUrl(format!("'{}': {}", base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConnectivityError::InvalidUrl(format!(
                "'{}': unsupported scheme '{}'",
                base_url,
                base.scheme()
            )));
        }
        // Health path is relative to the base path, e.g. `/v1` + `/health`.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let health_url = base
            .join(health_path.trim_start_matches('/'))
            .map_err(|e| ConnectivityError::InvalidUrl(format!("'{}': {}", health_path, e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_url,
            timeout,
        })
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self) -> Result<(), ProbeError> {
        let request = self
            .client
            .get(self.health_url.clone())
            .header(USER_AGENT, "codex-link-health-check")
            .send();

        match time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    Err(ProbeError::Status(status.as_u16()))
                }
            }
            Ok(Err(e)) => Err(ProbeError::Connect(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }

    fn backend_url(&self) -> &str {
        &self.base_url
    }
}
