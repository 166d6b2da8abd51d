//! Typed client for the backend JSON API.
//!
//! # Responsibilities
//! - List proposals, approve/reject one, read learning status
//! - Enforce a per-request timeout
//! - Map transport and status failures to `BackendError`
//!
//! # Design Decisions
//! - Never consulted for the real/mock decision; only probes do that
//! - Response bodies go through the wire adapter, never straight into
//!   domain types

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use url::Url;

use crate::domain::wire::{LearningEnvelope, ProposalEnvelope};
use crate::domain::{LearningStatus, Proposal};

/// Errors from backend data requests.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("request to {url} timed out after {}ms", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("proposal '{0}' not found")]
    NotFound(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Result type for backend requests.
pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Review {
    Approve,
    Reject,
}

impl Review {
    fn path(self) -> &'static str {
        match self {
            Review::Approve => "approve",
            Review::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Self::with_client(client, base_url, timeout)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let mut base_url: Url = base_url
            .parse()
            .map_err(|e| BackendError::InvalidUrl(format!("'{}': {}", base_url, e)))?;
        // Url::join drops the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/proposals`
    pub async fn list_proposals(&self) -> BackendResult<Vec<Proposal>> {
        let envelope: ProposalEnvelope = self.get_json("api/proposals").await?;
        Ok(envelope.into_proposals())
    }

    /// `POST /api/proposals/{id}/approve`
    pub async fn approve_proposal(&self, id: &str) -> BackendResult<()> {
        self.review(id, Review::Approve).await
    }

    /// `POST /api/proposals/{id}/reject`
    pub async fn reject_proposal(&self, id: &str) -> BackendResult<()> {
        self.review(id, Review::Reject).await
    }

    /// `GET /api/learning/status`
    pub async fn learning_status(&self) -> BackendResult<Vec<LearningStatus>> {
        let envelope: LearningEnvelope = self.get_json("api/learning/status").await?;
        Ok(envelope.into_statuses())
    }

    async fn review(&self, id: &str, review: Review) -> BackendResult<()> {
        let mut url = self.endpoint("api/proposals")?;
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .push(id)
            .push(review.path());

        let response = self.send(self.client.post(url.clone()), &url).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(id.to_string())),
            s if s.is_success() => Ok(()),
            s => Err(BackendError::Status {
                status: s.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> BackendResult<reqwest::Response> {
        match time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(BackendError::Request(e.to_string())),
            Err(_) => Err(BackendError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> BackendResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(format!("'{}': {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_keep_base_path() {
        let client = BackendClient::new("http://host:4000/v1", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("api/proposals").unwrap().as_str(),
            "http://host:4000/v1/api/proposals"
        );

        let client = BackendClient::new("http://host:4000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("api/learning/status").unwrap().as_str(),
            "http://host:4000/api/learning/status"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            BackendClient::new("::", Duration::from_secs(1)),
            Err(BackendError::InvalidUrl(_))
        ));
    }
}
