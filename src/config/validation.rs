//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs, value ranges and the operational window
//! - Reject malformed backend URLs at startup instead of letting them
//!   surface as probe failures
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LinkConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::LinkConfig;
use crate::connectivity::OperationalWindow;

/// One semantic problem, tagged with the offending field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed config. Collects every error.
pub fn validate_config(config: &LinkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "backend.base_url", &config.backend.base_url);
    for (i, candidate) in config.backend.candidates.iter().enumerate() {
        check_url(&mut errors, &format!("backend.candidates[{}]", i), candidate);
    }
    if !config.backend.health_path.starts_with('/') {
        errors.push(ValidationError::new("backend.health_path", "must start with '/'"));
    }
    if config.backend.health_timeout_ms == 0 {
        errors.push(ValidationError::new("backend.health_timeout_ms", "must be greater than 0"));
    }
    if config.backend.request_timeout_ms == 0 {
        errors.push(ValidationError::new("backend.request_timeout_ms", "must be greater than 0"));
    }

    let connectivity = &config.connectivity;
    if connectivity.failure_threshold == 0 {
        errors.push(ValidationError::new(
            "connectivity.failure_threshold",
            "must be at least 1",
        ));
    }
    if connectivity.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "connectivity.poll_interval_ms",
            "must be greater than 0",
        ));
    }
    let window = &connectivity.operational_window;
    if let Err(e) = OperationalWindow::parse(&window.start, &window.end) {
        errors.push(ValidationError::new("connectivity.operational_window", e.to_string()));
    }
    if connectivity.domains.is_empty() {
        errors.push(ValidationError::new("connectivity.domains", "at least one domain required"));
    }
    let mut seen = HashSet::new();
    for domain in &connectivity.domains {
        if domain.trim().is_empty() {
            errors.push(ValidationError::new("connectivity.domains", "domain names must not be empty"));
        } else if !seen.insert(domain.as_str()) {
            errors.push(ValidationError::new(
                "connectivity.domains",
                format!("duplicate domain '{}'", domain),
            ));
        }
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new("admin.bind_address", "not a socket address"));
        }
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }
    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            "expected 'pretty' or 'json'",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, raw: &str) {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported URL '{}' (scheme '{}')", raw, url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", raw, e))),
    }
}
