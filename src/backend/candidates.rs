//! Backend URL selection.
//!
//! # Responsibilities
//! - Probe the primary URL and the configured candidates, in order
//! - Pick the first reachable one, otherwise fall back to the primary
//!
//! # Design Decisions
//! - Candidates are probed one at a time so the configured order is the
//!   preference order
//! - An unparsable candidate is skipped, never fatal (validation already
//!   rejected it at startup when loaded from a file)

use std::time::Duration;

use crate::connectivity::{HealthProbe, HttpHealthProbe};

/// Primary first, then candidates; duplicates and trailing slashes removed.
pub fn candidate_order(primary: &str, candidates: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::with_capacity(candidates.len() + 1);
    for url in std::iter::once(primary).chain(candidates.iter().map(String::as_str)) {
        let normalized = url.trim().trim_end_matches('/').to_string();
        if !normalized.is_empty() && !ordered.contains(&normalized) {
            ordered.push(normalized);
        }
    }
    ordered
}

/// Return the first reachable backend URL, or the primary if none answers.
pub async fn select_backend_url(
    primary: &str,
    candidates: &[String],
    health_path: &str,
    timeout: Duration,
) -> String {
    for url in candidate_order(primary, candidates) {
        let probe = match HttpHealthProbe::new(&url, health_path, timeout) {
            Ok(probe) => probe,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Skipping invalid backend candidate");
                continue;
            }
        };
        match probe.check().await {
            Ok(()) => {
                tracing::info!(url = %url, "Backend candidate reachable");
                return url;
            }
            Err(e) => tracing::debug!(url = %url, error = %e, "Backend candidate unreachable"),
        }
    }

    let fallback = primary.trim_end_matches('/').to_string();
    tracing::warn!(url = %fallback, "No backend candidate reachable, using primary URL");
    fallback
}
