//! Mode, per-domain connectivity state and change notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::connectivity::ConnectivityError;

/// Where a data domain is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Live backend.
    Real,
    /// Local mock dataset.
    Mock,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Real => "real",
            Mode::Mock => "mock",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConnectivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(Mode::Real),
            "mock" => Ok(Mode::Mock),
            other => Err(ConnectivityError::UnknownMode(other.to_string())),
        }
    }
}

/// Mutable state owned by one controller.
///
/// Starts optimistic: `Real` with no failures and an unknown backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityState {
    pub mode: Mode,
    pub consecutive_failures: u32,
    pub backend_available: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self {
            mode: Mode::Real,
            consecutive_failures: 0,
            backend_available: false,
            last_checked_at: None,
        }
    }
}

/// Read-only snapshot handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub domain: String,
    pub mode: Mode,
    pub backend_available: bool,
    pub consecutive_failures: u32,
    pub backend_url: String,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub within_operational_hours: bool,
}

/// Why a mode flip happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    BackendConnected,
    BackendUnavailable,
    OutsideOperationalHours,
    Forced,
}

/// Emitted on every actual Real <-> Mock flip. Never emitted for self-transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeChange {
    pub domain: String,
    pub from: Mode,
    pub to: Mode,
    pub reason: TransitionReason,
    pub at: DateTime<Utc>,
}

impl ModeChange {
    /// One-line text suitable for a banner or snackbar.
    pub fn message(&self) -> String {
        match self.reason {
            TransitionReason::BackendConnected => {
                "Backend connected: switched to real mode".to_string()
            }
            TransitionReason::BackendUnavailable => {
                "Backend unavailable: switched to mock mode".to_string()
            }
            TransitionReason::OutsideOperationalHours => {
                "Outside operational hours: switched to mock mode".to_string()
            }
            TransitionReason::Forced => format!("Mode forced to {}", self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("real".parse::<Mode>().unwrap(), Mode::Real);
        assert_eq!(" MOCK ".parse::<Mode>().unwrap(), Mode::Mock);
        assert!("offline".parse::<Mode>().is_err());
    }

    #[test]
    fn test_initial_state_is_optimistic() {
        let state = ConnectivityState::default();
        assert_eq!(state.mode, Mode::Real);
        assert_eq!(state.consecutive_failures, 0);
        assert!(state.last_checked_at.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let status = ConnectionStatus {
            domain: "proposals".into(),
            mode: Mode::Mock,
            backend_available: false,
            consecutive_failures: 3,
            backend_url: "http://localhost:4000".into(),
            last_checked_at: None,
            within_operational_hours: true,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["mode"], "mock");
        assert_eq!(json["consecutive_failures"], 3);
    }
}
