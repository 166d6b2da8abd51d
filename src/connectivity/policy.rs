//! Mode decision policy.
//!
//! # State Transitions
//! ```text
//! Real → Mock: consecutive_failures >= failure_threshold
//!              OR outside operational hours
//! Mock → Real: backend_available AND inside operational hours
//! ```
//!
//! # Design Decisions
//! - One pure function serves probes, periodic evaluation and reloads
//! - Hours gate is checked first and dominates backend health
//! - A healthy backend implies zero failures (success resets the counter),
//!   so the threshold and availability checks never disagree

use crate::config::ConnectivityConfig;
use crate::connectivity::hours::OperationalWindow;
use crate::connectivity::mode::{Mode, TransitionReason};
use crate::connectivity::ConnectivityError;

/// Threshold and window; hot-swappable on config reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    pub failure_threshold: u32,
    pub window: OperationalWindow,
}

impl Default for ModePolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            window: OperationalWindow::default(),
        }
    }
}

impl ModePolicy {
    pub fn from_config(config: &ConnectivityConfig) -> Result<Self, ConnectivityError> {
        if config.failure_threshold == 0 {
            return Err(ConnectivityError::InvalidThreshold);
        }
        let window = OperationalWindow::parse(
            &config.operational_window.start,
            &config.operational_window.end,
        )?;
        Ok(Self {
            failure_threshold: config.failure_threshold,
            window,
        })
    }

    /// Derive the mode from current facts. Returns the current mode when no
    /// rule applies.
    pub fn decide(
        &self,
        current: Mode,
        backend_available: bool,
        consecutive_failures: u32,
        within_hours: bool,
    ) -> Mode {
        if !within_hours {
            Mode::Mock
        } else if consecutive_failures >= self.failure_threshold {
            Mode::Mock
        } else if backend_available {
            Mode::Real
        } else {
            current
        }
    }
}

/// Reason reported for a flip into `to`.
pub(crate) fn reason_for(to: Mode, within_hours: bool) -> TransitionReason {
    match to {
        Mode::Real => TransitionReason::BackendConnected,
        Mode::Mock if !within_hours => TransitionReason::OutsideOperationalHours,
        Mode::Mock => TransitionReason::BackendUnavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectivityConfig, WindowConfig};

    #[test]
    fn test_hours_gate_dominates() {
        let policy = ModePolicy::default();
        for current in [Mode::Real, Mode::Mock] {
            for available in [true, false] {
                for failures in [0, 1, 5] {
                    assert_eq!(policy.decide(current, available, failures, false), Mode::Mock);
                }
            }
        }
    }

    #[test]
    fn test_threshold_reached_forces_mock() {
        let policy = ModePolicy::default();
        assert_eq!(policy.decide(Mode::Real, false, 1, true), Mode::Real);
        assert_eq!(policy.decide(Mode::Real, false, 2, true), Mode::Real);
        assert_eq!(policy.decide(Mode::Real, false, 3, true), Mode::Mock);
        assert_eq!(policy.decide(Mode::Mock, false, 7, true), Mode::Mock);
    }

    #[test]
    fn test_recovery_needs_available_backend() {
        let policy = ModePolicy::default();
        assert_eq!(policy.decide(Mode::Mock, true, 0, true), Mode::Real);
        assert_eq!(policy.decide(Mode::Mock, false, 0, true), Mode::Mock);
    }

    #[test]
    fn test_from_config_validates() {
        let mut config = ConnectivityConfig::default();
        assert_eq!(ModePolicy::from_config(&config).unwrap(), ModePolicy::default());

        config.failure_threshold = 0;
        assert!(matches!(
            ModePolicy::from_config(&config),
            Err(ConnectivityError::InvalidThreshold)
        ));

        config.failure_threshold = 2;
        config.operational_window = WindowConfig {
            start: "nine".into(),
            end: "21:00".into(),
        };
        assert!(matches!(
            ModePolicy::from_config(&config),
            Err(ConnectivityError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_reason_for() {
        assert_eq!(reason_for(Mode::Real, true), TransitionReason::BackendConnected);
        assert_eq!(reason_for(Mode::Mock, true), TransitionReason::BackendUnavailable);
        assert_eq!(reason_for(Mode::Mock, false), TransitionReason::OutsideOperationalHours);
    }
}
