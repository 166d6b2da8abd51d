//! Connectivity mode subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic tick (poller.rs) or manual retry
//!     → controller.rs probe()
//!     → probe.rs health check (bounded timeout)
//!     → failure counter / availability update
//!     → policy.rs decide (hours gate, failure threshold)
//!     → ModeChange broadcast on an actual flip
//!
//! Observers:
//!     → connection_status() snapshots
//!     → subscribe() for mode flips
//! ```
//!
//! # Design Decisions
//! - One controller per data domain, constructed explicitly and shared via Arc
//! - Every cold start is optimistic: real mode, zero failures
//! - Nothing is persisted

pub mod clock;
pub mod controller;
pub mod hours;
pub mod mode;
pub mod poller;
pub mod policy;
pub mod probe;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ConnectivityModeController, ProbeOutcome, ProbeTrigger};
pub use hours::OperationalWindow;
pub use mode::{ConnectionStatus, ConnectivityState, Mode, ModeChange, TransitionReason};
pub use poller::ModePoller;
pub use policy::ModePolicy;
pub use probe::{HealthProbe, HttpHealthProbe, ProbeError};
pub use registry::ControllerRegistry;

use thiserror::Error;

/// Errors raised while building connectivity components. Runtime probe
/// failures are never surfaced this way.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// Backend URL could not be parsed or uses an unsupported scheme.
    #[error("invalid backend URL {0}")]
    InvalidUrl(String),

    /// Operational window bound is not "HH:MM".
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidWindow(String),

    /// Failure threshold must be at least 1.
    #[error("failure threshold must be at least 1")]
    InvalidThreshold,

    /// Mode string other than "real" or "mock".
    #[error("unknown mode '{0}', expected 'real' or 'mock'")]
    UnknownMode(String),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}
