//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Select backend URL → Build controllers
//!     → Build feeds → Spawn pollers → Start status API
//!
//! Shutdown (shutdown.rs):
//!     Signal received → pollers, reloader and status API stop → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then controllers, then listeners
//! - Fail fast: configuration errors abort startup; an unreachable backend
//!   does not (the controllers handle that)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
