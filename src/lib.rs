//! codex-link: real/mock connectivity mode controller for the Codex client.
//!
//! Each data domain (proposals, AI learning) gets a controller that probes
//! the backend, applies an operational-hours gate and a consecutive-failure
//! threshold, and tells observers whether data should come from the live
//! backend or from the local mock dataset.

pub mod admin;
pub mod backend;
pub mod config;
pub mod connectivity;
pub mod domain;
pub mod feed;
pub mod lifecycle;
pub mod observability;

pub use config::schema::LinkConfig;
pub use connectivity::{ConnectivityModeController, Mode};
pub use lifecycle::Shutdown;
