//! Domain model for the data served in real or mock mode.
//!
//! # Design Decisions
//! - One canonical snake_case model; alternate key spellings used by older
//!   backends are handled only in wire.rs
//! - Presentation attributes (label, color, icon) are a pure mapping in
//!   presentation.rs, never stored on the model

pub mod learning;
pub mod presentation;
pub mod proposal;
pub mod wire;

pub use learning::LearningStatus;
pub use presentation::Badge;
pub use proposal::{Proposal, ProposalStatus};
pub use wire::WireError;
