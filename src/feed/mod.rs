//! Mode-aware data feeds.
//!
//! # Data Flow
//! ```text
//! Caller asks a feed for data
//!     → controller.mode()
//!     → Real: backend client (falls back to mock on a failed read)
//!     → Mock: local mock dataset
//!     → FeedResponse { mode, source, data } (same shape either way)
//! ```
//!
//! # Design Decisions
//! - Feeds never touch the controller's failure counter; only probes do
//! - A failed read in real mode is served from the mock dataset for that
//!   call only
//! - Writes (approve/reject) in real mode are not redirected to mock data;
//!   backend errors are returned

pub mod learning;
pub mod mock;
pub mod proposals;

pub use learning::LearningFeed;
pub use mock::MockDataset;
pub use proposals::{ProposalFeed, ReviewResult};

use serde::Serialize;
use thiserror::Error;

use crate::backend::BackendError;
use crate::connectivity::Mode;
use crate::domain::ProposalStatus;

/// Domain name served by [`ProposalFeed`].
pub const PROPOSALS_DOMAIN: &str = "proposals";

/// Domain name served by [`LearningFeed`].
pub const LEARNING_DOMAIN: &str = "ai_learning";

/// Where a feed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Backend,
    Mock,
}

impl FeedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedSource::Backend => "backend",
            FeedSource::Mock => "mock",
        }
    }
}

/// Data plus the mode it was served under.
#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse<T> {
    pub domain: String,
    pub mode: Mode,
    pub source: FeedSource,
    pub data: T,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("proposal '{0}' not found")]
    NotFound(String),

    #[error("proposal '{id}' is {status} and can no longer be reviewed")]
    InvalidTransition { id: String, status: ProposalStatus },

    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for FeedError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(id) => FeedError::NotFound(id),
            other => FeedError::Backend(other),
        }
    }
}
