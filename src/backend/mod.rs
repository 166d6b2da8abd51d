//! Backend HTTP API.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     candidates.rs probes [primary, candidates...] in order
//!     → first reachable URL becomes the backend base URL
//!
//! Real mode:
//!     feed → client.rs → GET/POST {base}/api/...
//!     → domain::wire adapter → domain model
//! ```

pub mod candidates;
pub mod client;

pub use candidates::select_backend_url;
pub use client::{BackendClient, BackendError, BackendResult};
