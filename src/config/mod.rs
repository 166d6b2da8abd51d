//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LinkConfig (validated, immutable)
//!     → shared by value to all subsystems
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new ModePolicy swapped into every controller
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the mode policy is hot-applied
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::AdminConfig;
pub use schema::BackendConfig;
pub use schema::ConnectivityConfig;
pub use schema::LinkConfig;
pub use schema::ObservabilityConfig;
pub use schema::WindowConfig;
