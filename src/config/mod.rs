//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → CLI flags (binaries)
//!     → validation.rs (semantic checks)
//!     → MondConfig (validated, immutable)
//!     → handed to subsystems at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AgentConfig;
pub use schema::AuthConfig;
pub use schema::ListenerConfig;
pub use schema::MondConfig;
pub use schema::ObservabilityConfig;
pub use schema::ParserConfig;
pub use schema::StoreConfig;
