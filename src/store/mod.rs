//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     backing.rs (read bytes, `[]` if empty)
//!     → registry.rs (decode JSON array)
//!     → file.rs (FileStore owns the registry)
//!
//! Mutation (record_access_log / record_health):
//!     write lock
//!     → registry.rs (upsert record)
//!     → encode full registry
//!     → backing.rs (rewrite)
//!     → unlock
//! ```
//!
//! # Design Decisions
//! - Full rewrite per mutation; the on-disk format is a single JSON array
//! - The registry is never handed out by reference, only as clones
//! - An append-only log with periodic compaction is the extension point if
//!   registries outgrow full rewrites

use thiserror::Error;

pub mod analytics;
pub mod backing;
pub mod file;
pub mod registry;

pub use analytics::{AppAnalytics, IpStat};
pub use backing::{AtomicFile, Backing};
pub use file::FileStore;
pub use registry::{AppRecord, Registry};

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Existing content is not a valid serialized registry.
    #[error("problem loading apps store from {target}: {source}")]
    Load {
        target: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the backing storage failed.
    #[error("I/O error on apps store {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The registry could not be encoded.
    #[error("cannot encode apps store: {0}")]
    Encode(#[from] serde_json::Error),

    /// The blocking write task panicked or was cancelled.
    #[error("apps store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
