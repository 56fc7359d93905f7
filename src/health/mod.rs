//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Agent ticker (agent/ticker.rs):
//!     Periodic timer
//!     → dispatch.rs (one probe task per target)
//!     → probe.rs (HEAD request, classify)
//!     → map target → HealthStatus
//!     → agent/report.rs (POST /health/{app})
//!
//! Collector:
//!     POST /health/{app}
//!     → status.rs (decode)
//!     → store (last write wins)
//! ```
//!
//! # Design Decisions
//! - Probe failures are observations, never errors
//! - Probe rounds are a barrier: all targets complete before reporting
//! - Health state is per-application on the collector side

pub mod dispatch;
pub mod probe;
pub mod status;

pub use dispatch::check_all;
pub use probe::{check_website, website_probe};
pub use status::{HealthStatus, STATUS_DOWN, STATUS_UP};
