//! Access-log parsing subsystem.
//!
//! # Data Flow
//! ```text
//! POST /logs/{app} body (one raw line)
//!     → access_log.rs (independent pattern per field)
//!     → observation.rs (structured record, raw text retained)
//!     → store
//! ```

pub mod access_log;
pub mod observation;

pub use access_log::{parse_zone, zone_from_env, AccessLogParser};
pub use observation::Observation;
