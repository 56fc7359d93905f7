//! Application health status.
//!
//! # States
//! - `UP`: the last probe round succeeded
//! - `DOWN`: the probe could not reach the target
//! - anything else: status text supplied by the probe (e.g. `503 Service Unavailable`)
//!
//! # Design Decisions
//! - The state is kept as free text so probe-specific statuses survive the wire
//! - Timestamps are seconds since the Unix epoch
//! - Last write wins; the timestamp carried inside is informational only

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// State label for a reachable, healthy target.
pub const STATUS_UP: &str = "UP";

/// State label for an unreachable target.
pub const STATUS_DOWN: &str = "DOWN";

/// A status label plus the time it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    /// `UP`, `DOWN` or probe-supplied status text.
    #[serde(rename = "status")]
    pub state: String,

    /// Seconds since epoch.
    #[serde(rename = "timestamp")]
    pub observed_at: i64,
}

impl HealthStatus {
    pub fn new(state: impl Into<String>, observed_at: i64) -> Self {
        Self {
            state: state.into(),
            observed_at,
        }
    }

    /// Sentinel returned for explicit "down" defaults.
    pub fn unhealthy() -> Self {
        Self::new(STATUS_DOWN, 0)
    }

    /// Sentinel for explicit "up" defaults.
    pub fn healthy() -> Self {
        Self::new(STATUS_UP, 1)
    }

    /// `UP` observed right now.
    pub fn up_now() -> Self {
        Self::new(STATUS_UP, unix_now())
    }

    /// `DOWN` observed right now.
    pub fn down_now() -> Self {
        Self::new(STATUS_DOWN, unix_now())
    }

    pub fn is_up(&self) -> bool {
        self.state == STATUS_UP
    }

    pub fn is_down(&self) -> bool {
        self.state == STATUS_DOWN
    }
}

/// Current wall clock in seconds since epoch.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
