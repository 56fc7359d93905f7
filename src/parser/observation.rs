//! Parsed access-log record.

use serde::{Deserialize, Serialize};

/// One structured observation derived from a raw access-log line.
///
/// Every derived field may be empty or zero; only the raw text is guaranteed
/// to be present, and it is never modified after construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    /// When the collector parsed the line (seconds since epoch).
    #[serde(rename = "timestamp")]
    pub captured_at: i64,

    /// Time embedded in the line itself, 0 when missing or unparseable.
    #[serde(rename = "unix")]
    pub source_timestamp: i64,

    /// Leading IP of the line.
    #[serde(rename = "ip")]
    pub origin_ip: String,

    #[serde(rename = "method")]
    pub http_method: String,

    #[serde(rename = "path")]
    pub request_path: String,

    #[serde(rename = "version")]
    pub http_version: String,

    /// Proxy-forwarded client address.
    #[serde(rename = "remoteIp")]
    pub forwarded_ip: String,

    #[serde(rename = "status")]
    pub status_code: String,

    #[serde(rename = "raw")]
    raw_text: String,
}

impl Observation {
    /// An observation carrying only the raw text.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw_text: raw.into(),
            ..Self::default()
        }
    }

    /// The verbatim input line.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// True when at least the origin IP could be extracted.
    pub fn is_analysed(&self) -> bool {
        !self.origin_ip.is_empty()
    }
}
