//! Best-effort access-log line parser.
//!
//! # Responsibilities
//! - Extract origin IP, timestamp, request line, status and forwarded IP
//! - Never reject a line: unmatched fields degrade to empty/zero
//!
//! # Design Decisions
//! - Each field is matched independently with its own pattern, so one malformed
//!   segment does not hide the others
//! - The raw text is always retained
//! - An embedded offset wins; the configured zone only applies when the line
//!   carries no usable offset

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::observation::Observation;

static ORIGIN_IP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("origin ip pattern is valid")
});

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2})\s*([^\]]*)\]")
        .expect("timestamp pattern is valid")
});

static REQUEST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]*\sHTTP/\d\.\d)""#).expect("request line pattern is valid")
});

static STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s(\d{3})\s").expect("status pattern is valid"));

static FORWARDED_IP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})""#).expect("forwarded ip pattern is valid")
});

const WITH_OFFSET: &str = "%d/%b/%Y:%H:%M:%S %z";
const WALL_CLOCK: &str = "%d/%b/%Y:%H:%M:%S";

/// Parser for Apache/nginx style access-log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogParser {
    zone: Option<Tz>,
}

impl AccessLogParser {
    /// Create a parser. `zone` is used for timestamps without a usable offset.
    pub fn new(zone: Option<Tz>) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Option<Tz> {
        self.zone
    }

    /// Parse a line, stamping it with the current wall clock.
    pub fn parse(&self, raw: &str) -> Observation {
        self.parse_at(raw, Utc::now().timestamp())
    }

    /// Parse a line captured at `captured_at` (seconds since epoch).
    pub fn parse_at(&self, raw: &str, captured_at: i64) -> Observation {
        let (http_method, request_path, http_version) = find_request_line(raw);

        let mut observation = Observation::from_raw(raw);
        observation.captured_at = captured_at;
        observation.source_timestamp = self.find_timestamp(raw);
        observation.origin_ip = find_origin_ip(raw);
        observation.http_method = http_method;
        observation.request_path = request_path;
        observation.http_version = http_version;
        observation.forwarded_ip = find_forwarded_ip(raw);
        observation.status_code = find_status(raw);

        let missing = missing_fields(&observation);
        if !missing.is_empty() {
            tracing::debug!(missing = ?missing, line_len = raw.len(), "Access log line partially parsed");
        }

        observation
    }

    fn find_timestamp(&self, raw: &str) -> i64 {
        let Some(caps) = TIMESTAMP.captures(raw) else {
            return 0;
        };
        let wall = &caps[1];
        let offset = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

        if !offset.is_empty() {
            match DateTime::parse_from_str(&format!("{wall} {offset}"), WITH_OFFSET) {
                Ok(t) => return t.timestamp(),
                Err(e) => {
                    tracing::debug!(timestamp = %wall, offset = %offset, error = %e, "Embedded offset unusable");
                }
            }
        }

        let naive = match NaiveDateTime::parse_from_str(wall, WALL_CLOCK) {
            Ok(naive) => naive,
            Err(e) => {
                tracing::warn!(timestamp = %wall, error = %e, "Cannot parse access log timestamp");
                return 0;
            }
        };

        match self.zone {
            Some(zone) => match zone.from_local_datetime(&naive).earliest() {
                Some(t) => t.timestamp(),
                None => {
                    tracing::warn!(timestamp = %wall, zone = %zone, "Timestamp does not exist in zone");
                    0
                }
            },
            None => {
                tracing::warn!(timestamp = %wall, "Timestamp has no usable offset and no time zone is configured");
                0
            }
        }
    }
}

/// Parse an IANA zone name such as `Europe/Zurich`.
pub fn parse_zone(name: &str) -> Result<Tz, String> {
    name.trim()
        .trim_start_matches(':')
        .parse::<Tz>()
        .map_err(|e| e.to_string())
}

/// Zone from the process `TZ` variable, if set and valid.
pub fn zone_from_env() -> Option<Tz> {
    let name = std::env::var("TZ").ok().filter(|v| !v.trim().is_empty())?;
    match parse_zone(&name) {
        Ok(zone) => Some(zone),
        Err(e) => {
            tracing::warn!(tz = %name, error = %e, "Ignoring unrecognised TZ");
            None
        }
    }
}

fn find_origin_ip(raw: &str) -> String {
    ORIGIN_IP
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn find_status(raw: &str) -> String {
    STATUS
        .captures(raw)
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

fn find_request_line(raw: &str) -> (String, String, String) {
    let Some(caps) = REQUEST_LINE.captures(raw) else {
        return Default::default();
    };
    let mut parts = caps[1].splitn(3, ' ');
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();
    let version = parts.next().unwrap_or_default().to_string();
    (method, path, version)
}

fn find_forwarded_ip(raw: &str) -> String {
    FORWARDED_IP
        .captures_iter(raw)
        .last()
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

fn missing_fields(o: &Observation) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if o.origin_ip.is_empty() {
        missing.push("ip");
    }
    if o.source_timestamp == 0 {
        missing.push("timestamp");
    }
    if o.request_path.is_empty() {
        missing.push("path");
    }
    if o.status_code.is_empty() {
        missing.push("status");
    }
    if o.forwarded_ip.is_empty() {
        missing.push("remote_ip");
    }
    missing
}
