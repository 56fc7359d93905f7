//! Per-application analytics derived from the observation history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::health::HealthStatus;
use crate::parser::Observation;
use crate::store::registry::AppRecord;

/// Paths are grouped by this many leading characters.
const PATH_KEY_CHARS: usize = 20;

/// Requests seen from one forwarded client address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpStat {
    pub ip: String,
    pub count: usize,
    /// Truncated path → last full path seen under that prefix.
    pub paths: BTreeMap<String, String>,
}

/// Summary served by `GET /analytics/{app}`.
#[derive(Debug, Clone, Serialize)]
pub struct AppAnalytics {
    pub app: String,
    pub health: HealthStatus,
    pub total: usize,
    pub logs_per_day: BTreeMap<String, usize>,
    pub ip_stats: Vec<IpStat>,
    /// Observations, newest source timestamp first.
    pub logs: Vec<Observation>,
}

impl AppRecord {
    /// Observations sorted by source timestamp, newest first.
    pub fn observations_newest_first(&self) -> Vec<Observation> {
        let mut sorted = self.observations.clone();
        sorted.sort_by(|a, b| b.source_timestamp.cmp(&a.source_timestamp));
        sorted
    }

    /// Observation count per calendar day (`YYYY-MM-DD`) in `zone`, UTC when `None`.
    ///
    /// Observations without a source timestamp are not counted.
    pub fn log_count_per_day(&self, zone: Option<Tz>) -> BTreeMap<String, usize> {
        let mut per_day = BTreeMap::new();
        for observation in &self.observations {
            if observation.source_timestamp == 0 {
                continue;
            }
            let Some(utc) = DateTime::<Utc>::from_timestamp(observation.source_timestamp, 0) else {
                continue;
            };
            let day = match zone {
                Some(zone) => utc.with_timezone(&zone).format("%Y-%m-%d").to_string(),
                None => utc.format("%Y-%m-%d").to_string(),
            };
            *per_day.entry(day).or_insert(0) += 1;
        }
        per_day
    }

    /// Request counts per forwarded IP, busiest first.
    pub fn ip_stats(&self) -> Vec<IpStat> {
        let mut stats: Vec<IpStat> = Vec::new();
        for observation in &self.observations {
            if observation.forwarded_ip.is_empty() {
                continue;
            }
            let key: String = observation.request_path.chars().take(PATH_KEY_CHARS).collect();
            match stats.iter_mut().find(|s| s.ip == observation.forwarded_ip) {
                Some(stat) => {
                    stat.count += 1;
                    stat.paths.insert(key, observation.request_path.clone());
                }
                None => stats.push(IpStat {
                    ip: observation.forwarded_ip.clone(),
                    count: 1,
                    paths: BTreeMap::from([(key, observation.request_path.clone())]),
                }),
            }
        }
        // Stable: ties keep first-seen order.
        stats.sort_by(|a, b| b.count.cmp(&a.count));
        stats
    }

    pub fn analytics(&self, zone: Option<Tz>) -> AppAnalytics {
        AppAnalytics {
            app: self.name.clone(),
            health: self.health.clone(),
            total: self.observations.len(),
            logs_per_day: self.log_count_per_day(zone),
            ip_stats: self.ip_stats(),
            logs: self.observations_newest_first(),
        }
    }
}
