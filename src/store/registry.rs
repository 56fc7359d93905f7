//! In-memory application registry.
//!
//! # Responsibilities
//! - Hold every application record (health + observation history)
//! - Upsert on append-observation and set-health
//! - Encode/decode the persisted JSON array
//!
//! # Design Decisions
//! - Lookup is a linear scan; registries hold a handful of applications
//! - Records keep insertion order, which is also the order app names are listed in
//! - Names are stored as given; case normalization happens at the HTTP boundary

use serde::{Deserialize, Serialize};

use crate::health::HealthStatus;
use crate::parser::Observation;

/// One application with its latest health and full observation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    #[serde(rename = "app")]
    pub name: String,

    #[serde(default)]
    pub health: HealthStatus,

    /// Observations in arrival order.
    #[serde(default, rename = "logs")]
    pub observations: Vec<Observation>,
}

impl AppRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            health: HealthStatus::default(),
            observations: Vec::new(),
        }
    }
}

/// Every known application, persisted as a single JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    apps: Vec<AppRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a registry from its persisted form.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode the registry to its persisted form (newline terminated).
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn find(&self, name: &str) -> Option<&AppRecord> {
        self.apps.iter().find(|app| app.name == name)
    }

    /// Append an observation, creating the record if absent.
    pub fn append_observation(&mut self, name: &str, observation: Observation) {
        self.upsert(name).observations.push(observation);
    }

    /// Overwrite an application's health, creating the record if absent.
    pub fn set_health(&mut self, name: &str, status: HealthStatus) {
        self.upsert(name).health = status;
    }

    pub fn names(&self) -> Vec<String> {
        self.apps.iter().map(|app| app.name.clone()).collect()
    }

    pub fn apps(&self) -> &[AppRecord] {
        &self.apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    fn upsert(&mut self, name: &str) -> &mut AppRecord {
        let index = match self.apps.iter().position(|app| app.name == name) {
            Some(index) => index,
            None => {
                self.apps.push(AppRecord::new(name));
                self.apps.len() - 1
            }
        };
        &mut self.apps[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_without_health() {
        let registry = Registry::from_slice(
            br#"[
                {"app":"App1","logs":[
                    {"timestamp":0,"ip":"","path":"","remoteIp":"","status":"","raw":"Test1"},
                    {"timestamp":0,"ip":"","path":"","remoteIp":"","status":"","raw":"Test2"}
                ]},
                {"app":"App2","health":{"status":"UP","timestamp":3}}
            ]"#,
        )
        .unwrap();

        assert_eq!(registry.names(), vec!["App1", "App2"]);
        let app1 = registry.find("App1").unwrap();
        assert_eq!(app1.health, HealthStatus::default());
        assert_eq!(app1.observations[1].raw_text(), "Test2");
        assert!(registry.find("App2").unwrap().observations.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let mut registry = Registry::new();
        for i in 0..5 {
            registry.append_observation("a", Observation::from_raw(format!("line {i}")));
        }
        registry.set_health("b", HealthStatus::new("503 Service Unavailable", 9));
        registry.append_observation("b", Observation::from_raw("only"));

        let decoded = Registry::from_slice(&registry.to_bytes().unwrap()).unwrap();

        assert_eq!(decoded, registry);
        let raws: Vec<_> = decoded
            .find("a")
            .unwrap()
            .observations
            .iter()
            .map(|o| o.raw_text().to_string())
            .collect();
        assert_eq!(raws, ["line 0", "line 1", "line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_upsert_keeps_single_record() {
        let mut registry = Registry::new();
        registry.set_health("x", HealthStatus::healthy());
        registry.append_observation("x", Observation::from_raw("l"));
        registry.set_health("x", HealthStatus::unhealthy());

        assert_eq!(registry.len(), 1);
        let x = registry.find("x").unwrap();
        assert_eq!(x.health, HealthStatus::unhealthy());
        assert_eq!(x.observations.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = Registry::new();
        registry.append_observation("App", Observation::from_raw("1"));
        registry.append_observation("app", Observation::from_raw("2"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(Registry::from_slice(br#"{"app":"x"}"#).is_err());
        assert!(Registry::from_slice(b"not json").is_err());
    }
}
