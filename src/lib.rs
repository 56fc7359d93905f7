//! mond: access-log and health collector with a reporting agent.

pub mod agent;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod parser;
pub mod store;

pub use config::schema::MondConfig;
pub use health::HealthStatus;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use parser::{AccessLogParser, Observation};
pub use store::{FileStore, StoreError};
