//! File-backed application store.
//!
//! # Responsibilities
//! - Load the registry once at startup, initializing empty storage to `[]`
//! - Serve snapshots of apps, observations and health
//! - Re-encode and rewrite the whole registry after every mutation
//!
//! # Concurrency
//! The registry sits behind an `RwLock`, the backing storage behind a `Mutex`.
//! A mutation takes the backing lock first and holds it until its snapshot is
//! written, so snapshots reach storage in mutation order. The registry write
//! lock is held only for modify → encode: readers never observe a half-applied
//! mutation and never wait on disk I/O.
//!
//! The `*_async` variants run the synchronous write on tokio's blocking pool
//! so request handlers never stall a runtime worker.

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use tokio::task;

use crate::health::HealthStatus;
use crate::observability::metrics;
use crate::parser::Observation;
use crate::store::backing::{AtomicFile, Backing};
use crate::store::registry::{AppRecord, Registry};
use crate::store::StoreError;

const EMPTY_REGISTRY: &[u8] = b"[]\n";

/// Durable, thread-safe application store.
pub struct FileStore {
    registry: RwLock<Registry>,
    backing: Mutex<Box<dyn Backing>>,
}

impl FileStore {
    /// Open a store over an already-open handle.
    pub fn open<B: Backing + 'static>(backing: B) -> Result<Self, StoreError> {
        Self::load(Box::new(backing))
    }

    /// Open (or create) a store at `path`, with atomic rewrites.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::load(Box::new(AtomicFile::new(path)))
    }

    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            backing: Mutex::new(Box::new(Cursor::new(EMPTY_REGISTRY.to_vec()))),
        }
    }

    fn load(mut backing: Box<dyn Backing>) -> Result<Self, StoreError> {
        let target = backing.describe();
        let mut bytes = backing.read_all().map_err(|source| StoreError::Io {
            target: target.clone(),
            source,
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::info!(store = %target, "Initialising empty apps store");
            backing
                .rewrite(EMPTY_REGISTRY)
                .map_err(|source| StoreError::Io {
                    target: target.clone(),
                    source,
                })?;
            bytes = EMPTY_REGISTRY.to_vec();
        }

        let registry =
            Registry::from_slice(&bytes).map_err(|source| StoreError::Load { target: target.clone(), source })?;

        tracing::info!(store = %target, apps = registry.len(), "Apps store loaded");
        metrics::record_store_apps(registry.len());

        Ok(Self {
            registry: RwLock::new(registry),
            backing: Mutex::new(backing),
        })
    }

    /// Names of all applications, in registration order.
    pub fn app_names(&self) -> Vec<String> {
        self.read().names()
    }

    /// Snapshot of every application record.
    pub fn apps(&self) -> Vec<AppRecord> {
        self.read().apps().to_vec()
    }

    /// Snapshot of one application record.
    pub fn app(&self, name: &str) -> Option<AppRecord> {
        self.read().find(name).cloned()
    }

    /// Observations for `name` in arrival order; empty when unknown.
    pub fn access_logs(&self, name: &str) -> Vec<Observation> {
        self.read()
            .find(name)
            .map(|app| app.observations.clone())
            .unwrap_or_default()
    }

    /// Health of `name`, or the UNHEALTHY sentinel when unknown.
    pub fn health(&self, name: &str) -> HealthStatus {
        self.find_health(name).unwrap_or_else(HealthStatus::unhealthy)
    }

    /// Health of `name`, `None` when the application was never seen.
    pub fn find_health(&self, name: &str) -> Option<HealthStatus> {
        self.read().find(name).map(|app| app.health.clone())
    }

    /// Append an observation and persist the registry.
    pub fn record_access_log(&self, name: &str, observation: Observation) -> Result<(), StoreError> {
        self.mutate(|registry| registry.append_observation(name, observation))?;
        metrics::record_observation(name);
        Ok(())
    }

    /// Overwrite health and persist the registry.
    pub fn record_health(&self, name: &str, status: HealthStatus) -> Result<(), StoreError> {
        let state = status.state.clone();
        self.mutate(|registry| registry.set_health(name, status))?;
        metrics::record_health_report(&state);
        Ok(())
    }

    /// [`record_access_log`](Self::record_access_log) on the blocking pool.
    pub async fn record_access_log_async(
        self: Arc<Self>,
        name: String,
        observation: Observation,
    ) -> Result<(), StoreError> {
        task::spawn_blocking(move || self.record_access_log(&name, observation)).await?
    }

    /// [`record_health`](Self::record_health) on the blocking pool.
    pub async fn record_health_async(
        self: Arc<Self>,
        name: String,
        status: HealthStatus,
    ) -> Result<(), StoreError> {
        task::spawn_blocking(move || self.record_health(&name, status)).await?
    }

    /// Apply `change` under a short registry write lock, then rewrite the
    /// backing storage holding only the backing lock.
    ///
    /// The in-memory change is kept even when the write fails; the next
    /// successful write persists it.
    fn mutate(&self, change: impl FnOnce(&mut Registry)) -> Result<(), StoreError> {
        let mut backing = self.lock_backing();
        let (encoded, apps) = {
            let mut registry = self.write();
            change(&mut registry);
            (registry.to_bytes()?, registry.len())
        };

        let started = Instant::now();
        let result = backing.rewrite(&encoded);
        metrics::record_store_write(started.elapsed(), result.is_ok());
        metrics::record_store_apps(apps);

        result.map_err(|source| {
            let target = backing.describe();
            tracing::error!(store = %target, error = %source, "Failed to persist apps store");
            StoreError::Io { target, source }
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_backing(&self) -> MutexGuard<'_, Box<dyn Backing>> {
        self.backing.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
