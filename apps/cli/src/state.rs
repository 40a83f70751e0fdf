//! Application state.

use crate::commands::CommandError;
use crate::db::SqliteRepository;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use study_core::{LinearInterval, Settings};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Global application state.
///
/// The repository mutex is the single writer boundary: every command holds
/// it for the whole of one operation.
pub struct AppState {
    pub repository: Arc<Mutex<SqliteRepository>>,
    pub settings: Settings,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(repository: SqliteRepository, settings: Settings) -> Self {
        Self {
            repository: Arc::new(Mutex::new(repository)),
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn policy(&self) -> LinearInterval {
        LinearInterval::from_settings(&self.settings)
    }

    /// Lock the repository for one operation.
    pub fn repository(&self) -> Result<MutexGuard<'_, SqliteRepository>, CommandError> {
        self.repository
            .lock()
            .map_err(|_| CommandError::storage("repository lock poisoned"))
    }
}
