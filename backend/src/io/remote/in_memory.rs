use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::backend::RemoteBackend;
use super::error::RemoteError;
use super::rows::{LogRow, ProfileRow};
use crate::domain::models::Session;

/// Simulated failure applied to every call of an `InMemoryBackend`
#[derive(Debug, Clone, PartialEq)]
pub enum FailureMode {
    None,
    Unreachable,
    Reject(u16),
}

#[derive(Default)]
struct Tables {
    profiles: HashMap<String, ProfileRow>,
    logs: Vec<LogRow>,
    calls: usize,
}

/// Remote backend kept in memory, with failure injection.
///
/// Useful as a stand-in backend for offline runs and as a test double.
#[derive(Clone)]
pub struct InMemoryBackend {
    tables: Arc<Mutex<Tables>>,
    failure: Arc<Mutex<FailureMode>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            failure: Arc::new(Mutex::new(FailureMode::None)),
            delay: Arc::new(Mutex::new(None)),
        }
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failure(&self, mode: FailureMode) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = mode;
        }
    }

    /// Make every call wait before answering
    pub fn set_delay(&self, delay: Option<Duration>) {
        if let Ok(mut current) = self.delay.lock() {
            *current = delay;
        }
    }

    pub fn profile_row(&self, user_id: &str) -> Option<ProfileRow> {
        self.tables.lock().ok()?.profiles.get(user_id).cloned()
    }

    pub fn log_rows(&self, user_id: &str) -> Vec<LogRow> {
        self.tables
            .lock()
            .map(|t| t.logs.iter().filter(|r| r.user_id == user_id).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of calls that reached the backend
    pub fn call_count(&self) -> usize {
        self.tables.lock().map(|t| t.calls).unwrap_or(0)
    }

    async fn enter(&self) -> Result<(), RemoteError> {
        let delay = self.delay.lock().ok().and_then(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failure
            .lock()
            .map(|f| f.clone())
            .map_err(|_| RemoteError::Unreachable("backend lock poisoned".into()))?;

        {
            let mut tables = self.tables()?;
            tables.calls += 1;
        }

        match failure {
            FailureMode::None => Ok(()),
            FailureMode::Unreachable => Err(RemoteError::Unreachable("simulated outage".into())),
            FailureMode::Reject(status) => Err(RemoteError::api(status, "simulated rejection")),
        }
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>, RemoteError> {
        self.tables
            .lock()
            .map_err(|_| RemoteError::Unreachable("backend lock poisoned".into()))
    }
}

#[async_trait]
impl RemoteBackend for InMemoryBackend {
    async fn fetch_profile_row(&self, _session: &Session, user_id: &str) -> Result<Option<ProfileRow>, RemoteError> {
        self.enter().await?;
        Ok(self.tables()?.profiles.get(user_id).cloned())
    }

    async fn fetch_log_rows(&self, _session: &Session, user_id: &str) -> Result<Vec<LogRow>, RemoteError> {
        self.enter().await?;
        Ok(self.log_rows(user_id))
    }

    async fn upsert_profile_row(&self, _session: &Session, row: &ProfileRow) -> Result<(), RemoteError> {
        self.enter().await?;
        self.tables()?.profiles.insert(row.user_id.clone(), row.clone());
        Ok(())
    }

    async fn insert_log_row(&self, _session: &Session, row: &LogRow) -> Result<(), RemoteError> {
        self.enter().await?;
        let mut tables = self.tables()?;
        if tables.logs.iter().any(|existing| existing.id == row.id) {
            return Err(RemoteError::api(409, format!("duplicate key value: {}", row.id)));
        }
        tables.logs.push(row.clone());
        Ok(())
    }

    async fn delete_log_rows(&self, _session: &Session, user_id: &str) -> Result<(), RemoteError> {
        self.enter().await?;
        self.tables()?.logs.retain(|row| row.user_id != user_id);
        Ok(())
    }

    async fn delete_profile_row(&self, _session: &Session, user_id: &str) -> Result<(), RemoteError> {
        self.enter().await?;
        self.tables()?.profiles.remove(user_id);
        Ok(())
    }
}
