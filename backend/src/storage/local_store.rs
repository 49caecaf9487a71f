//! # Local Store
//!
//! Typed, canonical on-device copy of the profile and the log collection.
//!
//! Reads are synchronous. Every write goes through a single write lock, so
//! read-modify-write sequences on the log collection (see `append_log`) are
//! serialized and concurrent Add Log calls cannot overwrite each other.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{DailyLog, UserProfile};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::traits::{Connection, DEVICE_ID_KEY, LOGS_KEY, PROFILE_KEY};

#[derive(Clone)]
pub struct LocalStore<C: Connection> {
    connection: C,
    write_lock: Arc<Mutex<()>>,
}

impl<C: Connection> LocalStore<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read the stored profile, `None` if no profile has been saved
    pub fn read_profile(&self) -> Result<Option<UserProfile>> {
        self.read_json(PROFILE_KEY)
    }

    /// Overwrite the single stored profile
    pub fn write_profile(&self, profile: &UserProfile) -> Result<()> {
        let _guard = self.lock()?;
        self.write_json(PROFILE_KEY, profile)?;
        info!("Saved profile for {}", profile.name);
        Ok(())
    }

    /// Read the log collection in insertion order (oldest first)
    pub fn read_logs(&self) -> Result<Vec<DailyLog>> {
        Ok(self.read_json(LOGS_KEY)?.unwrap_or_default())
    }

    /// Replace the whole log collection
    pub fn write_logs(&self, logs: &[DailyLog]) -> Result<()> {
        let _guard = self.lock()?;
        self.write_json(LOGS_KEY, &logs)?;
        debug!("Saved {} logs", logs.len());
        Ok(())
    }

    /// Append one log and persist the full collection, returning it.
    ///
    /// Fails without writing if the identifier is already taken.
    pub fn append_log(&self, log: DailyLog) -> Result<Vec<DailyLog>> {
        let _guard = self.lock()?;

        let mut logs: Vec<DailyLog> = self.read_json(LOGS_KEY)?.unwrap_or_default();
        if logs.iter().any(|existing| existing.id == log.id) {
            return Err(anyhow!("A log with id {} already exists", log.id));
        }

        logs.push(log);
        self.write_json(LOGS_KEY, &logs)?;
        debug!("Appended log, collection now has {} entries", logs.len());
        Ok(logs)
    }

    /// Overwrite the profile and, when given, the log collection under one lock
    pub fn replace_snapshot(&self, profile: &UserProfile, logs: Option<&[DailyLog]>) -> Result<()> {
        let _guard = self.lock()?;
        self.write_json(PROFILE_KEY, profile)?;
        if let Some(logs) = logs {
            self.write_json(LOGS_KEY, &logs)?;
        }
        Ok(())
    }

    /// Delete both profile and logs. The device identifier survives.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        self.connection.remove(PROFILE_KEY)?;
        self.connection.remove(LOGS_KEY)?;
        info!("Cleared local profile and logs");
        Ok(())
    }

    pub fn read_device_id(&self) -> Result<Option<String>> {
        self.read_json(DEVICE_ID_KEY)
    }

    pub fn write_device_id(&self, device_id: &str) -> Result<()> {
        let _guard = self.lock()?;
        self.write_json(DEVICE_ID_KEY, &device_id)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow!("Local store write lock poisoned"))
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.connection.get(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Stored '{}' is not valid", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.connection.put(key, &raw)
    }
}
