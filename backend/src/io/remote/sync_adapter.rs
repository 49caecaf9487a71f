//! Best-effort mirror of the local journal to the remote backend.
//!
//! Every call is gated on an authenticated session: without one (or without
//! a configured backend) the adapter is disabled and calls return
//! `Skipped`. Backend errors and timeouts are logged and folded into the
//! returned outcome; nothing here ever fails the local path.

use chrono::Utc;
use log::{debug, warn};
use shared::{DailyLog, UserProfile};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::backend::RemoteBackend;
use super::error::RemoteError;
use super::rows::{LogMapper, ProfileMapper};
use super::{FetchOutcome, RemoteOutcome};
use crate::domain::models::Session;

/// Default bound on a single backend call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RemoteSyncAdapter {
    backend: Option<Arc<dyn RemoteBackend>>,
    timeout: Duration,
}

impl RemoteSyncAdapter {
    pub fn new(backend: Arc<dyn RemoteBackend>, timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            timeout,
        }
    }

    /// Adapter with no backend; every call is skipped
    pub fn disabled() -> Self {
        Self {
            backend: None,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Backend and session, if the adapter is enabled for this call
    fn gate<'a>(&'a self, session: Option<&'a Session>) -> Option<(&'a dyn RemoteBackend, &'a Session)> {
        match (self.backend.as_deref(), session) {
            (Some(backend), Some(session)) => Some((backend, session)),
            _ => None,
        }
    }

    /// Run one backend call under the timeout, classifying failures
    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, RemoteOutcome>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                let outcome = err.outcome();
                warn!("Remote {} failed ({:?}): {}", operation, outcome, err);
                Err(outcome)
            }
            Err(_) => {
                warn!("Remote {} timed out after {:?}", operation, self.timeout);
                Err(RemoteOutcome::Unreachable)
            }
        }
    }

    pub async fn fetch_profile(&self, session: Option<&Session>, identity: &str) -> FetchOutcome<Option<UserProfile>> {
        let Some((backend, session)) = self.gate(session) else {
            return FetchOutcome::Skipped;
        };

        match self
            .bounded("profile fetch", backend.fetch_profile_row(session, identity))
            .await
        {
            Ok(row) => FetchOutcome::Fetched(row.map(ProfileMapper::to_domain)),
            Err(outcome) => FetchOutcome::from_failure(outcome),
        }
    }

    pub async fn fetch_logs(&self, session: Option<&Session>, identity: &str) -> FetchOutcome<Vec<DailyLog>> {
        let Some((backend, session)) = self.gate(session) else {
            return FetchOutcome::Skipped;
        };

        match self.bounded("log fetch", backend.fetch_log_rows(session, identity)).await {
            Ok(rows) => FetchOutcome::Fetched(LogMapper::to_domain_list(rows)),
            Err(outcome) => FetchOutcome::from_failure(outcome),
        }
    }

    pub async fn push_profile(
        &self,
        session: Option<&Session>,
        identity: &str,
        profile: &UserProfile,
    ) -> RemoteOutcome {
        let Some((backend, session)) = self.gate(session) else {
            return RemoteOutcome::Skipped;
        };

        let row = ProfileMapper::to_row(identity, profile, Utc::now());
        match self.bounded("profile push", backend.upsert_profile_row(session, &row)).await {
            Ok(()) => {
                debug!("Pushed profile for {}", identity);
                RemoteOutcome::Ok
            }
            Err(outcome) => outcome,
        }
    }

    pub async fn push_log(&self, session: Option<&Session>, identity: &str, log: &DailyLog) -> RemoteOutcome {
        let Some((backend, session)) = self.gate(session) else {
            return RemoteOutcome::Skipped;
        };

        let row = LogMapper::to_row(identity, log);
        match self.bounded("log push", backend.insert_log_row(session, &row)).await {
            Ok(()) => {
                debug!("Pushed log {} for {}", log.id, identity);
                RemoteOutcome::Ok
            }
            Err(outcome) => outcome,
        }
    }

    /// Delete logs, then the profile. Stops at the first failure.
    pub async fn delete_all(&self, session: Option<&Session>, identity: &str) -> RemoteOutcome {
        let Some((backend, session)) = self.gate(session) else {
            return RemoteOutcome::Skipped;
        };

        if let Err(outcome) = self.bounded("log delete", backend.delete_log_rows(session, identity)).await {
            return outcome;
        }
        match self
            .bounded("profile delete", backend.delete_profile_row(session, identity))
            .await
        {
            Ok(()) => RemoteOutcome::Ok,
            Err(outcome) => outcome,
        }
    }
}
