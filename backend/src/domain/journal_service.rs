//! Journal write pipeline: optimistic local writes with a best-effort remote
//! mirror, plus the startup fetch that reconciles the two.
//!
//! Every write is complete once the local store has it. Remote pushes are
//! spawned afterwards and never awaited by the caller; their outcomes are
//! only observable through `flush_remote`.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use log::{info, warn};
use shared::{DailyLog, LogCategory, UserProfile};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

use crate::domain::commands::logs::AddLogCommand;
use crate::domain::commands::profile::UpdateProfileCommand;
use crate::domain::identity_service::IdentityService;
use crate::domain::metrics_service::MetricsService;
use crate::domain::models::{
    apply_body_measures, generate_log_id, validate_log, validate_profile, Identity, JournalState, Session,
};
use crate::io::{FetchOutcome, RemoteOutcome, RemoteSyncAdapter};
use crate::storage::{Connection, LocalStore};

#[derive(Clone)]
pub struct JournalService<C: Connection> {
    store: LocalStore<C>,
    identity_service: IdentityService<C>,
    remote: RemoteSyncAdapter,
    pending: Arc<Mutex<JoinSet<RemoteOutcome>>>,
}

impl<C: Connection> JournalService<C> {
    pub fn new(store: LocalStore<C>, remote: RemoteSyncAdapter) -> Self {
        Self {
            identity_service: IdentityService::new(store.clone()),
            store,
            remote,
            pending: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn store(&self) -> &LocalStore<C> {
        &self.store
    }

    /// Resolve the identity and load the journal state for it
    pub async fn bootstrap(&self, session: Option<Session>) -> Result<JournalState> {
        // A session means nothing without a backend to talk to
        let session = session.filter(|_| self.remote.is_configured());
        let identity = self
            .identity_service
            .resolve_identity(session.as_ref(), self.remote.is_configured())?;

        info!("Active identity: {} ({:?})", identity.id, identity.kind);
        self.startup_fetch(identity, session).await
    }

    /// Load state for an identity.
    ///
    /// Local mode uses the local store as-is. With a session the remote copy
    /// is authoritative: a fetched profile and fetched logs overwrite the
    /// local cache, and a missing or unreachable remote profile leaves the
    /// state without a profile (which triggers onboarding) even if a stale
    /// local copy exists. Logs that cannot be fetched fall back to the cache.
    pub async fn startup_fetch(&self, identity: Identity, session: Option<Session>) -> Result<JournalState> {
        let Some(active_session) = session.as_ref() else {
            let mut state = JournalState::new(identity, None);
            state.profile = self.store.read_profile()?;
            state.logs = self.store.read_logs()?;
            info!(
                "Loaded local journal: profile={}, {} logs",
                state.profile.is_some(),
                state.logs.len()
            );
            return Ok(state);
        };

        let (profile_outcome, logs_outcome) = tokio::join!(
            self.remote.fetch_profile(Some(active_session), &identity.id),
            self.remote.fetch_logs(Some(active_session), &identity.id),
        );

        let profile = match profile_outcome {
            FetchOutcome::Fetched(Some(profile)) => {
                self.store.write_profile(&profile)?;
                Some(profile)
            }
            FetchOutcome::Fetched(None) => {
                info!("No remote profile for {}, onboarding required", identity.id);
                None
            }
            other => {
                warn!("Remote profile unavailable for {} ({:?}), onboarding required", identity.id, other);
                None
            }
        };

        let logs = match logs_outcome {
            FetchOutcome::Fetched(logs) => {
                self.store.write_logs(&logs)?;
                logs
            }
            other => {
                warn!("Remote logs unavailable ({:?}), using local cache", other);
                self.store.read_logs()?
            }
        };

        let mut state = JournalState::new(identity, session);
        state.profile = profile;
        state.logs = logs;
        Ok(state)
    }

    /// Create the profile at the end of onboarding.
    ///
    /// When `is_child_mode` is not given it defaults to on for anyone under 18.
    pub async fn complete_onboarding(
        &self,
        state: &mut JournalState,
        name: &str,
        birth_date: NaiveDate,
        is_child_mode: Option<bool>,
        today: NaiveDate,
    ) -> Result<UserProfile> {
        let child_mode =
            is_child_mode.unwrap_or_else(|| MetricsService::new().suggest_child_mode(birth_date, today));
        let profile = UserProfile::new(name.trim(), birth_date, child_mode);

        self.save_profile(state, profile.clone()).await?;
        info!("Onboarding complete for {}", profile.name);
        Ok(profile)
    }

    /// Save Profile: local write first, remote upsert launched afterwards
    pub async fn save_profile(&self, state: &mut JournalState, profile: UserProfile) -> Result<()> {
        validate_profile(&profile)?;

        self.store.write_profile(&profile)?;
        state.profile = Some(profile.clone());

        if self.should_push(state) {
            let remote = self.remote.clone();
            let session = state.session.clone();
            let identity = state.identity.id.clone();
            self.launch(async move { remote.push_profile(session.as_ref(), &identity, &profile).await });
        }
        Ok(())
    }

    /// Apply a settings edit to the current profile and save it
    pub async fn update_profile(&self, state: &mut JournalState, command: UpdateProfileCommand) -> Result<UserProfile> {
        let mut profile = state
            .profile
            .clone()
            .ok_or_else(|| anyhow!("No profile to update; complete onboarding first"))?;

        if let Some(name) = command.name {
            profile.name = name.trim().to_string();
        }
        if let Some(theme) = command.theme {
            profile.theme = theme;
        }
        if let Some(is_child_mode) = command.is_child_mode {
            profile.is_child_mode = is_child_mode;
        }
        if let Some(height) = command.height {
            profile.height = height;
        }
        if let Some(weight) = command.weight {
            profile.weight = weight;
        }

        self.save_profile(state, profile.clone()).await?;
        Ok(profile)
    }

    /// Add Log: assign an id, append locally, return the full collection.
    ///
    /// Only the new entry is pushed remotely. A body log also refreshes the
    /// profile's height and weight through Save Profile.
    pub async fn add_log(&self, state: &mut JournalState, command: AddLogCommand) -> Result<Vec<DailyLog>> {
        let id = command
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_log_id);

        let log = DailyLog {
            id,
            date: command.date,
            category: command.category,
            value: if command.category == LogCategory::Body { 0.0 } else { command.value },
            note: command.note,
            sub_data: command.sub_data,
        };
        validate_log(&log)?;

        let logs = self.store.append_log(log.clone())?;
        state.logs = logs.clone();
        info!("Added {} log {} for {}", log.category, log.id, log.date);

        if self.should_push(state) {
            let remote = self.remote.clone();
            let session = state.session.clone();
            let identity = state.identity.id.clone();
            let pushed = log.clone();
            self.launch(async move { remote.push_log(session.as_ref(), &identity, &pushed).await });
        }

        if log.category == LogCategory::Body {
            match state.profile.as_ref() {
                Some(profile) => {
                    let updated = apply_body_measures(profile, &log);
                    self.save_profile(state, updated).await?;
                }
                None => warn!("Body log {} recorded without a profile, measures not copied", log.id),
            }
        }

        Ok(logs)
    }

    /// Delete the local profile and logs, and the remote rows when signed in
    pub async fn clear_data(&self, state: &mut JournalState) -> Result<()> {
        self.store.clear()?;
        state.profile = None;
        state.logs.clear();

        if self.should_push(state) {
            let remote = self.remote.clone();
            let session = state.session.clone();
            let identity = state.identity.id.clone();
            self.launch(async move { remote.delete_all(session.as_ref(), &identity).await });
        }
        info!("Cleared journal data for {}", state.identity.id);
        Ok(())
    }

    /// Drop the session and the local copy of the signed-in user's data.
    ///
    /// The device identifier is kept and becomes the active identity.
    pub async fn sign_out(&self, state: &mut JournalState) -> Result<()> {
        self.store.clear()?;
        state.session = None;
        state.profile = None;
        state.logs.clear();
        state.identity = self.identity_service.device_identity()?;
        info!("Signed out, now using device identity {}", state.identity.id);
        Ok(())
    }

    /// Re-read the in-memory state from the local store (after an import)
    pub fn reload(&self, state: &mut JournalState) -> Result<()> {
        state.profile = self.store.read_profile()?;
        state.logs = self.store.read_logs()?;
        Ok(())
    }

    /// Wait for the remote writes still pending and collect their outcomes.
    ///
    /// Writes that finished before a later launch were already released
    /// there, so only the ones since then are reported.
    pub async fn flush_remote(&self) -> Vec<RemoteOutcome> {
        let mut pending = match self.pending.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => {
                warn!("Pending remote writes lost: task set lock poisoned");
                return Vec::new();
            }
        };

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!("Remote write task failed: {}", e);
                    outcomes.push(RemoteOutcome::Unreachable);
                }
            }
        }
        outcomes
    }

    fn should_push(&self, state: &JournalState) -> bool {
        state.session.is_some() && self.remote.is_configured()
    }

    fn launch<F>(&self, write: F)
    where
        F: Future<Output = RemoteOutcome> + Send + 'static,
    {
        match self.pending.lock() {
            Ok(mut pending) => {
                // Release writes that already finished so the set stays bounded
                while let Some(joined) = pending.try_join_next() {
                    match joined {
                        Ok(RemoteOutcome::Ok) | Ok(RemoteOutcome::Skipped) => {}
                        Ok(other) => warn!("Remote write finished without effect: {:?}", other),
                        Err(e) => warn!("Remote write task failed: {}", e),
                    }
                }
                pending.spawn(write);
            }
            Err(_) => warn!("Remote write dropped: task set lock poisoned"),
        }
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::remote::{FailureMode, InMemoryBackend, ProfileMapper, RemoteBackend};
    use crate::storage::MemoryConnection;
    use chrono::Utc;
    use shared::ThemeOption;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Yui".to_string(),
            birth_date: date(1995, 7, 14),
            theme: ThemeOption::System,
            is_child_mode: false,
            height: 160.0,
            weight: 52.0,
        }
    }

    fn local_service() -> JournalService<MemoryConnection> {
        JournalService::new(LocalStore::new(MemoryConnection::new()), RemoteSyncAdapter::disabled())
    }

    fn synced_service(timeout: Duration) -> (JournalService<MemoryConnection>, InMemoryBackend) {
        let backend = InMemoryBackend::new();
        let adapter = RemoteSyncAdapter::new(Arc::new(backend.clone()), timeout);
        (JournalService::new(LocalStore::new(MemoryConnection::new()), adapter), backend)
    }

    fn session() -> Session {
        Session::new("auth-user", "token")
    }

    #[tokio::test]
    async fn test_add_log_assigns_unique_ids_and_persists() {
        let service = local_service();
        let mut state = service.bootstrap(None).await.unwrap();

        service
            .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Mood, 4.0))
            .await
            .unwrap();
        let logs = service
            .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Mood, 2.0))
            .await
            .unwrap();

        assert_eq!(logs.len(), 2);
        assert!(!logs[0].id.is_empty());
        assert_ne!(logs[0].id, logs[1].id);
        assert_eq!(state.logs, logs);
        assert_eq!(service.store().read_logs().unwrap(), logs);
    }

    #[tokio::test]
    async fn test_add_log_keeps_supplied_id() {
        let service = local_service();
        let mut state = service.bootstrap(None).await.unwrap();

        let logs = service
            .add_log(
                &mut state,
                AddLogCommand::score(date(2024, 5, 1), LogCategory::Sleep, 7.5).with_id("fixed-id"),
            )
            .await
            .unwrap();
        assert_eq!(logs[0].id, "fixed-id");

        let duplicate = service
            .add_log(
                &mut state,
                AddLogCommand::score(date(2024, 5, 2), LogCategory::Sleep, 6.0).with_id("fixed-id"),
            )
            .await;
        assert!(duplicate.is_err());
        assert_eq!(service.store().read_logs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_log_is_not_written() {
        let service = local_service();
        let mut state = service.bootstrap(None).await.unwrap();

        let result = service
            .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Mood, 9.0))
            .await;

        assert!(result.is_err());
        assert!(service.store().read_logs().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_body_log_refreshes_profile_measures() {
        let service = local_service();
        let mut state = service.bootstrap(None).await.unwrap();
        service.save_profile(&mut state, profile()).await.unwrap();

        service
            .add_log(&mut state, AddLogCommand::body(date(2024, 5, 3), None, Some(50.5)))
            .await
            .unwrap();

        let stored = service.store().read_profile().unwrap().unwrap();
        assert_eq!(stored.height, 160.0);
        assert_eq!(stored.weight, 50.5);
        assert_eq!(state.profile, Some(stored));
        assert_eq!(state.logs[0].value, 0.0);
    }

    #[tokio::test]
    async fn test_local_mode_never_contacts_backend() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let mut state = service.bootstrap(None).await.unwrap();

        service.save_profile(&mut state, profile()).await.unwrap();
        service
            .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Stress, 3.0))
            .await
            .unwrap();

        assert!(service.flush_remote().await.is_empty());
        assert_eq!(backend.call_count(), 0);
        assert!(!state.identity.is_authenticated());
    }

    #[tokio::test]
    async fn test_remote_push_is_incremental() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let mut state = service.bootstrap(Some(session())).await.unwrap();
        assert!(state.needs_onboarding());

        service.save_profile(&mut state, profile()).await.unwrap();
        assert_eq!(service.flush_remote().await, vec![RemoteOutcome::Ok]);

        service
            .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Mood, 3.0))
            .await
            .unwrap();
        service
            .add_log(&mut state, AddLogCommand::body(date(2024, 5, 2), Some(161.0), None))
            .await
            .unwrap();

        let outcomes = service.flush_remote().await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| *o == RemoteOutcome::Ok));

        assert_eq!(backend.log_rows("auth-user").len(), 2);
        assert_eq!(backend.profile_row("auth-user").unwrap().height, 161.0);
    }

    #[tokio::test]
    async fn test_remote_failure_does_not_fail_local_write() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let mut state = service.bootstrap(Some(session())).await.unwrap();
        backend.set_failure(FailureMode::Unreachable);

        let logs = service
            .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Exercise, 6.0))
            .await
            .unwrap();

        assert_eq!(logs.len(), 1);
        assert_eq!(service.flush_remote().await, vec![RemoteOutcome::Unreachable]);
        assert_eq!(service.store().read_logs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_log_does_not_wait_for_hung_backend() {
        let (service, backend) = synced_service(Duration::from_millis(100));
        let mut state = service.bootstrap(Some(session())).await.unwrap();
        backend.set_delay(Some(Duration::from_secs(30)));

        let write = service.add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Mood, 5.0));
        let logs = tokio::time::timeout(Duration::from_millis(50), write)
            .await
            .expect("local write must not wait on the remote")
            .unwrap();
        assert_eq!(logs.len(), 1);

        // The bounded remote call gives up on its own
        assert_eq!(service.flush_remote().await, vec![RemoteOutcome::Unreachable]);
    }

    #[tokio::test]
    async fn test_finished_pushes_are_released_without_flush() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let mut state = service.bootstrap(Some(session())).await.unwrap();

        for day in 1..=50 {
            service
                .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Stress, 4.0))
                .await
                .unwrap();
            // Let the spawned push run to completion
            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(service.pending_count() <= 2, "pending grew to {} after {} writes", service.pending_count(), day);
        }

        assert!(service.flush_remote().await.len() <= 2);
        assert_eq!(backend.log_rows("auth-user").len(), 50);
    }

    #[tokio::test]
    async fn test_startup_fetch_overwrites_local_cache() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let remote_profile = profile();
        backend
            .upsert_profile_row(&session(), &ProfileMapper::to_row("auth-user", &remote_profile, Utc::now()))
            .await
            .unwrap();

        let mut stale = profile();
        stale.name = "Stale".to_string();
        service.store().write_profile(&stale).unwrap();

        let state = service.bootstrap(Some(session())).await.unwrap();

        assert_eq!(state.identity, Identity::authenticated("auth-user"));
        assert_eq!(state.profile, Some(remote_profile.clone()));
        assert_eq!(service.store().read_profile().unwrap(), Some(remote_profile));
        assert!(state.logs.is_empty());
    }

    #[tokio::test]
    async fn test_missing_remote_profile_ignores_stale_cache() {
        let (service, _backend) = synced_service(Duration::from_secs(1));
        service.store().write_profile(&profile()).unwrap();

        let state = service.bootstrap(Some(session())).await.unwrap();

        assert!(state.needs_onboarding());
    }

    #[tokio::test]
    async fn test_unreachable_remote_falls_back_to_cached_logs() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let mut local = service.bootstrap(None).await.unwrap();
        service.save_profile(&mut local, profile()).await.unwrap();
        service
            .add_log(&mut local, AddLogCommand::score(date(2024, 5, 1), LogCategory::Mood, 4.0))
            .await
            .unwrap();
        backend.set_failure(FailureMode::Unreachable);

        let state = service.bootstrap(Some(session())).await.unwrap();

        assert!(state.needs_onboarding());
        assert_eq!(state.logs.len(), 1);
    }

    #[tokio::test]
    async fn test_session_without_backend_is_local_mode() {
        let service = local_service();
        let state = service.bootstrap(Some(session())).await.unwrap();

        assert!(!state.session_active());
        assert!(!state.identity.is_authenticated());
    }

    #[tokio::test]
    async fn test_clear_data_removes_local_and_remote() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let mut state = service.bootstrap(Some(session())).await.unwrap();
        service.save_profile(&mut state, profile()).await.unwrap();
        service
            .add_log(&mut state, AddLogCommand::score(date(2024, 5, 1), LogCategory::Mood, 4.0))
            .await
            .unwrap();
        service.flush_remote().await;

        service.clear_data(&mut state).await.unwrap();
        service.flush_remote().await;

        assert_eq!(service.store().read_profile().unwrap(), None);
        assert!(service.store().read_logs().unwrap().is_empty());
        assert!(state.profile.is_none() && state.logs.is_empty());
        assert!(backend.profile_row("auth-user").is_none());
        assert!(backend.log_rows("auth-user").is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_falls_back_to_device_identity() {
        let (service, backend) = synced_service(Duration::from_secs(1));
        let mut state = service.bootstrap(Some(session())).await.unwrap();
        service.save_profile(&mut state, profile()).await.unwrap();
        service.flush_remote().await;

        service.sign_out(&mut state).await.unwrap();

        assert!(!state.session_active());
        assert!(!state.identity.is_authenticated());
        assert!(state.needs_onboarding());
        assert_eq!(service.store().read_profile().unwrap(), None);
        // Remote data is untouched by sign-out
        assert!(backend.profile_row("auth-user").is_some());
    }

    #[tokio::test]
    async fn test_onboarding_defaults_child_mode_from_age() {
        let service = local_service();
        let mut state = service.bootstrap(None).await.unwrap();

        let child = service
            .complete_onboarding(&mut state, " Ren ", date(2018, 3, 1), None, date(2024, 6, 1))
            .await
            .unwrap();
        assert!(child.is_child_mode);
        assert_eq!(child.name, "Ren");

        let adult = service
            .complete_onboarding(&mut state, "Ren", date(1990, 3, 1), None, date(2024, 6, 1))
            .await
            .unwrap();
        assert!(!adult.is_child_mode);
        assert_eq!(state.profile, Some(adult));
    }

    #[tokio::test]
    async fn test_update_profile_requires_existing_profile() {
        let service = local_service();
        let mut state = service.bootstrap(None).await.unwrap();

        let missing = service
            .update_profile(&mut state, UpdateProfileCommand::default())
            .await;
        assert!(missing.is_err());

        service.save_profile(&mut state, profile()).await.unwrap();
        let updated = service
            .update_profile(
                &mut state,
                UpdateProfileCommand {
                    theme: Some(ThemeOption::Dark),
                    is_child_mode: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.theme, ThemeOption::Dark);
        assert!(updated.is_child_mode);
        assert_eq!(updated.name, "Yui");
    }
}
