//! # HealthNote Backend
//!
//! Local-first data layer for a personal health journal.
//!
//! - **storage**: the on-device key-value store and typed access to it
//! - **io**: the optional remote backend mirror
//! - **domain**: identity, the write pipeline, export/import and metrics
//! - **config**: data directory and remote settings
//!
//! `initialize_backend` wires the services against a data directory; the
//! caller then runs `JournalService::bootstrap` to get the journal state.

use anyhow::Result;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

pub use config::{AppConfig, RemoteConfig};
pub use domain::{ExportService, JournalService, MetricsService};
pub use io::remote::{RemoteSyncAdapter, RestBackend};
pub use storage::{Connection, FileConnection, LocalStore};

/// Every service the application needs, sharing one local store
#[derive(Clone)]
pub struct AppState<C: Connection = FileConnection> {
    pub journal_service: JournalService<C>,
    pub export_service: ExportService<C>,
    pub metrics_service: MetricsService,
}

impl<C: Connection> AppState<C> {
    pub fn new(connection: C, remote: RemoteSyncAdapter) -> Self {
        let store = LocalStore::new(connection);
        Self {
            journal_service: JournalService::new(store.clone(), remote),
            export_service: ExportService::new(store),
            metrics_service: MetricsService::new(),
        }
    }
}

/// Remote adapter for the configured backend, disabled when not configured
pub fn build_remote_adapter(config: &RemoteConfig) -> RemoteSyncAdapter {
    let (Some(url), Some(key)) = (config.url.as_deref(), config.api_key.as_deref()) else {
        info!("No remote backend configured, running local-only");
        return RemoteSyncAdapter::disabled();
    };
    if !config.is_configured() {
        info!("Remote backend settings incomplete, running local-only");
        return RemoteSyncAdapter::disabled();
    }

    match RestBackend::new(url, key, config.timeout()) {
        Ok(backend) => {
            info!("Remote backend configured at {}", url);
            RemoteSyncAdapter::new(Arc::new(backend), config.timeout())
        }
        Err(e) => {
            warn!("Remote backend unusable ({}), running local-only", e);
            RemoteSyncAdapter::disabled()
        }
    }
}

/// Set up the file-backed services for a data directory
pub fn initialize_backend(data_dir: &Path, config: &AppConfig) -> Result<AppState> {
    info!("Setting up local store in {:?}", data_dir);
    let connection = FileConnection::new(data_dir)?;

    info!("Setting up domain services");
    Ok(AppState::new(connection, build_remote_adapter(&config.remote)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::logs::AddLogCommand;
    use chrono::NaiveDate;
    use shared::LogCategory;
    use tempfile::TempDir;

    #[test]
    fn test_remote_adapter_requires_url_and_key() {
        assert!(!build_remote_adapter(&RemoteConfig::default()).is_configured());

        let partial = RemoteConfig {
            url: Some("https://db.example.com".to_string()),
            api_key: Some(" ".to_string()),
            timeout_secs: None,
        };
        assert!(!build_remote_adapter(&partial).is_configured());

        let complete = RemoteConfig {
            api_key: Some("anon".to_string()),
            ..partial
        };
        assert!(build_remote_adapter(&complete).is_configured());
    }

    #[tokio::test]
    async fn test_file_backed_journal_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let first = initialize_backend(temp_dir.path(), &config).unwrap();
        let mut state = first.journal_service.bootstrap(None).await.unwrap();
        first
            .journal_service
            .complete_onboarding(&mut state, "Kai", NaiveDate::from_ymd_opt(1988, 1, 5).unwrap(), None, today)
            .await
            .unwrap();
        first
            .journal_service
            .add_log(&mut state, AddLogCommand::score(today, LogCategory::Sleep, 7.0))
            .await
            .unwrap();

        let second = initialize_backend(temp_dir.path(), &config).unwrap();
        let reloaded = second.journal_service.bootstrap(None).await.unwrap();

        assert_eq!(reloaded.identity, state.identity);
        assert_eq!(reloaded.profile, state.profile);
        assert_eq!(reloaded.logs, state.logs);
    }
}
