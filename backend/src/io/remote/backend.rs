use async_trait::async_trait;

use super::error::RemoteError;
use super::rows::{LogRow, ProfileRow};
use crate::domain::models::Session;

/// Trait defining the remote backend the journal mirrors to.
///
/// Two collections, `profiles` and `logs`, both keyed by user. Profiles are
/// upserted, logs are inserted. Implementations speak in backend rows;
/// mapping to the local model is the sync adapter's job.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Fetch the profile row of a user, `None` if the user has none
    async fn fetch_profile_row(&self, session: &Session, user_id: &str) -> Result<Option<ProfileRow>, RemoteError>;

    /// Fetch all log rows of a user
    async fn fetch_log_rows(&self, session: &Session, user_id: &str) -> Result<Vec<LogRow>, RemoteError>;

    /// Insert or replace the profile row keyed by its `user_id`
    async fn upsert_profile_row(&self, session: &Session, row: &ProfileRow) -> Result<(), RemoteError>;

    /// Append one log row
    async fn insert_log_row(&self, session: &Session, row: &LogRow) -> Result<(), RemoteError>;

    /// Delete every log row of a user
    async fn delete_log_rows(&self, session: &Session, user_id: &str) -> Result<(), RemoteError>;

    /// Delete the profile row of a user
    async fn delete_profile_row(&self, session: &Session, user_id: &str) -> Result<(), RemoteError>;
}
