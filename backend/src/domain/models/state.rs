use shared::{DailyLog, UserProfile};

use super::identity::{Identity, Session};

/// Explicit application state threaded through journal operations.
///
/// Holds the active identity, the optional session and the in-memory copy
/// of what the local store contains.
#[derive(Debug, Clone)]
pub struct JournalState {
    pub identity: Identity,
    pub session: Option<Session>,
    pub profile: Option<UserProfile>,
    pub logs: Vec<DailyLog>,
}

impl JournalState {
    pub fn new(identity: Identity, session: Option<Session>) -> Self {
        Self {
            identity,
            session,
            profile: None,
            logs: Vec::new(),
        }
    }

    pub fn session_active(&self) -> bool {
        self.session.is_some()
    }

    /// No profile for the active identity means onboarding has to run
    pub fn needs_onboarding(&self) -> bool {
        self.profile.is_none()
    }
}
