use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the active identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    /// Subject of an authenticated session
    Authenticated,
    /// Locally generated, persisted device identifier
    Device,
}

/// Logical owner of a profile and a log collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub kind: IdentityKind,
}

impl Identity {
    pub fn authenticated(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: IdentityKind::Authenticated,
        }
    }

    pub fn device(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: IdentityKind::Device,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.kind == IdentityKind::Authenticated
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// An authenticated session handed in by the auth layer.
///
/// Login and signup live outside this crate; only the subject and the bearer
/// token cross the boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub access_token: String,
}

impl Session {
    pub fn new(subject: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            access_token: access_token.into(),
        }
    }
}

// Keep the token out of logs
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("subject", &self.subject)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
