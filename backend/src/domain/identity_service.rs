//! Identity resolution for the journal.
//!
//! An authenticated session wins when a remote backend is configured;
//! otherwise the journal belongs to a device identifier that is generated
//! once and persisted in the local store.

use anyhow::Result;
use log::info;
use uuid::Uuid;

use crate::domain::models::{Identity, Session};
use crate::storage::{Connection, LocalStore};

#[derive(Clone)]
pub struct IdentityService<C: Connection> {
    store: LocalStore<C>,
}

impl<C: Connection> IdentityService<C> {
    pub fn new(store: LocalStore<C>) -> Self {
        Self { store }
    }

    /// Determine the active identity.
    ///
    /// Errors only come from the local store and are fatal at startup.
    pub fn resolve_identity(&self, session: Option<&Session>, remote_configured: bool) -> Result<Identity> {
        if remote_configured {
            if let Some(session) = session {
                return Ok(Identity::authenticated(session.subject.clone()));
            }
        }

        self.device_identity()
    }

    /// The persisted device identifier, generating it on first use
    pub fn device_identity(&self) -> Result<Identity> {
        if let Some(id) = self.store.read_device_id()? {
            if !id.trim().is_empty() {
                return Ok(Identity::device(id));
            }
        }

        let id = Uuid::new_v4().to_string();
        self.store.write_device_id(&id)?;
        info!("Generated new device identifier {}", id);
        Ok(Identity::device(id))
    }
}
