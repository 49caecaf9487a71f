//! # Storage Traits
//!
//! This module defines the storage abstraction that lets the local store run
//! over different persistence backends (files on disk, memory for tests)
//! without the domain layer knowing which one is in use.

use anyhow::Result;

/// Key holding the serialized user profile
pub const PROFILE_KEY: &str = "profile";
/// Key holding the serialized log collection
pub const LOGS_KEY: &str = "logs";
/// Key holding the generated device identifier
pub const DEVICE_ID_KEY: &str = "device_id";

/// Trait defining a durable key-value blob store
///
/// Values are opaque strings; typed encoding happens in `LocalStore`.
/// Every call is synchronous so UI reads never suspend.
pub trait Connection: Send + Sync + Clone + 'static {
    /// Read the blob stored under `key`, `None` if nothing is stored
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the blob stored under `key`
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the blob stored under `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
