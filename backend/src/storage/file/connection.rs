use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::storage::traits::Connection;

/// FileConnection keeps one JSON file per key inside the data directory
#[derive(Clone)]
pub struct FileConnection {
    base_directory: Arc<PathBuf>,
}

impl FileConnection {
    /// Create a new file connection rooted at `base_directory`
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: Arc::new(base_path),
        })
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        self.base_directory.as_ref().clone()
    }

    /// Get the file path backing a key
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", key))
    }
}

impl Connection for FileConnection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            debug!("No stored value for key '{}'", key);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        if !self.base_directory.exists() {
            fs::create_dir_all(self.base_directory.as_ref())?;
        }

        let path = self.key_path(key);

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Stored key '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("Failed to delete {}", path.display()))?;
            debug!("Removed key '{}'", key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::file::test_utils::TestEnvironment;

    #[test]
    fn test_missing_key_reads_as_none() {
        let env = TestEnvironment::new().unwrap();
        assert_eq!(env.connection.get("profile").unwrap(), None);
    }

    #[test]
    fn test_put_get_remove() {
        let env = TestEnvironment::new().unwrap();

        env.connection.put("logs", "[]").unwrap();
        assert_eq!(env.connection.get("logs").unwrap().as_deref(), Some("[]"));
        assert!(env.base_directory().join("logs.json").exists());
        assert!(!env.base_directory().join("logs.tmp").exists());

        env.connection.remove("logs").unwrap();
        assert_eq!(env.connection.get("logs").unwrap(), None);

        // Removing again is a no-op
        env.connection.remove("logs").unwrap();
    }

    #[test]
    fn test_creates_nested_base_directory() {
        let env = TestEnvironment::new().unwrap();
        let nested = env.base_directory().join("a").join("b");

        let connection = FileConnection::new(&nested).unwrap();
        connection.put("device_id", "\"abc\"").unwrap();

        assert!(nested.join("device_id.json").exists());
        assert_eq!(connection.base_directory(), nested);
    }
}
