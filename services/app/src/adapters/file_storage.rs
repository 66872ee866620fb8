//! services/app/src/adapters/file_storage.rs
//!
//! This module contains the on-disk key-value medium, the concrete implementation
//! of the `KeyValueStorage` port used by the binary. Each key lives in its own file
//! under one directory; writes go to a temp file, which is synced to disk and
//! then renamed into place, so a crash never leaves a half-written entry behind.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use task_keeper_core::ports::{KeyValueStorage, PortError, PortResult};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const ENTRY_EXTENSION: &str = "kv";

/// A `KeyValueStorage` backed by one file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> PortError {
    PortError::Storage(format!("failed to {} {}: {}", action, path.display(), err))
}

impl FileStorage {
    /// Opens the medium, creating `directory` if it doesn't exist.
    pub async fn open(directory: impl Into<PathBuf>) -> PortResult<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)
            .await
            .map_err(|e| storage_error("create", &directory, e))?;
        info!(directory = %directory.display(), "Opened file storage");
        Ok(Self { directory })
    }

    /// Keys map straight onto file names, so only a safe alphabet is accepted.
    fn entry_path(&self, key: &str) -> PortResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PortError::Unexpected(format!(
                "'{}' is not a valid storage key",
                key
            )));
        }
        Ok(self.directory.join(format!("{key}.{ENTRY_EXTENSION}")))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &path, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let path = self.entry_path(key)?;
        let temp_path = path.with_extension(format!("{ENTRY_EXTENSION}.tmp"));
        let mut file = File::create(&temp_path)
            .await
            .map_err(|e| storage_error("create", &temp_path, e))?;
        file.write_all(value.as_bytes())
            .await
            .map_err(|e| storage_error("write", &temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| storage_error("sync", &temp_path, e))?;
        drop(file);
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| storage_error("replace", &path, e))?;
        debug!(key, path = %path.display(), bytes = value.len(), "Saved entry to file");
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, path = %path.display(), "Removed entry file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_persist_across_instances() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp_dir.path()).await.unwrap();
        assert_eq!(storage.get("users").await.unwrap(), None);

        storage.set("users", "[]").await.unwrap();
        storage.set("users", r#"[{"a":1}]"#).await.unwrap();

        let reopened = FileStorage::open(temp_dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("users").await.unwrap().as_deref(),
            Some(r#"[{"a":1}]"#)
        );
        assert!(!temp_dir.path().join("users.kv.tmp").exists());

        reopened.set("users", "[]").await.unwrap();
        assert_eq!(storage.get("users").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn remove_is_quiet_about_absent_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp_dir.path().join("nested")).await.unwrap();
        storage.remove("user_authorized").await.unwrap();

        storage.set("user_authorized", "42").await.unwrap();
        storage.remove("user_authorized").await.unwrap();
        assert_eq!(storage.get("user_authorized").await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp_dir.path()).await.unwrap();
        let err = storage.set("../escape", "x").await.unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
