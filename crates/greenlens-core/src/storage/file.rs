use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{StorageError, TokenStore};

/// Application name used for the cache directory path
const APP_NAME: &str = "greenlens";

/// Token file name in cache directory
const TOKEN_FILE: &str = "tokens.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

/// Tokens persisted as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.cache/greenlens/tokens.json` (platform equivalent).
    pub fn in_cache_dir() -> Result<Self, StorageError> {
        let cache_dir = dirs::cache_dir().ok_or(StorageError::NoCacheDir)?;
        Ok(Self::new(cache_dir.join(APP_NAME).join(TOKEN_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<TokenFile, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TokenFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, mut file: TokenFile) -> Result<(), StorageError> {
        if file.values.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
            restrict_dir(parent).await;
        }
        file.updated_at = Some(Utc::now());
        let contents = serde_json::to_string_pretty(&file)?;

        // Write beside the target, then rename into place
        let tmp = self.path.with_extension("json.tmp");
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut out = options.open(&tmp).await?;
        out.write_all(contents.as_bytes()).await?;
        out.sync_all().await?;
        drop(out);
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = ?self.path, keys = file.values.len(), "Token file written");
        Ok(())
    }
}

/// Limit the token directory to the current user.
#[cfg(unix)]
async fn restrict_dir(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let perms = std::fs::Permissions::from_mode(0o700);
    if let Err(e) = tokio::fs::set_permissions(dir, perms).await {
        tracing::warn!(path = ?dir, error = %e, "Failed to restrict token directory permissions");
    }
}

#[cfg(not(unix))]
async fn restrict_dir(_dir: &Path) {}

impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read().await?.values.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut file = self.read().await?;
        file.values.insert(key.to_string(), value.to_string());
        self.write(file).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut file = self.read().await?;
        if file.values.remove(key).is_none() {
            return Ok(());
        }
        self.write(file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoredTokens, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    fn store_in(dir: &tempfile::TempDir) -> FileTokenStore {
        FileTokenStore::new(dir.path().join("nested").join(TOKEN_FILE))
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        // Removing from a missing file is fine too
        store.remove(ACCESS_TOKEN_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn test_tokens_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = StoredTokens {
            access_token: "abc123".to_string(),
            refresh_token: "refresh".to_string(),
        };
        store_in(&dir).save_tokens(&tokens).await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.load_tokens().await.unwrap(), Some(tokens));
    }

    #[tokio::test]
    async fn test_file_removed_when_last_key_goes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set(ACCESS_TOKEN_KEY, "a").await.unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").await.unwrap();
        assert!(store.path().exists());

        store.remove(ACCESS_TOKEN_KEY).await.unwrap();
        assert!(store.path().exists());
        store.remove(REFRESH_TOKEN_KEY).await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set(ACCESS_TOKEN_KEY, "a").await.unwrap();
        store.set(ACCESS_TOKEN_KEY, "b").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(TOKEN_FILE)]);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(), Some("b"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set(ACCESS_TOKEN_KEY, "a").await.unwrap();

        let file_mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);

        let dir_mode = std::fs::metadata(store.path().parent().unwrap())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        let result = store.get(ACCESS_TOKEN_KEY).await;
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }
}
