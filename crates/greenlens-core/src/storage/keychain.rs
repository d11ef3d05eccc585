use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use keyring::Entry;
use tracing::debug;

use super::{StorageError, TokenStore};

const SERVICE_NAME: &str = "greenlens";

/// Tokens stored in the OS keychain, one entry per key.
///
/// Entries are opened once per key and reused, so every call for a key goes
/// through the same credential handle.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
    entries: Arc<Mutex<HashMap<String, Arc<Entry>>>>,
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entry(&self, key: &str) -> Result<Arc<Entry>, keyring::Error> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = entries.get(key) {
            return Ok(Arc::clone(entry));
        }
        let entry = Arc::new(Entry::new(&self.service, key)?);
        entries.insert(key.to_string(), Arc::clone(&entry));
        Ok(entry)
    }

    /// Run a blocking keychain call off the async runtime.
    async fn run<T, F>(&self, key: &str, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        let entry = self.entry(key)?;
        tokio::task::spawn_blocking(move || op(&entry))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
            .map_err(StorageError::from)
    }
}

impl TokenStore for KeyringTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.run(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let value = value.to_string();
        self.run(key, move |entry| entry.set_password(&value)).await?;
        debug!(key, "Token stored in keychain");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.run(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StoredTokens, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    /// Swap the platform keychain for keyring's in-process mock.
    fn mock_store() -> KeyringTokenStore {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeyringTokenStore::with_service("greenlens-test")
    }

    #[tokio::test]
    async fn test_keyring_round_trip() {
        let store = mock_store();
        let tokens = StoredTokens {
            access_token: "abc123".to_string(),
            refresh_token: "refresh-1".to_string(),
        };

        store.save_tokens(&tokens).await.unwrap();
        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
            Some("abc123")
        );
        assert_eq!(store.load_tokens().await.unwrap(), Some(tokens));
    }

    #[tokio::test]
    async fn test_keyring_clone_shares_entries() {
        let store = mock_store();
        store.set(ACCESS_TOKEN_KEY, "abc123").await.unwrap();

        let copy = store.clone();
        assert_eq!(copy.access_token().await.unwrap().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_keyring_remove_missing_is_ok() {
        let store = mock_store();
        store.remove(REFRESH_TOKEN_KEY).await.unwrap();
        assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap(), None);

        store.set(REFRESH_TOKEN_KEY, "refresh-1").await.unwrap();
        store.remove(REFRESH_TOKEN_KEY).await.unwrap();
        assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap(), None);
    }
}
