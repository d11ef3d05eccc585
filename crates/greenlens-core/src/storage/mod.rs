//! Durable key-value storage for the session's bearer tokens.
//!
//! This module provides:
//! - `TokenStore`: the async get/set/remove contract over string keys
//! - `FileTokenStore`: a JSON file in the user's cache directory
//! - `KeyringTokenStore`: the OS keychain via `keyring`
//! - `MemoryTokenStore`: a process-local map, used by tests and `--ephemeral`
//!
//! Only two keys are ever written: [`ACCESS_TOKEN_KEY`] and
//! [`REFRESH_TOKEN_KEY`].

pub mod error;
pub mod file;
pub mod keychain;
pub mod memory;

use serde::{Deserialize, Serialize};

pub use error::StorageError;
pub use file::FileTokenStore;
pub use keychain::KeyringTokenStore;
pub use memory::MemoryTokenStore;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// The token pair handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Async key-value persistence for session tokens.
///
/// Every call may suspend on I/O and must be awaited before dependent logic
/// runs. Removing an absent key succeeds.
#[allow(async_fn_in_trait)]
pub trait TokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Read the stored access token, treating an empty string as absent.
    async fn access_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get(ACCESS_TOKEN_KEY).await?.filter(|t| !t.is_empty()))
    }

    /// Persist both tokens, access token first.
    async fn save_tokens(&self, tokens: &StoredTokens) -> Result<(), StorageError> {
        self.set(ACCESS_TOKEN_KEY, &tokens.access_token).await?;
        self.set(REFRESH_TOKEN_KEY, &tokens.refresh_token).await
    }

    /// Read both tokens; `None` unless the access token is present.
    async fn load_tokens(&self) -> Result<Option<StoredTokens>, StorageError> {
        let Some(access_token) = self.access_token().await? else {
            return Ok(None);
        };
        let refresh_token = self.get(REFRESH_TOKEN_KEY).await?.unwrap_or_default();
        Ok(Some(StoredTokens {
            access_token,
            refresh_token,
        }))
    }
}

/// Which backend holds the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl Backend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Some(Backend::File),
            "keyring" | "keychain" => Some(Backend::Keyring),
            "memory" => Some(Backend::Memory),
            _ => None,
        }
    }
}

/// A token store selected at runtime from configuration.
pub enum TokenBackend {
    File(FileTokenStore),
    Keyring(KeyringTokenStore),
    Memory(MemoryTokenStore),
}

impl TokenBackend {
    /// Open the configured backend. File storage lives in the cache directory.
    pub fn open(backend: Backend) -> Result<Self, StorageError> {
        Ok(match backend {
            Backend::File => TokenBackend::File(FileTokenStore::in_cache_dir()?),
            Backend::Keyring => TokenBackend::Keyring(KeyringTokenStore::new()),
            Backend::Memory => TokenBackend::Memory(MemoryTokenStore::new()),
        })
    }

    pub fn kind(&self) -> Backend {
        match self {
            TokenBackend::File(_) => Backend::File,
            TokenBackend::Keyring(_) => Backend::Keyring,
            TokenBackend::Memory(_) => Backend::Memory,
        }
    }
}

impl TokenStore for TokenBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            TokenBackend::File(store) => store.get(key).await,
            TokenBackend::Keyring(store) => store.get(key).await,
            TokenBackend::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            TokenBackend::File(store) => store.set(key, value).await,
            TokenBackend::Keyring(store) => store.set(key, value).await,
            TokenBackend::Memory(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            TokenBackend::File(store) => store.remove(key).await,
            TokenBackend::Keyring(store) => store.remove(key).await,
            TokenBackend::Memory(store) => store.remove(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_tokens_writes_both_keys() {
        let store = MemoryTokenStore::new();
        let tokens = StoredTokens {
            access_token: "abc123".to_string(),
            refresh_token: "r-456".to_string(),
        };
        store.save_tokens(&tokens).await.unwrap();

        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(), Some("abc123"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap().as_deref(), Some("r-456"));
        assert_eq!(store.load_tokens().await.unwrap(), Some(tokens));
    }

    #[tokio::test]
    async fn test_empty_access_token_is_absent() {
        let store = MemoryTokenStore::new();
        store.set(ACCESS_TOKEN_KEY, "").await.unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").await.unwrap();

        assert_eq!(store.access_token().await.unwrap(), None);
        assert_eq!(store.load_tokens().await.unwrap(), None);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("file"), Some(Backend::File));
        assert_eq!(Backend::parse(" Keyring "), Some(Backend::Keyring));
        assert_eq!(Backend::parse("memory"), Some(Backend::Memory));
        assert_eq!(Backend::parse("s3"), None);
    }

    #[tokio::test]
    async fn test_token_backend_delegates() {
        let backend = TokenBackend::open(Backend::Memory).unwrap();
        assert_eq!(backend.kind(), Backend::Memory);
        backend.set(ACCESS_TOKEN_KEY, "t").await.unwrap();
        assert_eq!(backend.access_token().await.unwrap().as_deref(), Some("t"));
        backend.remove(ACCESS_TOKEN_KEY).await.unwrap();
        assert_eq!(backend.access_token().await.unwrap(), None);
    }
}
