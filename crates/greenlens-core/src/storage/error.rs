use thiserror::Error;

/// Any failure of the underlying token storage. Callers treat every variant
/// as "storage unavailable".
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not find cache directory")]
    NoCacheDir,

    #[error("Token file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain unavailable: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Storage task failed: {0}")]
    Task(String),
}
