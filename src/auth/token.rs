use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

/// File extension for the persisted credential
const TOKEN_EXT: &str = "token";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The deployment never configured a storage key. Nothing can be
    /// stored or retrieved without one, so this aborts startup.
    #[error("token storage key is not configured (set SCENTDESK_TOKEN_KEY)")]
    Unconfigured,
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists a single bearer credential as `<key>.token` in the state
/// directory. The raw token string is the entire file contents; at most
/// one credential exists at a time, and absence means "no session".
#[derive(Debug)]
pub struct TokenStore {
    dir: PathBuf,
    key: String,
}

impl TokenStore {
    pub fn new(dir: PathBuf, key: &str) -> Result<Self, StoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(StoreError::Unconfigured);
        }
        Ok(Self {
            dir,
            key: key.to_string(),
        })
    }

    /// Persist a token, replacing any previous one.
    pub fn set(&self, token: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.token_path(), token)?;
        debug!("Stored bearer token");
        Ok(())
    }

    /// Read the current token, if any.
    pub fn get(&self) -> Result<Option<String>, StoreError> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        // Tolerate a trailing newline from hand-edited files
        Ok(Some(contents.trim_end().to_string()))
    }

    /// Remove the persisted token. Removing an absent token is not an error.
    pub fn remove(&self) -> Result<(), StoreError> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path)?;
            debug!("Removed bearer token");
        }
        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.key, TOKEN_EXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, TokenStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().to_path_buf(), "desk_jwt").unwrap();
        (dir, store)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, store) = store();
        assert_eq!(store.get().unwrap(), None);
        store.set("abc123").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("abc123"));
        store.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_set_replaces_previous_token() {
        let (_dir, store) = store();
        store.set("first").unwrap();
        store.set("second").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_remove_absent_token_is_ok() {
        let (_dir, store) = store();
        store.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_unconfigured_key_refuses_construction() {
        let dir = tempfile::tempdir().unwrap();
        let err = TokenStore::new(dir.path().to_path_buf(), "  ").unwrap_err();
        assert!(matches!(err, StoreError::Unconfigured));
    }

    #[test]
    fn test_token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = TokenStore::new(dir.path().to_path_buf(), "desk_jwt").unwrap();
            store.set("persisted").unwrap();
        }
        let store = TokenStore::new(dir.path().to_path_buf(), "desk_jwt").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("persisted"));
    }
}
