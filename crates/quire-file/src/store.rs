//! File-backed token store.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use quire_core::error::{Error, StorageError};
use quire_core::{AccessToken, PersistedTokens, RefreshToken, Result, TokenStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk session document.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    saved_at: DateTime<Utc>,
}

/// Stores the token pair as a JSON document on disk.
///
/// Writes are serialised through an exclusive lock on a sibling `.lock`
/// file and land atomically via rename. On Unix the document is readable by
/// the owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the file at `path`. Nothing is touched until
    /// the first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the session document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn io_error(&self, err: std::io::Error) -> Error {
        Error::Storage(StorageError::Io {
            location: self.path.display().to_string(),
            message: err.to_string(),
        })
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    /// Run `f` while holding the exclusive write lock.
    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.ensure_parent()?;
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))?;
        lock_file.lock_exclusive().map_err(|e| self.io_error(e))?;

        let result = f();
        let _ = FileExt::unlock(&lock_file);
        result
    }

    fn write_document(&self, stored: &StoredTokens) -> Result<()> {
        let json = serde_json::to_vec_pretty(stored).map_err(|e| StorageError::Corrupt {
            location: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let tmp = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        let written = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&tmp)?;

            // Set restrictive permissions before any secret lands in the file.
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))?;

            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        })();

        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(err));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<PersistedTokens> {
        let json = match fs::read(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file");
                return Ok(PersistedTokens::default());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let stored: StoredTokens =
            serde_json::from_slice(&json).map_err(|e| StorageError::Corrupt {
                location: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        debug!(saved_at = %stored.saved_at, "Loaded session file");
        Ok(PersistedTokens {
            access_token: stored.access_token.map(AccessToken::new),
            refresh_token: stored.refresh_token.map(RefreshToken::new),
        })
    }

    #[instrument(skip(self, tokens), fields(path = %self.path.display()))]
    async fn save(&self, tokens: &PersistedTokens) -> Result<()> {
        let stored = StoredTokens {
            access_token: tokens.access_token.as_ref().map(|t| t.as_str().to_string()),
            refresh_token: tokens
                .refresh_token
                .as_ref()
                .map(|t| t.as_str().to_string()),
            saved_at: Utc::now(),
        };

        self.with_lock(|| self.write_document(&stored))?;
        debug!("Saved session file");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<()> {
        self.with_lock(|| match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        })?;
        debug!("Removed session file");
        Ok(())
    }
}
