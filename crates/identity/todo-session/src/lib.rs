//! Access-token persistence.
//!
//! The todo API issues a bearer token on login. A [`SessionStore`] keeps it under the fixed
//! key [`TOKEN_KEY`] so a later run can restore the session without asking for credentials.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the access token is stored.
pub const TOKEN_KEY: &str = "access_token";

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> SessionResult<Option<String>>;

    fn save(&self, token: &str) -> SessionResult<()>;

    /// Removing an absent token is not an error.
    fn clear(&self) -> SessionResult<()>;
}

/// In-process store, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> SessionResult<Option<String>> {
        let guard = self.token.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> SessionResult<()> {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    access_token: String,
}

/// JSON file holding `{"access_token": "..."}`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/todo-cli/session.json`
    pub fn default_path() -> SessionResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(SessionError::NoConfigDir)?;
        Ok(dir.join("todo-cli").join("session.json"))
    }

    pub fn at_default_location() -> SessionResult<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> SessionResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let file: SessionFile =
            serde_json::from_str(&contents).map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        if file.access_token.is_empty() {
            warn!(path = %self.path.display(), "Ignoring empty stored token");
            return Ok(None);
        }

        Ok(Some(file.access_token))
    }

    fn save(&self, token: &str) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = SessionFile {
            access_token: token.to_string(),
        };
        let contents = serde_json::to_string_pretty(&file).map_err(|source| {
            SessionError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, contents)?;

        debug!(path = %self.path.display(), "Saved session token");
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed session token");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
