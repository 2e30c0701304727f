//! Session token storage
//!
//! The gateway asks a `TokenSource` for the bearer token on every request.
//! `SessionStore` keeps the token issued by the OTP login in a small JSON file
//! under the XDG config directory (`~/.config/salonadmin/session.json` on
//! Linux), with an optional override that takes precedence.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

/// Supplies the bearer token attached to outgoing requests
pub trait TokenSource: Send + Sync {
    /// Current token, if a session exists
    fn token(&self) -> Option<String>;
}

/// Token source that never yields a token
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn token(&self) -> Option<String> {
        None
    }
}

/// Fixed token, e.g. from a CLI flag
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Errors that can occur when persisting the session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What a successful login leaves behind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// File-backed session with an in-process override
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    override_token: Mutex<Option<String>>,
}

impl SessionStore {
    /// Creates a store in the XDG config directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "salonadmin")?;
        Some(Self::with_dir(project_dirs.config_dir()))
    }

    /// Creates a store that keeps its file in `dir`
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join("session.json"),
            override_token: Mutex::new(None),
        }
    }

    /// Forces a token regardless of what is on disk
    pub fn set_override(&self, token: Option<String>) {
        *self
            .override_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session, `None` when absent or unreadable
    pub fn load(&self) -> Option<Session> {
        let content = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Writes the session, creating the directory if needed
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    /// Removes the stored session; a missing file is not an error
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenSource for SessionStore {
    fn token(&self) -> Option<String> {
        let forced = self
            .override_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        forced
            .or_else(|| self.load().map(|session| session.token))
            .filter(|token| !token.is_empty())
    }
}
