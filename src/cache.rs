//! Local durable cache for the client stores.
//!
//! One JSON file holding the signed-in user plus the task and category
//! collections. Loaded at startup, written after mutations. A missing or
//! corrupt cache must never block startup; it just means starting empty.

use crate::models::{Category, Task, User};
use crate::store::{AuthState, TaskStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedState {
    pub user: Option<User>,
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
}

impl CachedState {
    /// Capture what survives a restart. Loading/error flags are session
    /// state and stay out.
    pub fn snapshot(store: &TaskStore, auth: &AuthState) -> Self {
        CachedState {
            user: auth.user.clone(),
            tasks: store.tasks.clone(),
            categories: store.categories.clone(),
        }
    }

    pub fn restore(self) -> (TaskStore, AuthState) {
        let store = TaskStore {
            tasks: self.tasks,
            categories: self.categories,
            is_loading: false,
            error: None,
        };
        (store, AuthState { user: self.user })
    }
}

pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CacheFile { path: path.as_ref().to_path_buf() }
    }

    /// Read the cached state. Absent file means a fresh start; unreadable
    /// content is logged and discarded.
    pub fn load(&self) -> CachedState {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return CachedState::default(),
            Err(e) => {
                warn!(path = %self.path.display(), %e, "cache unreadable, starting fresh");
                return CachedState::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), %e, "cache corrupt, starting fresh");
                CachedState::default()
            }
        }
    }

    pub fn save(&self, state: &CachedState) -> Result<(), CacheError> {
        let bytes =
            serde_json::to_vec(state).map_err(|e| CacheError::Encode(e.to_string()))?;
        fs::write(&self.path, bytes).map_err(|e| CacheError::Io(e.to_string()))?;
        Ok(())
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CacheError {
    Io(String),
    Encode(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Io(e) => write!(f, "io: {e}"),
            CacheError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
