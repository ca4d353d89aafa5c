//! Session persistence
//!
//! The core consumes a key/value `SessionStore`; it never depends on a
//! concrete storage backend. Keys are a configurable prefix plus the fixed
//! `access_token` / `refresh_token` suffixes. Two backends are provided:
//! a JSON file store with atomic writes and an in-memory store for tests
//! and hosts that persist elsewhere.
//!
//! Persistence is synchronous and failures are hard errors to the
//! immediate caller — they are never routed through a continuation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Key/value storage for session tokens, supplied by the host.
pub trait SessionStore: Send + Sync {
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn get(&self, key: &str) -> Option<String>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// JSON-file-backed session store.
///
/// All writes use atomic temp-file + rename to prevent corruption on
/// crash. A mutex serializes concurrent writes; the file is created with
/// 0600 permissions since it holds OAuth tokens.
pub struct FileSessionStore {
    path: PathBuf,
    state: Mutex<HashMap<String, String>>,
}

impl FileSessionStore {
    /// Load the store from the given file path.
    ///
    /// If the file doesn't exist, creates it as `{}` so future loads don't
    /// need the cold-start path.
    pub fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::Store(format!("reading session file: {e}")))?;
            let state: HashMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::Store(format!("parsing session file: {e}")))?;
            info!(path = %path.display(), entries = state.len(), "loaded session store");
            state
        } else {
            info!(path = %path.display(), "session file not found, starting empty");
            let state = HashMap::new();
            write_atomic(&path, &state)?;
            state
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }
}

impl SessionStore for FileSessionStore {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut state = lock(&self.state)?;
        state.insert(key.to_owned(), value.to_owned());
        write_atomic(&self.path, &state)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.state.lock().ok()?.get(key).cloned()
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut state = lock(&self.state)?;
        if state.remove(key).is_some() {
            write_atomic(&self.path, &state)?;
        }
        Ok(())
    }
}

fn lock(state: &Mutex<HashMap<String, String>>) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
    state
        .lock()
        .map_err(|_| Error::Store("session store lock poisoned".into()))
}

/// Write the session map to a file atomically (temp file + rename, 0600).
fn write_atomic(path: &Path, data: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Store(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Store("session path has no parent directory".into()))?;
    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    std::fs::write(&tmp_path, json.as_bytes())
        .map_err(|e| Error::Store(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&tmp_path, perms)
            .map_err(|e| Error::Store(format!("setting session file permissions: {e}")))?;
    }

    std::fs::rename(&tmp_path, path)
        .map_err(|e| Error::Store(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}

/// In-memory session store for tests and hosts with their own persistence.
#[derive(Default)]
pub struct MemorySessionStore {
    state: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.state)?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.state.lock().ok()?.get(key).cloned()
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.state)?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::load(path.clone()).unwrap();
        store.put("OK_SDK_access_token", "at_1").unwrap();
        store.put("OK_SDK_refresh_token", "rt_1").unwrap();

        // Load into a new store instance
        let store2 = FileSessionStore::load(path).unwrap();
        assert_eq!(store2.get("OK_SDK_access_token").as_deref(), Some("at_1"));
        assert_eq!(store2.get("OK_SDK_refresh_token").as_deref(), Some("rt_1"));
    }

    #[test]
    fn cold_start_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert!(!path.exists());
        let store = FileSessionStore::load(path.clone()).unwrap();
        assert!(path.exists());
        assert!(store.get("anything").is_none());

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::load(path).unwrap();
        store.put("k", "v").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
        // Absent key is a no-op, not an error
        store.remove("k").unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileSessionStore::load(path.clone()).unwrap();
        store.put("OK_SDK_access_token", "at_1").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "session file must be 0600, got {mode:o}");
    }

    #[test]
    fn concurrent_puts_dont_corrupt() {
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = Arc::new(FileSessionStore::load(path.clone()).unwrap());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.put(&format!("key-{i}"), &format!("value-{i}")).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: HashMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 10);
    }

    #[test]
    fn memory_store_semantics() {
        let store = MemorySessionStore::new();
        assert!(store.get("k").is_none());
        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.put("k", "v2").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v2"));
        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
        store.remove("k").unwrap();
    }
}
