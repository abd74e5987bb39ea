use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

const APP_DIR: &str = "textplate";
const STATE_SUBDIR: &str = ".local/state";
const DEFAULT_FALLBACK_STATE_DIR: &str = "/tmp/textplate";
const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key is empty")]
    MissingKey,
    #[error("storage key `{0}` contains a path separator")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Durable string records addressed by a fixed key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// One file per key inside a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub const fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn with_default_root() -> StorageResult<Self> {
        let root = default_state_dir();
        fs::create_dir_all(&root)?;
        Ok(Self::with_root(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate_key(key: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::MissingKey);
        }
        if key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    pub fn path_for_key(&self, key: &str) -> StorageResult<PathBuf> {
        Self::validate_key(key)?;
        let mut path = self.root.clone();
        path.push(format!("{key}.{RECORD_EXTENSION}"));
        Ok(path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for_key(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for_key(key)?;
        fs::create_dir_all(&self.root)?;
        // Readers never observe a partially written record.
        let staging = path.with_extension("tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for_key(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

/// In-process store, mainly for tests and sessions without a state directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::MissingKey);
        }
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.records.borrow_mut().remove(key);
        Ok(())
    }
}

pub fn default_state_dir() -> PathBuf {
    state_dir_with(
        std::env::var_os("XDG_STATE_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn state_dir_with(xdg_state_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(xdg) = xdg_state_home.filter(|path| !path.as_os_str().is_empty()) {
        return xdg.join(APP_DIR);
    }
    match home {
        Some(home) => home.join(STATE_SUBDIR).join(APP_DIR),
        None => PathBuf::from(DEFAULT_FALLBACK_STATE_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_dir_prefers_xdg_then_home_then_tmp() {
        assert_eq!(
            state_dir_with(Some("/xdg".into()), Some("/home/u".into())),
            PathBuf::from("/xdg/textplate")
        );
        assert_eq!(
            state_dir_with(Some("".into()), Some("/home/u".into())),
            PathBuf::from("/home/u/.local/state/textplate")
        );
        assert_eq!(
            state_dir_with(None, None),
            PathBuf::from("/tmp/textplate")
        );
    }

    #[test]
    fn path_for_key_rejects_empty_and_separators() {
        let store = FileStore::with_root(PathBuf::from("/tmp/state"));
        assert_eq!(
            store.path_for_key("autosave").unwrap(),
            PathBuf::from("/tmp/state/autosave.json")
        );
        assert!(matches!(
            store.path_for_key(""),
            Err(StorageError::MissingKey)
        ));
        assert!(matches!(
            store.path_for_key("../escape"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn file_store_round_trips_and_removes_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_root(dir.path().join("nested"));

        assert_eq!(store.get("draft").unwrap(), None);
        store.set("draft", "{\"a\":1}").unwrap();
        assert_eq!(store.get("draft").unwrap().as_deref(), Some("{\"a\":1}"));

        store.set("draft", "{}").unwrap();
        assert_eq!(store.get("draft").unwrap().as_deref(), Some("{}"));

        store.remove("draft").unwrap();
        store.remove("draft").unwrap();
        assert_eq!(store.get("draft").unwrap(), None);
    }

    #[test]
    fn memory_store_tracks_records() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!((&store).get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
