//! Namespaced key-value persistence

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::StoreError;

/// Persisted key-value state grouped by namespace
pub trait KeyValueStore: Send + Sync {
    /// Read a value; missing or unreadable data is `None`
    fn get(&self, namespace: &str, key: &str) -> Option<Value>;

    /// Write a value, replacing any previous one
    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError>;
}

/// One JSON document per namespace under a data directory
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        debug!("Opened key-value store at {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }

    fn read_namespace(&self, namespace: &str) -> Map<String, Value> {
        let path = self.path_for(namespace);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!("Failed to read namespace file {}: {}", path.display(), e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("Ignoring malformed namespace file {}", path.display());
                Map::new()
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.read_namespace(namespace).remove(key)
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        let mut doc = self.read_namespace(namespace);
        doc.insert(key.to_string(), value);

        let encoded = serde_json::to_string_pretty(&Value::Object(doc)).map_err(|source| {
            StoreError::Encode {
                namespace: namespace.to_string(),
                source,
            }
        })?;

        // Write then rename so readers never see a half-written file
        let path = self.path_for(namespace);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encoded).map_err(|source| StoreError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        debug!("Persisted {}/{}", namespace, key);
        Ok(())
    }
}

/// Process-local store, used when nothing should touch the disk
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.values
            .lock()
            .ok()?
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        self.values
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_store_round_trips_values_per_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        store.put("settings", "syncAudio", json!(true)).unwrap();
        store.put("reminders", "lastUpdate", json!(42)).unwrap();
        store.put("settings", "syncAudio", json!(false)).unwrap();

        assert_eq!(store.get("settings", "syncAudio"), Some(json!(false)));
        assert_eq!(store.get("reminders", "lastUpdate"), Some(json!(42)));
        assert_eq!(store.get("reminders", "missing"), None);
        assert!(dir.path().join("settings.json").exists());
    }

    #[test]
    fn unreadable_namespace_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        fs::create_dir(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.get("settings", "syncAudio"), None);
        assert!(store.put("settings", "syncAudio", json!(true)).is_err());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        JsonFileStore::open(dir.path())
            .unwrap()
            .put("settings", "syncAudio", json!(true))
            .unwrap();

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("settings", "syncAudio"), Some(json!(true)));
    }

    #[test]
    fn malformed_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("reminders.json"), "{not json").unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("reminders", "reminders"), None);

        store.put("reminders", "lastUpdate", json!(1)).unwrap();
        assert_eq!(store.get("reminders", "lastUpdate"), Some(json!(1)));
    }

    #[test]
    fn memory_store_keeps_namespaces_apart() {
        let store = MemoryStore::new();
        store.put("a", "key", json!("one")).unwrap();
        store.put("b", "key", json!("two")).unwrap();

        assert_eq!(store.get("a", "key"), Some(json!("one")));
        assert_eq!(store.get("b", "key"), Some(json!("two")));
    }
}
