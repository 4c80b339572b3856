//! JSON file key-value store

use super::{ProgressStore, StoreError, PROGRESS_KEY};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A JSON object on disk mapping keys to documents.
///
/// Other keys in the file are preserved on save. Writes go to a sibling
/// temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, PROGRESS_KEY)
    }

    pub fn with_key(path: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: path.into(),
            key: key.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_map(&self) -> Result<Option<Map<String, Value>>, StoreError> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        match serde_json::from_str::<Value>(&body)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(StoreError::Unavailable(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let Some(map) = self.read_map()? else {
            return Ok(None);
        };
        Ok(map.get(&self.key).map(|v| match v {
            // Stored as a string by some writers, as an object by others
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn save(&mut self, document: &str) -> Result<(), StoreError> {
        // A corrupt file is overwritten rather than blocking saves
        let mut map = self.read_map().unwrap_or_default().unwrap_or_default();
        let value: Value = serde_json::from_str(document)?;
        map.insert(self.key.clone(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let body = serde_json::to_string_pretty(&Value::Object(map))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("progress.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("progress.json"));
        store.save(r#"{"currentLevel":4}"#).unwrap();
        let loaded: Value = serde_json::from_str(&store.load().unwrap().unwrap()).unwrap();
        assert_eq!(loaded["currentLevel"], 4);
    }

    #[test]
    fn other_keys_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        store.save(r#"{"currentLevel":2}"#).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[PROGRESS_KEY]["currentLevel"], 2);
    }

    #[test]
    fn string_encoded_document_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"cipherQuestProgress":"{\"currentLevel\":7}"}"#).unwrap();
        let store = JsonFileStore::new(&path);
        assert_eq!(store.load().unwrap().unwrap(), r#"{"currentLevel":7}"#);
    }

    #[test]
    fn corrupt_file_is_an_error_on_load_but_not_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
        store.save(r#"{"currentLevel":1}"#).unwrap();
        assert!(store.load().unwrap().is_some());
    }
}
