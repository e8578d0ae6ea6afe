// JSON key/value store for remembered answers.
//
// Every `set` rewrites the whole file through a sibling temp file and a
// rename, so a crash mid-write leaves the previous answers intact.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ConfigError;

#[derive(Debug)]
pub struct AnswerStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl AnswerStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = values.len(), "opened answer store");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed value for `key`; a value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "ignoring stored answer");
                None
            }
        }
    }

    /// Store `value` under `key` and persist immediately.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), ConfigError> {
        self.values.insert(key.to_owned(), serde_json::to_value(value)?);
        self.persist()
    }

    /// Remove `key` and persist.
    pub fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&self.values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
