//! Preference storage abstraction.
//!
//! The host owns the real preference backend; this module defines the
//! synchronous key-value trait the configuration store talks to, plus two
//! implementations:
//! - `MemoryPreferences` for tests and embedding
//! - `JsonFilePreferences` for a flat JSON object on disk
//!
//! Keys are full preference keys (e.g. "geo.wifi.uri").

use crate::error::PrefError;
use crate::value::ConfigValue;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Abstract preference backend.
///
/// All methods are synchronous. A failed `set_value` must leave the stored
/// value unchanged.
pub trait PreferenceStore: Send + Sync {
    /// Load a value; `None` when the key has never been set.
    fn get_value(&self, key: &str) -> Result<Option<ConfigValue>, PrefError>;

    /// Store a value.
    fn set_value(&mut self, key: &str, value: ConfigValue) -> Result<(), PrefError>;

    /// Check if a key holds a value.
    fn has_key(&self, key: &str) -> bool {
        matches!(self.get_value(key), Ok(Some(_)))
    }
}

/// In-memory preferences.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, ConfigValue>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding, mostly for tests.
    pub fn with_value(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_value(&self, key: &str) -> Result<Option<ConfigValue>, PrefError> {
        Ok(self.values.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: ConfigValue) -> Result<(), PrefError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object.
///
/// The file is read once on open and rewritten after every successful set.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: BTreeMap<String, ConfigValue>,
}

impl JsonFilePreferences {
    /// Open a preference file. A missing or empty file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PrefError> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!("Loaded {} preferences from {}", values.len(), path.display());
        Ok(Self { path, values })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), PrefError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;

        // Write atomically using temp file
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!("Saved {} preferences to {}", self.values.len(), self.path.display());
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get_value(&self, key: &str) -> Result<Option<ConfigValue>, PrefError> {
        Ok(self.values.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: ConfigValue) -> Result<(), PrefError> {
        let previous = self.values.insert(key.to_string(), value);

        if let Err(e) = self.save() {
            // Roll back so memory matches what is on disk
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
