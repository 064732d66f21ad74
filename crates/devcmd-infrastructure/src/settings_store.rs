//! File-backed settings store.
//!
//! Settings live in `settings.toml` as a flat table of strings, one key per
//! setting, e.g.
//!
//! ```toml
//! selectedModel = "gemma"
//! useDocs = "true"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use devcmd_core::error::Result;
use devcmd_core::settings::SettingsStore;

use crate::paths::DevcmdPaths;
use crate::storage::AtomicTomlFile;

type SettingsMap = BTreeMap<String, String>;

pub struct FileSettingsStore {
    file: AtomicTomlFile<SettingsMap>,
}

impl FileSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Opens the store at its default location.
    pub fn new_default(paths: &DevcmdPaths) -> Result<Self> {
        Ok(Self::new(paths.settings_file()?))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .file
            .load()?
            .and_then(|mut values| values.remove(key)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_all(&[(key, value)])
    }

    /// One locked read-modify-write, so a batch lands whole or not at all.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.file.update(SettingsMap::new(), |values| {
            for (key, value) in entries {
                values.insert(key.to_string(), value.to_string());
            }
        })
    }
}
