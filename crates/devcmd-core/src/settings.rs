//! Persisted user preferences.
//!
//! Settings are stored as string values under fixed keys in a best-effort
//! key-value store. Reading never fails: a missing, unreadable or no longer
//! valid value leaves the default in place.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{DevcmdError, Result};
use crate::selection::{ALL_TECHNOLOGIES, ModelSelector, OpenRouterPicker, TechnologyCatalog};

pub const KEY_SELECTED_MODEL: &str = "selectedModel";
pub const KEY_OPENROUTER_MODEL: &str = "openrouterModel";
pub const KEY_EXECUTE_COMMANDS: &str = "executeCommands";
pub const KEY_SELECTED_TECHNOLOGY: &str = "selectedTechnology";
pub const KEY_USE_WEB: &str = "useWeb";
pub const KEY_USE_DOCS: &str = "useDocs";

/// A durable string key-value store.
///
/// Callers treat every failure as non-fatal.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Writes several keys at once. Stores that can commit them in one
    /// step should override this.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// In-memory store, used by tests and as a fallback when no file store can
/// be opened.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| DevcmdError::storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| DevcmdError::storage(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| DevcmdError::storage(e.to_string()))?;
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Flags that are not owned by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub execute_commands: bool,
    pub use_web: bool,
    pub use_docs: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            execute_commands: false,
            use_web: false,
            use_docs: true,
        }
    }
}

/// The selector state the settings are read into and written from.
pub struct SettingsTargets<'a> {
    pub models: &'a mut ModelSelector,
    pub openrouter: &'a mut OpenRouterPicker,
    pub technologies: &'a TechnologyCatalog,
    pub toggles: &'a mut Toggles,
}

/// Reads every persisted key into `targets`.
///
/// Returns the stored technology when it names a member of the catalog;
/// the caller routes it through technology selection so the badge follows.
pub fn load(store: &dyn SettingsStore, targets: SettingsTargets<'_>) -> Option<String> {
    if let Some(model) = read(store, KEY_SELECTED_MODEL)
        && let Err(e) = targets.models.select(&model)
    {
        tracing::debug!("[Settings] Ignoring stored model '{}': {}", model, e);
    }

    if let Some(model) = read(store, KEY_OPENROUTER_MODEL)
        && targets.openrouter.contains(&model)
    {
        let _ = targets.openrouter.select(&model);
    }

    targets.toggles.execute_commands =
        read(store, KEY_EXECUTE_COMMANDS).as_deref() == Some("true");
    targets.toggles.use_web = read(store, KEY_USE_WEB).as_deref() == Some("true");
    // Defaults to true: only an explicit "false" turns docs off.
    targets.toggles.use_docs = read(store, KEY_USE_DOCS).as_deref() != Some("false");

    read(store, KEY_SELECTED_TECHNOLOGY)
        .filter(|tech| tech != ALL_TECHNOLOGIES && targets.technologies.contains(tech))
}

/// Writes every tracked setting in one batch.
///
/// A cleared technology filter is written as `"all"`.
pub fn save(
    store: &dyn SettingsStore,
    models: &ModelSelector,
    openrouter: &OpenRouterPicker,
    technology: Option<&str>,
    toggles: Toggles,
) {
    let entries = [
        (KEY_SELECTED_MODEL, models.selected().to_string()),
        (KEY_EXECUTE_COMMANDS, toggles.execute_commands.to_string()),
        (
            KEY_SELECTED_TECHNOLOGY,
            technology.unwrap_or(ALL_TECHNOLOGIES).to_string(),
        ),
        (KEY_OPENROUTER_MODEL, openrouter.selected().to_string()),
        (KEY_USE_WEB, toggles.use_web.to_string()),
        (KEY_USE_DOCS, toggles.use_docs.to_string()),
    ];

    let entries: Vec<(&str, &str)> = entries
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    if let Err(e) = store.set_all(&entries) {
        tracing::warn!("[Settings] Failed to persist settings: {}", e);
    }
}

fn read(store: &dyn SettingsStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("[Settings] Failed to read '{}': {}", key, e);
            None
        }
    }
}
