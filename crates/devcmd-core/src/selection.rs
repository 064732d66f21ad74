//! Model and technology selection state.
//!
//! Holds what the panel's selectors show: the primary model list with
//! per-option availability, the OpenRouter sub-model picker with its text
//! filter, and the technology bar with its selection badge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DevcmdError, Result};

/// Primary model id that activates the OpenRouter sub-model picker.
pub const OPENROUTER_MODEL_ID: &str = "openrouter";

/// Technology value meaning "no filter".
pub const ALL_TECHNOLOGIES: &str = "all";

/// A selectable model, either in the primary selector or the OpenRouter picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    pub id: String,
    pub label: String,
    #[serde(default = "default_enabled", skip_serializing)]
    pub enabled: bool,
    /// Tooltip set after a status refresh.
    #[serde(default, skip_serializing)]
    pub title: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl ModelOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            enabled: true,
            title: None,
        }
    }
}

/// The primary model selector.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    options: Vec<ModelOption>,
    selected: String,
}

impl ModelSelector {
    /// Creates a selector. The initial selection is `default` when offered,
    /// otherwise the first option.
    pub fn new(options: Vec<ModelOption>, default: &str) -> Self {
        let selected = options
            .iter()
            .find(|o| o.id == default)
            .or_else(|| options.first())
            .map(|o| o.id.clone())
            .unwrap_or_default();
        Self { options, selected }
    }

    pub fn options(&self) -> &[ModelOption] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn contains(&self, id: &str) -> bool {
        self.options.iter().any(|o| o.id == id)
    }

    pub fn option(&self, id: &str) -> Option<&ModelOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Whether the OpenRouter sub-model picker should be shown.
    pub fn is_openrouter(&self) -> bool {
        self.selected == OPENROUTER_MODEL_ID
    }

    /// Selects a model. Unknown and disabled options are refused.
    pub fn select(&mut self, id: &str) -> Result<()> {
        match self.option(id) {
            None => Err(DevcmdError::UnknownModel(id.to_string())),
            Some(option) if !option.enabled => Err(DevcmdError::config(format!(
                "{} API key not configured",
                option.id
            ))),
            Some(_) => {
                self.selected = id.to_string();
                Ok(())
            }
        }
    }

    /// Applies a backend availability map.
    ///
    /// Options mapped to `false` are disabled, options mapped to `true` are
    /// enabled, options absent from the map are left untouched.
    pub fn apply_availability(&mut self, availability: &HashMap<String, bool>) {
        for option in &mut self.options {
            if let Some(&available) = availability.get(&option.id) {
                option.enabled = available;
                option.title = Some(if available {
                    format!("{} API available", option.id)
                } else {
                    format!("{} API key not configured", option.id)
                });
            }
        }
    }
}

/// The OpenRouter sub-model picker and its search filter.
#[derive(Debug, Clone)]
pub struct OpenRouterPicker {
    options: Vec<ModelOption>,
    selected: String,
    filter: String,
}

impl OpenRouterPicker {
    pub fn new(options: Vec<ModelOption>) -> Self {
        let selected = options.first().map(|o| o.id.clone()).unwrap_or_default();
        Self {
            options,
            selected,
            filter: String::new(),
        }
    }

    pub fn options(&self) -> &[ModelOption] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn contains(&self, id: &str) -> bool {
        self.options.iter().any(|o| o.id == id)
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(DevcmdError::UnknownModel(id.to_string()));
        }
        self.selected = id.to_string();
        Ok(())
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// An option stays visible when its label or its id contains the filter,
    /// compared case-insensitively.
    pub fn is_visible(&self, option: &ModelOption) -> bool {
        let needle = self.filter.to_lowercase();
        option.label.to_lowercase().contains(&needle) || option.id.to_lowercase().contains(&needle)
    }

    pub fn visible_options(&self) -> impl Iterator<Item = &ModelOption> {
        self.options.iter().filter(|o| self.is_visible(o))
    }
}

/// The fixed set of technologies a command can be narrowed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologyCatalog {
    technologies: Vec<String>,
}

impl TechnologyCatalog {
    pub fn new<I, S>(technologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            technologies: technologies.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, tech: &str) -> bool {
        self.technologies.iter().any(|t| t == tech)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.technologies.iter().map(String::as_str)
    }
}

/// Highlight and badge state of the technology bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologyBar {
    highlighted: String,
    badge: Option<String>,
}

impl Default for TechnologyBar {
    fn default() -> Self {
        Self {
            highlighted: ALL_TECHNOLOGIES.to_string(),
            badge: None,
        }
    }
}

impl TechnologyBar {
    /// The control currently carrying the highlight (`"all"` included).
    pub fn highlighted(&self) -> &str {
        &self.highlighted
    }

    /// Label of the selection badge, `None` while the badge is hidden.
    pub fn badge(&self) -> Option<&str> {
        self.badge.as_deref()
    }

    /// Moves the highlight to `tech` and returns the resulting filter value.
    pub fn select(&mut self, catalog: &TechnologyCatalog, tech: &str) -> Result<Option<String>> {
        if tech == ALL_TECHNOLOGIES {
            self.highlighted = ALL_TECHNOLOGIES.to_string();
            self.badge = None;
            return Ok(None);
        }
        if !catalog.contains(tech) {
            return Err(DevcmdError::UnknownTechnology(tech.to_string()));
        }
        self.highlighted = tech.to_string();
        self.badge = Some(capitalize(tech));
        Ok(Some(tech.to_string()))
    }
}

/// Uppercases the first character, leaving the rest as-is.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
