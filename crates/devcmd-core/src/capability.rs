//! Backend-reported capability snapshot.

use std::collections::HashMap;

use crate::api::StatusResponse;

/// Availability of documentation sets and model APIs, as of the last status
/// check. Each check replaces the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityStatus {
    pub docs: HashMap<String, bool>,
    pub apis: HashMap<String, bool>,
    pub local_models: HashMap<String, bool>,
    pub speech_model: Option<bool>,
}

impl CapabilityStatus {
    pub fn is_docs_available(&self, technology: &str) -> bool {
        self.docs.get(technology).copied().unwrap_or(false)
    }

    /// True when no documentation set is downloaded, including when the
    /// backend reported none at all.
    pub fn no_docs_downloaded(&self) -> bool {
        self.docs.values().all(|downloaded| !downloaded)
    }
}

impl From<StatusResponse> for CapabilityStatus {
    fn from(status: StatusResponse) -> Self {
        Self {
            docs: status.docs,
            apis: status.apis,
            local_models: status.models,
            speech_model: status.vosk_available,
        }
    }
}
