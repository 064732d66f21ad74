//! Wire types and the backend trait for the assistant's HTTP API.
//!
//! Every endpoint is plain JSON over HTTP. Optional response fields are
//! `Option` or `#[serde(default)]` so a partially filled response degrades
//! instead of failing; `ai_response` is the only field whose absence makes a
//! command response malformed.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Body of `POST /api/process_command`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessCommandRequest {
    pub command: String,
    pub model: String,
    pub execute: bool,
    /// `null` on the wire when no technology filter is active.
    pub technology: Option<String>,
    pub use_web: bool,
    pub use_docs: bool,
    /// Only present when `model` is the OpenRouter aggregator.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub openrouter_model: Option<String>,
}

/// Response of `POST /api/process_command`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessCommandResponse {
    pub ai_response: String,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
}

/// Body of `POST /api/web_search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchRequest {
    pub query: String,
    pub num_results: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: String,
}

/// Response of `POST /api/web_search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResponse {
    #[serde(default)]
    pub results: Vec<WebSearchResult>,
}

/// Body of `POST /api/docs/download`. A `null` technology downloads every set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsDownloadRequest {
    pub technology: Option<String>,
}

/// Response of `POST /api/docs/download`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocsDownloadResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/docs/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsSearchRequest {
    pub technology: String,
    pub query: String,
    pub max_results: u32,
}

/// One item of the `POST /api/docs/search` response array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsSearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub context: String,
}

/// One item of the `GET /api/history` response array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub user_input: String,
    pub ai_response: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Response of `GET /api/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Documentation availability per technology.
    #[serde(default)]
    pub docs: HashMap<String, bool>,
    /// API availability per model id.
    #[serde(default)]
    pub apis: HashMap<String, bool>,
    /// Locally installed model availability per model id.
    #[serde(default)]
    pub models: HashMap<String, bool>,
    #[serde(default)]
    pub vosk_available: Option<bool>,
}

/// The assistant backend.
///
/// Implementations surface non-2xx statuses as [`crate::DevcmdError::Http`]
/// and connection problems as [`crate::DevcmdError::Transport`].
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn process_command(&self, request: ProcessCommandRequest)
    -> Result<ProcessCommandResponse>;

    async fn web_search(&self, request: WebSearchRequest) -> Result<WebSearchResponse>;

    async fn download_docs(&self, request: DocsDownloadRequest) -> Result<DocsDownloadResponse>;

    async fn search_docs(&self, request: DocsSearchRequest) -> Result<Vec<DocsSearchResult>>;

    async fn history(&self) -> Result<Vec<HistoryRecord>>;

    async fn status(&self) -> Result<StatusResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_command_request_omits_openrouter_model_when_unset() {
        let request = ProcessCommandRequest {
            command: "list files".to_string(),
            model: "gemma".to_string(),
            execute: false,
            technology: None,
            use_web: false,
            use_docs: true,
            openrouter_model: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("openrouter_model").is_none());
        assert!(value["technology"].is_null());
        assert_eq!(value["use_docs"], serde_json::json!(true));
    }

    #[test]
    fn test_process_command_response_optional_fields() {
        let response: ProcessCommandResponse =
            serde_json::from_str(r#"{"ai_response": "ls -la"}"#).unwrap();
        assert_eq!(response.ai_response, "ls -la");
        assert!(response.technology.is_none());
        assert!(response.model_used.is_none());
    }

    #[test]
    fn test_process_command_response_requires_ai_response() {
        let parsed: std::result::Result<ProcessCommandResponse, _> =
            serde_json::from_str(r#"{"technology": "Python"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_status_response_tolerates_extra_and_missing_fields() {
        let status: StatusResponse = serde_json::from_str(
            r#"{"docs": {"python": true}, "vosk_available": false, "unrelated": 1}"#,
        )
        .unwrap();
        assert_eq!(status.docs.get("python"), Some(&true));
        assert!(status.apis.is_empty());
        assert_eq!(status.vosk_available, Some(false));
    }
}
