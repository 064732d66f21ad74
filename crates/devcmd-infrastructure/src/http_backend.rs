//! HTTP client for the assistant backend.

use std::time::Duration;

use async_trait::async_trait;
use devcmd_core::api::{
    BackendApi, DocsDownloadRequest, DocsDownloadResponse, DocsSearchRequest, DocsSearchResult,
    HistoryRecord, ProcessCommandRequest, ProcessCommandResponse, StatusResponse,
    WebSearchRequest, WebSearchResponse,
};
use devcmd_core::error::{DevcmdError, Result};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

const PROCESS_COMMAND_PATH: &str = "/api/process_command";
const WEB_SEARCH_PATH: &str = "/api/web_search";
const DOCS_DOWNLOAD_PATH: &str = "/api/docs/download";
const DOCS_SEARCH_PATH: &str = "/api/docs/search";
const HISTORY_PATH: &str = "/api/history";
const STATUS_PATH: &str = "/api/status";

/// [`BackendApi`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DevcmdError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("[Backend] POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;
        decode(path, response).await
    }

    async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        tracing::debug!("[Backend] GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;
        decode(path, response).await
    }
}

fn request_failed(path: &str, error: reqwest::Error) -> DevcmdError {
    tracing::warn!("[Backend] {} request failed: {}", path, error);
    DevcmdError::transport(error.to_string())
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!("[Backend] {} returned {}", path, status);
        return Err(DevcmdError::http(status.as_u16()));
    }

    response.json::<T>().await.map_err(|e| {
        tracing::warn!("[Backend] Malformed response from {}: {}", path, e);
        DevcmdError::json(e.to_string())
    })
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn process_command(
        &self,
        request: ProcessCommandRequest,
    ) -> Result<ProcessCommandResponse> {
        self.post(PROCESS_COMMAND_PATH, &request).await
    }

    async fn web_search(&self, request: WebSearchRequest) -> Result<WebSearchResponse> {
        self.post(WEB_SEARCH_PATH, &request).await
    }

    async fn download_docs(&self, request: DocsDownloadRequest) -> Result<DocsDownloadResponse> {
        self.post(DOCS_DOWNLOAD_PATH, &request).await
    }

    async fn search_docs(&self, request: DocsSearchRequest) -> Result<Vec<DocsSearchResult>> {
        self.post(DOCS_SEARCH_PATH, &request).await
    }

    async fn history(&self) -> Result<Vec<HistoryRecord>> {
        self.get(HISTORY_PATH).await
    }

    async fn status(&self) -> Result<StatusResponse> {
        self.get(STATUS_PATH).await
    }
}
