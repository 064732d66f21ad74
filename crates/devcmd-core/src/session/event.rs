use std::time::Duration;

use uuid::Uuid;

use crate::api::{
    DocsDownloadRequest, DocsDownloadResponse, DocsSearchRequest, DocsSearchResult,
    HistoryRecord, ProcessCommandRequest, ProcessCommandResponse, StatusResponse,
    WebSearchRequest, WebSearchResponse,
};
use crate::error::Result;
use crate::speech::SpeechEvent;
use crate::transcript::EntryId;

/// A submitted command waiting for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    pub request_id: Uuid,
    pub command: String,
    /// The "Processing command..." entry to drop when the request settles.
    pub placeholder: EntryId,
}

/// A change made through one of the panel's setting controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsChange {
    Model(String),
    OpenRouterModel(String),
    ExecuteCommands(bool),
    UseWeb(bool),
    UseDocs(bool),
}

/// Everything the session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Fetch history and status, then greet.
    Startup,
    Submit(String),
    CommandCompleted {
        pending: PendingCommand,
        outcome: Result<ProcessCommandResponse>,
    },
    SettingsChanged(SettingsChange),
    /// `"all"` clears the filter.
    SelectTechnology(String),
    FilterOpenRouter(String),
    RefreshStatus,
    StatusLoaded(Result<StatusResponse>),
    LoadHistory,
    HistoryLoaded(Result<Vec<HistoryRecord>>),
    WebSearch {
        query: String,
        num_results: u32,
    },
    WebSearchCompleted(Result<WebSearchResponse>),
    /// `None` downloads every documentation set.
    DownloadDocs {
        technology: Option<String>,
    },
    DocsDownloadCompleted(Result<DocsDownloadResponse>),
    /// `None` searches the selected technology.
    SearchDocs {
        technology: Option<String>,
        query: String,
        max_results: u32,
    },
    DocsSearchCompleted {
        technology: String,
        outcome: Result<Vec<DocsSearchResult>>,
    },
    ToggleSpeech,
    Speech(SpeechEvent),
    /// Copy the command of the history item at this index into the input.
    Recall(usize),
    Welcome,
    DocsHint,
}

/// Work the controller asks its host to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ProcessCommand {
        pending: PendingCommand,
        request: ProcessCommandRequest,
    },
    WebSearch(WebSearchRequest),
    DownloadDocs(DocsDownloadRequest),
    SearchDocs(DocsSearchRequest),
    FetchHistory,
    FetchStatus,
    /// Deliver `event` after `after`; best effort.
    Schedule {
        after: Duration,
        event: Box<SessionEvent>,
    },
    FillInput(String),
}
