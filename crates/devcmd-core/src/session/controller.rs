use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use super::event::{Effect, PendingCommand, SessionEvent, SettingsChange};
use super::state::SessionState;
use crate::api::{
    DocsDownloadRequest, DocsDownloadResponse, DocsSearchRequest, DocsSearchResult,
    HistoryRecord, ProcessCommandRequest, ProcessCommandResponse, StatusResponse,
    WebSearchRequest, WebSearchResponse,
};
use crate::capability::CapabilityStatus;
use crate::error::Result;
use crate::history::{History, HistoryEntry, UNKNOWN_TECHNOLOGY};
use crate::selection::{
    ModelOption, ModelSelector, OpenRouterPicker, TechnologyBar, TechnologyCatalog,
};
use crate::settings::{self, SettingsStore, SettingsTargets, Toggles};
use crate::speech::{SpeechAdapter, SpeechCapability, SpeechEvent, SpeechOutcome, ToggleOutcome};
use crate::transcript::{EntryKind, Transcript, TranscriptSink};

pub const PROCESSING_MESSAGE: &str = "Processing command...";
pub const WELCOME_MESSAGE: &str =
    "System initialized and ready. You can type or speak your commands.";
pub const NO_DOCS_MESSAGE: &str = "No documentation is currently downloaded. Consider downloading documentation for better results.";

pub const WELCOME_DELAY: Duration = Duration::from_millis(500);
pub const DOCS_HINT_DELAY: Duration = Duration::from_secs(2);
pub const STATUS_RECHECK_DELAY: Duration = Duration::from_secs(5);

/// Result count used for web and documentation searches.
pub const DEFAULT_RESULT_COUNT: u32 = 5;

/// Static inputs of a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Initially selected model, and the model whose use is not announced.
    pub default_model: String,
    pub models: Vec<ModelOption>,
    pub openrouter_models: Vec<ModelOption>,
    pub technologies: Vec<String>,
    /// Filter applied to the OpenRouter picker at startup.
    pub openrouter_filter: Option<String>,
}

/// The central coordinator of a session.
///
/// `SessionController` owns every piece of session state and is the only
/// place it changes. Each [`SessionEvent`] is applied synchronously and
/// yields the [`Effect`]s the host must run; their completions come back as
/// further events.
pub struct SessionController {
    state: SessionState,
    transcript: Transcript,
    history: History,
    models: ModelSelector,
    openrouter: OpenRouterPicker,
    technologies: TechnologyCatalog,
    tech_bar: TechnologyBar,
    toggles: Toggles,
    speech: SpeechAdapter,
    store: Arc<dyn SettingsStore>,
    default_model: String,
}

impl SessionController {
    /// Creates a controller and reads the persisted settings once.
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn SettingsStore>,
        speech: SpeechCapability,
        sink: Box<dyn TranscriptSink>,
    ) -> Self {
        let mut models = ModelSelector::new(config.models, &config.default_model);
        let mut openrouter = OpenRouterPicker::new(config.openrouter_models);
        let technologies = TechnologyCatalog::new(config.technologies);
        let mut toggles = Toggles::default();

        let stored_technology = settings::load(
            store.as_ref(),
            SettingsTargets {
                models: &mut models,
                openrouter: &mut openrouter,
                technologies: &technologies,
                toggles: &mut toggles,
            },
        );

        if let Some(filter) = config.openrouter_filter.filter(|f| !f.trim().is_empty()) {
            openrouter.set_filter(filter);
        }

        let mut controller = Self {
            state: SessionState::default(),
            transcript: Transcript::new(sink),
            history: History::new(),
            models,
            openrouter,
            technologies,
            tech_bar: TechnologyBar::default(),
            toggles,
            speech: SpeechAdapter::new(speech),
            store,
            default_model: config.default_model,
        };

        if let Some(tech) = stored_technology
            && let Ok(selected) = controller.tech_bar.select(&controller.technologies, &tech)
        {
            controller.state.selected_technology = selected;
        }

        tracing::info!(
            "[Session] Initialized (model: {}, technology: {:?})",
            controller.models.selected(),
            controller.state.selected_technology
        );
        controller
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn models(&self) -> &ModelSelector {
        &self.models
    }

    pub fn openrouter(&self) -> &OpenRouterPicker {
        &self.openrouter
    }

    /// The OpenRouter picker is only shown for the OpenRouter model.
    pub fn openrouter_visible(&self) -> bool {
        self.models.is_openrouter()
    }

    pub fn technologies(&self) -> &TechnologyCatalog {
        &self.technologies
    }

    pub fn tech_bar(&self) -> &TechnologyBar {
        &self.tech_bar
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn speech(&self) -> &SpeechAdapter {
        &self.speech
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    // ============================================================================
    // Event dispatch
    // ============================================================================

    /// Applies one event and returns the effects it requests.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Startup => self.startup(),
            SessionEvent::Submit(input) => self.submit(&input),
            SessionEvent::CommandCompleted { pending, outcome } => {
                self.complete_command(pending, outcome);
                Vec::new()
            }
            SessionEvent::SettingsChanged(change) => {
                self.change_setting(change);
                Vec::new()
            }
            SessionEvent::SelectTechnology(tech) => {
                self.select_technology(&tech);
                Vec::new()
            }
            SessionEvent::FilterOpenRouter(filter) => {
                self.openrouter.set_filter(filter);
                Vec::new()
            }
            SessionEvent::RefreshStatus => self.refresh_capabilities(),
            SessionEvent::StatusLoaded(outcome) => {
                self.apply_status(outcome);
                Vec::new()
            }
            SessionEvent::LoadHistory => vec![Effect::FetchHistory],
            SessionEvent::HistoryLoaded(outcome) => {
                self.apply_history(outcome);
                Vec::new()
            }
            SessionEvent::WebSearch { query, num_results } => self.web_search(query, num_results),
            SessionEvent::WebSearchCompleted(outcome) => {
                self.show_web_results(outcome);
                Vec::new()
            }
            SessionEvent::DownloadDocs { technology } => self.download_docs(technology),
            SessionEvent::DocsDownloadCompleted(outcome) => self.finish_docs_download(outcome),
            SessionEvent::SearchDocs {
                technology,
                query,
                max_results,
            } => self.search_docs(technology, query, max_results),
            SessionEvent::DocsSearchCompleted {
                technology,
                outcome,
            } => {
                self.show_docs_results(&technology, outcome);
                Vec::new()
            }
            SessionEvent::ToggleSpeech => {
                self.toggle_speech();
                Vec::new()
            }
            SessionEvent::Speech(event) => self.handle_speech(event),
            SessionEvent::Recall(index) => self.recall(index).into_iter().collect(),
            SessionEvent::Welcome => {
                self.transcript.append(WELCOME_MESSAGE, EntryKind::Info);
                vec![Effect::Schedule {
                    after: DOCS_HINT_DELAY,
                    event: Box::new(SessionEvent::DocsHint),
                }]
            }
            SessionEvent::DocsHint => {
                if self.state.capabilities.no_docs_downloaded() {
                    self.transcript.append(NO_DOCS_MESSAGE, EntryKind::Info);
                }
                Vec::new()
            }
        }
    }

    fn startup(&mut self) -> Vec<Effect> {
        vec![
            Effect::FetchHistory,
            Effect::FetchStatus,
            Effect::Schedule {
                after: WELCOME_DELAY,
                event: Box::new(SessionEvent::Welcome),
            },
        ]
    }

    // ============================================================================
    // Commands
    // ============================================================================

    /// Starts processing a command.
    ///
    /// Whitespace-only input is ignored. Otherwise the command and a
    /// provisional placeholder are shown and a request is issued.
    pub fn submit(&mut self, raw_input: &str) -> Vec<Effect> {
        let command = raw_input.trim();
        if command.is_empty() {
            return Vec::new();
        }

        self.transcript.append(command, EntryKind::Command);
        let placeholder = self.transcript.append(PROCESSING_MESSAGE, EntryKind::Info);

        let request = ProcessCommandRequest {
            command: command.to_string(),
            model: self.models.selected().to_string(),
            execute: self.toggles.execute_commands,
            technology: self.state.selected_technology.clone(),
            use_web: self.toggles.use_web,
            use_docs: self.toggles.use_docs,
            openrouter_model: self
                .models
                .is_openrouter()
                .then(|| self.openrouter.selected().to_string()),
        };

        self.state.last_command = Some(command.to_string());

        let pending = PendingCommand {
            request_id: Uuid::new_v4(),
            command: command.to_string(),
            placeholder,
        };
        tracing::debug!(
            "[Session] Submitting command {} with model {}",
            pending.request_id,
            request.model
        );

        vec![Effect::ProcessCommand { pending, request }]
    }

    /// Settles a submitted command.
    pub fn complete_command(
        &mut self,
        pending: PendingCommand,
        outcome: Result<ProcessCommandResponse>,
    ) {
        self.transcript.remove(pending.placeholder);

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    "[Session] Error processing command {}: {}",
                    pending.request_id,
                    e
                );
                self.transcript
                    .append(format!("Error processing command: {e}"), EntryKind::Error);
                return;
            }
        };

        let detected = response.technology.filter(|t| !t.is_empty());

        if let Some(tech) = &detected
            && self.state.selected_technology.is_none()
        {
            self.transcript
                .append(format!("Detected technology: {tech}"), EntryKind::Info);
        }

        if let Some(model) = response.model_used.as_deref()
            && !model.is_empty()
            && model != self.default_model
        {
            self.transcript
                .append(format!("Using model: {model}"), EntryKind::Info);
        }

        self.transcript
            .append(response.ai_response.clone(), EntryKind::Output);

        let technology = detected
            .or_else(|| self.state.selected_technology.clone())
            .unwrap_or_else(|| UNKNOWN_TECHNOLOGY.to_string());

        self.history.record(HistoryEntry {
            command: pending.command,
            response: response.ai_response,
            technology,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
    }

    // ============================================================================
    // Settings and selection
    // ============================================================================

    /// Sets or clears (`"all"`) the technology filter and persists it.
    pub fn select_technology(&mut self, tech: &str) {
        match self.tech_bar.select(&self.technologies, tech) {
            Ok(selected) => {
                self.state.selected_technology = selected;
                self.save_settings();
            }
            Err(e) => {
                self.transcript.append(e.to_string(), EntryKind::Error);
            }
        }
    }

    pub fn change_setting(&mut self, change: SettingsChange) {
        let applied = match change {
            SettingsChange::Model(id) => self.models.select(&id),
            SettingsChange::OpenRouterModel(id) => self.openrouter.select(&id),
            SettingsChange::ExecuteCommands(value) => {
                self.toggles.execute_commands = value;
                Ok(())
            }
            SettingsChange::UseWeb(value) => {
                self.toggles.use_web = value;
                Ok(())
            }
            SettingsChange::UseDocs(value) => {
                self.toggles.use_docs = value;
                Ok(())
            }
        };

        match applied {
            Ok(()) => self.save_settings(),
            Err(e) => {
                self.transcript.append(e.to_string(), EntryKind::Error);
            }
        }
    }

    fn save_settings(&self) {
        settings::save(
            self.store.as_ref(),
            &self.models,
            &self.openrouter,
            self.state.selected_technology.as_deref(),
            self.toggles,
        );
    }

    // ============================================================================
    // Capability status and history
    // ============================================================================

    pub fn refresh_capabilities(&self) -> Vec<Effect> {
        vec![Effect::FetchStatus]
    }

    /// Replaces the capability snapshot and gates model options on it.
    /// Failures are only logged.
    pub fn apply_status(&mut self, outcome: Result<StatusResponse>) {
        match outcome {
            Ok(status) => {
                tracing::info!("[Session] System status: {:?}", status);
                self.state.capabilities = CapabilityStatus::from(status);
                self.models
                    .apply_availability(&self.state.capabilities.apis);
            }
            Err(e) => {
                tracing::error!("[Session] Error checking status: {}", e);
            }
        }
    }

    /// Replaces the history with the backend's log. Failures are only logged.
    pub fn apply_history(&mut self, outcome: Result<Vec<HistoryRecord>>) {
        match outcome {
            Ok(records) => {
                tracing::debug!("[Session] Loaded {} history records", records.len());
                self.history
                    .replace_all(records.into_iter().map(HistoryEntry::from));
            }
            Err(e) => {
                tracing::error!("[Session] Error fetching history: {}", e);
            }
        }
    }

    /// Copies a history item's command into the input without submitting it.
    pub fn recall(&self, index: usize) -> Option<Effect> {
        self.history
            .get(index)
            .map(|entry| Effect::FillInput(entry.command.clone()))
    }

    // ============================================================================
    // Web and documentation search
    // ============================================================================

    fn web_search(&mut self, query: String, num_results: u32) -> Vec<Effect> {
        self.transcript
            .append(format!("Searching web for: {query}"), EntryKind::Info);
        vec![Effect::WebSearch(WebSearchRequest { query, num_results })]
    }

    fn show_web_results(&mut self, outcome: Result<WebSearchResponse>) {
        match outcome {
            Ok(response) if !response.results.is_empty() => {
                self.transcript.append(
                    format!("Found {} results:", response.results.len()),
                    EntryKind::Success,
                );
                for (index, result) in response.results.into_iter().enumerate() {
                    self.transcript.append(
                        format!("{}. {} - {}", index + 1, result.title, result.url),
                        EntryKind::Output,
                    );
                    self.transcript.append(result.summary, EntryKind::Info);
                }
            }
            Ok(_) => {
                self.transcript
                    .append("No search results found.", EntryKind::Error);
            }
            Err(e) => {
                tracing::error!("[Session] Error searching web: {}", e);
                self.transcript
                    .append(format!("Error searching web: {e}"), EntryKind::Error);
            }
        }
    }

    fn download_docs(&mut self, technology: Option<String>) -> Vec<Effect> {
        let message = match &technology {
            Some(tech) => format!("Starting download of {tech} documentation..."),
            None => {
                "Starting download of ALL documentation. This may take a while...".to_string()
            }
        };
        self.transcript.append(message, EntryKind::Info);
        vec![Effect::DownloadDocs(DocsDownloadRequest { technology })]
    }

    fn finish_docs_download(&mut self, outcome: Result<DocsDownloadResponse>) -> Vec<Effect> {
        match outcome {
            Ok(response) => {
                let succeeded = response.success != Some(false);
                let message = response.message.unwrap_or_else(|| {
                    format!(
                        "Documentation download {}.",
                        if response.success == Some(true) {
                            "started"
                        } else {
                            "failed"
                        }
                    )
                });
                let kind = if succeeded {
                    EntryKind::Success
                } else {
                    EntryKind::Error
                };
                self.transcript.append(message, kind);

                vec![Effect::Schedule {
                    after: STATUS_RECHECK_DELAY,
                    event: Box::new(SessionEvent::RefreshStatus),
                }]
            }
            Err(e) => {
                tracing::error!("[Session] Error downloading documentation: {}", e);
                self.transcript.append(
                    format!("Error downloading documentation: {e}"),
                    EntryKind::Error,
                );
                Vec::new()
            }
        }
    }

    fn search_docs(
        &mut self,
        technology: Option<String>,
        query: String,
        max_results: u32,
    ) -> Vec<Effect> {
        let Some(technology) = technology.or_else(|| self.state.selected_technology.clone())
        else {
            self.transcript
                .append("Please select a technology first.", EntryKind::Error);
            return Vec::new();
        };

        self.transcript.append(
            format!("Searching {technology} documentation for: {query}"),
            EntryKind::Info,
        );
        vec![Effect::SearchDocs(DocsSearchRequest {
            technology,
            query,
            max_results,
        })]
    }

    fn show_docs_results(&mut self, technology: &str, outcome: Result<Vec<DocsSearchResult>>) {
        match outcome {
            Ok(results) if !results.is_empty() => {
                self.transcript.append(
                    format!("Found {} results:", results.len()),
                    EntryKind::Success,
                );
                for (index, result) in results.into_iter().enumerate() {
                    self.transcript.append(
                        format!("{}. {}", index + 1, result.title),
                        EntryKind::Output,
                    );
                    self.transcript.append(result.context, EntryKind::Info);
                }
            }
            Ok(_) => {
                self.transcript.append(
                    format!(
                        "No results found in {technology} documentation. Consider downloading the documentation first."
                    ),
                    EntryKind::Error,
                );
            }
            Err(e) => {
                tracing::error!("[Session] Error searching documentation: {}", e);
                self.transcript.append(
                    format!("Error searching documentation: {e}"),
                    EntryKind::Error,
                );
            }
        }
    }

    // ============================================================================
    // Speech
    // ============================================================================

    pub fn toggle_speech(&mut self) {
        match self.speech.toggle() {
            Ok(ToggleOutcome::Disabled) => {
                tracing::debug!("[Speech] Toggle ignored, speech is unavailable");
            }
            Ok(outcome) => {
                tracing::debug!("[Speech] {:?}", outcome);
            }
            Err(e) => {
                self.handle_speech(SpeechEvent::Error(e.to_string()));
            }
        }
    }

    pub fn handle_speech(&mut self, event: SpeechEvent) -> Vec<Effect> {
        let outcome = self.speech.handle(event);
        self.state.listening = self.speech.is_listening();

        match outcome {
            SpeechOutcome::Nothing => Vec::new(),
            SpeechOutcome::Submit(text) => self.submit(&text),
            SpeechOutcome::Failed(message) => {
                self.transcript.append(message, EntryKind::Error);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WebSearchResult;
    use crate::error::DevcmdError;
    use crate::history::HISTORY_CAPACITY;
    use crate::selection::{ALL_TECHNOLOGIES, OPENROUTER_MODEL_ID};
    use crate::settings::{KEY_SELECTED_TECHNOLOGY, KEY_USE_WEB, MemorySettingsStore};
    use crate::speech::tests::{ScriptedEngine, available};
    use crate::transcript::{NullSink, TranscriptEntry};
    use std::collections::HashMap;

    fn config() -> SessionConfig {
        SessionConfig {
            default_model: "gemma".to_string(),
            models: vec![
                ModelOption::new("gemma", "Gemma 2"),
                ModelOption::new("modelA", "Model A"),
                ModelOption::new(OPENROUTER_MODEL_ID, "OpenRouter"),
            ],
            openrouter_models: vec![
                ModelOption::new("openai/gpt-4o", "GPT-4o"),
                ModelOption::new("anthropic/claude-3.5-sonnet", "Claude 3.5 Sonnet"),
            ],
            technologies: vec!["python".to_string(), "rust".to_string(), "t1".to_string()],
            openrouter_filter: None,
        }
    }

    fn controller_with(store: Arc<MemorySettingsStore>) -> SessionController {
        SessionController::new(
            config(),
            store,
            SpeechCapability::Unavailable,
            Box::new(NullSink),
        )
    }

    fn controller() -> SessionController {
        controller_with(Arc::new(MemorySettingsStore::new()))
    }

    fn messages(controller: &SessionController) -> Vec<(EntryKind, String)> {
        controller
            .transcript()
            .entries()
            .iter()
            .map(|TranscriptEntry { kind, message, .. }| (*kind, message.clone()))
            .collect()
    }

    fn pending_of(effects: Vec<Effect>) -> (PendingCommand, ProcessCommandRequest) {
        match effects.into_iter().next() {
            Some(Effect::ProcessCommand { pending, request }) => (pending, request),
            other => panic!("expected ProcessCommand, got {:?}", other),
        }
    }

    fn response(ai: &str, tech: Option<&str>, model: Option<&str>) -> ProcessCommandResponse {
        ProcessCommandResponse {
            ai_response: ai.to_string(),
            technology: tech.map(str::to_string),
            model_used: model.map(str::to_string),
        }
    }

    #[test]
    fn test_whitespace_input_is_ignored() {
        let mut controller = controller();
        for input in ["", "   ", "\t\n "] {
            assert!(controller.submit(input).is_empty());
        }
        assert!(controller.transcript().is_empty());
        assert!(controller.history().is_empty());
        assert!(controller.state().last_command.is_none());
    }

    #[test]
    fn test_submit_builds_request_and_placeholder() {
        let mut controller = controller();
        let (pending, request) = pending_of(controller.submit("  list files  "));

        assert_eq!(request.command, "list files");
        assert_eq!(request.model, "gemma");
        assert!(!request.execute);
        assert!(request.technology.is_none());
        assert!(!request.use_web);
        assert!(request.use_docs);
        assert!(request.openrouter_model.is_none());

        assert_eq!(
            messages(&controller),
            vec![
                (EntryKind::Command, "list files".to_string()),
                (EntryKind::Info, PROCESSING_MESSAGE.to_string()),
            ]
        );
        assert!(controller.transcript().contains(pending.placeholder));
        assert_eq!(controller.state().last_command.as_deref(), Some("list files"));
    }

    #[test]
    fn test_openrouter_model_only_sent_for_openrouter() {
        let mut controller = controller();
        controller.change_setting(SettingsChange::Model(OPENROUTER_MODEL_ID.to_string()));
        controller.change_setting(SettingsChange::OpenRouterModel(
            "anthropic/claude-3.5-sonnet".to_string(),
        ));
        assert!(controller.openrouter_visible());

        let (_, request) = pending_of(controller.submit("explain git rebase"));
        assert_eq!(request.model, OPENROUTER_MODEL_ID);
        assert_eq!(
            request.openrouter_model.as_deref(),
            Some("anthropic/claude-3.5-sonnet")
        );
    }

    #[test]
    fn test_detected_technology_is_announced_and_recorded() {
        let mut controller = controller();
        let (pending, _) = pending_of(controller.submit("install requests"));

        controller.complete_command(pending, Ok(response("X", Some("t1"), None)));

        assert_eq!(
            messages(&controller),
            vec![
                (EntryKind::Command, "install requests".to_string()),
                (EntryKind::Info, "Detected technology: t1".to_string()),
                (EntryKind::Output, "X".to_string()),
            ]
        );
        let newest = controller.history().get(0).unwrap();
        assert_eq!(newest.technology, "t1");
        assert_eq!(newest.command, "install requests");
        assert_eq!(newest.response, "X");
    }

    #[test]
    fn test_detection_not_announced_when_technology_selected() {
        let mut controller = controller();
        controller.select_technology("rust");
        let (pending, request) = pending_of(controller.submit("build release"));
        assert_eq!(request.technology.as_deref(), Some("rust"));

        controller.complete_command(pending, Ok(response("cargo build --release", None, None)));

        assert!(
            messages(&controller)
                .iter()
                .all(|(_, m)| !m.starts_with("Detected technology"))
        );
        assert_eq!(controller.history().get(0).unwrap().technology, "rust");
    }

    #[test]
    fn test_unknown_technology_fallback() {
        let mut controller = controller();
        let (pending, _) = pending_of(controller.submit("hello"));
        controller.complete_command(pending, Ok(response("hi", Some(""), None)));

        assert_eq!(
            controller.history().get(0).unwrap().technology,
            UNKNOWN_TECHNOLOGY
        );
    }

    #[test]
    fn test_non_default_model_is_announced() {
        let mut controller = controller();
        let (pending, _) = pending_of(controller.submit("a"));
        controller.complete_command(pending, Ok(response("one", None, Some("gemma"))));
        let (pending, _) = pending_of(controller.submit("b"));
        controller.complete_command(pending, Ok(response("two", None, Some("openai"))));

        let announcements: Vec<String> = messages(&controller)
            .into_iter()
            .filter(|(_, m)| m.starts_with("Using model"))
            .map(|(_, m)| m)
            .collect();
        assert_eq!(announcements, vec!["Using model: openai".to_string()]);
    }

    #[test]
    fn test_http_error_leaves_history_unchanged() {
        let mut controller = controller();
        let (pending, _) = pending_of(controller.submit("deploy"));

        controller.complete_command(pending.clone(), Err(DevcmdError::http(500)));

        assert!(controller.history().is_empty());
        assert!(!controller.transcript().contains(pending.placeholder));
        assert_eq!(
            messages(&controller).last().unwrap(),
            &(
                EntryKind::Error,
                "Error processing command: HTTP error! Status: 500".to_string()
            )
        );
    }

    #[test]
    fn test_overlapping_submissions_remove_their_own_placeholder() {
        let mut controller = controller();
        let (first, _) = pending_of(controller.submit("first"));
        let (second, _) = pending_of(controller.submit("second"));

        controller.complete_command(second.clone(), Ok(response("two", None, None)));
        assert!(controller.transcript().contains(first.placeholder));
        assert!(!controller.transcript().contains(second.placeholder));

        controller.complete_command(first.clone(), Ok(response("one", None, None)));
        assert!(!controller.transcript().contains(first.placeholder));

        assert_eq!(
            messages(&controller),
            vec![
                (EntryKind::Command, "first".to_string()),
                (EntryKind::Command, "second".to_string()),
                (EntryKind::Output, "two".to_string()),
                (EntryKind::Output, "one".to_string()),
            ]
        );
        assert_eq!(controller.history().get(0).unwrap().command, "first");
    }

    #[test]
    fn test_history_bounded_through_controller() {
        let mut controller = controller();
        for n in 0..HISTORY_CAPACITY + 5 {
            let (pending, _) = pending_of(controller.submit(&format!("cmd {n}")));
            controller.complete_command(pending, Ok(response("ok", None, None)));
        }
        assert_eq!(controller.history().len(), HISTORY_CAPACITY);
        assert_eq!(
            controller.history().get(0).unwrap().command,
            format!("cmd {}", HISTORY_CAPACITY + 4)
        );
    }

    #[test]
    fn test_select_technology_all_and_specific() {
        let store = Arc::new(MemorySettingsStore::new());
        let mut controller = controller_with(store.clone());

        controller.select_technology("rust");
        assert_eq!(controller.state().selected_technology.as_deref(), Some("rust"));
        assert_eq!(controller.tech_bar().badge(), Some("Rust"));
        assert_eq!(
            store.get(KEY_SELECTED_TECHNOLOGY).unwrap().as_deref(),
            Some("rust")
        );

        controller.select_technology(ALL_TECHNOLOGIES);
        assert!(controller.state().selected_technology.is_none());
        assert!(controller.tech_bar().badge().is_none());
    }

    #[test]
    fn test_select_unknown_technology_reports_error() {
        let mut controller = controller();
        controller.select_technology("cobol");
        assert!(controller.state().selected_technology.is_none());
        assert_eq!(
            messages(&controller),
            vec![(EntryKind::Error, "Unknown technology: cobol".to_string())]
        );
    }

    #[test]
    fn test_settings_persist_across_controllers() {
        let store = Arc::new(MemorySettingsStore::new());
        {
            let mut controller = controller_with(store.clone());
            controller.change_setting(SettingsChange::UseWeb(true));
            controller.change_setting(SettingsChange::ExecuteCommands(true));
            controller.change_setting(SettingsChange::Model("modelA".to_string()));
            controller.select_technology("python");
        }
        assert_eq!(store.get(KEY_USE_WEB).unwrap().as_deref(), Some("true"));

        let controller = controller_with(store);
        assert!(controller.toggles().use_web);
        assert!(controller.toggles().execute_commands);
        assert_eq!(controller.models().selected(), "modelA");
        assert_eq!(
            controller.state().selected_technology.as_deref(),
            Some("python")
        );
        assert_eq!(controller.tech_bar().badge(), Some("Python"));
    }

    #[test]
    fn test_status_replaces_snapshot_and_gates_models() {
        let mut controller = controller();
        controller.apply_status(Ok(StatusResponse {
            docs: HashMap::from([("python".to_string(), true)]),
            apis: HashMap::from([("modelA".to_string(), false)]),
            ..Default::default()
        }));

        let disabled: Vec<&str> = controller
            .models()
            .options()
            .iter()
            .filter(|o| !o.enabled)
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(disabled, vec!["modelA"]);

        controller.apply_status(Ok(StatusResponse {
            docs: HashMap::from([("rust".to_string(), false)]),
            ..Default::default()
        }));
        assert_eq!(controller.state().capabilities.docs.len(), 1);
        assert!(controller.state().capabilities.apis.is_empty());

        controller.apply_status(Err(DevcmdError::transport("connection refused")));
        assert_eq!(controller.state().capabilities.docs.len(), 1);
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn test_history_load_replaces_and_failure_is_silent() {
        let mut controller = controller();
        controller.apply_history(Ok(vec![HistoryRecord {
            user_input: "git status".to_string(),
            ai_response: "git status".to_string(),
            timestamp: "20240501_101500".to_string(),
        }]));
        assert_eq!(controller.history().len(), 1);
        assert_eq!(
            controller.history().get(0).unwrap().technology,
            UNKNOWN_TECHNOLOGY
        );

        controller.apply_history(Err(DevcmdError::http(500)));
        assert_eq!(controller.history().len(), 1);
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn test_recall_fills_input_without_submitting() {
        let mut controller = controller();
        let (pending, _) = pending_of(controller.submit("docker ps"));
        controller.complete_command(pending, Ok(response("docker ps", None, None)));
        let transcript_len = controller.transcript().len();

        assert_eq!(
            controller.handle(SessionEvent::Recall(0)),
            vec![Effect::FillInput("docker ps".to_string())]
        );
        assert!(controller.handle(SessionEvent::Recall(7)).is_empty());
        assert_eq!(controller.transcript().len(), transcript_len);
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn test_startup_and_welcome_sequence() {
        let mut controller = controller();
        let effects = controller.handle(SessionEvent::Startup);
        assert_eq!(effects[0], Effect::FetchHistory);
        assert_eq!(effects[1], Effect::FetchStatus);
        assert_eq!(
            effects[2],
            Effect::Schedule {
                after: WELCOME_DELAY,
                event: Box::new(SessionEvent::Welcome)
            }
        );

        let effects = controller.handle(SessionEvent::Welcome);
        assert_eq!(
            effects,
            vec![Effect::Schedule {
                after: DOCS_HINT_DELAY,
                event: Box::new(SessionEvent::DocsHint)
            }]
        );
        controller.handle(SessionEvent::DocsHint);

        assert_eq!(
            messages(&controller),
            vec![
                (EntryKind::Info, WELCOME_MESSAGE.to_string()),
                (EntryKind::Info, NO_DOCS_MESSAGE.to_string()),
            ]
        );
    }

    #[test]
    fn test_docs_hint_skipped_when_docs_present() {
        let mut controller = controller();
        controller.apply_status(Ok(StatusResponse {
            docs: HashMap::from([("python".to_string(), true)]),
            ..Default::default()
        }));
        controller.handle(SessionEvent::DocsHint);
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn test_web_search_flow() {
        let mut controller = controller();
        let effects = controller.handle(SessionEvent::WebSearch {
            query: "tokio select".to_string(),
            num_results: DEFAULT_RESULT_COUNT,
        });
        assert_eq!(
            effects,
            vec![Effect::WebSearch(WebSearchRequest {
                query: "tokio select".to_string(),
                num_results: DEFAULT_RESULT_COUNT,
            })]
        );

        controller.handle(SessionEvent::WebSearchCompleted(Ok(WebSearchResponse {
            results: vec![WebSearchResult {
                title: "Tokio docs".to_string(),
                url: "https://docs.rs/tokio".to_string(),
                summary: "select! macro".to_string(),
            }],
        })));
        controller.handle(SessionEvent::WebSearchCompleted(Ok(
            WebSearchResponse::default(),
        )));

        assert_eq!(
            messages(&controller),
            vec![
                (EntryKind::Info, "Searching web for: tokio select".to_string()),
                (EntryKind::Success, "Found 1 results:".to_string()),
                (
                    EntryKind::Output,
                    "1. Tokio docs - https://docs.rs/tokio".to_string()
                ),
                (EntryKind::Info, "select! macro".to_string()),
                (EntryKind::Error, "No search results found.".to_string()),
            ]
        );
    }

    #[test]
    fn test_docs_download_schedules_status_refresh() {
        let mut controller = controller();
        let effects = controller.handle(SessionEvent::DownloadDocs { technology: None });
        assert_eq!(
            effects,
            vec![Effect::DownloadDocs(DocsDownloadRequest { technology: None })]
        );

        let effects = controller.handle(SessionEvent::DocsDownloadCompleted(Ok(
            DocsDownloadResponse {
                success: Some(false),
                message: None,
            },
        )));
        assert_eq!(
            effects,
            vec![Effect::Schedule {
                after: STATUS_RECHECK_DELAY,
                event: Box::new(SessionEvent::RefreshStatus)
            }]
        );
        assert_eq!(
            messages(&controller).last().unwrap(),
            &(EntryKind::Error, "Documentation download failed.".to_string())
        );

        controller.handle(SessionEvent::DocsDownloadCompleted(Ok(
            DocsDownloadResponse {
                success: None,
                message: Some("Started downloading all documentation in the background".to_string()),
            },
        )));
        assert_eq!(messages(&controller).last().unwrap().0, EntryKind::Success);
    }

    #[test]
    fn test_docs_search_requires_technology() {
        let mut controller = controller();
        let effects = controller.handle(SessionEvent::SearchDocs {
            technology: None,
            query: "venv".to_string(),
            max_results: DEFAULT_RESULT_COUNT,
        });
        assert!(effects.is_empty());
        assert_eq!(
            messages(&controller),
            vec![(
                EntryKind::Error,
                "Please select a technology first.".to_string()
            )]
        );

        controller.select_technology("python");
        let effects = controller.handle(SessionEvent::SearchDocs {
            technology: None,
            query: "venv".to_string(),
            max_results: 3,
        });
        assert_eq!(
            effects,
            vec![Effect::SearchDocs(DocsSearchRequest {
                technology: "python".to_string(),
                query: "venv".to_string(),
                max_results: 3,
            })]
        );

        controller.handle(SessionEvent::DocsSearchCompleted {
            technology: "python".to_string(),
            outcome: Ok(Vec::new()),
        });
        assert_eq!(
            messages(&controller).last().unwrap().1,
            "No results found in python documentation. Consider downloading the documentation first."
        );
    }

    #[test]
    fn test_speech_result_submits_once() {
        let engine = ScriptedEngine::default();
        let mut controller = SessionController::new(
            config(),
            Arc::new(MemorySettingsStore::new()),
            available(engine),
            Box::new(NullSink),
        );

        controller.toggle_speech();
        controller.handle_speech(SpeechEvent::Started);
        assert!(controller.state().listening);

        let effects = controller.handle_speech(SpeechEvent::Result("show disk usage".to_string()));
        let (pending, request) = pending_of(effects);
        assert_eq!(request.command, "show disk usage");
        assert_eq!(pending.command, "show disk usage");

        assert!(
            controller
                .handle_speech(SpeechEvent::Result("again".to_string()))
                .is_empty()
        );
        controller.handle_speech(SpeechEvent::Ended);
        assert!(!controller.state().listening);
    }

    #[test]
    fn test_speech_error_is_reported() {
        let mut controller = SessionController::new(
            config(),
            Arc::new(MemorySettingsStore::new()),
            available(ScriptedEngine::default()),
            Box::new(NullSink),
        );
        controller.toggle_speech();
        controller.handle_speech(SpeechEvent::Started);
        controller.handle_speech(SpeechEvent::Error("audio-capture".to_string()));

        assert!(!controller.state().listening);
        assert_eq!(
            messages(&controller),
            vec![(
                EntryKind::Error,
                "Speech recognition error: audio-capture".to_string()
            )]
        );
    }

    #[test]
    fn test_speech_start_failure_is_reported_and_stays_idle() {
        let engine = ScriptedEngine {
            start_error: Some("microphone permission denied"),
            ..Default::default()
        };
        let calls = engine.calls.clone();
        let mut controller = SessionController::new(
            config(),
            Arc::new(MemorySettingsStore::new()),
            available(engine),
            Box::new(NullSink),
        );

        controller.handle(SessionEvent::ToggleSpeech);

        assert_eq!(*calls.lock().unwrap(), vec!["start"]);
        assert!(!controller.state().listening);
        assert!(!controller.speech().indicator_visible());
        assert_eq!(
            messages(&controller),
            vec![(
                EntryKind::Error,
                "Speech recognition error: microphone permission denied".to_string()
            )]
        );
    }

    #[test]
    fn test_speech_engine_construction_failure_is_reported() {
        let capability = SpeechCapability::Available(Box::new(|_| {
            Err(DevcmdError::speech("no recognizer for en-US"))
        }));
        let mut controller = SessionController::new(
            config(),
            Arc::new(MemorySettingsStore::new()),
            capability,
            Box::new(NullSink),
        );

        controller.handle(SessionEvent::ToggleSpeech);

        assert!(!controller.state().listening);
        assert_eq!(
            messages(&controller),
            vec![(
                EntryKind::Error,
                "Speech recognition error: no recognizer for en-US".to_string()
            )]
        );
    }

    #[test]
    fn test_speech_unavailable_toggle_is_noop() {
        let mut controller = controller();
        assert!(!controller.speech().is_enabled());
        controller.toggle_speech();
        assert!(controller.transcript().is_empty());
        assert!(!controller.state().listening);
    }
}
