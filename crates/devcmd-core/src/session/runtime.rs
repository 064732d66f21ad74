use std::sync::Arc;

use tokio::sync::mpsc;

use super::controller::SessionController;
use super::event::{Effect, SessionEvent};
use crate::api::BackendApi;

/// Drives a [`SessionController`] against a backend.
///
/// Effects run on spawned tokio tasks; each completion is sent back over an
/// unbounded channel and applied by [`SessionRuntime::process_next`], so the
/// controller is only ever touched by the runtime's owner. In-flight
/// requests are never cancelled.
pub struct SessionRuntime {
    controller: SessionController,
    backend: Arc<dyn BackendApi>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    pending_input: Option<String>,
}

impl SessionRuntime {
    pub fn new(controller: SessionController, backend: Arc<dyn BackendApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            backend,
            events_tx,
            events_rx,
            pending_input: None,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Text to pre-fill the next prompt with, if a recall asked for it.
    pub fn take_pending_input(&mut self) -> Option<String> {
        self.pending_input.take()
    }

    /// Applies an event and starts the effects it yields.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: SessionEvent) {
        let effects = self.controller.handle(event);
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Waits for the next queued event and applies it.
    pub async fn process_next(&mut self) {
        // The runtime holds a sender, so the channel never closes.
        if let Some(event) = self.events_rx.recv().await {
            self.dispatch(event);
        }
    }

    fn execute(&mut self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();

        match effect {
            Effect::ProcessCommand { pending, request } => {
                tokio::spawn(async move {
                    let outcome = backend.process_command(request).await;
                    let _ = tx.send(SessionEvent::CommandCompleted { pending, outcome });
                });
            }
            Effect::WebSearch(request) => {
                tokio::spawn(async move {
                    let outcome = backend.web_search(request).await;
                    let _ = tx.send(SessionEvent::WebSearchCompleted(outcome));
                });
            }
            Effect::DownloadDocs(request) => {
                tokio::spawn(async move {
                    let outcome = backend.download_docs(request).await;
                    let _ = tx.send(SessionEvent::DocsDownloadCompleted(outcome));
                });
            }
            Effect::SearchDocs(request) => {
                tokio::spawn(async move {
                    let technology = request.technology.clone();
                    let outcome = backend.search_docs(request).await;
                    let _ = tx.send(SessionEvent::DocsSearchCompleted {
                        technology,
                        outcome,
                    });
                });
            }
            Effect::FetchHistory => {
                tokio::spawn(async move {
                    let outcome = backend.history().await;
                    let _ = tx.send(SessionEvent::HistoryLoaded(outcome));
                });
            }
            Effect::FetchStatus => {
                tokio::spawn(async move {
                    let outcome = backend.status().await;
                    let _ = tx.send(SessionEvent::StatusLoaded(outcome));
                });
            }
            Effect::Schedule { after, event } => {
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(*event);
                });
            }
            Effect::FillInput(text) => {
                self.pending_input = Some(text);
            }
        }
    }
}
