//! Optional speech input.
//!
//! Whether speech is offered at all is decided once, when the
//! [`SpeechCapability`] is built. With an engine available, the adapter runs
//! a one-shot recognition session per start: `Idle -> Listening` when the
//! engine confirms the start, back to `Idle` when it reports the end or an
//! error. Engines report through [`SpeechEvent`]s fed to the session.

use crate::error::Result;

/// Locale every recognition session runs in.
pub const SPEECH_LOCALE: &str = "en-US";

/// Callback payloads reported by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Result(String),
    Ended,
    Error(String),
}

/// A platform recognition engine. `start` and `stop` are requests; the
/// engine confirms them later with [`SpeechEvent::Started`] and
/// [`SpeechEvent::Ended`]. A request the engine cannot even issue fails
/// with [`DevcmdError::Speech`](crate::error::DevcmdError::Speech).
pub trait SpeechEngine: Send {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;
}

/// Builds an engine for the given locale on first use.
pub type SpeechEngineFactory = Box<dyn FnMut(&str) -> Result<Box<dyn SpeechEngine>> + Send>;

pub enum SpeechCapability {
    Unavailable,
    Available(SpeechEngineFactory),
}

impl std::fmt::Debug for SpeechCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => f.write_str("Unavailable"),
            Self::Available(_) => f.write_str("Available"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Listening,
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Speech is not offered; the control is disabled.
    Disabled,
    StartRequested,
    StopRequested,
}

/// What the session should do after an engine event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Nothing,
    /// Submit the transcribed text as if typed.
    Submit(String),
    /// Show the message as a transcript error.
    Failed(String),
}

pub struct SpeechAdapter {
    capability: SpeechCapability,
    engine: Option<Box<dyn SpeechEngine>>,
    state: SpeechState,
    indicator_visible: bool,
    result_delivered: bool,
}

impl std::fmt::Debug for SpeechAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAdapter")
            .field("capability", &self.capability)
            .field("state", &self.state)
            .field("indicator_visible", &self.indicator_visible)
            .finish_non_exhaustive()
    }
}

impl SpeechAdapter {
    pub fn new(capability: SpeechCapability) -> Self {
        if matches!(capability, SpeechCapability::Unavailable) {
            tracing::info!("[Speech] Speech recognition not supported on this host");
        }
        Self {
            capability,
            engine: None,
            state: SpeechState::Idle,
            indicator_visible: false,
            result_delivered: false,
        }
    }

    /// False when the trigger control is permanently disabled.
    pub fn is_enabled(&self) -> bool {
        matches!(self.capability, SpeechCapability::Available(_))
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SpeechState::Listening
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator_visible
    }

    /// Requests a start or a stop depending on the current state.
    pub fn toggle(&mut self) -> Result<ToggleOutcome> {
        let SpeechCapability::Available(factory) = &mut self.capability else {
            return Ok(ToggleOutcome::Disabled);
        };

        if self.engine.is_none() {
            self.engine = Some(factory(SPEECH_LOCALE)?);
        }
        let Some(engine) = self.engine.as_mut() else {
            return Ok(ToggleOutcome::Disabled);
        };

        if self.state == SpeechState::Listening {
            engine.stop()?;
            Ok(ToggleOutcome::StopRequested)
        } else {
            engine.start()?;
            Ok(ToggleOutcome::StartRequested)
        }
    }

    /// Applies an engine callback.
    pub fn handle(&mut self, event: SpeechEvent) -> SpeechOutcome {
        match event {
            SpeechEvent::Started => {
                self.state = SpeechState::Listening;
                self.indicator_visible = true;
                self.result_delivered = false;
                SpeechOutcome::Nothing
            }
            SpeechEvent::Result(text) => {
                if self.state != SpeechState::Listening || self.result_delivered {
                    tracing::debug!("[Speech] Dropping result outside a live session");
                    return SpeechOutcome::Nothing;
                }
                self.result_delivered = true;
                SpeechOutcome::Submit(text)
            }
            SpeechEvent::Ended => {
                self.go_idle();
                SpeechOutcome::Nothing
            }
            SpeechEvent::Error(error) => {
                tracing::error!("[Speech] Speech recognition error: {}", error);
                self.go_idle();
                SpeechOutcome::Failed(format!("Speech recognition error: {error}"))
            }
        }
    }

    fn go_idle(&mut self) {
        self.state = SpeechState::Idle;
        self.indicator_visible = false;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Engine that records the requests it receives.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedEngine {
        pub calls: Arc<Mutex<Vec<&'static str>>>,
        /// Refuse every start with this message.
        pub start_error: Option<&'static str>,
    }

    impl SpeechEngine for ScriptedEngine {
        fn start(&mut self) -> Result<()> {
            self.calls.lock().unwrap().push("start");
            match self.start_error {
                Some(message) => Err(crate::error::DevcmdError::speech(message)),
                None => Ok(()),
            }
        }

        fn stop(&mut self) -> Result<()> {
            self.calls.lock().unwrap().push("stop");
            Ok(())
        }
    }

    pub(crate) fn available(engine: ScriptedEngine) -> SpeechCapability {
        SpeechCapability::Available(Box::new(move |locale| {
            assert_eq!(locale, SPEECH_LOCALE);
            Ok(Box::new(engine.clone()) as Box<dyn SpeechEngine>)
        }))
    }

    #[test]
    fn test_unavailable_is_disabled() {
        let mut adapter = SpeechAdapter::new(SpeechCapability::Unavailable);
        assert!(!adapter.is_enabled());
        assert_eq!(adapter.toggle().unwrap(), ToggleOutcome::Disabled);
        assert_eq!(adapter.state(), SpeechState::Idle);
    }

    #[test]
    fn test_toggle_starts_then_stops() {
        let engine = ScriptedEngine::default();
        let calls = engine.calls.clone();
        let mut adapter = SpeechAdapter::new(available(engine));

        assert_eq!(adapter.toggle().unwrap(), ToggleOutcome::StartRequested);
        // Still idle until the engine confirms.
        assert!(!adapter.is_listening());

        adapter.handle(SpeechEvent::Started);
        assert!(adapter.is_listening());
        assert!(adapter.indicator_visible());

        assert_eq!(adapter.toggle().unwrap(), ToggleOutcome::StopRequested);
        adapter.handle(SpeechEvent::Ended);
        assert_eq!(adapter.state(), SpeechState::Idle);
        assert!(!adapter.indicator_visible());

        assert_eq!(*calls.lock().unwrap(), vec!["start", "stop"]);
    }

    #[test]
    fn test_one_result_per_session() {
        let mut adapter = SpeechAdapter::new(available(ScriptedEngine::default()));
        adapter.toggle().unwrap();
        adapter.handle(SpeechEvent::Started);

        assert_eq!(
            adapter.handle(SpeechEvent::Result("list files".to_string())),
            SpeechOutcome::Submit("list files".to_string())
        );
        assert_eq!(
            adapter.handle(SpeechEvent::Result("again".to_string())),
            SpeechOutcome::Nothing
        );
    }

    #[test]
    fn test_error_forces_idle() {
        let mut adapter = SpeechAdapter::new(available(ScriptedEngine::default()));
        adapter.toggle().unwrap();
        adapter.handle(SpeechEvent::Started);

        let outcome = adapter.handle(SpeechEvent::Error("no-speech".to_string()));
        assert_eq!(
            outcome,
            SpeechOutcome::Failed("Speech recognition error: no-speech".to_string())
        );
        assert_eq!(adapter.state(), SpeechState::Idle);
        assert!(!adapter.indicator_visible());
    }
}
