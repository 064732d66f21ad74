pub mod api;
pub mod capability;
pub mod error;
pub mod history;
pub mod selection;
pub mod session;
pub mod settings;
pub mod speech;
pub mod transcript;

// Re-export common error type
pub use error::{DevcmdError, Result};

pub use api::BackendApi;
pub use session::{Effect, SessionConfig, SessionController, SessionEvent, SessionRuntime};
pub use settings::SettingsStore;
pub use transcript::{EntryKind, TranscriptSink};
