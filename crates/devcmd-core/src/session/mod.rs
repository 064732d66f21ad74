//! Session domain module.
//!
//! # Module Structure
//!
//! - `state`: Mutable session record (`SessionState`)
//! - `event`: Typed events and effects (`SessionEvent`, `Effect`)
//! - `controller`: The single event handler (`SessionController`)
//! - `runtime`: Effect execution against a backend (`SessionRuntime`)

mod controller;
mod event;
mod runtime;
mod state;

pub use controller::{
    DEFAULT_RESULT_COUNT, DOCS_HINT_DELAY, NO_DOCS_MESSAGE, PROCESSING_MESSAGE,
    STATUS_RECHECK_DELAY, SessionConfig, SessionController, WELCOME_DELAY, WELCOME_MESSAGE,
};
pub use event::{Effect, PendingCommand, SessionEvent, SettingsChange};
pub use runtime::SessionRuntime;
pub use state::SessionState;
