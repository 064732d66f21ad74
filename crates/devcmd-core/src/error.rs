//! Error types for the devcmd application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire devcmd application.
///
/// Every variant carries plain strings so errors can be cloned into
/// session events and rendered into the transcript.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DevcmdError {
    /// Backend answered with a non-success HTTP status
    #[error("HTTP error! Status: {status}")]
    Http { status: u16 },

    /// Request never produced a response (connection refused, timeout, ...)
    #[error("{0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Speech recognition engine error, raised by `SpeechEngine` implementations
    #[error("{0}")]
    Speech(String),

    /// Technology outside the configured technology set
    #[error("Unknown technology: {0}")]
    UnknownTechnology(String),

    /// Model id not offered by the model selector
    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

impl DevcmdError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Http error from a status code
    pub fn http(status: u16) -> Self {
        Self::Http { status }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a JSON Serialization error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Speech error
    pub fn speech(message: impl Into<String>) -> Self {
        Self::Speech(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error came from talking to the backend
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Transport(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DevcmdError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DevcmdError {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string())
    }
}

impl From<toml::de::Error> for DevcmdError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DevcmdError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, DevcmdError>`.
pub type Result<T> = std::result::Result<T, DevcmdError>;
