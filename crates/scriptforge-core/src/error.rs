//! Error types for Scriptforge Core
//!
//! Every fallible pipeline operation returns [`ForgeError`]. Decode failures
//! carry the stage that produced them so the top-level handler can report
//! where a run aborted.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Scriptforge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Main error type for Scriptforge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Gateway called with neither a conversation nor a prompt
    #[error("Both conversation and prompt cannot be empty when requesting a generation")]
    EmptyRequest,

    /// A response expected to be JSON was not
    #[error("{stage}: failed to decode JSON response: {source}")]
    Decode {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A JSON envelope lacks its payload key
    #[error("{stage}: missing expected key '{key}' in JSON response")]
    MissingKey { stage: &'static str, key: &'static str },

    /// The payload key exists but is not a string
    #[error("{stage}: key '{key}' does not hold a string")]
    NotAString { stage: &'static str, key: &'static str },

    /// A run artifact was written twice
    #[error("Artifact already written: {0}")]
    AlreadyWritten(PathBuf),

    /// The validation subprocess could not be run
    #[error("Sandbox error: {0}")]
    Sandbox(String),

    /// Configuration problems
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interactive input failed
    #[error("Input error: {0}")]
    Input(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForgeError {
    /// True for failures caused by a malformed generation response
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::MissingKey { .. } | Self::NotAString { .. }
        )
    }
}
