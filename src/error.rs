//! Error types
//!
//! Nothing on the per-frame path is fatal; these only surface at the edges
//! (config parsing, misuse of a composed handle, a rejected content fetch).

use thiserror::Error;

/// Configuration could not be parsed
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid carousel config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown dealing direction: {0:?}")]
    UnknownDirection(String),
}

/// Misuse of an animation control handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    /// Composed sequences only know how to run forward
    #[error("reverse is not supported on a sequence")]
    ReverseUnsupported,
}

/// The revealed-content provider rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("revealed content unavailable: {0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
