//! Error types for the coaching engine
//!
//! This module provides structured error types using thiserror. Nothing here
//! reaches the student: generator failures are mapped to fallback turns by the
//! policy layer, and `CoachError` is reserved for caller mistakes such as an
//! unknown session or a bad configuration.

use crate::session::SessionId;
use std::time::Duration;
use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum CoachError {
    /// Session registry errors
    #[error("Session {id} not found. It may have already been finalized.")]
    SessionNotFound { id: SessionId },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// A configured recognizer failed to compile
    #[error("Invalid pattern '{pattern}' for category {category}: {reason}")]
    InvalidPattern {
        category: String,
        pattern: String,
        reason: String,
    },

    /// Finalize hook errors
    #[error("Failed to hand off session {id} for storage: {reason}")]
    FinalizeFailed { id: SessionId, reason: String },

    /// General errors for cases that don't fit a specific variant
    #[error("{0}")]
    General(String),
}

impl CoachError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::FinalizeFailed { .. } => "FINALIZE_FAILED",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::SessionNotFound { .. } => vec![
                "Start a new session with the confirmed problem text",
                "Check that the session was not ended by another request",
            ],
            Self::ConfigError { .. } => vec![
                "Run 'mathcoach config' to inspect the effective settings",
                "Run 'mathcoach init --force' to regenerate the settings file",
            ],
            Self::InvalidPattern { .. } => vec![
                "Patterns use Rust regex syntax; look-around is not supported",
                "Remove the pattern from [guardrail.extra_patterns] to restore the builtin taxonomy",
            ],
            Self::FinalizeFailed { .. } => vec![
                "The transcript is still returned to the caller and can be stored manually",
            ],
            Self::General(_) => vec![],
        }
    }
}

/// Failures of the external text generator or analyzer.
///
/// Every variant is recoverable: the policy layer substitutes a templated turn.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Generator did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Generator transport failed: {0}")]
    Transport(String),

    #[error("Generator rate limit exceeded")]
    RateLimited,

    #[error("Generator usage quota exhausted")]
    QuotaExhausted,

    #[error("Generator returned an empty response")]
    Empty,
}

impl GeneratorError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "GENERATOR_TIMEOUT",
            Self::Transport(_) => "GENERATOR_TRANSPORT",
            Self::RateLimited => "GENERATOR_RATE_LIMITED",
            Self::QuotaExhausted => "GENERATOR_QUOTA_EXHAUSTED",
            Self::Empty => "GENERATOR_EMPTY",
        }
    }
}

/// Result type alias for engine operations
pub type CoachResult<T> = Result<T, CoachError>;

/// Result type alias for generator calls
pub type GeneratorResult<T> = Result<T, GeneratorError>;
