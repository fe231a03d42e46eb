//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - nothing was flagged
//! - `1`: General error - unspecified failure
//! - `2`: Flagged - the text tripped a guardrail; audit pipelines should stop
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::CoachError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Text matched a guardrail category (code 2)
    Flagged = 2,

    /// Session not found (code 3)
    NotFound = 3,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// `Flagged` when a guardrail hit, `Success` otherwise
    pub fn from_flag(flagged: bool) -> Self {
        if flagged {
            ExitCode::Flagged
        } else {
            ExitCode::Success
        }
    }

    /// Convert a `CoachError` to the appropriate exit code.
    pub fn from_error(error: &CoachError) -> Self {
        match error {
            CoachError::SessionNotFound { .. } => ExitCode::NotFound,
            CoachError::ConfigError { .. } | CoachError::InvalidPattern { .. } => {
                ExitCode::ConfigError
            }
            CoachError::FinalizeFailed { .. } => ExitCode::IoError,
            CoachError::General(_) => ExitCode::GeneralError,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::Flagged => "Flagged by a guardrail",
            ExitCode::NotFound => "Not found",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
        }
    }
}
