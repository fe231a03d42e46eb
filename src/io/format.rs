//! Format definitions for CLI output.
//!
//! Provides structured format types for consistent JSON responses so the
//! audit commands can be scripted.

use crate::error::CoachError;
use crate::io::exit_code::ExitCode;
use serde::Serialize;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for tool integration
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Check if format is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Standard JSON response format.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "FLAGGED", "CONFIG_ERROR")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Actual data payload (only for success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Recovery suggestions (only for errors)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,

    /// Exit code for shell scripts
    pub exit_code: u8,
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    /// Create a response carrying data. A flagged result is still a success
    /// of the command, only its exit code differs.
    pub fn with_data(data: T, code: ExitCode) -> Self {
        let (code_str, message) = match code {
            ExitCode::Flagged => ("FLAGGED", "Text matched a guardrail category"),
            _ => ("OK", "Operation completed successfully"),
        };
        Self {
            status: "success".to_string(),
            code: code_str.to_string(),
            message: message.to_string(),
            data: Some(data),
            suggestions: Vec::new(),
            exit_code: code as u8,
        }
    }
}

impl JsonResponse<serde_json::Value> {
    /// Create an error response from CoachError.
    pub fn from_error(error: &CoachError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.status_code(),
            message: error.to_string(),
            data: None,
            suggestions: error
                .recovery_suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exit_code: ExitCode::from_error(error) as u8,
        }
    }
}
