//! Text generator seam.
//!
//! The coach never writes free-form replies itself. It hands a
//! [`GenerationRequest`] to an external [`TextGenerator`] and inspects what
//! comes back. Calls are bounded by a timeout, and every failure surfaces as a
//! [`GeneratorError`] for the policy layer to turn into a templated turn.

use crate::error::{GeneratorError, GeneratorResult};
use crate::hints::HintTier;
use crate::session::{Role, Turn};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub mod offline;
pub mod scripted;

pub use offline::OfflineGenerator;
pub use scripted::ScriptedGenerator;

/// Everything a generator needs for one reply
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Policy text plus problem context and, for hints, the tier instruction
    pub system_prompt: String,
    /// Full session transcript, oldest first
    pub transcript: Vec<Turn>,
    /// The problem text the session is coaching on
    pub problem_context: String,
    /// Set when the request produces a hint
    pub hint_tier: Option<HintTier>,
}

/// Chat-completion style message, for generators backed by a chat API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl GenerationRequest {
    /// System message followed by the transcript, coach turns as `assistant`
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.transcript.len() + 1);
        messages.push(ChatMessage {
            role: "system",
            content: self.system_prompt.clone(),
        });
        messages.extend(self.transcript.iter().map(|turn| ChatMessage {
            role: match turn.role {
                Role::Coach => "assistant",
                Role::Student => "user",
            },
            content: turn.content.clone(),
        }));
        messages
    }

    pub fn last_student_message(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|turn| turn.role == Role::Student)
            .map(|turn| turn.content.as_str())
    }
}

/// External free-form text generator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GeneratorResult<String>;

    /// Short name for logs
    fn name(&self) -> &str {
        "generator"
    }
}

/// Invoke the generator under a deadline.
///
/// Blank output counts as a failure so the caller never shows an empty turn.
pub async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    timeout: Duration,
) -> GeneratorResult<String> {
    let text = match tokio::time::timeout(timeout, generator.generate(request)).await {
        Ok(result) => result?,
        Err(_) => return Err(GeneratorError::Timeout(timeout)),
    };

    if text.trim().is_empty() {
        return Err(GeneratorError::Empty);
    }

    debug!(
        "{} produced {} chars{}",
        generator.name(),
        text.len(),
        request
            .hint_tier
            .map(|t| format!(" for hint tier {}", t.level()))
            .unwrap_or_default()
    );
    Ok(text.trim().to_string())
}
