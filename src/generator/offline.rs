//! Deterministic generator for running the coach without a model backend.

use super::{GenerationRequest, TextGenerator};
use crate::error::GeneratorResult;
use crate::hints::HintTier;
use async_trait::async_trait;

const REPLIES: &[&str] = &[
    "Interesting approach! Before we go further, let's make sure we understand what we're looking for. Can you tell me in your own words what the problem is asking?",
    "Good thinking! Now, let's break this down. What information does the problem give us? Try listing out the key facts.",
    "I like where you're going with this. What pattern do you notice in the numbers? Sometimes finding a pattern helps us see the structure.",
    "That's a good start! Let's try a smaller example first. What would happen with just a few numbers instead of all of them?",
    "You're on the right track. What stays the same as we work through this problem? Finding the invariant can be really helpful.",
    "Great observation! Now, can you think of another way to approach this? Sometimes looking at a problem from a different angle reveals the structure.",
    "Excellent work so far! What's the relationship between the quantities in this problem? Try expressing it as an equation or drawing a diagram.",
    "You're making good progress! Let's check your reasoning with a quick test. Does your approach work for a simpler version of this problem?",
];

const HINTS: [&str; 3] = [
    "Before calculating, think about what type of problem this is. What do you notice about the numbers given?",
    "Try writing the relationship between the quantities as an equation or a table. What does each part represent?",
    "Take the relationship you wrote down and carry out the first step with the actual values. What do you get, and what does it tell you?",
];

/// Picks replies by transcript length, so the same transcript always gets the
/// same reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GeneratorResult<String> {
        let reply = match request.hint_tier {
            Some(HintTier::Broad) => HINTS[0],
            Some(HintTier::Narrow) => HINTS[1],
            Some(HintTier::Concrete) => HINTS[2],
            None => REPLIES[request.transcript.len() % REPLIES.len()],
        };
        Ok(reply.to_string())
    }

    fn name(&self) -> &str {
        "offline"
    }
}
