//! Reviewed phrasings for synthesized coach turns.
//!
//! Refusals and persistence nudges are drawn uniformly from fixed sets so the
//! coach does not repeat itself word for word. Selection goes through an
//! injected seedable RNG; a configured seed makes every pick reproducible.

use crate::hints::HintTier;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod config;

pub use config::TemplateConfig;

const REFUSALS: &[&str] = &[
    "I'm here to help you discover the answer yourself! Let's think through this together.",
    "Great question! Rather than giving you the answer, let me help you figure it out step by step.",
    "I want you to have that 'aha!' moment. Let's work through the reasoning together.",
    "Finding the answer yourself will make it stick better. Here's what to think about next...",
];

const PERSISTENCE: &[&str] = &[
    "I hear you! Let's try a different angle. What if we used smaller numbers to see the pattern?",
    "Being stuck is part of learning! Can we draw a quick diagram or table to organize what we know?",
    "That's okay, let's step back. What stays the same in this problem? Finding an invariant often helps.",
    "Let's try working backwards. What would the answer need to look like?",
    "Here's an idea: let's rewrite the problem in a different form. Sometimes that reveals a path forward.",
];

const TIER1_HINTS: &[&str] = &[
    "This problem is about finding a pattern. What do you notice about how the numbers are arranged?",
    "Before calculating, think about what type of problem this is. Have you seen something similar before?",
    "Start by identifying what's changing and what stays the same in this problem.",
];

const TIER2_HINTS: &[&str] = &[
    "Try pairing up numbers from opposite ends. What do you notice about each pair?",
    "Set up the relationship between the quantities as an equation. What does each part represent?",
    "Draw a quick diagram or make a table. Visual representation often reveals the structure.",
];

const TIER3_HINTS: &[&str] = &[
    "Look at the first and last numbers. Now look at the second and second-to-last. What's the pattern in these sums?",
    "Write out the equation with the specific values from the problem. Now isolate the unknown step by step.",
    "Count how many pairs you can make. Multiply by the sum of each pair. What do you get?",
];

const ANSWER_REDIRECT: &str =
    "Let's focus on the approach. What's the first thing you notice about this problem?";

const LEAK_REDIRECT: &str =
    "Let me guide you to the next step instead. What have you figured out so far?";

const SHOWN_WORK_REDIRECT: &str = "You've laid out your steps, which is exactly what a mathematician does. Now check them yourself: put your result back into the original problem. Does every condition still hold?";

const CONFIRMATION_REQUEST: &str = "Rather than confirming, let's think about how you'd **verify** your answer. Before I can check it, walk me through how you arrived at it. Can you check it using a different method, or try it back in the original problem to see if it makes sense?";

const NEAR_FINAL: &str = "You're very close! Now, can you complete that last calculation yourself? What value do you get? Try it and tell me what you find.";

const NO_HINT_AVAILABLE: &str = "No hint available: you've used all 3 hints for this problem. You have everything you need, so try the next step and tell me what you find.";

const GENERATOR_UNAVAILABLE: &str = "I'm having trouble responding right now. Let's keep going: what part of the problem would you like to explore?";

const WELCOME: &str = "Great! Let's work on this together. Here's what I see:\n\n**{problem}**\n\n{observation}Let's start: **What do we know from this problem, and what are we trying to find?**";

fn pick_set(overrides: &[String], builtin: &[&str]) -> Vec<String> {
    let cleaned: Vec<String> = overrides
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if cleaned.is_empty() {
        builtin.iter().map(|t| t.to_string()).collect()
    } else {
        cleaned
    }
}

fn pick_phrase(value: &Option<String>, builtin: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(builtin)
        .to_string()
}

/// Template sets plus the random source used to pick from them
#[derive(Debug)]
pub struct TemplateBank {
    refusals: Vec<String>,
    persistence: Vec<String>,
    hints: [Vec<String>; 3],
    answer_redirect: String,
    leak_redirect: String,
    shown_work_redirect: String,
    confirmation_request: String,
    near_final: String,
    no_hint_available: String,
    generator_unavailable: String,
    welcome: String,
    rng: Mutex<StdRng>,
}

impl TemplateBank {
    /// Build the bank from configuration, seeding from the OS unless a seed is set
    pub fn from_config(config: &TemplateConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    /// Build the bank with an explicit random source
    pub fn with_rng(config: &TemplateConfig, rng: StdRng) -> Self {
        let phrases = &config.phrases;
        Self {
            refusals: pick_set(&config.refusals, REFUSALS),
            persistence: pick_set(&config.persistence, PERSISTENCE),
            hints: [
                pick_set(&config.hints.tier1, TIER1_HINTS),
                pick_set(&config.hints.tier2, TIER2_HINTS),
                pick_set(&config.hints.tier3, TIER3_HINTS),
            ],
            answer_redirect: pick_phrase(&phrases.answer_redirect, ANSWER_REDIRECT),
            leak_redirect: pick_phrase(&phrases.leak_redirect, LEAK_REDIRECT),
            shown_work_redirect: pick_phrase(&phrases.shown_work_redirect, SHOWN_WORK_REDIRECT),
            confirmation_request: pick_phrase(&phrases.confirmation_request, CONFIRMATION_REQUEST),
            near_final: pick_phrase(&phrases.near_final, NEAR_FINAL),
            no_hint_available: pick_phrase(&phrases.no_hint_available, NO_HINT_AVAILABLE),
            generator_unavailable: pick_phrase(
                &phrases.generator_unavailable,
                GENERATOR_UNAVAILABLE,
            ),
            welcome: pick_phrase(&phrases.welcome, WELCOME),
            rng: Mutex::new(rng),
        }
    }

    /// Builtin bank with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(&TemplateConfig::default(), StdRng::seed_from_u64(seed))
    }

    fn choose<'a>(&self, set: &'a [String]) -> &'a str {
        // Sets are never empty: overrides that clean to nothing fall back to builtin
        let index = self.rng.lock().random_range(0..set.len());
        &set[index]
    }

    pub fn refusals(&self) -> &[String] {
        &self.refusals
    }

    pub fn persistence_set(&self) -> &[String] {
        &self.persistence
    }

    pub fn hint_set(&self, tier: HintTier) -> &[String] {
        &self.hints[usize::from(tier.level() - 1)]
    }

    pub fn refusal(&self) -> String {
        self.choose(&self.refusals).to_string()
    }

    pub fn persistence(&self) -> String {
        self.choose(&self.persistence).to_string()
    }

    /// Fallback hint text for a tier
    pub fn fallback_hint(&self, tier: HintTier) -> String {
        self.choose(self.hint_set(tier)).to_string()
    }

    /// Refusal followed by the fixed redirect question
    pub fn answer_redirect(&self) -> String {
        format!("{}\n\n{}", self.refusal(), self.answer_redirect)
    }

    /// Refusal followed by the generic redirect used when a reply is suppressed
    pub fn leak_replacement(&self) -> String {
        format!("{}\n\n{}", self.refusal(), self.leak_redirect)
    }

    /// Replacement for a confirming reply to a student who showed their work
    pub fn shown_work_redirect(&self) -> &str {
        &self.shown_work_redirect
    }

    pub fn confirmation_request(&self) -> &str {
        &self.confirmation_request
    }

    pub fn near_final(&self) -> &str {
        &self.near_final
    }

    pub fn no_hint_available(&self) -> &str {
        &self.no_hint_available
    }

    pub fn generator_unavailable(&self) -> &str {
        &self.generator_unavailable
    }

    pub fn answer_redirect_question(&self) -> &str {
        &self.answer_redirect
    }

    pub fn leak_redirect_question(&self) -> &str {
        &self.leak_redirect
    }

    /// Opening coach turn for a confirmed problem
    pub fn welcome(&self, problem: &str, safe_rephrase: Option<&str>) -> String {
        let observation = safe_rephrase
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| format!("In other words: {r}\n\n"))
            .unwrap_or_default();

        // Placeholders are filled in the template only, never inside the
        // substituted problem text
        self.welcome
            .split("{problem}")
            .map(|piece| piece.replace("{observation}", &observation))
            .collect::<Vec<_>>()
            .join(problem.trim())
    }
}

impl Default for TemplateBank {
    fn default() -> Self {
        Self::from_config(&TemplateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guardrail::ResponseScanner;

    #[test]
    fn test_same_seed_same_selection() {
        let a = TemplateBank::seeded(7);
        let b = TemplateBank::seeded(7);
        let picks_a: Vec<String> = (0..20).map(|_| a.refusal()).collect();
        let picks_b: Vec<String> = (0..20).map(|_| b.refusal()).collect();
        assert_eq!(picks_a, picks_b);
    }

    #[test]
    fn test_selection_stays_inside_the_set() {
        let bank = TemplateBank::seeded(42);
        for _ in 0..50 {
            assert!(bank.persistence_set().contains(&bank.persistence()));
            assert!(bank.refusals().contains(&bank.refusal()));
        }
        assert_eq!(bank.persistence_set().len(), 5);
        assert_eq!(bank.refusals().len(), 4);
    }

    #[test]
    fn test_selection_varies_over_many_draws() {
        let bank = TemplateBank::seeded(3);
        let mut seen: Vec<String> = (0..200).map(|_| bank.persistence()).collect();
        seen.sort();
        seen.dedup();
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_answer_redirect_ends_with_fixed_question() {
        let bank = TemplateBank::seeded(1);
        let reply = bank.answer_redirect();
        let (refusal, question) = reply.split_once("\n\n").unwrap();
        assert!(bank.refusals().iter().any(|r| r == refusal));
        assert_eq!(question, ANSWER_REDIRECT);
    }

    #[test]
    fn test_overrides_replace_only_what_they_name() {
        let mut config = TemplateConfig::default();
        config.persistence = vec!["Keep going!".to_string(), "   ".to_string()];
        config.phrases.near_final = Some("Almost there.".to_string());
        config.refusals = vec!["".to_string()];

        let bank = TemplateBank::with_rng(&config, StdRng::seed_from_u64(0));
        assert_eq!(bank.persistence_set(), ["Keep going!".to_string()]);
        assert_eq!(bank.near_final(), "Almost there.");
        assert_eq!(bank.refusals().len(), REFUSALS.len());
        assert_eq!(bank.confirmation_request(), CONFIRMATION_REQUEST);
    }

    #[test]
    fn test_welcome_substitutes_problem_and_observation() {
        let bank = TemplateBank::seeded(0);
        let text = bank.welcome("If 3x + 7 = 22, find x.", Some("A number tripled plus 7 is 22."));
        assert!(text.contains("**If 3x + 7 = 22, find x.**"));
        assert!(text.contains("In other words: A number tripled plus 7 is 22."));

        let bare = bank.welcome("Find the sum of 1 to 100.", None);
        assert!(!bare.contains("In other words"));
        assert!(!bare.contains("{observation}"));
    }

    #[test]
    fn test_welcome_leaves_braces_in_problem_text_alone() {
        let bank = TemplateBank::seeded(0);
        let text = bank.welcome("Fill in {observation} please", Some("SAFE"));
        assert!(text.contains("**Fill in {observation} please**"));
        assert_eq!(text.matches("In other words: SAFE").count(), 1);

        let text = bank.welcome("Solve {problem} + 1", Some("a {problem} rephrase"));
        assert!(text.contains("**Solve {problem} + 1**"));
        assert!(text.contains("In other words: a {problem} rephrase"));
    }

    #[test]
    fn test_builtin_templates_never_leak() {
        let scanner = ResponseScanner::default();
        let bank = TemplateBank::seeded(0);
        let mut all: Vec<&str> = Vec::new();
        all.extend(REFUSALS);
        all.extend(PERSISTENCE);
        all.extend(TIER1_HINTS);
        all.extend(TIER2_HINTS);
        all.extend(TIER3_HINTS);
        all.extend([
            ANSWER_REDIRECT,
            LEAK_REDIRECT,
            SHOWN_WORK_REDIRECT,
            CONFIRMATION_REQUEST,
            NEAR_FINAL,
            NO_HINT_AVAILABLE,
            GENERATOR_UNAVAILABLE,
        ]);
        for text in all {
            assert!(!scanner.scan_for_leak(text), "template leaks: {text}");
        }
        assert!(!scanner.scan_for_leak(&bank.leak_replacement()));
    }
}
