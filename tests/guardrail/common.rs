//! Shared fixtures for the guardrail integration tests

use mathcoach::{Coach, Problem, ProblemType, ScriptedGenerator, Settings, TemplateBank};
use std::sync::Arc;

pub const GAUSS: &str = "Find the sum of all whole numbers from 1 to 100.";

pub fn gauss_problem() -> Problem {
    Problem::typed(GAUSS)
        .with_problem_type(ProblemType::Pattern)
        .with_topics(vec!["Arithmetic series".to_string()])
}

/// Coach over a scripted generator with pinned template selection
pub fn coach_with(generator: Arc<ScriptedGenerator>) -> Coach {
    coach_with_settings(&Settings::default(), generator)
}

pub fn coach_with_settings(settings: &Settings, generator: Arc<ScriptedGenerator>) -> Coach {
    Coach::new(settings, generator)
        .expect("default settings are valid")
        .with_templates(TemplateBank::seeded(42))
}
