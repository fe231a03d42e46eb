//! Settings flowing into the coach

use crate::common::{coach_with_settings, gauss_problem};
use mathcoach::policy::{ConfirmationPolicy, FormulaDumpAction};
use mathcoach::{
    Category, Coach, CoachError, PolicyDecision, ScriptedGenerator, Settings, TemplateBank,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const SHOWN_WORK: &str = "I subtracted 7 from both sides and got 3x = 15, so is 5 correct?";

#[tokio::test]
async fn test_shown_work_reaches_generator_by_default() {
    let generator = Arc::new(ScriptedGenerator::replies([
        "Walk me through the subtraction step once more. What could you check next?",
    ]));
    let coach = coach_with_settings(&Settings::default(), generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach.send_message(id, SHOWN_WORK).await.unwrap();
    assert!(matches!(decision, PolicyDecision::PassThrough { .. }));
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_shown_work_generation_is_still_scanned() {
    let generator = Arc::new(ScriptedGenerator::replies(["Yes, that's correct!"]));
    let coach = coach_with_settings(&Settings::default(), generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach.send_message(id, SHOWN_WORK).await.unwrap();
    assert!(matches!(
        decision,
        PolicyDecision::SynthesizedLeakReplacement { .. }
    ));
    // Shown work is acknowledged rather than met with a refusal
    assert_eq!(
        decision.text(),
        TemplateBank::seeded(0).shown_work_redirect()
    );
    assert_eq!(generator.calls(), 1);
    assert_eq!(coach.stats().leaks_suppressed, 1);
}

#[tokio::test]
async fn test_bare_value_guess_never_reaches_generator() {
    let generator = Arc::new(ScriptedGenerator::replies(["Yes, that's correct!"]));
    let coach = coach_with_settings(&Settings::default(), generator.clone());
    let id = coach.start_session(gauss_problem());

    for guess in ["is 3/4 correct?", "is 2^10 the answer?", "I found 12. Am I right?"] {
        let decision = coach.send_message(id, guess).await.unwrap();
        assert_eq!(
            decision.text(),
            TemplateBank::seeded(0).confirmation_request(),
            "{guess}"
        );
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_strict_policy_never_passes_confirmations() {
    let mut settings = Settings::default();
    settings.policy.confirmation_policy = ConfirmationPolicy::Never;
    let generator = Arc::new(ScriptedGenerator::default());
    let coach = coach_with_settings(&settings, generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach.send_message(id, SHOWN_WORK).await.unwrap();
    assert!(matches!(
        decision,
        PolicyDecision::SynthesizedRedirect {
            category: Category::ConfirmationSeeking,
            ..
        }
    ));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_formula_dump_replace_from_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.toml");
    fs::write(
        &path,
        r#"
[policy]
formula_dump_action = "replace"

[templates]
seed = 1
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(
        settings.policy.formula_dump_action,
        FormulaDumpAction::Replace
    );

    let generator = Arc::new(ScriptedGenerator::replies([
        "The formula is n(n+1)/2, so what do you get?",
    ]));
    let coach = Coach::new(&settings, generator).unwrap();
    let id = coach.start_session(gauss_problem());

    let decision = coach.send_message(id, "what about pairs").await.unwrap();
    assert!(matches!(
        decision,
        PolicyDecision::SynthesizedLeakReplacement { .. }
    ));
    let stats = coach.stats();
    assert_eq!(stats.formula_dumps, 1);
    assert_eq!(stats.leaks_suppressed, 1);
}

#[tokio::test]
async fn test_extra_patterns_extend_the_taxonomy() {
    let mut settings = Settings::default();
    settings.guardrail.extra_patterns.insert(
        "answer_seeking".to_string(),
        vec!["what number goes in the box".to_string()],
    );
    let generator = Arc::new(ScriptedGenerator::default());
    let coach = coach_with_settings(&settings, generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach
        .send_message(id, "What number goes in the box?")
        .await
        .unwrap();
    assert!(matches!(
        decision,
        PolicyDecision::SynthesizedRedirect {
            category: Category::AnswerSeeking,
            ..
        }
    ));
    assert_eq!(generator.calls(), 0);
}

#[test]
fn test_bad_patterns_are_rejected_at_construction() {
    let mut settings = Settings::default();
    settings
        .guardrail
        .extra_patterns
        .insert("answer_leak".to_string(), vec!["[unterminated".to_string()]);
    let err = Coach::new(&settings, Arc::new(ScriptedGenerator::default()))
        .err()
        .unwrap();
    assert!(matches!(err, CoachError::InvalidPattern { .. }));

    let mut settings = Settings::default();
    settings
        .guardrail
        .extra_patterns
        .insert("homework".to_string(), vec!["anything".to_string()]);
    let err = Coach::new(&settings, Arc::new(ScriptedGenerator::default()))
        .err()
        .unwrap();
    assert_eq!(err.status_code(), "CONFIG_ERROR");
}
