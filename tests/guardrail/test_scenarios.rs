//! End-to-end coaching scenarios

use crate::common::{coach_with, gauss_problem};
use mathcoach::session::Role;
use mathcoach::{Category, HintTier, PolicyDecision, ScriptedGenerator, TemplateBank};
use std::sync::Arc;

#[tokio::test]
async fn test_answer_request_is_refused_without_generation() {
    let generator = Arc::new(ScriptedGenerator::replies(["The answer is 5050."]));
    let coach = coach_with(generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach
        .send_message(id, "What's the final answer?")
        .await
        .unwrap();

    let PolicyDecision::SynthesizedRedirect { category, text } = &decision else {
        panic!("expected a redirect, got {decision:?}");
    };
    assert_eq!(*category, Category::AnswerSeeking);

    let bank = TemplateBank::seeded(0);
    let (refusal, question) = text.split_once("\n\n").unwrap();
    assert!(bank.refusals().iter().any(|r| r == refusal));
    assert_eq!(question, bank.answer_redirect_question());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_bare_guess_gets_justification_request() {
    let generator = Arc::new(ScriptedGenerator::replies(["Yes, that's correct!"]));
    let coach = coach_with(generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach.send_message(id, "is 42 correct?").await.unwrap();

    assert_eq!(
        decision.text(),
        TemplateBank::seeded(0).confirmation_request()
    );
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
async fn test_leaking_generation_is_never_shown() {
    let generator = Arc::new(ScriptedGenerator::replies(["The answer is 17."]));
    let coach = coach_with(generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach
        .send_message(id, "I added the first few numbers together")
        .await
        .unwrap();

    assert!(matches!(
        decision,
        PolicyDecision::SynthesizedLeakReplacement { .. }
    ));
    assert!(!decision.text().contains("17"));
    assert_eq!(generator.calls(), 1);

    let transcript = coach.transcript(id).await.unwrap();
    assert!(transcript.iter().all(|t| !t.content.contains("The answer is 17")));
    assert_eq!(coach.stats().leaks_suppressed, 1);
}

#[tokio::test]
async fn test_hints_progress_then_run_out() {
    let generator = Arc::new(ScriptedGenerator::replies([
        "Think about what kind of pattern the numbers make.",
        "Try pairing numbers from opposite ends of the list.",
        "Look at 1 + 100 and 2 + 99. How many pairs like that are there?",
    ]));
    let coach = coach_with(generator.clone());
    let id = coach.start_session(gauss_problem());

    for (expected, remaining) in HintTier::ALL.into_iter().zip([2u8, 1, 0]) {
        let decision = coach.request_hint(id).await.unwrap();
        let PolicyDecision::Hint { tier, .. } = decision else {
            panic!("expected hint tier {}", expected.level());
        };
        assert_eq!(tier, expected);
        assert_eq!(coach.hints_remaining(id).await.unwrap(), remaining);
    }

    let fourth = coach.request_hint(id).await.unwrap();
    assert!(matches!(fourth, PolicyDecision::HintUnavailable { .. }));
    assert!(fourth.text().to_lowercase().contains("no hint available"));
    assert_eq!(coach.hints_remaining(id).await.unwrap(), 0);
    assert_eq!(generator.calls(), 3);

    // Each hint request carried its tier
    let tiers: Vec<_> = generator
        .requests()
        .iter()
        .map(|r| r.hint_tier.map(|t| t.level()))
        .collect();
    assert_eq!(tiers, vec![Some(1), Some(2), Some(3)]);

    let record = coach.end_session(id).await.unwrap();
    assert_eq!(record.hints_used, 3);
}

#[tokio::test]
async fn test_giving_up_gets_persistence_template() {
    let generator = Arc::new(ScriptedGenerator::default());
    let coach = coach_with(generator.clone());
    let id = coach.start_session(gauss_problem());

    let decision = coach
        .send_message(id, "I give up, this is too hard")
        .await
        .unwrap();

    assert!(matches!(
        decision,
        PolicyDecision::SynthesizedRedirect {
            category: Category::Stuck,
            ..
        }
    ));
    let bank = TemplateBank::seeded(0);
    assert_eq!(bank.persistence_set().len(), 5);
    assert!(bank.persistence_set().iter().any(|t| t == decision.text()));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_transcript_is_ordered_and_append_only() {
    let generator = Arc::new(ScriptedGenerator::replies([
        "What do you notice about 1 and 100?",
    ]));
    let coach = coach_with(generator);
    let id = coach.start_session(gauss_problem());

    coach.send_message(id, "I'm stuck").await.unwrap();
    let before = coach.transcript(id).await.unwrap();
    coach.send_message(id, "maybe pair them up?").await.unwrap();
    let after = coach.transcript(id).await.unwrap();

    assert_eq!(&after[..before.len()], &before[..]);
    let roles: Vec<Role> = after.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::Coach,
            Role::Student,
            Role::Coach,
            Role::Student,
            Role::Coach
        ]
    );
    assert!(after[0].content.contains("Find the sum of all whole numbers"));
}
