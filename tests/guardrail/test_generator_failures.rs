//! Generator outages, timeouts, and sessions ended mid-call

use crate::common::{coach_with, coach_with_settings, gauss_problem};
use async_trait::async_trait;
use mathcoach::analysis::{AnalysisInput, ProblemAnalyzer};
use mathcoach::error::CoachResult;
use mathcoach::session::{SessionRecord, SessionSink};
use mathcoach::{
    CoachError, GeneratorError, GeneratorResult, HintTier, PolicyDecision, ScriptedGenerator,
    Settings, TemplateBank,
};
use std::sync::Arc;
use std::time::Duration;

fn short_timeout() -> Settings {
    let mut settings = Settings::default();
    settings.generator.timeout_ms = 50;
    settings
}

#[tokio::test(start_paused = true)]
async fn test_slow_generator_yields_fallback_turn() {
    let generator = Arc::new(
        ScriptedGenerator::replies(["Too late to matter."]).with_delay(Duration::from_secs(2)),
    );
    let coach = coach_with_settings(&short_timeout(), generator);
    let id = coach.start_session(gauss_problem());

    let decision = coach
        .send_message(id, "I want to add them in order")
        .await
        .unwrap();

    assert!(matches!(decision, PolicyDecision::Fallback { .. }));
    assert_eq!(
        decision.text(),
        TemplateBank::seeded(0).generator_unavailable()
    );
    assert_eq!(coach.stats().generator_fallbacks, 1);
    // The student still sees a coach turn
    let transcript = coach.transcript(id).await.unwrap();
    assert_eq!(transcript.last().unwrap().content, decision.text());
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_hint_still_advances_tier() {
    let generator =
        Arc::new(ScriptedGenerator::replies(["late"]).with_delay(Duration::from_secs(2)));
    let coach = coach_with_settings(&short_timeout(), generator);
    let id = coach.start_session(gauss_problem());

    let decision = coach.request_hint(id).await.unwrap();
    let PolicyDecision::Hint { tier, text } = &decision else {
        panic!("a granted hint request always yields a hint");
    };
    assert_eq!(*tier, HintTier::Broad);
    assert!(
        TemplateBank::seeded(0)
            .hint_set(HintTier::Broad)
            .contains(text)
    );
    assert_eq!(coach.hints_remaining(id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_each_failure_kind_falls_back() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Err(GeneratorError::Transport("connection reset".to_string())),
        Err(GeneratorError::RateLimited),
        Err(GeneratorError::QuotaExhausted),
        Ok("   ".to_string()),
    ]));
    let coach = coach_with(generator);
    let id = coach.start_session(gauss_problem());

    for message in ["first idea", "second idea", "third idea", "fourth idea"] {
        let decision = coach.send_message(id, message).await.unwrap();
        assert!(
            matches!(decision, PolicyDecision::Fallback { .. }),
            "{message}: {decision:?}"
        );
    }
    assert_eq!(coach.stats().generator_fallbacks, 4);
}

#[tokio::test(start_paused = true)]
async fn test_ending_session_discards_pending_reply() {
    let generator = Arc::new(
        ScriptedGenerator::replies(["What do you notice?", "{}"])
            .with_delay(Duration::from_millis(100)),
    );
    let coach = Arc::new(coach_with(generator));
    let id = coach.start_session(gauss_problem());

    let pending = {
        let coach = Arc::clone(&coach);
        tokio::spawn(async move { coach.send_message(id, "pairs maybe").await })
    };
    // Let the message take the session lock and reach the generator
    tokio::time::sleep(Duration::from_millis(10)).await;

    let record = coach.end_session(id).await.unwrap();
    let outcome = pending.await.unwrap();

    assert!(matches!(outcome, Err(CoachError::SessionNotFound { .. })));
    assert_eq!(record.transcript.len(), 1, "only the welcome turn remains");
    assert_eq!(coach.active_sessions(), 0);
}

struct FailingSink;

#[async_trait]
impl SessionSink for FailingSink {
    async fn finalize(&self, record: &SessionRecord) -> CoachResult<()> {
        Err(CoachError::FinalizeFailed {
            id: record.id,
            reason: "storage offline".to_string(),
        })
    }
}

#[tokio::test]
async fn test_failed_finalize_still_returns_record() {
    let generator = Arc::new(ScriptedGenerator::replies([
        r#"{"conceptsPracticed": ["Pairing"], "strategiesUsed": ["Smaller cases"], "reflectionQuestions": ["Why do the pairs match?"]}"#,
    ]));
    let coach = coach_with(generator).with_sink(Arc::new(FailingSink));
    let id = coach.start_session(gauss_problem());

    let record = coach.end_session(id).await.unwrap();
    assert_eq!(record.reflection.concepts_practiced, vec!["Pairing"]);
    assert_eq!(record.reflection.strategies_used, vec!["Smaller cases"]);
}

struct GarbageAnalyzer;

#[async_trait]
impl ProblemAnalyzer for GarbageAnalyzer {
    async fn analyze(&self, _input: &AnalysisInput) -> GeneratorResult<String> {
        Ok("Sorry, here is the problem: What is 3/4 of 20?".to_string())
    }
}

#[tokio::test]
async fn test_malformed_analysis_still_opens_session() {
    let coach = coach_with(Arc::new(ScriptedGenerator::default()));
    let input = AnalysisInput::Image("AAAA".to_string());

    let problem = coach.analyze(&GarbageAnalyzer, &input).await;
    assert!((problem.confidence - 0.7).abs() < f64::EPSILON);
    assert_eq!(problem.topics, vec!["Mathematics"]);
    assert!(!problem.text().is_empty());

    let id = coach.start_session(problem);
    assert_eq!(coach.hints_remaining(id).await.unwrap(), 3);
}
