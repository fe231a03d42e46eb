//! Concurrent hint requests on one session

use crate::common::{coach_with, gauss_problem};
use mathcoach::session::TurnKind;
use mathcoach::{PolicyDecision, ScriptedGenerator};
use std::sync::Arc;
use std::time::Duration;

async fn race_hints(requests: usize) -> (Vec<PolicyDecision>, Vec<u8>) {
    let generator = Arc::new(
        ScriptedGenerator::replies((0..requests).map(|i| format!("Consider step {i} carefully.")))
            .with_delay(Duration::from_millis(5)),
    );
    let coach = Arc::new(coach_with(generator));
    let id = coach.start_session(gauss_problem());

    let handles: Vec<_> = (0..requests)
        .map(|_| {
            let coach = Arc::clone(&coach);
            tokio::spawn(async move { coach.request_hint(id).await })
        })
        .collect();

    let mut decisions = Vec::new();
    for handle in handles {
        decisions.push(handle.await.unwrap().unwrap());
    }

    let tiers = coach
        .transcript(id)
        .await
        .unwrap()
        .iter()
        .filter(|t| t.kind == TurnKind::Hint)
        .filter_map(|t| t.hint_tier.map(|tier| tier.level()))
        .collect();
    (decisions, tiers)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_grant_at_most_three() {
    for requests in [1usize, 2, 3, 5, 8] {
        let (decisions, tiers) = race_hints(requests).await;

        let granted = decisions
            .iter()
            .filter(|d| matches!(d, PolicyDecision::Hint { .. }))
            .count();
        let rejected = decisions
            .iter()
            .filter(|d| matches!(d, PolicyDecision::HintUnavailable { .. }))
            .count();

        assert_eq!(granted, requests.min(3), "{requests} concurrent requests");
        assert_eq!(rejected, requests.saturating_sub(3));
        assert_eq!(tiers, (1..=requests.min(3) as u8).collect::<Vec<_>>());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sessions_do_not_share_hint_state() {
    let generator = Arc::new(ScriptedGenerator::replies(
        (0..6).map(|i| format!("Look again at part {i}.")),
    ));
    let coach = Arc::new(coach_with(generator));
    let first = coach.start_session(gauss_problem());
    let second = coach.start_session(gauss_problem());

    let a = {
        let coach = Arc::clone(&coach);
        tokio::spawn(async move {
            for _ in 0..3 {
                coach.request_hint(first).await.unwrap();
            }
        })
    };
    let b = {
        let coach = Arc::clone(&coach);
        tokio::spawn(async move { coach.request_hint(second).await.unwrap() })
    };
    a.await.unwrap();
    b.await.unwrap();

    assert_eq!(coach.hints_remaining(first).await.unwrap(), 0);
    assert_eq!(coach.hints_remaining(second).await.unwrap(), 2);
    assert_eq!(coach.stats().hints_granted, 4);
    assert_eq!(coach.active_sessions(), 2);
}
