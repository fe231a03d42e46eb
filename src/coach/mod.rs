//! Session registry and the message/hint flow.
//!
//! Each live session sits behind its own async mutex. The lock is held for
//! the whole read, decide, generate, scan, commit sequence of one student
//! action, so two actions on the same session are applied one after the
//! other while different sessions proceed independently. No registry-wide
//! lock is held across a generator call.

use crate::analysis::{AnalysisInput, Problem, ProblemAnalyzer, analyze_problem};
use crate::config::Settings;
use crate::error::{CoachError, CoachResult};
use crate::generator::{GenerationRequest, TextGenerator, generate_with_timeout};
use crate::guardrail::{Category, MessageClassifier, ResponseScanner};
use crate::hints::HintTier;
use crate::logging::AUDIT_TARGET;
use crate::policy::{PolicyDecision, Resolution, ResponsePolicy, Routing};
use crate::prompt::PolicyText;
use crate::session::reflection::{REFLECTION_PROMPT, reflection_input};
use crate::session::{
    CoachSession, MemorySink, SessionId, SessionRecord, SessionSink, Turn, parse_reflection,
};
use crate::templates::TemplateBank;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub mod stats;

pub use stats::{GuardrailStats, StatsSnapshot};

pub struct Coach {
    policy_text: Arc<PolicyText>,
    policy: ResponsePolicy,
    classifier: MessageClassifier,
    scanner: ResponseScanner,
    templates: Arc<TemplateBank>,
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn SessionSink>,
    timeout: Duration,
    sessions: DashMap<SessionId, Arc<Mutex<CoachSession>>>,
    stats: GuardrailStats,
}

impl Coach {
    /// Build a coach from settings. Fails on invalid settings, such as an extra
    /// pattern that does not compile.
    pub fn new(settings: &Settings, generator: Arc<dyn TextGenerator>) -> CoachResult<Self> {
        settings.validate()?;
        let taxonomy = settings.guardrail.taxonomy()?;

        Ok(Self {
            policy_text: Arc::new(PolicyText::new(settings.policy.confirmation_policy)),
            policy: ResponsePolicy::new(settings.policy.clone()),
            classifier: MessageClassifier::new(taxonomy.clone()),
            scanner: ResponseScanner::new(taxonomy),
            templates: Arc::new(TemplateBank::from_config(&settings.templates)),
            generator,
            sink: Arc::new(MemorySink::new()),
            timeout: settings.generator.timeout(),
            sessions: DashMap::new(),
            stats: GuardrailStats::default(),
        })
    }

    /// Replace the finalize hook
    pub fn with_sink(mut self, sink: Arc<dyn SessionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the template bank, e.g. with a seeded one
    pub fn with_templates(mut self, templates: TemplateBank) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    pub fn classifier(&self) -> &MessageClassifier {
        &self.classifier
    }

    pub fn scanner(&self) -> &ResponseScanner {
        &self.scanner
    }

    pub fn policy_text(&self) -> Arc<PolicyText> {
        Arc::clone(&self.policy_text)
    }

    /// Run problem intake under the generator deadline
    pub async fn analyze(&self, analyzer: &dyn ProblemAnalyzer, input: &AnalysisInput) -> Problem {
        analyze_problem(analyzer, input, self.timeout).await
    }

    /// Open a session on a confirmed problem. The transcript starts with the
    /// welcome turn.
    pub fn start_session(&self, problem: Problem) -> SessionId {
        let rephrase = Some(problem.safe_rephrase.as_str());
        let welcome = self.templates.welcome(problem.text(), rephrase);
        let session = CoachSession::new(problem, welcome);
        let id = session.id;

        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        info!("Started session {id}");
        id
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn session(&self, id: SessionId) -> CoachResult<Arc<Mutex<CoachSession>>> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(CoachError::SessionNotFound { id })
    }

    /// True once `end_session` has taken the session out of the registry
    fn is_ended(&self, id: SessionId) -> bool {
        !self.sessions.contains_key(&id)
    }

    fn request(
        &self,
        session: &CoachSession,
        pending: Option<&Turn>,
        tier: Option<HintTier>,
    ) -> GenerationRequest {
        let mut transcript = session.transcript.turns().to_vec();
        transcript.extend(pending.cloned());

        GenerationRequest {
            system_prompt: self.policy_text.system_content(Some(&session.problem), tier),
            transcript,
            problem_context: session.problem.text().to_string(),
            hint_tier: tier,
        }
    }

    /// Handle one student message and return the coach turn shown for it
    pub async fn send_message(&self, id: SessionId, message: &str) -> CoachResult<PolicyDecision> {
        let session = self.session(id)?;
        let mut session = session.lock().await;
        let student = Turn::student(message);

        let decision = match self.policy.route(message, &self.classifier, &self.templates) {
            Routing::Immediate(decision) => {
                self.stats.record_redirect();
                if let PolicyDecision::SynthesizedRedirect { category, .. } = &decision {
                    info!(target: AUDIT_TARGET, "Session {id}: redirected {category} message");
                }
                decision
            }
            Routing::Generate(classification) => {
                debug!(
                    "Session {id}: generating reply (classified as {})",
                    classification.category
                );
                let request = self.request(&session, Some(&student), None);
                let outcome =
                    generate_with_timeout(self.generator.as_ref(), &request, self.timeout).await;
                // Only shown-work confirmations reach here as ConfirmationSeeking
                let resolution = if classification.category == Category::ConfirmationSeeking {
                    self.policy
                        .resolve_shown_work(outcome, &self.scanner, &self.templates)
                } else {
                    self.policy
                        .resolve_reply(outcome, &self.scanner, &self.templates)
                };
                self.audit(id, &resolution);

                if self.is_ended(id) {
                    debug!("Session {id} ended during generation, discarding reply");
                    return Err(CoachError::SessionNotFound { id });
                }
                resolution.decision
            }
        };

        session.transcript.push(student);
        session.transcript.push(decision.to_turn());
        Ok(decision)
    }

    /// Grant the next hint tier, or report that none are left
    pub async fn request_hint(&self, id: SessionId) -> CoachResult<PolicyDecision> {
        let session = self.session(id)?;
        let mut session = session.lock().await;

        let tier = match self.policy.next_hint(&session.hints, &self.templates) {
            Ok(tier) => tier,
            Err(unavailable) => {
                self.stats.record_hint_rejected();
                info!("Session {id}: hint rejected, all tiers used");
                session.transcript.push(unavailable.to_turn());
                return Ok(unavailable);
            }
        };

        let request = self.request(&session, None, Some(tier));
        let outcome = generate_with_timeout(self.generator.as_ref(), &request, self.timeout).await;
        let resolution = self
            .policy
            .resolve_hint(tier, outcome, &self.scanner, &self.templates);
        self.audit(id, &resolution);

        if self.is_ended(id) {
            debug!("Session {id} ended during hint generation, discarding hint");
            return Err(CoachError::SessionNotFound { id });
        }

        session
            .hints
            .commit(tier)
            .map_err(|e| CoachError::General(format!("Session {id}: {e}")))?;
        self.stats.record_hint_granted();
        info!("Session {id}: granted hint tier {}", tier.level());

        session.transcript.push(resolution.decision.to_turn());
        Ok(resolution.decision)
    }

    /// Close a session, build its reflection, and hand the record to the sink.
    ///
    /// The record is returned even when the sink fails.
    pub async fn end_session(&self, id: SessionId) -> CoachResult<SessionRecord> {
        // Removing first makes any in-flight action discard its result
        let (_, session) = self
            .sessions
            .remove(&id)
            .ok_or(CoachError::SessionNotFound { id })?;
        let session = session.lock().await.clone();

        let request = GenerationRequest {
            system_prompt: REFLECTION_PROMPT.to_string(),
            transcript: vec![Turn::student(reflection_input(
                session.problem.text(),
                session.transcript.turns(),
            ))],
            problem_context: session.problem.text().to_string(),
            hint_tier: None,
        };
        let reflection =
            match generate_with_timeout(self.generator.as_ref(), &request, self.timeout).await {
                Ok(raw) => parse_reflection(&raw, &session.problem.concepts),
                Err(e) => {
                    warn!("Session {id}: reflection unavailable ({})", e.status_code());
                    parse_reflection("", &session.problem.concepts)
                }
            };

        let record = session.finish(reflection);
        if let Err(e) = self.sink.finalize(&record).await {
            error!("Session {id}: finalize hook failed: {e}");
        }

        info!(
            "Ended session {id} after {} turns and {} hints",
            record.transcript.len(),
            record.hints_used
        );
        Ok(record)
    }

    pub async fn hints_remaining(&self, id: SessionId) -> CoachResult<u8> {
        let session = self.session(id)?;
        let session = session.lock().await;
        Ok(session.hints.remaining())
    }

    pub async fn transcript(&self, id: SessionId) -> CoachResult<Vec<Turn>> {
        let session = self.session(id)?;
        let session = session.lock().await;
        Ok(session.transcript.turns().to_vec())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn audit(&self, id: SessionId, resolution: &Resolution) {
        if let Some(e) = &resolution.failure {
            self.stats.record_fallback();
            warn!("Session {id}: generator failed ({}), using fallback: {e}", e.status_code());
        }
        if let Some(report) = &resolution.formula_dump {
            self.stats.record_formula_dump();
            info!(
                target: AUDIT_TARGET,
                "Session {id}: formula dump detected by {}", report.recognizer
            );
        }
        if let Some(report) = &resolution.leak {
            self.stats.record_leak();
            warn!(
                target: AUDIT_TARGET,
                "Session {id}: suppressed generated text, {} matched {}",
                report.category, report.recognizer
            );
        }
    }
}
