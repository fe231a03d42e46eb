//! Response policy: what the coach says next.
//!
//! A student message is routed before any text is generated. Hard-redirect
//! categories are answered from the template bank on the spot; everything
//! else goes to the generator, and the generated text is resolved against the
//! scanner afterwards. The selector never holds session state: the caller
//! owns the transcript and hint counter and commits the decision.

use crate::error::{GeneratorError, GeneratorResult};
use crate::guardrail::{
    Category, Classification, LeakReport, MessageClassifier, ResponseScanner, shows_reasoning,
};
use crate::hints::{HintState, HintTier};
use crate::session::{Turn, TurnKind};
use crate::templates::TemplateBank;
use serde::Serialize;

pub mod config;

pub use config::{ConfirmationPolicy, FormulaDumpAction, PolicyConfig};

/// The coach turn chosen for one student action, with its exact visible text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PolicyDecision {
    /// Templated reply for a hard-redirect category; the generator was not called
    SynthesizedRedirect { category: Category, text: String },
    /// Generated text that passed the scanner, delivered verbatim
    PassThrough { text: String },
    /// Generated text was suppressed and replaced by refusal plus redirect
    SynthesizedLeakReplacement { text: String },
    /// A granted hint
    Hint { tier: HintTier, text: String },
    /// The generator was unavailable
    Fallback { text: String },
    /// Hint requested with none left
    HintUnavailable { text: String },
}

impl PolicyDecision {
    pub fn text(&self) -> &str {
        match self {
            Self::SynthesizedRedirect { text, .. }
            | Self::PassThrough { text }
            | Self::SynthesizedLeakReplacement { text }
            | Self::Hint { text, .. }
            | Self::Fallback { text }
            | Self::HintUnavailable { text } => text,
        }
    }

    /// Stable name for logs and the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SynthesizedRedirect { .. } => "synthesized_redirect",
            Self::PassThrough { .. } => "pass_through",
            Self::SynthesizedLeakReplacement { .. } => "synthesized_leak_replacement",
            Self::Hint { .. } => "hint",
            Self::Fallback { .. } => "fallback",
            Self::HintUnavailable { .. } => "hint_unavailable",
        }
    }

    /// Coach turn recording this decision
    pub fn to_turn(&self) -> Turn {
        match self {
            Self::Hint { tier, text } => Turn::hint(*tier, text.as_str()),
            Self::SynthesizedRedirect { text, .. } | Self::SynthesizedLeakReplacement { text } => {
                Turn {
                    kind: TurnKind::Question,
                    ..Turn::coach(text.as_str())
                }
            }
            other => Turn::coach(other.text()),
        }
    }
}

/// Where a student message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Reply without calling the generator
    Immediate(PolicyDecision),
    /// Call the generator with the transcript
    Generate(Classification),
}

/// A decision on generated text plus what the scanner saw on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub decision: PolicyDecision,
    /// Leak that caused the generated text to be suppressed
    pub leak: Option<LeakReport>,
    /// Formula dump seen in the generated text, suppressed or not
    pub formula_dump: Option<LeakReport>,
    /// Generator failure that forced a fallback
    pub failure: Option<GeneratorError>,
}

impl Resolution {
    fn new(decision: PolicyDecision) -> Self {
        Self {
            decision,
            leak: None,
            formula_dump: None,
            failure: None,
        }
    }
}

/// Stateless response policy selector
#[derive(Debug, Clone, Default)]
pub struct ResponsePolicy {
    config: PolicyConfig,
}

impl ResponsePolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Route a student message before any generation happens
    pub fn route(
        &self,
        message: &str,
        classifier: &MessageClassifier,
        templates: &TemplateBank,
    ) -> Routing {
        let classification = classifier.classify_detailed(message);

        let text = match classification.category {
            Category::AnswerSeeking => templates.answer_redirect(),
            Category::ConfirmationSeeking => {
                if self.config.confirmation_policy == ConfirmationPolicy::WithShownWork
                    && shows_reasoning(message)
                {
                    return Routing::Generate(classification);
                }
                templates.confirmation_request().to_string()
            }
            Category::NearFinal => templates.near_final().to_string(),
            Category::Stuck => templates.persistence(),
            _ => return Routing::Generate(classification),
        };

        Routing::Immediate(PolicyDecision::SynthesizedRedirect {
            category: classification.category,
            text,
        })
    }

    /// Turn a generator outcome for a regular reply into a decision
    pub fn resolve_reply(
        &self,
        outcome: GeneratorResult<String>,
        scanner: &ResponseScanner,
        templates: &TemplateBank,
    ) -> Resolution {
        let generated = match outcome {
            Ok(text) => text,
            Err(e) => {
                return Resolution {
                    failure: Some(e),
                    ..Resolution::new(PolicyDecision::Fallback {
                        text: templates.generator_unavailable().to_string(),
                    })
                };
            }
        };

        let (suppressed_by, formula_dump) = self.inspect(&generated, scanner);
        match suppressed_by {
            Some(report) => Resolution {
                leak: Some(report),
                formula_dump,
                ..Resolution::new(PolicyDecision::SynthesizedLeakReplacement {
                    text: templates.leak_replacement(),
                })
            },
            None => Resolution {
                formula_dump,
                ..Resolution::new(PolicyDecision::PassThrough { text: generated })
            },
        }
    }

    /// Resolve the reply to a confirmation request that came with shown work.
    ///
    /// A reply that would confirm the result is still suppressed, but the
    /// replacement acknowledges the work instead of refusing.
    pub fn resolve_shown_work(
        &self,
        outcome: GeneratorResult<String>,
        scanner: &ResponseScanner,
        templates: &TemplateBank,
    ) -> Resolution {
        let mut resolution = self.resolve_reply(outcome, scanner, templates);
        if let PolicyDecision::SynthesizedLeakReplacement { text } = &mut resolution.decision {
            *text = templates.shown_work_redirect().to_string();
        }
        resolution
    }

    /// Turn a generator outcome for a hint into a decision.
    ///
    /// A leaking or missing hint is replaced by the tier's fallback hint, so a
    /// granted request always yields a hint.
    pub fn resolve_hint(
        &self,
        tier: HintTier,
        outcome: GeneratorResult<String>,
        scanner: &ResponseScanner,
        templates: &TemplateBank,
    ) -> Resolution {
        let fallback = || PolicyDecision::Hint {
            tier,
            text: templates.fallback_hint(tier),
        };

        let generated = match outcome {
            Ok(text) => text,
            Err(e) => {
                return Resolution {
                    failure: Some(e),
                    ..Resolution::new(fallback())
                };
            }
        };

        let (suppressed_by, formula_dump) = self.inspect(&generated, scanner);
        match suppressed_by {
            Some(report) => Resolution {
                leak: Some(report),
                formula_dump,
                ..Resolution::new(fallback())
            },
            None => Resolution {
                formula_dump,
                ..Resolution::new(PolicyDecision::Hint {
                    tier,
                    text: generated,
                })
            },
        }
    }

    /// Next tier to grant, or the exhausted reply
    pub fn next_hint(
        &self,
        state: &HintState,
        templates: &TemplateBank,
    ) -> Result<HintTier, PolicyDecision> {
        state
            .next_tier()
            .ok_or_else(|| PolicyDecision::HintUnavailable {
                text: templates.no_hint_available().to_string(),
            })
    }

    /// Leak check, then formula check. Returns the report that suppresses the
    /// text (if any) and the formula dump hit (if any).
    fn inspect(
        &self,
        generated: &str,
        scanner: &ResponseScanner,
    ) -> (Option<LeakReport>, Option<LeakReport>) {
        let leak = scanner.scan(generated);
        let formula_dump = scanner.detect_formula_dump(generated);

        let suppressed_by = leak.or_else(|| match self.config.formula_dump_action {
            FormulaDumpAction::Replace => formula_dump.clone(),
            FormulaDumpAction::Allow => None,
        });
        (suppressed_by, formula_dump)
    }
}
