//! Configuration for the template bank.

use serde::{Deserialize, Serialize};

/// Overrides for the reviewed coaching phrasings.
///
/// Empty lists and unset phrases fall back to the builtin bank, so a partial
/// `[templates]` section only replaces what it names.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TemplateConfig {
    /// Pin template selection (tests, audits). Unset seeds from the OS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Refusals used for answer-seeking turns and leak replacements
    #[serde(default)]
    pub refusals: Vec<String>,

    /// Encouragement used when the student is stuck
    #[serde(default)]
    pub persistence: Vec<String>,

    /// Per-tier fallback hints, used when generation fails or leaks
    #[serde(default)]
    pub hints: HintTemplates,

    /// Fixed single phrasings
    #[serde(default)]
    pub phrases: PhraseOverrides,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct HintTemplates {
    #[serde(default)]
    pub tier1: Vec<String>,
    #[serde(default)]
    pub tier2: Vec<String>,
    #[serde(default)]
    pub tier3: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PhraseOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leak_redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shown_work_redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near_final: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_hint_available: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_unavailable: Option<String>,
    /// Supports `{problem}` and `{observation}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome: Option<String>,
}
