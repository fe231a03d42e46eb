//! Configuration points of the response policy.

use serde::{Deserialize, Serialize};

/// How confirmation-seeking messages are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPolicy {
    /// Never confirm; always ask for justification
    Never,
    /// Ask for justification on a bare guess; let shown work reach the coach
    #[default]
    WithShownWork,
}

/// What to do with a generated reply that hands over a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaDumpAction {
    /// Deliver the reply; the detection is logged and counted
    #[default]
    Allow,
    /// Suppress the reply the same way as an answer leak
    Replace,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PolicyConfig {
    #[serde(default)]
    pub confirmation_policy: ConfirmationPolicy,

    #[serde(default)]
    pub formula_dump_action: FormulaDumpAction,
}
