//! Rule layer that keeps the coach from leaking answers.
//!
//! Student messages are classified into behavioral categories before any text
//! is generated, and generated replies are scanned for leaks before they are
//! shown. Both passes are pure regex matching over case-insensitive text, so
//! every decision is deterministic and can be audited offline.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod classifier;
pub mod patterns;
pub mod scanner;

pub use classifier::{Classification, MessageClassifier, shows_reasoning};
pub use patterns::{Recognizer, Taxonomy};
pub use scanner::{LeakReport, ResponseScanner};

/// Behavioral tag produced by the taxonomy.
///
/// The first four apply to student text, the leak and formula categories to
/// generated text. `None` means no recognizer matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AnswerSeeking,
    ConfirmationSeeking,
    NearFinal,
    Stuck,
    AnswerLeak,
    ConfirmationLeak,
    FormulaDump,
    None,
}

impl Category {
    /// Priority order for student messages. Earlier entries win ties.
    pub const STUDENT_PRIORITY: [Category; 4] = [
        Category::AnswerSeeking,
        Category::ConfirmationSeeking,
        Category::NearFinal,
        Category::Stuck,
    ];

    /// Categories that together make up the leak check on generated text.
    pub const LEAK_CHECK: [Category; 2] = [Category::AnswerLeak, Category::ConfirmationLeak];

    /// Stable snake_case name, used in recognizer ids and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnswerSeeking => "answer_seeking",
            Self::ConfirmationSeeking => "confirmation_seeking",
            Self::NearFinal => "near_final",
            Self::Stuck => "stuck",
            Self::AnswerLeak => "answer_leak",
            Self::ConfirmationLeak => "confirmation_leak",
            Self::FormulaDump => "formula_dump",
            Self::None => "none",
        }
    }

    /// Parse a snake_case category name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "answer_seeking" => Some(Self::AnswerSeeking),
            "confirmation_seeking" => Some(Self::ConfirmationSeeking),
            "near_final" => Some(Self::NearFinal),
            "stuck" => Some(Self::Stuck),
            "answer_leak" => Some(Self::AnswerLeak),
            "confirmation_leak" => Some(Self::ConfirmationLeak),
            "formula_dump" => Some(Self::FormulaDump),
            _ => None,
        }
    }

    /// Student categories whose reply is synthesized without the generator
    pub fn is_hard_redirect(&self) -> bool {
        matches!(
            self,
            Self::AnswerSeeking | Self::ConfirmationSeeking | Self::NearFinal | Self::Stuck
        )
    }

    /// Categories recognized on generated text rather than student text
    pub fn applies_to_generated(&self) -> bool {
        matches!(
            self,
            Self::AnswerLeak | Self::ConfirmationLeak | Self::FormulaDump
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_round_trip_through_from_name() {
        for category in Category::STUDENT_PRIORITY
            .iter()
            .chain(Category::LEAK_CHECK.iter())
            .chain([Category::FormulaDump].iter())
        {
            assert_eq!(Category::from_name(category.as_str()), Some(*category));
        }
        assert_eq!(Category::from_name("none"), None);
        assert_eq!(Category::from_name("Stuck "), Some(Category::Stuck));
    }

    #[test]
    fn test_hard_redirect_set() {
        assert!(Category::AnswerSeeking.is_hard_redirect());
        assert!(Category::Stuck.is_hard_redirect());
        assert!(!Category::None.is_hard_redirect());
        assert!(!Category::AnswerLeak.is_hard_redirect());
        assert!(Category::FormulaDump.applies_to_generated());
    }
}
