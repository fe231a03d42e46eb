//! Student message classification.

use super::{Category, Taxonomy};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Category assigned to a message plus the recognizer that decided it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Stable recognizer id, `None` when nothing matched
    pub recognizer: Option<String>,
}

impl Classification {
    fn unmatched() -> Self {
        Self {
            category: Category::None,
            recognizer: None,
        }
    }
}

/// First-match classifier over the student categories.
///
/// Categories are tried in `Category::STUDENT_PRIORITY` order, so a message
/// that asks for the answer while saying it is stuck is answer-seeking.
#[derive(Debug, Clone, Default)]
pub struct MessageClassifier {
    taxonomy: Taxonomy,
}

impl MessageClassifier {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Classify a student message
    pub fn classify(&self, text: &str) -> Category {
        self.classify_detailed(text).category
    }

    /// Classify a student message, keeping the matching recognizer id
    pub fn classify_detailed(&self, text: &str) -> Classification {
        if text.trim().is_empty() {
            return Classification::unmatched();
        }

        for category in Category::STUDENT_PRIORITY {
            if let Some(recognizer) = self.taxonomy.first_match(category, text) {
                return Classification {
                    category,
                    recognizer: Some(recognizer.id().to_string()),
                };
            }
        }

        Classification::unmatched()
    }
}

// Connectives and verbs that introduce an explanation of how a value was found.
// A bare "I got 12" only counts when a method follows it.
static REASONING_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(because|since|so that|which means|that means|my (work|steps|reasoning)|i (added|subtracted|multiplied|divided|used|tried|noticed|set up|solved|simplified|factored|substituted|plugged|computed|calculated|figured)|i (got|found)\b[^.?!]*\b(by|from|after|using|when)|by (adding|subtracting|multiplying|dividing|factoring|substituting)|first\b.+\bthen)\b",
    )
    .expect("reasoning clause pattern must compile")
});

// An operand-operator-operand run such as `6*7`, `3x + 7`, `2^10`, `3/4`
static ARITHMETIC_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+(\.\d+)?\s*[a-z]?(\s*[-+*/×÷^]\s*\(?\s*\d+(\.\d+)?[a-z]?\)?)+")
        .expect("arithmetic expression pattern must compile")
});

// An operator expression on the left of `=`, as in `22 - 7 = 15`
static EQUATION_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d\s*[a-z]?\s*[-+*/×÷^]\s*\(?\s*[\da-z][^=?!\n]*=\s*\(?-?[\da-z]")
        .expect("equation step pattern must compile")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").expect("number pattern must compile"));

/// An arithmetic step that is more than the guessed value itself.
///
/// "is 3/4 correct?" only names a value. "6*7 gives 42, right?" relates an
/// expression to another number, and "22 - 7 = 15" is a worked equation.
fn has_worked_step(text: &str) -> bool {
    if EQUATION_STEP.is_match(text) {
        return true;
    }
    let expressions: Vec<_> = ARITHMETIC_EXPR.find_iter(text).map(|m| m.range()).collect();
    if expressions.is_empty() {
        return false;
    }
    NUMBER
        .find_iter(text)
        .any(|n| !expressions.iter().any(|e| e.contains(&n.start())))
}

/// Whether a message carries reasoning beyond a bare guess.
///
/// "is 42 correct?" and "is 3/4 correct?" are bare guesses. "I subtracted 7
/// from both sides and got 15, is x = 5 right?" shows work.
pub fn shows_reasoning(text: &str) -> bool {
    REASONING_CLAUSE.is_match(text) || has_worked_step(text)
}
