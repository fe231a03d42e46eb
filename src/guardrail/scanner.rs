//! Leak detection over generated coach replies.
//!
//! The scanner is the last check before text reaches the student. It has no
//! bypass: every generated reply and every generated hint goes through
//! [`ResponseScanner::scan`].

use super::{Category, Taxonomy};
use serde::Serialize;

/// Which leak recognizer fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeakReport {
    pub category: Category,
    pub recognizer: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseScanner {
    taxonomy: Taxonomy,
}

impl ResponseScanner {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Whether the reply must be suppressed
    pub fn scan_for_leak(&self, generated: &str) -> bool {
        self.scan(generated).is_some()
    }

    /// Run the combined answer/confirmation leak check.
    ///
    /// End-anchored recognizers (`= 42`, `correct!`) are applied to the whole
    /// reply and to every line of it, so a result stated at the end of a
    /// paragraph is caught even when a follow-up question comes after it.
    pub fn scan(&self, generated: &str) -> Option<LeakReport> {
        self.first_hit(&Category::LEAK_CHECK, generated)
    }

    /// FormulaDump recognizer set. Reported only; the caller decides the action.
    pub fn detect_formula_dump(&self, generated: &str) -> Option<LeakReport> {
        self.first_hit(&[Category::FormulaDump], generated)
    }

    fn first_hit(&self, categories: &[Category], generated: &str) -> Option<LeakReport> {
        let whole = generated.trim();
        if whole.is_empty() {
            return None;
        }

        let lines = whole.lines().map(str::trim).filter(|line| !line.is_empty());
        for candidate in std::iter::once(whole).chain(lines) {
            for category in categories {
                if let Some(recognizer) = self.taxonomy.first_match(*category, candidate) {
                    return Some(LeakReport {
                        category: *category,
                        recognizer: recognizer.id().to_string(),
                    });
                }
            }
        }

        None
    }
}
