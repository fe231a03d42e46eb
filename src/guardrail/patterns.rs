//! Pattern taxonomy: the recognizer table behind every guardrail decision.
//!
//! Each category owns a set of case-insensitive regular expressions. Any match
//! inside a set is a hit for that category. Precedence between categories is
//! decided by the callers (`MessageClassifier`, `ResponseScanner`), not here.

use super::Category;
use crate::error::{CoachError, CoachResult};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Direct requests for the final answer, option picks, "what does x equal".
const ANSWER_SEEKING: &[&str] = &[
    r"what('s| is) the (final )?(answer|solution)",
    r"just (tell|give) me (the )?(answer|solution)",
    r"solve (it|this)( for me)?",
    r"tell me (what )?x( is|=)?",
    r"pick (option )?(A|B|C|D)\b",
    r"which (one|option|choice|letter) (is it|should I pick)",
    r"what does x equal",
    r"give me the (final )?(result|number)",
    r"what is the value of",
];

/// Seeking validation of a guess.
const CONFIRMATION_SEEKING: &[&str] = &[
    r"is (it |the answer |this )?(correct|right|\d+)",
    r"did I get it (right|correct)",
    r"is (\d+|[a-z]) (correct|right|the answer)",
    r"am I (right|correct)",
    r"check (my|the) answer",
    r"is this (the )?(correct|right) (answer|solution)",
    r"confirm (the|my|this) (answer|result)",
    r"tell me if (I'm|I am) (right|correct)",
    r"is that (correct|right)",
];

/// The student already states the concluding inference.
const NEAR_FINAL: &[&str] = &[
    r"so (the answer|it) (is|equals|must be)",
    r"that means (the answer|x|it) (is|=)",
    r"so x\s*=\s*\d",
    r"therefore.*(is|=|equals)",
    r"which gives us",
];

const STUCK: &[&str] = &[
    r"i('m| am) stuck",
    r"i don'?t (know|understand|get it)",
    r"help me",
    r"i give up",
    r"this is (too )?hard",
    r"i can'?t (do|figure|solve)",
];

/// Generated text that states a result.
const ANSWER_LEAK: &[&str] = &[
    r"the (final )?(answer|solution) is",
    r"equals?\s+\d+\s*$",
    r"= \d+\s*[.!]?\s*$",
    r"(correct|right)[!.]?\s*$",
    r"you got it[!.]?\s*$",
    r"that'?s (correct|right|the answer)",
    r"yes,? (that'?s|it'?s) (correct|right)",
    r"option [A-E] is (correct|right)",
    r"the (correct|right) (answer|option|choice) is",
    r"x\s*=\s*\d+\s*[.!]?\s*$",
    r"the (value|result) is \d+",
];

/// Generated text that confirms a guess.
const CONFIRMATION_LEAK: &[&str] = &[
    r"yes,? (that'?s|you('re| are)) (correct|right)",
    r"correct!$",
    r"right!$",
    r"you got it",
    r"that is (correct|right|the answer)",
    r"\d+ is (correct|right)",
];

/// Generated text that hands over a formula instead of guiding discovery.
const FORMULA_DUMP: &[&str] = &[
    r"the formula is",
    r"just use this formula",
    r"plug (it |this |these )?into",
    r"the equation is simply",
];

const BUILTIN: &[(Category, &[&str])] = &[
    (Category::AnswerSeeking, ANSWER_SEEKING),
    (Category::ConfirmationSeeking, CONFIRMATION_SEEKING),
    (Category::NearFinal, NEAR_FINAL),
    (Category::Stuck, STUCK),
    (Category::AnswerLeak, ANSWER_LEAK),
    (Category::ConfirmationLeak, CONFIRMATION_LEAK),
    (Category::FormulaDump, FORMULA_DUMP),
];

static BUILTIN_TAXONOMY: LazyLock<Taxonomy> = LazyLock::new(|| {
    let mut taxonomy = Taxonomy::empty();
    for (category, patterns) in BUILTIN {
        for pattern in *patterns {
            taxonomy
                .add(*category, pattern)
                .expect("builtin guardrail pattern must compile");
        }
    }
    taxonomy
});

/// A single text-matching rule bound to exactly one category.
#[derive(Debug, Clone)]
pub struct Recognizer {
    id: String,
    category: Category,
    regex: Regex,
}

impl Recognizer {
    /// Compile a case-insensitive recognizer.
    ///
    /// `ordinal` is the position inside the category's set and becomes part of
    /// the stable id (`stuck.2`).
    pub fn new(category: Category, ordinal: usize, pattern: &str) -> CoachResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| CoachError::InvalidPattern {
                category: category.to_string(),
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            id: format!("{category}.{ordinal}"),
            category,
            regex,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Named recognizer sets, one per category.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    sets: HashMap<Category, Vec<Recognizer>>,
}

impl Taxonomy {
    fn empty() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    /// The reviewed builtin recognizer table.
    ///
    /// Compiled once per process; this returns a cheap clone of the shared copy.
    pub fn builtin() -> Self {
        BUILTIN_TAXONOMY.clone()
    }

    /// Builtin table extended with patterns from configuration.
    ///
    /// Keys are category names (`answer_seeking`, `formula_dump`, ...). Unknown
    /// names and patterns that fail to compile are configuration errors.
    pub fn with_extra_patterns(extra: &HashMap<String, Vec<String>>) -> CoachResult<Self> {
        let mut taxonomy = Self::builtin();

        // Sorted so recognizer ids do not depend on map iteration order
        let mut names: Vec<&String> = extra.keys().collect();
        names.sort();

        for name in names {
            let category = Category::from_name(name).ok_or_else(|| CoachError::ConfigError {
                reason: format!("unknown guardrail category '{name}' in extra_patterns"),
            })?;
            for pattern in &extra[name] {
                taxonomy.add(category, pattern)?;
            }
        }

        Ok(taxonomy)
    }

    /// Append a recognizer to a category's set
    pub fn add(&mut self, category: Category, pattern: &str) -> CoachResult<()> {
        if category == Category::None {
            return Err(CoachError::ConfigError {
                reason: "patterns cannot be bound to the 'none' category".to_string(),
            });
        }

        let set = self.sets.entry(category).or_default();
        let recognizer = Recognizer::new(category, set.len(), pattern)?;
        set.push(recognizer);
        Ok(())
    }

    /// Recognizers of one category
    pub fn recognizers(&self, category: Category) -> &[Recognizer] {
        self.sets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First recognizer of `category` that matches `text`
    pub fn first_match(&self, category: Category, text: &str) -> Option<&Recognizer> {
        self.recognizers(category).iter().find(|r| r.is_match(text))
    }

    /// Whether any recognizer of `category` matches `text`
    pub fn matches(&self, category: Category, text: &str) -> bool {
        self.first_match(category, text).is_some()
    }

    /// Total recognizer count across all categories
    pub fn len(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}
