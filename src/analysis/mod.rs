//! Problem intake: the analyzer seam and defensive parsing of its output.
//!
//! The analyzer is an external model that extracts the problem text from an
//! image (or annotates typed text) and returns loosely structured JSON. Its
//! shape is never trusted: every field is optional, and output that does not
//! parse at all still produces a usable [`ProblemAnalysis`].

use crate::error::GeneratorResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

pub mod parse;

pub use parse::parse_analysis;

/// Kind of math problem, as reported by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemType {
    Algebra,
    Arithmetic,
    Geometry,
    WordProblem,
    Percentage,
    Ratio,
    Pattern,
    #[default]
    Other,
}

impl ProblemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Algebra => "algebra",
            Self::Arithmetic => "arithmetic",
            Self::Geometry => "geometry",
            Self::WordProblem => "word-problem",
            Self::Percentage => "percentage",
            Self::Ratio => "ratio",
            Self::Pattern => "pattern",
            Self::Other => "other",
        }
    }

    /// Lenient parse; anything unrecognized is `Other`
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "algebra" => Self::Algebra,
            "arithmetic" => Self::Arithmetic,
            "geometry" => Self::Geometry,
            "word-problem" | "word" => Self::WordProblem,
            "percentage" | "percent" | "percentages" => Self::Percentage,
            "ratio" | "ratios" => Self::Ratio,
            "pattern" | "patterns" => Self::Pattern,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display banding of extraction confidence. UI only; never gates a guardrail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.9 {
            Self::High
        } else if confidence > 0.7 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High confidence",
            Self::Medium => "Medium confidence",
            Self::Low => "Low confidence - please review",
        }
    }
}

/// Register the coach should speak in, derived from the grade estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeTone {
    Elementary,
    Middle,
    High,
}

impl AgeTone {
    /// "Grade 5-6" reads as grade 56 after stripping non-digits, so only the
    /// first run of digits is used. No digits means grade 5.
    pub fn from_grade_estimate(grade: &str) -> Self {
        let digits: String = grade
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let grade = digits.parse::<u32>().unwrap_or(5);

        match grade {
            0..=4 => Self::Elementary,
            5..=7 => Self::Middle,
            _ => Self::High,
        }
    }
}

/// Typed analyzer result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemAnalysis {
    pub extracted_text: String,
    pub confidence: f64,
    pub topics: Vec<String>,
    pub concepts: Vec<String>,
    pub grade_estimate: String,
    pub safe_rephrase: String,
    pub problem_type: ProblemType,
    /// True when the analyzer output could not be parsed
    pub is_fallback: bool,
}

/// What the student submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    /// Image as a data URL or bare base64 (assumed JPEG)
    Image(String),
    /// Typed problem text
    Text(String),
}

impl AnalysisInput {
    /// The image as a data URL, if this is an image input
    pub fn image_data_url(&self) -> Option<String> {
        match self {
            Self::Image(data) if data.starts_with("data:") => Some(data.clone()),
            Self::Image(data) => Some(format!("data:image/jpeg;base64,{data}")),
            Self::Text(_) => None,
        }
    }

    pub fn typed_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    /// Instruction the analyzer model receives alongside the input
    pub fn instruction(&self) -> String {
        const FIELDS: &str = r#"  "topics": ["topic1", "topic2"] - mathematical topics this problem covers,
  "concepts": ["concept1", "concept2"] - key concepts needed to solve this,
  "gradeEstimate": "estimated grade level (e.g., 'Grade 5-6')",
  "safeRephrase": "restate the problem clearly without solving it",
  "problemType": "algebra|arithmetic|geometry|word-problem|percentage|ratio|pattern|other""#;

        match self {
            Self::Image(_) => format!(
                "Extract the math problem from this image. Return ONLY a JSON object with these fields:
{{
  \"extractedText\": \"the exact math problem text extracted from the image\",
  \"confidence\": 0.0 to 1.0 indicating how confident you are in the extraction,
{FIELDS}
}}
Be precise with mathematical notation. Use ^ for exponents, * for multiplication, / for division.
Do NOT solve the problem. Only extract and analyze it."
            ),
            Self::Text(text) => format!(
                "Analyze this math problem (do NOT solve it). Return ONLY a JSON object:
{{
  \"extractedText\": the problem text unchanged,
  \"confidence\": 1.0,
{FIELDS}
}}
Problem: {text}"
            ),
        }
    }
}

/// External image/text analyzer.
///
/// Implementations return the raw model output; [`analyze_problem`] owns the
/// parsing and fallback policy.
#[async_trait]
pub trait ProblemAnalyzer: Send + Sync {
    async fn analyze(&self, input: &AnalysisInput) -> GeneratorResult<String>;
}

/// A problem confirmed for a coaching session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub ocr_text: String,
    /// Text after the student's review; empty until edited
    pub edited_text: String,
    pub confidence: f64,
    pub topics: Vec<String>,
    pub concepts: Vec<String>,
    pub grade_estimate: String,
    pub safe_rephrase: String,
    pub problem_type: ProblemType,
}

impl Problem {
    /// A typed problem with no analysis attached
    pub fn typed(text: &str) -> Self {
        Self {
            ocr_text: text.to_string(),
            edited_text: text.to_string(),
            confidence: 1.0,
            topics: Vec::new(),
            concepts: Vec::new(),
            grade_estimate: "Unknown".to_string(),
            safe_rephrase: String::new(),
            problem_type: ProblemType::Other,
        }
    }

    pub fn from_analysis(analysis: ProblemAnalysis, input: &AnalysisInput) -> Self {
        // Typed text is authoritative; the analyzer only annotates it
        let (text, confidence) = match input.typed_text() {
            Some(typed) => (typed.to_string(), 1.0),
            None => (analysis.extracted_text, analysis.confidence),
        };

        Self {
            ocr_text: text.clone(),
            edited_text: text,
            confidence,
            topics: analysis.topics,
            concepts: analysis.concepts,
            grade_estimate: analysis.grade_estimate,
            safe_rephrase: analysis.safe_rephrase,
            problem_type: analysis.problem_type,
        }
    }

    pub fn with_problem_type(mut self, problem_type: ProblemType) -> Self {
        self.problem_type = problem_type;
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    /// Apply the student's correction from the review step
    pub fn edit(&mut self, text: &str) {
        self.edited_text = text.trim().to_string();
    }

    /// The text the session coaches on
    pub fn text(&self) -> &str {
        if self.edited_text.trim().is_empty() {
            &self.ocr_text
        } else {
            &self.edited_text
        }
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }

    pub fn age_tone(&self) -> AgeTone {
        AgeTone::from_grade_estimate(&self.grade_estimate)
    }
}

/// Run the analyzer and always come back with a problem.
///
/// Timeouts and analyzer failures degrade to an unannotated problem: typed
/// text is kept as-is, an image yields empty text with zero confidence so the
/// review step asks the student to type it.
pub async fn analyze_problem(
    analyzer: &dyn ProblemAnalyzer,
    input: &AnalysisInput,
    timeout: Duration,
) -> Problem {
    let outcome = match tokio::time::timeout(timeout, analyzer.analyze(input)).await {
        Ok(result) => result,
        Err(_) => Err(crate::error::GeneratorError::Timeout(timeout)),
    };

    match outcome {
        Ok(raw) => {
            let analysis = parse_analysis(&raw, input.typed_text());
            if analysis.is_fallback {
                warn!("Analyzer output was not valid JSON, using best-effort extraction");
            }
            debug!(
                "Analyzed problem: type={}, confidence={:.2}",
                analysis.problem_type, analysis.confidence
            );
            Problem::from_analysis(analysis, input)
        }
        Err(e) => {
            warn!("Problem analysis failed ({}): {}", e.status_code(), e);
            match input.typed_text() {
                Some(text) => Problem::typed(text),
                None => {
                    let mut problem = Problem::typed("");
                    problem.confidence = 0.0;
                    problem
                }
            }
        }
    }
}
