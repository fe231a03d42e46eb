//! Defensive parsing of analyzer output.

use super::{ProblemAnalysis, ProblemType};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const FALLBACK_CONFIDENCE: f64 = 0.7;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("code fence pattern must compile")
});

/// Strip markdown fences and surrounding prose, leaving the JSON candidate
pub(crate) fn extract_json_candidate(raw: &str) -> &str {
    if let Some(inner) = CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        return inner.as_str().trim();
    }

    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw.trim(),
    }
}

/// Plain text left once fences and JSON punctuation are removed
fn clean_text(raw: &str) -> String {
    CODE_FENCE
        .replace_all(raw, "$1")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(extract_json_candidate(raw)) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

pub(crate) fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Accepts a list of strings, or a single comma-separated string
pub(crate) fn list_field(map: &Map<String, Value>, keys: &[&str]) -> Option<Vec<String>> {
    let value = keys.iter().find_map(|key| map.get(*key))?;
    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    };
    (!items.is_empty()).then_some(items)
}

fn confidence_field(map: &Map<String, Value>) -> Option<f64> {
    let value = map.get("confidence")?;
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    // Percent-style values (92) are read as fractions
    let number = if number > 1.0 && number <= 100.0 {
        number / 100.0
    } else {
        number
    };
    Some(number.clamp(0.0, 1.0))
}

/// Parse analyzer output into a typed analysis.
///
/// Missing fields get defaults. Output that is not a JSON object becomes the
/// best-effort fallback: the cleaned text is used as the problem text with
/// 0.7 confidence. `typed_text` stands in for a missing `extractedText`.
pub fn parse_analysis(raw: &str, typed_text: Option<&str>) -> ProblemAnalysis {
    let Some(map) = parse_object(raw) else {
        let text = typed_text
            .map(str::to_string)
            .unwrap_or_else(|| clean_text(raw));
        return ProblemAnalysis {
            extracted_text: text.clone(),
            confidence: FALLBACK_CONFIDENCE,
            topics: vec!["Mathematics".to_string()],
            concepts: vec!["Problem Solving".to_string()],
            grade_estimate: "Unknown".to_string(),
            safe_rephrase: text,
            problem_type: ProblemType::Other,
            is_fallback: true,
        };
    };

    let extracted_text = string_field(&map, &["extractedText", "extracted_text", "text"])
        .or_else(|| typed_text.map(str::to_string))
        .unwrap_or_default();

    ProblemAnalysis {
        confidence: confidence_field(&map).unwrap_or(FALLBACK_CONFIDENCE),
        topics: list_field(&map, &["topics"]).unwrap_or_else(|| vec!["Mathematics".to_string()]),
        concepts: list_field(&map, &["concepts"])
            .unwrap_or_else(|| vec!["Problem Solving".to_string()]),
        grade_estimate: string_field(&map, &["gradeEstimate", "grade_estimate"])
            .unwrap_or_else(|| "Unknown".to_string()),
        safe_rephrase: string_field(&map, &["safeRephrase", "safe_rephrase"])
            .unwrap_or_else(|| extracted_text.clone()),
        problem_type: string_field(&map, &["problemType", "problem_type"])
            .map(|t| ProblemType::parse(&t))
            .unwrap_or_default(),
        extracted_text,
        is_fallback: false,
    }
}
