//! End-of-session reflection summary.

use super::{Role, Turn};
use crate::analysis::parse::{list_field, parse_object, string_field};
use serde::{Deserialize, Serialize};

pub const REFLECTION_PROMPT: &str = "Generate a session summary for this tutoring conversation. DO NOT confirm if the student got the final answer correct.

Return ONLY a JSON object with:
{
  \"conceptsPracticed\": [\"concept1\", \"concept2\"] - actual concepts from this session,
  \"strategiesUsed\": [\"strategy1\", \"strategy2\"] - specific strategies the student tried,
  \"reflectionQuestions\": [
    \"Question about what the student learned\",
    \"Question connecting to other problems\",
    \"Question about the approach used\"
  ]
}

Focus on the LEARNING PROCESS, not correctness of answers. Be specific to what actually happened in the conversation.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReflection {
    pub concepts_practiced: Vec<String>,
    pub strategies_used: Vec<String>,
    pub reflection_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_notes: Option<String>,
}

impl SessionReflection {
    /// Summary used when the generator is unavailable or returns garbage
    pub fn fallback(concepts: &[String]) -> Self {
        let concepts_practiced = if concepts.is_empty() {
            vec![
                "Problem Solving".to_string(),
                "Mathematical Reasoning".to_string(),
            ]
        } else {
            concepts.to_vec()
        };

        Self {
            concepts_practiced,
            strategies_used: vec![
                "Working through the problem step by step".to_string(),
                "Asking clarifying questions".to_string(),
            ],
            reflection_questions: vec![
                "What was the key insight that helped you understand this problem?".to_string(),
                "Where else might you use this type of thinking?".to_string(),
                "What would you do differently if you saw a similar problem?".to_string(),
            ],
            student_notes: None,
        }
    }
}

/// User-side content of the reflection request
pub fn reflection_input(problem_text: &str, transcript: &[Turn]) -> String {
    let conversation = transcript
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::Student => "student",
                Role::Coach => "coach",
            };
            format!("{role}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Problem: {problem_text}\n\nConversation:\n{conversation}")
}

/// Parse generated reflection JSON; missing lists come from the fallback
pub fn parse_reflection(raw: &str, concepts: &[String]) -> SessionReflection {
    let fallback = SessionReflection::fallback(concepts);
    let Some(map) = parse_object(raw) else {
        return fallback;
    };

    SessionReflection {
        concepts_practiced: list_field(&map, &["conceptsPracticed", "concepts_practiced"])
            .unwrap_or(fallback.concepts_practiced),
        strategies_used: list_field(&map, &["strategiesUsed", "strategies_used"])
            .unwrap_or(fallback.strategies_used),
        reflection_questions: list_field(&map, &["reflectionQuestions", "reflection_questions"])
            .unwrap_or(fallback.reflection_questions),
        student_notes: string_field(&map, &["studentNotes", "student_notes"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_reflection() {
        let raw = r#"```json
{"conceptsPracticed": ["Arithmetic series"], "strategiesUsed": ["Pairing terms"],
 "reflectionQuestions": ["Why does pairing work?"]}
```"#;
        let reflection = parse_reflection(raw, &[]);
        assert_eq!(reflection.concepts_practiced, vec!["Arithmetic series"]);
        assert_eq!(reflection.strategies_used, vec!["Pairing terms"]);
        assert_eq!(reflection.reflection_questions, vec!["Why does pairing work?"]);
    }

    #[test]
    fn test_garbage_uses_problem_concepts() {
        let concepts = vec!["Ratios".to_string()];
        let reflection = parse_reflection("I could not summarize that.", &concepts);
        assert_eq!(reflection.concepts_practiced, concepts);
        assert_eq!(reflection.reflection_questions.len(), 3);
    }

    #[test]
    fn test_reflection_input_lists_turns() {
        let transcript = vec![Turn::coach("Welcome"), Turn::student("I tried pairs")];
        let input = reflection_input("Sum 1..100", &transcript);
        assert!(input.starts_with("Problem: Sum 1..100"));
        assert!(input.ends_with("coach: Welcome\nstudent: I tried pairs"));
    }
}
