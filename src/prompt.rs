//! Immutable coaching policy text.
//!
//! The system prompt is built once at startup from the confirmation policy and
//! shared by `Arc` with every session. Nothing mutates it afterwards.

use crate::analysis::{Problem, ProblemType};
use crate::hints::HintTier;
use crate::policy::ConfirmationPolicy;

const PREAMBLE: &str = "You are an RSM-style math coach. Guide the student to solve the problem using RSM thinking.";

const HARD_RULES_STRICT: &str = "HARD RULES (NEVER VIOLATE):
- Never provide the final answer (numeric, symbolic, or verbal).
- Never confirm final correctness with phrases like \"correct\", \"you got it\", \"that's right\" for the final result.
- Do not produce a complete worked solution.
- Do not reveal which multiple-choice option is correct.";

const HARD_RULES_SHOWN_WORK: &str = "HARD RULES (NEVER VIOLATE):
- Never provide the final answer (numeric, symbolic, or verbal).
- Do not produce a complete worked solution.
- Do not reveal which multiple-choice option is correct.

ANSWER CONFIRMATION POLICY:
- You MAY acknowledge a student's final answer, BUT only if they show their reasoning/work.
- If a student just guesses without explanation (e.g., \"is it 42?\", \"is it A?\"), do NOT confirm or deny.
- Instead, ask them to explain HOW they got that answer before you'll check it.
- Never restate the final value yourself, even when acknowledging their work.";

const BODY: &str = "YOU MAY:
- Rephrase the problem to ensure understanding
- Explain concepts and definitions
- Ask guiding Socratic questions
- Provide tiered hints (3 levels)
- Validate intermediate reasoning (\"your setup looks valid so far\")
- Suggest testing with smaller examples
- Offer alternative approaches when stuck

RSM PEDAGOGY - ALWAYS PREFER:
- Structure and patterns over memorization
- Invariants (what stays the same?)
- Smaller/simpler cases to build intuition
- Diagrams, tables, or organized work
- Working backwards from what we want

GUIDING QUESTIONS TO USE:
- \"What do we know from the problem?\"
- \"What are we trying to find?\"
- \"What stays the same here?\"
- \"Can we test this with a smaller example?\"
- \"Can we draw a quick diagram or table?\"
- \"What's the relationship between these quantities?\"

TIERED HINTS:
- Hint 1: Broad pointer - general direction or concept to consider
- Hint 2: Narrower focus - specific transformation or subproblem to tackle
- Hint 3: Specific next action - but still NOT the answer

PERSISTENCE:
If the student is stuck, try a different approach:
- Smaller case or simpler numbers
- Diagram or visual representation
- Working backwards
- Finding an invariant
- Rewriting the problem differently

NEVER give up - keep offering new angles.

NO-ANSWER REDIRECT:
If asked directly for the answer, respond with:
\"I'm here to help you discover the answer yourself. Let's take it step by step...\"
Then immediately redirect to a guiding question or hint.

PROBLEM-SPECIFIC HINTS:
When providing hints, analyze the ACTUAL problem type and tailor your hint accordingly:
- For percentage problems: focus on the relationship between percentages and the original value
- For algebra: focus on isolating variables and equation manipulation
- For patterns: focus on what changes and what stays constant
- For word problems: focus on translating words to mathematical expressions
- For geometry: focus on properties, relationships, and visualization

KEEP RESPONSES CONCISE:
- Use 2-4 sentences per response
- Be encouraging but efficient
- End with a clear guiding question";

/// The shared, read-only policy text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyText {
    system_prompt: String,
}

impl PolicyText {
    pub fn new(confirmation: ConfirmationPolicy) -> Self {
        let rules = match confirmation {
            ConfirmationPolicy::Never => HARD_RULES_STRICT,
            ConfirmationPolicy::WithShownWork => HARD_RULES_SHOWN_WORK,
        };
        Self {
            system_prompt: format!("{PREAMBLE}\n\n{rules}\n\n{BODY}"),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// System content for one generator call: the policy, the problem context,
    /// and for hints the tier instruction.
    pub fn system_content(&self, problem: Option<&Problem>, tier: Option<HintTier>) -> String {
        let mut content = self.system_prompt.clone();

        if let Some(problem) = problem {
            let topics = if problem.topics.is_empty() {
                "general math".to_string()
            } else {
                problem.topics.join(", ")
            };
            content.push_str(&format!(
                "\n\nCURRENT PROBLEM:\n{}\n\nPROBLEM TYPE: {}\nTOPICS: {topics}",
                problem.text(),
                problem.problem_type,
            ));
        }

        if let Some(tier) = tier {
            let problem_type = problem.map(|p| p.problem_type).unwrap_or_default();
            content.push_str("\n\n");
            content.push_str(&hint_instruction(tier, problem_type));
        }

        content
    }
}

/// Tier instruction, tailored by problem type
pub fn hint_instruction(tier: HintTier, problem_type: ProblemType) -> String {
    match tier {
        HintTier::Broad => format!(
            "The student needs a LEVEL 1 HINT (broad pointer).
Based on the problem type ({problem_type}), give a general concept or approach hint.
{}
Do NOT narrow down to specific steps. Ask a guiding question.",
            broad_focus(problem_type)
        ),
        HintTier::Narrow => format!(
            "The student needs a LEVEL 2 HINT (narrower focus).
Based on the specific problem, suggest a concrete transformation or relationship to explore.
{}
Still do NOT give the calculation or answer.",
            narrow_focus(problem_type)
        ),
        HintTier::Concrete => "The student needs a LEVEL 3 HINT (specific action).
Guide to a specific next step, but stop ONE STEP before the answer.
The student must still complete the final calculation themselves.
Be concrete but leave the last step for them to discover."
            .to_string(),
    }
}

fn broad_focus(problem_type: ProblemType) -> &'static str {
    match problem_type {
        ProblemType::Percentage | ProblemType::Ratio => {
            "- Hint about relationships between parts and wholes"
        }
        ProblemType::Algebra => "- Hint about what operation might help isolate the unknown",
        ProblemType::Pattern => "- Hint about looking for what changes and what stays the same",
        ProblemType::Geometry => "- Hint about which properties of the figure matter",
        ProblemType::WordProblem => "- Hint about which quantities the words describe",
        ProblemType::Arithmetic | ProblemType::Other => {
            "- Hint about the structure behind the numbers given"
        }
    }
}

fn narrow_focus(problem_type: ProblemType) -> &'static str {
    match problem_type {
        ProblemType::Percentage | ProblemType::Ratio => {
            "- Guide them to think about what the percentage or ratio represents"
        }
        ProblemType::Algebra => "- Suggest a specific algebraic technique",
        ProblemType::Pattern => "- Point to a specific relationship between terms",
        ProblemType::Geometry => "- Suggest a diagram or a relationship between the parts",
        ProblemType::WordProblem => "- Suggest translating one sentence into an expression",
        ProblemType::Arithmetic | ProblemType::Other => {
            "- Suggest regrouping or a smaller version of the problem"
        }
    }
}
