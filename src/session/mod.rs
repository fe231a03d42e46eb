//! Coaching session state: transcript, hint counter, and end-of-session record.

use crate::analysis::Problem;
use crate::hints::{HintState, HintTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod reflection;
pub mod sink;

pub use reflection::{SessionReflection, parse_reflection};
pub use sink::{MemorySink, SessionSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Coach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    #[default]
    Text,
    Hint,
    Question,
}

/// One message in the session transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub kind: TurnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_tier: Option<HintTier>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn student(content: impl Into<String>) -> Self {
        Self {
            role: Role::Student,
            content: content.into(),
            kind: TurnKind::Text,
            hint_tier: None,
            timestamp: Utc::now(),
        }
    }

    pub fn coach(content: impl Into<String>) -> Self {
        Self {
            role: Role::Coach,
            content: content.into(),
            kind: TurnKind::Text,
            hint_tier: None,
            timestamp: Utc::now(),
        }
    }

    pub fn hint(tier: HintTier, content: impl Into<String>) -> Self {
        Self {
            kind: TurnKind::Hint,
            hint_tier: Some(tier),
            ..Self::coach(content)
        }
    }
}

/// Append-only ordered turn history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Hint turns in the order they were granted
    pub fn hints(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| t.kind == TurnKind::Hint)
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

/// Live state of one coaching session
#[derive(Debug, Clone)]
pub struct CoachSession {
    pub id: SessionId,
    pub problem: Problem,
    pub transcript: Transcript,
    pub hints: HintState,
    pub started_at: DateTime<Utc>,
}

impl CoachSession {
    /// Start a session whose transcript opens with `welcome`
    pub fn new(problem: Problem, welcome: String) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Turn::coach(welcome));

        Self {
            id: SessionId::new(),
            problem,
            transcript,
            hints: HintState::new(),
            started_at: Utc::now(),
        }
    }

    /// Close the session into a record for the finalize hook
    pub fn finish(self, reflection: SessionReflection) -> SessionRecord {
        SessionRecord {
            id: self.id,
            hints_used: self.hints.granted(),
            problem: self.problem,
            transcript: self.transcript.into_turns(),
            started_at: self.started_at,
            ended_at: Utc::now(),
            reflection,
        }
    }
}

/// Completed session handed to external persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub problem: Problem,
    pub transcript: Vec<Turn>,
    pub hints_used: u8,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub reflection: SessionReflection,
}
