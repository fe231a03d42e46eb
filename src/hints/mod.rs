//! Hint-tier state machine.
//!
//! A session moves through `0 → 1 → 2 → 3` granted hints and stops there.
//! Tiers are granted strictly in order; there is no reset other than starting
//! a new session.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of hint tiers available per problem
pub const MAX_HINTS: u8 = 3;

/// Escalating specificity levels of guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HintTier {
    /// General concept or direction to consider
    Broad = 1,
    /// A specific transformation or subproblem
    Narrow = 2,
    /// A concrete next step that stops short of the answer
    Concrete = 3,
}

impl HintTier {
    pub const ALL: [HintTier; 3] = [HintTier::Broad, HintTier::Narrow, HintTier::Concrete];

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Broad),
            2 => Some(Self::Narrow),
            3 => Some(Self::Concrete),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Broad => "broad pointer",
            Self::Narrow => "narrower focus",
            Self::Concrete => "specific action",
        }
    }
}

impl From<HintTier> for u8 {
    fn from(tier: HintTier) -> u8 {
        tier.level()
    }
}

impl TryFrom<u8> for HintTier {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_level(level).ok_or_else(|| format!("hint tier must be 1-3, got {level}"))
    }
}

impl fmt::Display for HintTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hint {} ({})", self.level(), self.label())
    }
}

/// Rejected state transitions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintTransitionError {
    #[error("All {MAX_HINTS} hints have already been granted")]
    Exhausted,

    #[error("Hint tier {got} cannot follow {granted} granted hints")]
    OutOfOrder { granted: u8, got: u8 },
}

/// Per-session count of granted hints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintState {
    granted: u8,
}

impl HintState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granted(&self) -> u8 {
        self.granted
    }

    pub fn remaining(&self) -> u8 {
        MAX_HINTS.saturating_sub(self.granted)
    }

    pub fn is_exhausted(&self) -> bool {
        self.granted >= MAX_HINTS
    }

    /// Tier the next granted hint would belong to
    pub fn next_tier(&self) -> Option<HintTier> {
        HintTier::from_level(self.granted + 1)
    }

    /// Record a granted hint.
    ///
    /// Only the tier returned by `next_tier` is accepted, so the counter moves
    /// by exactly one and never skips or repeats a tier.
    pub fn commit(&mut self, tier: HintTier) -> Result<(), HintTransitionError> {
        let expected = self.next_tier().ok_or(HintTransitionError::Exhausted)?;
        if tier != expected {
            return Err(HintTransitionError::OutOfOrder {
                granted: self.granted,
                got: tier.level(),
            });
        }
        self.granted = tier.level();
        Ok(())
    }

    /// Most recently granted tier
    pub fn last_tier(&self) -> Option<HintTier> {
        HintTier::from_level(self.granted)
    }
}
