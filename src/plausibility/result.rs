//! Ternary plausibility verdicts
//!
//! ## Table of Contents
//! - **PlausibilityResult**: Pass / soft fail / hard stop, with AND composition

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign};

/// Verdict returned by a plausibility filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlausibilityResult {
    /// Filter satisfied, keep evaluating
    #[default]
    Pass,
    /// Filter not satisfied, but extensions of this rupture may still pass
    FailSoft,
    /// Filter not satisfied, and no extension of this rupture can pass
    FailHardStop,
}

impl PlausibilityResult {
    /// True only for [`Pass`](Self::Pass). Aggregation stops as soon as this is false.
    #[inline]
    pub fn can_continue(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// True only for [`Pass`](Self::Pass)
    #[inline]
    pub fn is_pass(self) -> bool {
        self.can_continue()
    }

    /// Combine two verdicts, keeping the worse one
    #[inline]
    pub fn logical_and(self, other: Self) -> Self {
        use PlausibilityResult::*;
        match (self, other) {
            (FailHardStop, _) | (_, FailHardStop) => FailHardStop,
            (FailSoft, _) | (_, FailSoft) => FailSoft,
            (Pass, Pass) => Pass,
        }
    }

    /// Wire name (`PASS`, `FAIL_SOFT`, `FAIL_HARD_STOP`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::FailSoft => "FAIL_SOFT",
            Self::FailHardStop => "FAIL_HARD_STOP",
        }
    }
}

impl BitAnd for PlausibilityResult {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.logical_and(rhs)
    }
}

impl BitAndAssign for PlausibilityResult {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.logical_and(rhs);
    }
}

impl fmt::Display for PlausibilityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
