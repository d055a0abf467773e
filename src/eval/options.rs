//! Evaluation feature switches

use serde::{Deserialize, Serialize};

/// Optional evaluation terms, fixed per difficulty profile.
///
/// Built once and shared read-only with every evaluation of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationOptions {
    /// Bonus for a four and an open three made by one stone
    pub four_three_bonus: bool,
    /// Bonus per threatened direction beyond the first
    pub multi_threat_bonus: bool,
    /// Boost the defense term when the move also makes a four
    pub counter_four: bool,
    /// White: a four whose defense point is forbidden for Black
    pub forbidden_trap: bool,
    /// White: an open three whose open-four point is forbidden for Black
    pub fukumi: bool,
    /// White: follow-up threat points that Black may not occupy
    pub mise: bool,
    /// Bonus when a shallow VCT remains after the move
    pub vct_bonus: bool,
    /// Penalize a four with no open three behind it
    pub single_four_penalty: bool,
    /// Veto moves that ignore an opponent five or open-four threat
    pub mandatory_defense: bool,
}

impl EvaluationOptions {
    /// Plain pattern evaluation
    pub const fn basic() -> Self {
        Self {
            four_three_bonus: false,
            multi_threat_bonus: false,
            counter_four: false,
            forbidden_trap: false,
            fukumi: false,
            mise: false,
            vct_bonus: false,
            single_four_penalty: false,
            mandatory_defense: false,
        }
    }

    /// Tactical terms without the Renju-specific traps
    pub const fn tactical() -> Self {
        Self {
            four_three_bonus: true,
            multi_threat_bonus: true,
            counter_four: true,
            single_four_penalty: true,
            mandatory_defense: true,
            ..Self::basic()
        }
    }

    /// Every term enabled
    pub const fn full() -> Self {
        Self {
            four_three_bonus: true,
            multi_threat_bonus: true,
            counter_four: true,
            forbidden_trap: true,
            fukumi: true,
            mise: true,
            vct_bonus: true,
            single_four_penalty: true,
            mandatory_defense: true,
        }
    }

    /// Any of the White-only forbidden-point terms
    pub fn uses_forbidden_pressure(&self) -> bool {
        self.forbidden_trap || self.fukumi || self.mise
    }
}
