//! Pattern scores for Renju evaluation
//!
//! Tier values are strictly ordered so that one stronger shape always
//! outweighs a handful of weaker ones on other axes.

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;
    /// `_OOOO_`: two completion points, cannot be blocked
    pub const OPEN_FOUR: i32 = 100_000;
    /// `XOOOO_`: one completion point
    pub const FOUR: i32 = 10_000;
    /// `_OOO_`: becomes an open four if not blocked
    pub const OPEN_THREE: i32 = 5_000;
    /// `XOOO_`
    pub const THREE: i32 = 1_000;
    pub const OPEN_TWO: i32 = 500;
    pub const TWO: i32 = 100;

    // Optional bonuses, see `EvaluationOptions`
    /// Four and open three made by the same stone
    pub const FOUR_THREE: i32 = 50_000;
    /// Per threatened direction beyond the first
    pub const MULTI_THREAT: i32 = 4_000;
    /// White four whose only defense is forbidden for Black
    pub const FORBIDDEN_TRAP: i32 = 90_000;
    /// White open three with a forbidden defense point
    pub const FUKUMI: i32 = 20_000;
    /// Per White follow-up point that Black may not occupy
    pub const MISE: i32 = 3_000;
    /// Move leaves a forced continuous-threat win behind it
    pub const VCT: i32 = 60_000;
    /// Lone four with nothing behind it
    pub const SINGLE_FOUR_PENALTY: i32 = 4_000;

    /// Score of a move rejected by the mandatory-defense rule.
    ///
    /// Far below any reachable score but far from `i32::MIN`, so sums never overflow.
    pub const MANDATORY_DEFENSE_VETO: i32 = i32::MIN / 4;
}

/// Diagonal axes are worth slightly more than orthogonal ones (percent)
pub const DIAGONAL_BONUS_PERCENT: i32 = 105;
/// Share of the opponent's value at a cell credited for blocking it (percent)
pub const DEFENSE_PERCENT: i32 = 50;
/// Defense multiplier when the move also makes a four (percent)
pub const COUNTER_FOUR_PERCENT: i32 = 150;

/// Maximum Manhattan distance from center on a 15x15 board
pub const MAX_CENTER_DIST: i32 = 14;
/// Weight per distance unit from center
pub const CENTER_WEIGHT: i32 = 5;

/// Shape tier of one axis, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    None,
    Two,
    OpenTwo,
    Three,
    OpenThree,
    Four,
    OpenFour,
    Five,
}

impl Tier {
    /// Tier of a contiguous run of `count` stones with `open_ends` empty ends.
    pub fn from_run(count: usize, open_ends: u8) -> Tier {
        match (count, open_ends) {
            (5.., _) => Tier::Five,
            (4, 2) => Tier::OpenFour,
            (4, 1) => Tier::Four,
            (3, 2) => Tier::OpenThree,
            (3, 1) => Tier::Three,
            (2, 2) => Tier::OpenTwo,
            (2, 1) => Tier::Two,
            _ => Tier::None,
        }
    }

    pub fn score(self) -> i32 {
        match self {
            Tier::None => 0,
            Tier::Two => PatternScore::TWO,
            Tier::OpenTwo => PatternScore::OPEN_TWO,
            Tier::Three => PatternScore::THREE,
            Tier::OpenThree => PatternScore::OPEN_THREE,
            Tier::Four => PatternScore::FOUR,
            Tier::OpenFour => PatternScore::OPEN_FOUR,
            Tier::Five => PatternScore::FIVE,
        }
    }

    #[inline]
    pub fn is_four(self) -> bool {
        matches!(self, Tier::Four | Tier::OpenFour)
    }
}

/// Score of one axis; axes 2 and 3 are the diagonals.
#[inline]
pub fn axis_score(tier: Tier, axis: usize) -> i32 {
    let base = tier.score();
    if axis >= 2 && tier != Tier::Five {
        base * DIAGONAL_BONUS_PERCENT / 100
    } else {
        base
    }
}
