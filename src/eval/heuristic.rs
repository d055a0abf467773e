//! Heuristic evaluation
//!
//! Two entry points:
//! - [`Evaluator::evaluate_position`]: how good is it for `color` to play a
//!   given empty cell. Used for move ordering.
//! - [`evaluate_board`]: static score of a whole position from one side's
//!   point of view. Used at search leaves.

use crate::board::{Board, Pos, Stone, BOARD_SIZE, CENTER};
use crate::rules::{PatternType, RuleOracle, DIRECTIONS};
use crate::search::threat::ThreatSearcher;

use super::options::EvaluationOptions;
use super::patterns::{
    axis_score, PatternScore, Tier, CENTER_WEIGHT, COUNTER_FOUR_PERCENT, DEFENSE_PERCENT,
    MAX_CENTER_DIST,
};

/// Plies of the threat probe behind `vct_bonus`
const VCT_PROBE_VCF_DEPTH: u8 = 4;
const VCT_PROBE_VCT_DEPTH: u8 = 2;
const VCT_PROBE_NODES: u64 = 2_000;

/// At most this many mise points are rewarded per move
const MAX_MISE_POINTS: i32 = 2;

/// Scores moves for one difficulty profile.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    rules: &'a dyn RuleOracle,
    options: EvaluationOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(rules: &'a dyn RuleOracle, options: EvaluationOptions) -> Self {
        Self { rules, options }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Heuristic value of `color` playing the empty cell `pos`.
    ///
    /// Returns exactly [`PatternScore::FIVE`] when the move completes a five,
    /// and [`PatternScore::MANDATORY_DEFENSE_VETO`] when the mandatory-defense
    /// rule is enabled and the move ignores a threat it must answer.
    pub fn evaluate_position(&self, board: &Board, pos: Pos, color: Stone) -> i32 {
        let threats = self.threat_scan(board, color);
        self.score_move(board, pos, color, threats.as_ref())
    }

    /// [`Evaluator::evaluate_position`] for many candidates of one side,
    /// scanning the opponent's threats only once.
    pub fn evaluate_candidates(&self, board: &Board, candidates: &[Pos], color: Stone) -> Vec<i32> {
        let threats = self.threat_scan(board, color);
        candidates
            .iter()
            .map(|&pos| self.score_move(board, pos, color, threats.as_ref()))
            .collect()
    }

    fn threat_scan(&self, board: &Board, color: Stone) -> Option<OpponentThreats> {
        self.options
            .mandatory_defense
            .then(|| OpponentThreats::scan(self.rules, board, color.opponent()))
    }

    fn score_move(
        &self,
        board: &Board,
        pos: Pos,
        color: Stone,
        threats: Option<&OpponentThreats>,
    ) -> i32 {
        if !board.is_empty(pos) {
            return 0;
        }
        if self.rules.completes_five(board, pos, color) {
            return PatternScore::FIVE;
        }

        let opponent = color.opponent();
        let tiers = axis_tiers(board, pos, color);
        let fours = tiers.iter().filter(|t| t.is_four()).count() as i32;
        let open_fours = tiers.iter().filter(|&&t| t == Tier::OpenFour).count() as i32;
        let open_threes = tiers.iter().filter(|&&t| t == Tier::OpenThree).count() as i32;

        if let Some(threats) = threats {
            let counter_threat = (fours > 0 && open_threes > 0) || open_fours > 0 || fours > 1;
            if threats.vetoes(self.rules, board, pos, color, counter_threat) {
                return PatternScore::MANDATORY_DEFENSE_VETO;
            }
        }

        let attack: i32 = tiers
            .iter()
            .enumerate()
            .map(|(axis, &tier)| axis_score(tier, axis))
            .sum();

        let blocked = if self.rules.completes_five(board, pos, opponent) {
            PatternScore::FIVE
        } else {
            axis_tiers(board, pos, opponent)
                .iter()
                .enumerate()
                .map(|(axis, &tier)| axis_score(tier, axis))
                .sum()
        };
        let mut defense = blocked * DEFENSE_PERCENT / 100;
        if self.options.counter_four && fours > 0 {
            defense = defense * COUNTER_FOUR_PERCENT / 100;
        }

        let mut score = attack + defense + center_bonus(pos);

        if self.options.four_three_bonus && fours > 0 && open_threes > 0 {
            score += PatternScore::FOUR_THREE;
        }
        if self.options.multi_threat_bonus {
            let directions = tiers.iter().filter(|&&t| t >= Tier::OpenThree).count() as i32;
            if directions > 1 {
                score += PatternScore::MULTI_THREAT * (directions - 1);
            }
        }
        if self.options.single_four_penalty && fours == 1 && open_fours == 0 && open_threes == 0 {
            score -= PatternScore::SINGLE_FOUR_PENALTY;
        }
        if color == Stone::White && self.options.uses_forbidden_pressure() {
            score += self.forbidden_pressure(board, pos);
        }
        if self.options.vct_bonus && (fours > 0 || open_threes > 0) && self.leaves_vct(board, pos, color) {
            score += PatternScore::VCT;
        }

        score
    }

    /// White-only bonuses for threats whose answer is a forbidden point for Black.
    fn forbidden_pressure(&self, board: &Board, pos: Pos) -> i32 {
        let mut after = board.clone();
        after.place_stone(pos, Stone::White);
        let patterns = self
            .rules
            .recognize_line_patterns(&after, pos, Stone::White);

        let mut bonus = 0;
        for (axis, &pattern) in patterns.iter().enumerate() {
            let (dr, dc) = DIRECTIONS[axis];
            let along = (-4..=4).filter_map(|k| pos.offset(dr * k, dc * k));
            match pattern {
                PatternType::Four if self.options.forbidden_trap => {
                    let trapped = along
                        .filter(|&q| self.rules.completes_five(&after, q, Stone::White))
                        .any(|q| self.rules.is_forbidden(&after, q));
                    if trapped {
                        bonus += PatternScore::FORBIDDEN_TRAP;
                    }
                }
                PatternType::OpenThree if self.options.fukumi => {
                    let trapped = along
                        .filter(|&q| after.is_empty(q))
                        .filter(|&q| {
                            self.rules.recognize_line_patterns(&after, q, Stone::White)[axis]
                                == PatternType::OpenFour
                        })
                        .any(|q| self.rules.is_forbidden(&after, q));
                    if trapped {
                        bonus += PatternScore::FUKUMI;
                    }
                }
                _ => {}
            }
        }

        if self.options.mise {
            let mut points = 0;
            for dr in -2..=2 {
                for dc in -2..=2 {
                    let Some(q) = pos.offset(dr, dc) else { continue };
                    if !after.is_empty(q) || !self.rules.is_forbidden(&after, q) {
                        continue;
                    }
                    let follow_up = self
                        .rules
                        .recognize_line_patterns(&after, q, Stone::White)
                        .iter()
                        .any(|p| p.is_four() || *p == PatternType::OpenThree);
                    if follow_up {
                        points += 1;
                    }
                }
            }
            bonus += PatternScore::MISE * points.min(MAX_MISE_POINTS);
        }

        bonus
    }

    /// Does `color` still have a forced threat win after playing `pos`?
    fn leaves_vct(&self, board: &Board, pos: Pos, color: Stone) -> bool {
        let mut after = board.clone();
        after.place_stone(pos, color);
        ThreatSearcher::new(self.rules)
            .with_depths(VCT_PROBE_VCF_DEPTH, VCT_PROBE_VCT_DEPTH)
            .with_node_budget(VCT_PROBE_NODES)
            .has_vct(&after, color)
    }
}

/// Cells where the opponent would win or make an open four.
#[derive(Debug, Clone)]
pub struct OpponentThreats {
    opponent: Stone,
    five_points: Vec<Pos>,
    open_four_points: Vec<Pos>,
}

impl OpponentThreats {
    pub fn scan(rules: &dyn RuleOracle, board: &Board, opponent: Stone) -> Self {
        let mut five_points = Vec::new();
        let mut open_four_points = Vec::new();

        for q in cells_near(board, opponent) {
            if !has_line_support(board, q, opponent, 3) || !rules.is_legal(board, q, opponent) {
                continue;
            }
            if rules.completes_five(board, q, opponent) {
                five_points.push(q);
            } else if rules
                .recognize_line_patterns(board, q, opponent)
                .contains(&PatternType::OpenFour)
            {
                open_four_points.push(q);
            }
        }

        Self {
            opponent,
            five_points,
            open_four_points,
        }
    }

    pub fn five_points(&self) -> &[Pos] {
        &self.five_points
    }

    pub fn open_four_points(&self) -> &[Pos] {
        &self.open_four_points
    }

    /// Should `color` playing `pos` be rejected?
    ///
    /// A five threat must be blocked on the spot. Open-four threats must be
    /// reduced, unless the move answers with a counter-threat at least as
    /// strong: a four-three, an open four or a double four.
    fn vetoes(
        &self,
        rules: &dyn RuleOracle,
        board: &Board,
        pos: Pos,
        color: Stone,
        counter_threat: bool,
    ) -> bool {
        if !self.five_points.is_empty() {
            return !self.five_points.contains(&pos);
        }
        if self.open_four_points.is_empty() || counter_threat {
            return false;
        }
        // Our stone can only take open-four points away, so only the known
        // ones need rechecking
        let mut after = board.clone();
        after.place_stone(pos, color);
        let remaining = self
            .open_four_points
            .iter()
            .filter(|&&q| {
                q != pos
                    && rules.is_legal(&after, q, self.opponent)
                    && rules
                        .recognize_line_patterns(&after, q, self.opponent)
                        .contains(&PatternType::OpenFour)
            })
            .count();
        remaining >= self.open_four_points.len()
    }
}

/// Empty cells within one step of a `color` stone, in row-major order.
fn cells_near(board: &Board, color: Stone) -> Vec<Pos> {
    let Some(stones) = board.stones(color) else {
        return Vec::new();
    };
    let mut marked = [false; BOARD_SIZE * BOARD_SIZE];
    for s in stones.iter_ones() {
        for dr in -1..=1 {
            for dc in -1..=1 {
                if let Some(q) = s.offset(dr, dc) {
                    if board.is_empty(q) {
                        marked[q.to_index()] = true;
                    }
                }
            }
        }
    }
    marked
        .iter()
        .enumerate()
        .filter(|(_, &m)| m)
        .map(|(i, _)| Pos::from_index(i))
        .collect()
}

/// Does some line through `pos` hold at least `min` other `color` stones within four cells?
fn has_line_support(board: &Board, pos: Pos, color: Stone, min: usize) -> bool {
    DIRECTIONS.iter().any(|&(dr, dc)| {
        let mut n = 0;
        for k in 1..=4 {
            for sign in [1, -1] {
                let r = pos.row as i32 + dr * k * sign;
                let c = pos.col as i32 + dc * k * sign;
                if board.get_checked(r, c) == Some(color) {
                    n += 1;
                }
            }
        }
        n >= min
    })
}

/// Center bonus: highest at tengen, zero in the corners.
#[inline]
pub fn center_bonus(pos: Pos) -> i32 {
    (MAX_CENTER_DIST - pos.manhattan(CENTER) as i32) * CENTER_WEIGHT
}

/// Per-axis tiers for `color` placing at `pos`.
///
/// Contiguous runs are read first; one-gap fours (`OO_OO`) and one-gap open
/// threes (`_O_OO_`) lift an axis that the contiguous reading ranks lower.
/// A Black run of six or more counts for nothing.
fn axis_tiers(board: &Board, pos: Pos, color: Stone) -> [Tier; 4] {
    let mut tiers = [Tier::None; 4];
    for (axis, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
        let window = read_window(board, pos, color, dr, dc);

        let (count, open_ends) = contiguous_run(&window);
        let mut tier = if color == Stone::Black && count >= 6 {
            Tier::None
        } else {
            Tier::from_run(count, open_ends)
        };
        if tier < Tier::Four && has_gapped_four(&window) {
            tier = Tier::Four;
        }
        if tier < Tier::OpenThree && has_gapped_open_three(&window) {
            tier = Tier::OpenThree;
        }
        tiers[axis] = tier;
    }
    tiers
}

const WINDOW_HALF: usize = 5;
const WINDOW: usize = 2 * WINDOW_HALF + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Own,
    Empty,
    Blocked,
}

fn read_window(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> [Seen; WINDOW] {
    let mut window = [Seen::Blocked; WINDOW];
    for (i, cell) in window.iter_mut().enumerate() {
        let k = i as i32 - WINDOW_HALF as i32;
        *cell = if k == 0 {
            Seen::Own
        } else {
            match board.get_checked(pos.row as i32 + dr * k, pos.col as i32 + dc * k) {
                Some(s) if s == color => Seen::Own,
                Some(Stone::Empty) => Seen::Empty,
                _ => Seen::Blocked,
            }
        };
    }
    window
}

fn contiguous_run(window: &[Seen; WINDOW]) -> (usize, u8) {
    let mut lo = WINDOW_HALF;
    while lo > 0 && window[lo - 1] == Seen::Own {
        lo -= 1;
    }
    let mut hi = WINDOW_HALF;
    while hi + 1 < WINDOW && window[hi + 1] == Seen::Own {
        hi += 1;
    }
    let mut open_ends = 0;
    if lo > 0 && window[lo - 1] == Seen::Empty {
        open_ends += 1;
    }
    if hi + 1 < WINDOW && window[hi + 1] == Seen::Empty {
        open_ends += 1;
    }
    (hi - lo + 1, open_ends)
}

/// Four stones in a 5-cell window through the centre, the empty cell inside.
fn has_gapped_four(window: &[Seen; WINDOW]) -> bool {
    (WINDOW_HALF - 4..=WINDOW_HALF).any(|start| {
        let w = &window[start..start + 5];
        w[0] == Seen::Own
            && w[4] == Seen::Own
            && !w.contains(&Seen::Blocked)
            && w.iter().filter(|&&s| s == Seen::Own).count() == 4
    })
}

/// `_O_OO_` or `_OO_O_` with the centre among the inner four cells.
fn has_gapped_open_three(window: &[Seen; WINDOW]) -> bool {
    (WINDOW_HALF - 4..WINDOW_HALF).any(|start| {
        let w = &window[start..start + 6];
        w[0] == Seen::Empty
            && w[5] == Seen::Empty
            && w[1] == Seen::Own
            && w[4] == Seen::Own
            && w[2] != w[3]
            && !w[1..5].contains(&Seen::Blocked)
    })
}

/// Evaluate the board from the perspective of the given color.
///
/// Symmetric: `evaluate_board(b, Black) == -evaluate_board(b, White)`.
#[must_use]
pub fn evaluate_board(board: &Board, perspective: Stone) -> i32 {
    side_score(board, perspective) - side_score(board, perspective.opponent())
}

/// Pattern and position value of every `color` stone.
fn side_score(board: &Board, color: Stone) -> i32 {
    let Some(stones) = board.stones(color) else {
        return 0;
    };
    let mut score = 0;
    for pos in stones.iter_ones() {
        for (axis, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
            score += axis_score(line_tier(board, pos, dr, dc, color), axis);
        }
        score += center_bonus(pos);
    }
    score
}

/// Tier of the line segment starting at `pos` along `(dr, dc)`.
///
/// Only the first stone of a segment (no same-color stone behind it) scores,
/// so each segment is counted once. One internal gap is allowed.
fn line_tier(board: &Board, pos: Pos, dr: i32, dc: i32, color: Stone) -> Tier {
    let prev = board.get_checked(pos.row as i32 - dr, pos.col as i32 - dc);
    if prev == Some(color) {
        return Tier::None;
    }

    let mut count = 1;
    let mut open_ends = u8::from(prev == Some(Stone::Empty));
    let mut has_gap = false;

    let mut r = pos.row as i32 + dr;
    let mut c = pos.col as i32 + dc;
    while let Some(cell) = board.get_checked(r, c) {
        if cell == color {
            count += 1;
        } else if cell == Stone::Empty {
            if !has_gap && board.get_checked(r + dr, c + dc) == Some(color) {
                has_gap = true;
            } else {
                open_ends += 1;
                break;
            }
        } else {
            break;
        }
        r += dr;
        c += dc;
    }

    if has_gap {
        match (count, open_ends) {
            (4.., _) => Tier::Four,
            (3, 2) => Tier::OpenThree,
            (3, 1) => Tier::Three,
            (2, 2) => Tier::OpenTwo,
            _ => Tier::None,
        }
    } else if color == Stone::Black && count >= 6 {
        Tier::None
    } else {
        Tier::from_run(count, open_ends)
    }
}
