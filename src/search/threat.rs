//! VCF/VCT threat search for forced wins
//!
//! This module implements specialized threat-space search algorithms:
//! - VCF (Victory by Continuous Fours): forced wins using only four-threats
//! - VCT (Victory by Continuous Threats): fours and open threes
//!
//! Both work on a private copy of the board with make/unmake, so callers
//! never see intermediate stones.

use crate::board::{Board, Pos, Stone};
use crate::rules::line::{Line, Three};
use crate::rules::{PatternType, RuleOracle, DIRECTIONS};

/// Attacker moves in a VCF line
pub const DEFAULT_VCF_DEPTH: u8 = 8;
/// Attacker threats in a VCT line
pub const DEFAULT_VCT_DEPTH: u8 = 4;
/// Nodes one top-level query may visit
pub const DEFAULT_NODE_BUDGET: u64 = 50_000;

/// Result of a VCF/VCT search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatResult {
    /// Whether a forced win was found
    pub found: bool,
    /// Attacker moves of the winning line, first move first
    pub sequence: Vec<Pos>,
}

impl ThreatResult {
    #[inline]
    fn not_found() -> Self {
        Self {
            found: false,
            sequence: Vec::new(),
        }
    }

    #[inline]
    fn found(sequence: Vec<Pos>) -> Self {
        Self {
            found: true,
            sequence,
        }
    }

    /// First move of the winning line
    pub fn first_move(&self) -> Option<Pos> {
        self.sequence.first().copied()
    }
}

/// What a candidate threat move does for the attacker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ThreatKind {
    Five,
    Four,
    OpenThree,
}

/// Threat searcher for VCF/VCT algorithms
pub struct ThreatSearcher<'a> {
    rules: &'a dyn RuleOracle,
    max_vcf_depth: u8,
    max_vct_depth: u8,
    node_budget: u64,
    nodes: u64,
}

impl<'a> ThreatSearcher<'a> {
    pub fn new(rules: &'a dyn RuleOracle) -> Self {
        Self {
            rules,
            max_vcf_depth: DEFAULT_VCF_DEPTH,
            max_vct_depth: DEFAULT_VCT_DEPTH,
            node_budget: DEFAULT_NODE_BUDGET,
            nodes: 0,
        }
    }

    #[must_use]
    pub fn with_depths(mut self, vcf_depth: u8, vct_depth: u8) -> Self {
        self.max_vcf_depth = vcf_depth;
        self.max_vct_depth = vct_depth;
        self
    }

    #[must_use]
    pub fn with_node_budget(mut self, nodes: u64) -> Self {
        self.node_budget = nodes;
        self
    }

    /// Nodes visited by the last query
    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Did the last query run out of nodes?
    #[inline]
    pub fn exhausted(&self) -> bool {
        self.nodes > self.node_budget
    }

    /// Search for a win by continuous fours for `color`, who is to move.
    ///
    /// Each attacker move makes a four, which leaves the defender exactly one
    /// reply. The line succeeds on a five, on a four with two completion
    /// points, or when White's four can only be stopped on a cell that is
    /// forbidden for Black.
    pub fn find_vcf(&mut self, board: &Board, color: Stone) -> ThreatResult {
        self.nodes = 0;
        let mut work = board.clone();
        let mut sequence = Vec::new();
        if self.vcf(&mut work, color, 0, &mut sequence) {
            ThreatResult::found(sequence)
        } else {
            ThreatResult::not_found()
        }
    }

    pub fn has_vcf(&mut self, board: &Board, color: Stone) -> bool {
        self.find_vcf(board, color).found
    }

    /// Search for a win by continuous threats for `color`, who is to move.
    ///
    /// Tries VCF first. Open threes are allowed as threats too, and a threat
    /// only counts when every defensive reply still loses.
    pub fn find_vct(&mut self, board: &Board, color: Stone) -> ThreatResult {
        let vcf = self.find_vcf(board, color);
        if vcf.found {
            return vcf;
        }

        self.nodes = 0;
        let mut work = board.clone();
        let mut sequence = Vec::new();
        if self.vct(&mut work, color, 0, &mut sequence) {
            ThreatResult::found(sequence)
        } else {
            ThreatResult::not_found()
        }
    }

    pub fn has_vct(&mut self, board: &Board, color: Stone) -> bool {
        self.find_vct(board, color).found
    }

    /// Count a node; false once the budget is spent.
    #[inline]
    fn enter(&mut self) -> bool {
        self.nodes += 1;
        self.nodes <= self.node_budget
    }

    fn vcf(&mut self, board: &mut Board, color: Stone, depth: u8, sequence: &mut Vec<Pos>) -> bool {
        if !self.enter() || depth >= self.max_vcf_depth {
            return false;
        }
        let defender = color.opponent();

        for (mv, kind) in self.threat_moves(board, color, false) {
            if kind == ThreatKind::Five {
                sequence.push(mv);
                return true;
            }

            board.place_stone(mv, color);
            sequence.push(mv);

            let won = match self.reply_to_four(board, mv, color) {
                FourReply::DefenderWins => false,
                FourReply::Unstoppable => true,
                FourReply::Forced(block) => {
                    board.place_stone(block, defender);
                    let result = self.vcf(board, color, depth + 1, sequence);
                    board.remove_stone(block);
                    result
                }
            };

            board.remove_stone(mv);
            if won {
                return true;
            }
            sequence.pop();
        }

        false
    }

    fn vct(&mut self, board: &mut Board, color: Stone, depth: u8, sequence: &mut Vec<Pos>) -> bool {
        if !self.enter() || depth >= self.max_vct_depth {
            return false;
        }
        let defender = color.opponent();

        for (mv, kind) in self.threat_moves(board, color, true) {
            if kind == ThreatKind::Five {
                sequence.push(mv);
                return true;
            }

            board.place_stone(mv, color);
            sequence.push(mv);

            let defenses = if kind == ThreatKind::Four {
                match self.reply_to_four(board, mv, color) {
                    FourReply::DefenderWins => None,
                    FourReply::Unstoppable => Some(Vec::new()),
                    FourReply::Forced(block) => Some(vec![block]),
                }
            } else if self.five_points_anywhere(board, defender) {
                None
            } else {
                Some(self.three_defenses(board, mv, color))
            };

            let won = match defenses {
                None => false,
                Some(defenses) => {
                    let mut line = Vec::new();
                    let mut all_beaten = true;
                    for &d in &defenses {
                        if !self.rules.is_legal(board, d, defender) {
                            // Black cannot block on a forbidden cell
                            continue;
                        }
                        board.place_stone(d, defender);
                        let mut branch = Vec::new();
                        let beaten = self.vcf(board, color, 0, &mut branch)
                            || self.vct(board, color, depth + 1, &mut branch);
                        board.remove_stone(d);
                        if !beaten {
                            all_beaten = false;
                            break;
                        }
                        if line.is_empty() {
                            line = branch;
                        }
                    }
                    if all_beaten {
                        sequence.extend(line);
                    }
                    all_beaten
                }
            };

            board.remove_stone(mv);
            if won {
                return true;
            }
            sequence.pop();
        }

        false
    }

    /// Legal threat moves for `color`: fives first, then fours, then (when
    /// asked) open threes. Within a group, moves threatening on more axes
    /// come first, then row-major order.
    fn threat_moves(&self, board: &Board, color: Stone, with_threes: bool) -> Vec<(Pos, ThreatKind)> {
        let mut moves = Vec::new();
        for pos in cells_near(board, color, 2) {
            if !self.rules.is_legal(board, pos, color) {
                continue;
            }
            if self.rules.completes_five(board, pos, color) {
                moves.push((pos, ThreatKind::Five, 0));
                continue;
            }
            let patterns = self.rules.recognize_line_patterns(board, pos, color);
            let axes = patterns
                .iter()
                .filter(|p| p.is_four() || **p == PatternType::OpenThree)
                .count();
            if patterns.iter().any(|p| p.is_four()) {
                moves.push((pos, ThreatKind::Four, axes));
            } else if with_threes && axes > 0 {
                moves.push((pos, ThreatKind::OpenThree, axes));
            }
        }
        moves.sort_by_key(|&(_, kind, axes)| (kind, std::cmp::Reverse(axes)));
        moves.into_iter().map(|(pos, kind, _)| (pos, kind)).collect()
    }

    /// How the defender must answer the four `color` just made at `mv`.
    fn reply_to_four(&self, board: &Board, mv: Pos, color: Stone) -> FourReply {
        let defender = color.opponent();
        if self.five_points_anywhere(board, defender) {
            return FourReply::DefenderWins;
        }

        let mut points: Vec<Pos> = Vec::new();
        for &(dr, dc) in &DIRECTIONS {
            for k in -4..=4 {
                let Some(q) = mv.offset(dr * k, dc * k) else { continue };
                if board.is_empty(q) && !points.contains(&q) && self.rules.completes_five(board, q, color) {
                    points.push(q);
                }
            }
        }

        match points.as_slice() {
            [block] if self.rules.is_legal(board, *block, defender) => FourReply::Forced(*block),
            // Two completion points, or the only one is forbidden for Black
            _ => FourReply::Unstoppable,
        }
    }

    /// Cells where the defender breaks the open three(s) `color` made at `mv`.
    fn three_defenses(&self, board: &mut Board, mv: Pos, color: Stone) -> Vec<Pos> {
        let defender = color.opponent();
        let mut defenses = Vec::new();
        for &dir in &DIRECTIONS {
            if Line::extract(board, mv, color, dir).three() != Three::Open {
                continue;
            }
            let (dr, dc) = dir;
            for k in -4..=4 {
                let Some(q) = mv.offset(dr * k, dc * k) else { continue };
                if !board.is_empty(q) || defenses.contains(&q) {
                    continue;
                }
                board.place_stone(q, defender);
                let broken = Line::extract(board, mv, color, dir).three() != Three::Open;
                board.remove_stone(q);
                if broken {
                    defenses.push(q);
                }
            }
        }
        defenses
    }

    fn five_points_anywhere(&self, board: &Board, color: Stone) -> bool {
        cells_near(board, color, 1)
            .into_iter()
            .any(|q| self.rules.completes_five(board, q, color))
    }
}

enum FourReply {
    /// The defender completes a five first
    DefenderWins,
    /// No legal single block exists
    Unstoppable,
    Forced(Pos),
}

/// Empty cells within `radius` of a `color` stone, in row-major order.
fn cells_near(board: &Board, color: Stone, radius: i32) -> Vec<Pos> {
    let Some(stones) = board.stones(color) else {
        return Vec::new();
    };
    let mut marked = [false; crate::board::TOTAL_CELLS];
    for s in stones.iter_ones() {
        for dr in -radius..=radius {
            for dc in -radius..=radius {
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
