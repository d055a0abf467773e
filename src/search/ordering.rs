//! Move ordering: TT move, killer moves, static score, history
//!
//! Priority is lexicographic. The TT move comes first, then the two killer
//! slots of the current ply, then every other move by its static
//! `evaluate_position` score, with the history weight breaking ties. The
//! sort is stable, so remaining ties keep generator order.

use crate::board::{Board, Pos, Stone, BOARD_SIZE};
use crate::eval::Evaluator;

/// Deepest ply with killer slots
pub const MAX_PLY: usize = 64;

const TT_MOVE_PRIORITY: u8 = 3;
const KILLER_1_PRIORITY: u8 = 2;
const KILLER_2_PRIORITY: u8 = 1;

/// Two quiet moves per ply that recently caused a beta cutoff.
#[derive(Debug, Clone)]
pub struct KillerMoves {
    slots: [[Option<Pos>; 2]; MAX_PLY],
}

impl KillerMoves {
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_PLY],
        }
    }

    /// Remember a cutoff move; the previous first slot moves to the second.
    pub fn record(&mut self, ply: usize, mv: Pos) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    pub fn get(&self, ply: usize) -> [Option<Pos>; 2] {
        self.slots.get(ply).copied().unwrap_or([None; 2])
    }

    pub fn clear(&mut self) {
        self.slots = [[None; 2]; MAX_PLY];
    }
}

impl Default for KillerMoves {
    fn default() -> Self {
        Self::new()
    }
}

/// Cutoff counts per cell, weighted by depth squared.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    weights: [[u32; BOARD_SIZE]; BOARD_SIZE],
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            weights: [[0; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn record(&mut self, mv: Pos, depth: u8) {
        let w = &mut self.weights[mv.row as usize][mv.col as usize];
        *w = w.saturating_add(u32::from(depth) * u32::from(depth));
    }

    #[inline]
    pub fn weight(&self, mv: Pos) -> u32 {
        self.weights[mv.row as usize][mv.col as usize]
    }

    pub fn clear(&mut self) {
        self.weights = [[0; BOARD_SIZE]; BOARD_SIZE];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A candidate with its ordering keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub pos: Pos,
    /// 3 = TT move, 2/1 = killer slots, 0 = other
    pub priority: u8,
    /// `evaluate_position` value
    pub static_score: i32,
    pub history: u32,
}

impl ScoredMove {
    #[inline]
    fn key(&self) -> (u8, i32, u32) {
        (self.priority, self.static_score, self.history)
    }
}

/// Sort `candidates` best-first for `color`.
pub fn order_moves(
    board: &Board,
    color: Stone,
    candidates: &[Pos],
    tt_move: Option<Pos>,
    killers: [Option<Pos>; 2],
    history: &HistoryTable,
    evaluator: &Evaluator<'_>,
) -> Vec<ScoredMove> {
    let static_scores = evaluator.evaluate_candidates(board, candidates, color);
    let mut scored: Vec<ScoredMove> = candidates
        .iter()
        .zip(static_scores)
        .map(|(&pos, static_score)| {
            let priority = if tt_move == Some(pos) {
                TT_MOVE_PRIORITY
            } else if killers[0] == Some(pos) {
                KILLER_1_PRIORITY
            } else if killers[1] == Some(pos) {
                KILLER_2_PRIORITY
            } else {
                0
            };
            ScoredMove {
                pos,
                priority,
                static_score,
                history: history.weight(pos),
            }
        })
        .collect();

    scored.sort_by(|a, b| b.key().cmp(&a.key()));
    scored
}
