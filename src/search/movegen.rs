//! Candidate move generation

use crate::board::{Board, Pos, Stone, CENTER, TOTAL_CELLS};
use crate::rules::RuleOracle;

/// Candidates lie within this Chebyshev distance of an existing stone
pub const CANDIDATE_RADIUS: i32 = 2;

/// Legal candidate moves for `color`, in row-major order.
///
/// An empty board yields only the center. Otherwise every empty cell within
/// [`CANDIDATE_RADIUS`] of a stone is a candidate; for Black, forbidden
/// cells are dropped unless they complete a five.
pub fn generate_moves(board: &Board, color: Stone, rules: &dyn RuleOracle) -> Vec<Pos> {
    if board.is_board_empty() {
        return vec![CENTER];
    }

    let mut near = [false; TOTAL_CELLS];
    for stone in board.black.iter_ones().chain(board.white.iter_ones()) {
        for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
            for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                if let Some(p) = stone.offset(dr, dc) {
                    near[p.to_index()] = true;
                }
            }
        }
    }

    let mut moves = Vec::with_capacity(64);
    for (idx, _) in near.iter().enumerate().filter(|(_, &n)| n) {
        let pos = Pos::from_index(idx);
        if rules.is_legal(board, pos, color) {
            moves.push(pos);
        }
    }
    moves
}

/// True when `pos` is a legal move for `color` that [`generate_moves`] would offer.
pub fn is_candidate(board: &Board, pos: Pos, color: Stone, rules: &dyn RuleOracle) -> bool {
    if board.is_board_empty() {
        return pos == CENTER;
    }
    let near_stone = (-CANDIDATE_RADIUS..=CANDIDATE_RADIUS).any(|dr| {
        (-CANDIDATE_RADIUS..=CANDIDATE_RADIUS).any(|dc| {
            pos.offset(dr, dc)
                .is_some_and(|p| !board.is_empty(p))
        })
    });
    near_stone && rules.is_legal(board, pos, color)
}
