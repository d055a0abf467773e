//! Five-in-a-row detection
//!
//! Black wins only with an exact five; six or more is an overline. White
//! wins with five or more.

use crate::board::{Board, Pos, Stone};

use super::line::DIRECTIONS;

/// Run length through `pos` along `(dr, dc)`, counting `pos` itself as `color`.
#[inline]
pub fn run_length(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> usize {
    let mut count = 1;
    for sign in [1, -1] {
        let mut r = pos.row as i32 + dr * sign;
        let mut c = pos.col as i32 + dc * sign;
        while board.get_checked(r, c) == Some(color) {
            count += 1;
            r += dr * sign;
            c += dc * sign;
        }
    }
    count
}

#[inline]
fn is_five_length(len: usize, color: Stone) -> bool {
    match color {
        Stone::Black => len == 5,
        Stone::White => len >= 5,
        Stone::Empty => false,
    }
}

/// Fast five check at a specific position, treating `pos` as `color`.
///
/// Only checks the 4 lines through `pos`. No allocation.
#[inline]
pub fn has_five_at_pos(board: &Board, pos: Pos, color: Stone) -> bool {
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| is_five_length(run_length(board, pos, color, dr, dc), color))
}

/// Would placing `color` on the empty cell `pos` complete a five?
#[inline]
pub fn completes_five(board: &Board, pos: Pos, color: Stone) -> bool {
    board.is_empty(pos) && has_five_at_pos(board, pos, color)
}

/// Did the stone just placed at `last_move` win for `color`?
#[inline]
pub fn is_win(board: &Board, last_move: Pos, color: Stone) -> bool {
    board.get(last_move) == color && has_five_at_pos(board, last_move, color)
}
