//! Renju rules
//!
//! The engine talks to the rules only through [`RuleOracle`]: forbidden-move
//! classification for Black, five detection, and per-line pattern
//! recognition. [`RenjuRules`] is the standard implementation.

pub mod forbidden;
pub mod line;
pub mod win;

use crate::board::{Board, Pos, Stone};

pub use line::DIRECTIONS;

/// Strongest shape a stone makes on one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternType {
    None,
    /// One more stone makes a four
    Three,
    /// One more stone makes an open four
    OpenThree,
    /// One cell (or two non-adjacent cells on one line) completes a five
    Four,
    /// Two cells complete a five; cannot be blocked
    OpenFour,
    Five,
    /// Six or more for Black
    Overline,
}

impl PatternType {
    #[inline]
    pub fn is_four(self) -> bool {
        matches!(self, PatternType::Four | PatternType::OpenFour)
    }
}

/// Pure, side-effect-free rule predicates consumed by the engine.
pub trait RuleOracle: Send + Sync {
    /// Would Black playing `pos` be a forbidden move?
    fn is_forbidden(&self, board: &Board, pos: Pos) -> bool;

    /// Would `color` playing the empty cell `pos` complete a five?
    fn completes_five(&self, board: &Board, pos: Pos, color: Stone) -> bool;

    /// Did `color`'s stone at `last_move` complete a five?
    fn is_win(&self, board: &Board, last_move: Pos, color: Stone) -> bool;

    /// Shapes `color` has through `pos` once a stone stands there, one entry
    /// per axis in [`DIRECTIONS`] order.
    fn recognize_line_patterns(&self, board: &Board, pos: Pos, color: Stone) -> [PatternType; 4];

    /// Empty, and not forbidden for Black unless it wins on the spot.
    fn is_legal(&self, board: &Board, pos: Pos, color: Stone) -> bool {
        if !board.is_empty(pos) {
            return false;
        }
        color != Stone::Black
            || self.completes_five(board, pos, color)
            || !self.is_forbidden(board, pos)
    }
}

/// Standard Renju rules: exact five for Black, overline/double-four/double-three forbidden.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenjuRules;

impl RuleOracle for RenjuRules {
    fn is_forbidden(&self, board: &Board, pos: Pos) -> bool {
        forbidden::is_forbidden(board, pos)
    }

    fn completes_five(&self, board: &Board, pos: Pos, color: Stone) -> bool {
        win::completes_five(board, pos, color)
    }

    fn is_win(&self, board: &Board, last_move: Pos, color: Stone) -> bool {
        win::is_win(board, last_move, color)
    }

    fn recognize_line_patterns(&self, board: &Board, pos: Pos, color: Stone) -> [PatternType; 4] {
        DIRECTIONS.map(|d| {
            let line = line::Line::extract(board, pos, color, d);
            if line.is_overline() {
                return PatternType::Overline;
            }
            if line.is_five() {
                return PatternType::Five;
            }
            match line.four() {
                line::Four::Open => PatternType::OpenFour,
                line::Four::Single | line::Four::Double => PatternType::Four,
                line::Four::None => match line.three() {
                    line::Three::Open => PatternType::OpenThree,
                    line::Three::Closed => PatternType::Three,
                    line::Three::None => PatternType::None,
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_patterns_per_axis() {
        let mut board = Board::new();
        // Row: open three once (7, 7) is placed
        board.place_stone(Pos::new(7, 6), Stone::White);
        board.place_stone(Pos::new(7, 8), Stone::White);
        // Column: four capped at the top
        board.place_stone(Pos::new(4, 7), Stone::Black);
        board.place_stone(Pos::new(5, 7), Stone::White);
        board.place_stone(Pos::new(6, 7), Stone::White);
        board.place_stone(Pos::new(8, 7), Stone::White);

        let patterns = RenjuRules.recognize_line_patterns(&board, Pos::new(7, 7), Stone::White);
        assert_eq!(patterns[0], PatternType::OpenThree);
        assert_eq!(patterns[1], PatternType::Four);
        assert_eq!(patterns[2], PatternType::None);
        assert_eq!(patterns[3], PatternType::None);
    }

    #[test]
    fn test_is_legal_for_black_and_white() {
        let mut board = Board::new();
        for &(r, c) in &[(7, 6), (7, 8), (6, 7), (8, 7)] {
            board.place_stone(Pos::new(r, c), Stone::Black);
        }
        let rules = RenjuRules;
        assert!(!rules.is_legal(&board, Pos::new(7, 7), Stone::Black));
        assert!(rules.is_legal(&board, Pos::new(7, 7), Stone::White));
        assert!(!rules.is_legal(&board, Pos::new(7, 6), Stone::White));
    }
}
