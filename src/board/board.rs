//! Board structure

use std::fmt;

use super::bitboard::Bitboard;
use super::{Pos, Stone, BOARD_SIZE};
use crate::error::EngineError;

/// Game board: one bitboard per color.
///
/// The board is only ever changed one cell at a time through
/// [`Board::place_stone`] and [`Board::remove_stone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Black stones bitboard
    pub black: Bitboard,
    /// White stones bitboard
    pub white: Bitboard,
}

impl Board {
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
        }
    }

    /// Build a board from a row-major cell matrix, validating its shape.
    pub fn from_cells(cells: &[Vec<Stone>]) -> Result<Self, EngineError> {
        if cells.len() != BOARD_SIZE {
            return Err(EngineError::MalformedBoard {
                rows: cells.len(),
                cols: cells.first().map_or(0, Vec::len),
            });
        }
        let mut board = Self::new();
        for (row, line) in cells.iter().enumerate() {
            if line.len() != BOARD_SIZE {
                return Err(EngineError::MalformedBoard {
                    rows: cells.len(),
                    cols: line.len(),
                });
            }
            for (col, &stone) in line.iter().enumerate() {
                board.place_stone(Pos::new(row as u8, col as u8), stone);
            }
        }
        Ok(board)
    }

    /// Row-major cell matrix, the inverse of [`Board::from_cells`].
    pub fn to_cells(&self) -> Vec<Vec<Stone>> {
        (0..BOARD_SIZE)
            .map(|r| {
                (0..BOARD_SIZE)
                    .map(|c| self.get(Pos::new(r as u8, c as u8)))
                    .collect()
            })
            .collect()
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Stone at signed coordinates, `None` when off the board.
    #[inline]
    pub fn get_checked(&self, row: i32, col: i32) -> Option<Stone> {
        if Pos::is_valid(row, col) {
            Some(self.get(Pos::new(row as u8, col as u8)))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    /// Place a stone on an empty cell
    #[inline]
    pub fn place_stone(&mut self, pos: Pos, stone: Stone) {
        debug_assert!(stone == Stone::Empty || self.is_empty(pos));
        match stone {
            Stone::Black => self.black.set(pos),
            Stone::White => self.white.set(pos),
            Stone::Empty => {}
        }
    }

    /// Remove a stone
    #[inline]
    pub fn remove_stone(&mut self, pos: Pos) {
        self.black.clear(pos);
        self.white.clear(pos);
    }

    /// Get bitboard for a color (returns None for Empty)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Option<&Bitboard> {
        match stone {
            Stone::Black => Some(&self.black),
            Stone::White => Some(&self.white),
            Stone::Empty => None,
        }
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.stone_count() as usize == super::TOTAL_CELLS
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..BOARD_SIZE {
            write!(f, "{:>2} ", c)?;
        }
        writeln!(f)?;
        for r in 0..BOARD_SIZE {
            write!(f, "{:>2} ", r)?;
            for c in 0..BOARD_SIZE {
                let ch = match self.get(Pos::new(r as u8, c as u8)) {
                    Stone::Black => 'X',
                    Stone::White => 'O',
                    Stone::Empty => '.',
                };
                write!(f, " {} ", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
