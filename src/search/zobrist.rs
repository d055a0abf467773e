//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when placing/removing stones.
//! The keys are drawn once from the engine context's RNG, so a seeded context
//! reproduces the same table.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use renju::board::{Board, Pos, Stone};
//! use renju::search::ZobristTable;
//!
//! let zt = ZobristTable::new(&mut ChaCha8Rng::seed_from_u64(7));
//! let mut board = Board::new();
//! let hash1 = zt.hash(&board, Stone::Black);
//!
//! let pos = Pos::new(7, 7);
//! board.place_stone(pos, Stone::Black);
//!
//! // Incremental update plus side toggle equals full recomputation
//! let incremental = zt.toggle_side(zt.update(hash1, pos, Stone::Black));
//! assert_eq!(incremental, zt.hash(&board, Stone::White));
//! ```

use rand::Rng;

use crate::board::{Board, Pos, Stone, BOARD_SIZE};

/// Random keys per `[row][col][color]`, plus a side-to-move key.
pub struct ZobristTable {
    stones: [[[u64; 2]; BOARD_SIZE]; BOARD_SIZE],
    /// XORed in when Black is to move
    black_to_move: u64,
}

impl ZobristTable {
    #[must_use]
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut stones = [[[0u64; 2]; BOARD_SIZE]; BOARD_SIZE];
        for row in stones.iter_mut() {
            for cell in row.iter_mut() {
                cell[0] = rng.gen();
                cell[1] = rng.gen();
            }
        }
        Self {
            stones,
            black_to_move: rng.gen(),
        }
    }

    #[inline]
    fn key(&self, pos: Pos, stone: Stone) -> u64 {
        match stone.index() {
            Some(i) => self.stones[pos.row as usize][pos.col as usize][i],
            None => 0,
        }
    }

    /// Compute the full hash for a board position.
    #[must_use]
    pub fn hash(&self, board: &Board, side_to_move: Stone) -> u64 {
        let mut h = 0u64;
        for pos in board.black.iter_ones() {
            h ^= self.key(pos, Stone::Black);
        }
        for pos in board.white.iter_ones() {
            h ^= self.key(pos, Stone::White);
        }
        if side_to_move == Stone::Black {
            h ^= self.black_to_move;
        }
        h
    }

    /// XOR one stone in or out. Self-inverse: applying it twice is a no-op.
    #[inline]
    #[must_use]
    pub fn update(&self, hash: u64, pos: Pos, stone: Stone) -> u64 {
        hash ^ self.key(pos, stone)
    }

    /// Toggle the side-to-move component of the hash.
    #[inline]
    #[must_use]
    pub fn toggle_side(&self, hash: u64) -> u64 {
        hash ^ self.black_to_move
    }
}
