//! Renju CPU engine
//!
//! A decision engine for 15x15 Renju: Black moves first and must make an
//! exact five, and overlines, double-fours and double-threes are forbidden
//! to Black. White wins with five or more and has no restrictions.
//!
//! # Architecture
//!
//! - [`board`]: bitboard position representation
//! - [`rules`]: the [`RuleOracle`] trait and the standard [`RenjuRules`]
//! - [`eval`]: pattern-based move and position evaluation
//! - [`search`]: Zobrist hashing, transposition table, move ordering,
//!   iterative-deepening alpha-beta and VCF/VCT threat search
//! - [`opening`]: opening book with the 26 traditional openings
//! - [`config`]: difficulty profiles and engine settings
//! - [`engine`]: request/response orchestrator
//! - [`worker`]: background thread owning an engine
//! - [`headless`]: self-play games and Elo bookkeeping
//!
//! # Quick Start
//!
//! ```
//! use renju::{Board, Difficulty, DifficultyTable, Engine, EngineConfig, MoveRequest, Pos, Stone};
//!
//! let mut board = Board::new();
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//! board.place_stone(Pos::new(7, 8), Stone::White);
//! board.place_stone(Pos::new(8, 8), Stone::Black);
//!
//! let mut engine = Engine::new(EngineConfig::seeded(1), DifficultyTable::default());
//! let response = engine.handle(&MoveRequest::new(&board, Stone::White, Difficulty::Easy));
//! assert!(board.is_empty(response.position));
//! ```
//!
//! # Move Priority
//!
//! 1. Opening book (first three stones)
//! 2. Immediate five, then blocking the opponent's five
//! 3. VCF, then VCT
//! 4. Alpha-Beta search with transposition table

#![forbid(unsafe_code)]

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod headless;
pub mod opening;
pub mod rules;
pub mod search;
pub mod worker;

pub use board::{Board, Pos, Stone, BOARD_SIZE, CENTER};
pub use config::{Difficulty, DifficultyParams, DifficultyTable, EngineConfig};
pub use engine::{Engine, EngineContext, MoveRequest, MoveResponse, MoveSource};
pub use error::EngineError;
pub use rules::{RenjuRules, RuleOracle};
pub use worker::EngineWorker;
