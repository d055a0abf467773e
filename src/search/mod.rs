//! Search module for the Renju engine
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Candidate generation and move ordering
//! - Alpha-Beta search with iterative deepening
//! - VCF/VCT threat search for forced wins

pub mod alphabeta;
pub mod movegen;
pub mod ordering;
pub mod threat;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchLimits, SearchResult, Searcher, ROOT_WIDTH};
pub use movegen::{generate_moves, is_candidate};
pub use ordering::{order_moves, HistoryTable, KillerMoves, ScoredMove};
pub use threat::{ThreatResult, ThreatSearcher};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
