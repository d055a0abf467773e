//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by board hash,
//! enabling reuse of previous search results for positions we've seen before.
//!
//! # Example
//!
//! ```
//! use renju::board::Pos;
//! use renju::search::{EntryType, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1); // 1 MB
//! let hash = 0x1234_5678_9ABC_DEF0;
//! tt.store(hash, 5, 100, EntryType::Exact, Some(Pos::new(7, 7)));
//!
//! assert_eq!(tt.probe(hash, 5, -1000, 1000), Some(100));
//! assert_eq!(tt.get_best_move(hash), Some(Pos::new(7, 7)));
//! ```

use crate::board::Pos;

/// Bound kind of a stored score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// The true score fell inside the search window
    Exact,
    /// Failed high: score >= stored value
    LowerBound,
    /// Failed low: score <= stored value
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    /// Remaining depth the entry was searched to
    pub depth: u8,
    pub score: i32,
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Pos>,
}

/// Direct-mapped transposition table.
///
/// Each hash maps to exactly one slot. Collisions are resolved with a
/// depth-preferred replacement policy.
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let size = ((size_mb * 1024 * 1024) / entry_size).max(1024);
        Self {
            entries: vec![None; size],
            size,
        }
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    /// Cached score for `hash`, if the stored entry is deep enough and its
    /// bound allows a cutoff inside `[alpha, beta]`.
    #[must_use]
    pub fn probe(&self, hash: u64, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        let entry = self.entries[self.slot(hash)]?;
        if entry.hash != hash || entry.depth < depth {
            return None;
        }
        match entry.entry_type {
            EntryType::Exact => Some(entry.score),
            EntryType::LowerBound if entry.score >= beta => Some(entry.score),
            EntryType::UpperBound if entry.score <= alpha => Some(entry.score),
            _ => None,
        }
    }

    /// Best move from a previous search of this position, for move ordering.
    #[must_use]
    pub fn get_best_move(&self, hash: u64) -> Option<Pos> {
        self.entries[self.slot(hash)]
            .filter(|e| e.hash == hash)
            .and_then(|e| e.best_move)
    }

    /// Store a search result.
    ///
    /// Replaces the slot if it is empty, holds the same position, or holds
    /// an entry searched no deeper than this one.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u8,
        score: i32,
        entry_type: EntryType,
        best_move: Option<Pos>,
    ) {
        let idx = self.slot(hash);
        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => e.hash == hash || e.depth <= depth,
        };
        if should_replace {
            self.entries[idx] = Some(TTEntry {
                hash,
                depth,
                score,
                entry_type,
                best_move,
            });
        }
    }

    /// Clear all entries (new game).
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        TTStats {
            size: self.size,
            used,
            usage_percent: (used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}
