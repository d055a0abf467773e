//! Alpha-Beta search with iterative deepening and transposition table
//!
//! Negamax with alpha-beta pruning over the candidate generator, ordered by
//! [`order_moves`]. The board is mutated in place with make/unmake, so every
//! child sees exactly its own line and the parent gets its board back
//! unchanged.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use renju::board::{Board, Pos, Stone};
//! use renju::eval::{EvaluationOptions, Evaluator};
//! use renju::rules::RenjuRules;
//! use renju::search::{SearchLimits, Searcher, TranspositionTable, ZobristTable};
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let zobrist = ZobristTable::new(&mut rng);
//! let mut tt = TranspositionTable::new(1);
//! let rules = RenjuRules;
//! let evaluator = Evaluator::new(&rules, EvaluationOptions::basic());
//!
//! let mut board = Board::new();
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//!
//! let mut searcher = Searcher::new(&rules, evaluator, &zobrist, &mut tt);
//! let limits = SearchLimits::new(2, Duration::from_millis(200));
//! let result = searcher
//!     .find_best_move_iterative(&board, Stone::White, &limits, &mut rng)
//!     .unwrap();
//! assert!(board.is_empty(result.position));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use rand::Rng;

use crate::board::{Board, Pos, Stone};
use crate::error::EngineError;
use crate::eval::{evaluate_board, Evaluator, PatternScore};
use crate::rules::RuleOracle;

use super::movegen::generate_moves;
use super::ordering::{order_moves, HistoryTable, KillerMoves, ScoredMove};
use super::{EntryType, TranspositionTable, ZobristTable};

/// Infinity score for alpha-beta bounds
const INF: i32 = PatternScore::FIVE + 1;

/// Maximum moves to consider at root.
pub const ROOT_WIDTH: usize = 30;

/// Default cap on ordered moves at internal nodes.
pub const DEFAULT_MAX_WIDTH: usize = 15;

/// Budget for one top-level search.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    pub max_depth: u8,
    pub time_limit: Duration,
    /// Node ceiling, enforced from the second iteration onward
    pub max_nodes: Option<u64>,
    /// Probability of picking among the top third instead of the best move
    pub random_factor: f64,
    /// Ordered candidates searched at internal nodes
    pub max_width: usize,
    /// Cooperative stop flag, read between iterations
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    pub fn new(max_depth: u8, time_limit: Duration) -> Self {
        Self {
            max_depth: max_depth.max(1),
            time_limit,
            max_nodes: None,
            random_factor: 0.0,
            max_width: DEFAULT_MAX_WIDTH,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: Option<u64>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    #[must_use]
    pub fn with_random_factor(mut self, random_factor: f64) -> Self {
        self.random_factor = random_factor.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width.max(1);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Search result containing the chosen move and associated statistics.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub position: Pos,
    /// Score of the best move from the mover's point of view
    pub score: i32,
    /// Deepest fully completed iteration
    pub completed_depth: u8,
    /// Stopped by time, node ceiling or cancel before `max_depth`
    pub interrupted: bool,
    pub nodes: u64,
    /// Root moves with their scores from the last completed iteration, best first
    pub root_scores: Vec<(Pos, i32)>,
}

struct RootOutcome {
    best: Pos,
    score: i32,
    scores: Vec<(Pos, i32)>,
}

/// Single-threaded alpha-beta searcher.
///
/// Killer and history tables live for one top-level call. The
/// transposition table is borrowed from the caller and may be reused
/// across the moves of a game.
pub struct Searcher<'a> {
    rules: &'a dyn RuleOracle,
    evaluator: Evaluator<'a>,
    zobrist: &'a ZobristTable,
    tt: &'a mut TranspositionTable,
    killers: KillerMoves,
    history: HistoryTable,
    nodes: u64,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    aborted: bool,
    max_width: usize,
}

impl<'a> Searcher<'a> {
    pub fn new(
        rules: &'a dyn RuleOracle,
        evaluator: Evaluator<'a>,
        zobrist: &'a ZobristTable,
        tt: &'a mut TranspositionTable,
    ) -> Self {
        Self {
            rules,
            evaluator,
            zobrist,
            tt,
            killers: KillerMoves::new(),
            history: HistoryTable::new(),
            nodes: 0,
            node_limit: None,
            deadline: None,
            aborted: false,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    fn reset(&mut self, max_width: usize) {
        self.killers.clear();
        self.history.clear();
        self.nodes = 0;
        self.node_limit = None;
        self.deadline = None;
        self.aborted = false;
        self.max_width = max_width;
    }

    /// Iterative deepening from depth 1 up to `limits.max_depth`.
    ///
    /// Before each iteration past the first, stops when half the time
    /// budget is gone or the cancel flag is set. From depth 2 on the node
    /// ceiling and the full time budget are also enforced inside the
    /// recursion; an iteration cut short by either is discarded. The
    /// depth-1 result is always kept.
    pub fn find_best_move_iterative<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        color: Stone,
        limits: &SearchLimits,
        rng: &mut R,
    ) -> Result<SearchResult, EngineError> {
        let start = Instant::now();
        self.reset(limits.max_width);

        let mut work = board.clone();
        let hash = self.zobrist.hash(&work, color);
        let mut best: Option<(RootOutcome, u8)> = None;
        let mut interrupted = false;

        for depth in 1..=limits.max_depth.max(1) {
            if depth > 1 {
                if start.elapsed() >= limits.time_limit / 2 || limits.cancelled() {
                    interrupted = true;
                    break;
                }
                self.node_limit = limits.max_nodes;
                self.deadline = start.checked_add(limits.time_limit);
            }

            let outcome = self.search_root(&mut work, color, depth, hash)?;
            if self.aborted {
                interrupted = true;
                break;
            }

            debug!(
                "depth {} score {} move {} nodes {} elapsed {:?}",
                depth,
                outcome.score,
                outcome.best,
                self.nodes,
                start.elapsed()
            );

            let proven = outcome.score.abs() >= PatternScore::FIVE;
            best = Some((outcome, depth));
            if proven {
                break;
            }
        }

        let (outcome, completed_depth) = best.ok_or(EngineError::NoLegalMove(color))?;
        let (position, score) = pick_move(&outcome, limits.random_factor, rng);

        Ok(SearchResult {
            position,
            score,
            completed_depth,
            interrupted,
            nodes: self.nodes,
            root_scores: outcome.scores,
        })
    }

    /// One full-width pass at a fixed depth, without time or node limits.
    pub fn search_depth(&mut self, board: &Board, color: Stone, depth: u8) -> Result<SearchResult, EngineError> {
        self.reset(self.max_width);
        let depth = depth.max(1);
        let mut work = board.clone();
        let hash = self.zobrist.hash(&work, color);
        let outcome = self.search_root(&mut work, color, depth, hash)?;
        Ok(SearchResult {
            position: outcome.best,
            score: outcome.score,
            completed_depth: depth,
            interrupted: false,
            nodes: self.nodes,
            root_scores: outcome.scores,
        })
    }

    /// Nodes visited by the last call
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn search_root(
        &mut self,
        board: &mut Board,
        color: Stone,
        depth: u8,
        hash: u64,
    ) -> Result<RootOutcome, EngineError> {
        let candidates = generate_moves(board, color, self.rules);
        if candidates.is_empty() {
            return Err(EngineError::NoLegalMove(color));
        }

        let tt_move = self.tt.get_best_move(hash);
        let mut moves = self.ordered(board, color, &candidates, tt_move, 0);
        moves.truncate(ROOT_WIDTH);

        let mut alpha = -INF;
        let beta = INF;
        let mut best_move = moves[0].pos;
        let mut best_score = -INF;
        let mut scores = Vec::with_capacity(moves.len());

        for m in &moves {
            board.place_stone(m.pos, color);
            let child_hash = self.zobrist.toggle_side(self.zobrist.update(hash, m.pos, color));
            let score = -self.negamax(board, color.opponent(), depth - 1, 1, -beta, -alpha, child_hash, m.pos);
            board.remove_stone(m.pos);

            if self.aborted {
                break;
            }

            scores.push((m.pos, score));
            if score > best_score {
                best_score = score;
                best_move = m.pos;
            }
            alpha = alpha.max(score);
        }

        if !self.aborted {
            self.tt.store(hash, depth, best_score, EntryType::Exact, Some(best_move));
        }

        scores.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(RootOutcome {
            best: best_move,
            score: best_score,
            scores,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        board: &mut Board,
        color: Stone,
        depth: u8,
        ply: usize,
        mut alpha: i32,
        beta: i32,
        hash: u64,
        last_move: Pos,
    ) -> i32 {
        if self.aborted {
            return 0;
        }
        self.nodes += 1;
        if self.node_limit.is_some_and(|limit| self.nodes > limit)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.aborted = true;
            return 0;
        }

        // The previous move may have ended the game
        if self.rules.is_win(board, last_move, color.opponent()) {
            return -PatternScore::FIVE;
        }
        if depth == 0 {
            return evaluate_board(board, color);
        }

        if let Some(score) = self.tt.probe(hash, depth, alpha, beta) {
            return score;
        }

        let candidates = generate_moves(board, color, self.rules);
        if candidates.is_empty() {
            return 0;
        }

        let tt_move = self.tt.get_best_move(hash);
        let mut moves = self.ordered(board, color, &candidates, tt_move, ply);
        moves.truncate(self.max_width);

        let alpha_orig = alpha;
        let mut best_score = -INF;
        let mut best_move = None;

        for m in &moves {
            board.place_stone(m.pos, color);
            let child_hash = self.zobrist.toggle_side(self.zobrist.update(hash, m.pos, color));
            let score = -self.negamax(board, color.opponent(), depth - 1, ply + 1, -beta, -alpha, child_hash, m.pos);
            board.remove_stone(m.pos);

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(m.pos);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.killers.record(ply, m.pos);
                self.history.record(m.pos, depth);
                break;
            }
        }

        let entry_type = if best_score <= alpha_orig {
            EntryType::UpperBound
        } else if best_score >= beta {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };
        self.tt.store(hash, depth, best_score, entry_type, best_move);

        best_score
    }

    /// Ordered candidates. Vetoed moves are dropped while any other move remains.
    fn ordered(
        &self,
        board: &Board,
        color: Stone,
        candidates: &[Pos],
        tt_move: Option<Pos>,
        ply: usize,
    ) -> Vec<ScoredMove> {
        let mut moves = order_moves(
            board,
            color,
            candidates,
            tt_move,
            self.killers.get(ply),
            &self.history,
            &self.evaluator,
        );
        if moves
            .iter()
            .any(|m| m.static_score != PatternScore::MANDATORY_DEFENSE_VETO)
        {
            moves.retain(|m| m.static_score != PatternScore::MANDATORY_DEFENSE_VETO);
        }
        moves
    }
}

/// Best root move, or with probability `random_factor` a uniform pick from
/// the top third. A proven win is never randomized away.
fn pick_move<R: Rng + ?Sized>(outcome: &RootOutcome, random_factor: f64, rng: &mut R) -> (Pos, i32) {
    let n = outcome.scores.len();
    if n >= 2
        && random_factor > 0.0
        && outcome.score < PatternScore::FIVE
        && rng.gen::<f64>() < random_factor
    {
        // Proven losses never take part in the draw
        let pool: Vec<(Pos, i32)> = outcome.scores[..n.div_ceil(3)]
            .iter()
            .copied()
            .filter(|&(_, score)| score > -PatternScore::FIVE)
            .collect();
        if !pool.is_empty() {
            return pool[rng.gen_range(0..pool.len())];
        }
    }
    (outcome.best, outcome.score)
}
