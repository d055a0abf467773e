//! Engine orchestrator
//!
//! [`Engine::handle`] answers one [`MoveRequest`]. The move comes from the
//! first stage that produces one:
//!
//! 1. **Opening book** for the first three stones, answered after an
//!    artificial delay so the perceived thinking time stays consistent
//! 2. **Forced wins** (when the difficulty enables it): an immediate five,
//!    a block of the opponent's five, VCF, then VCT from eight stones on
//! 3. **Alpha-Beta**: iterative deepening under the difficulty's limits
//!
//! Any error or panic below `handle` is contained there and turned into a
//! center-cell response with zero score and depth.
//!
//! # Example
//!
//! ```
//! use renju::board::{Board, Stone, CENTER};
//! use renju::config::{Difficulty, DifficultyTable, EngineConfig};
//! use renju::engine::{Engine, MoveRequest};
//!
//! let mut engine = Engine::new(EngineConfig::seeded(7), DifficultyTable::default());
//! let request = MoveRequest::new(&Board::new(), Stone::Black, Difficulty::Easy);
//! let response = engine.handle(&request);
//! assert_eq!(response.position, CENTER);
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone, CENTER};
use crate::config::{Difficulty, DifficultyParams, DifficultyTable, EngineConfig};
use crate::error::EngineError;
use crate::eval::{Evaluator, PatternScore};
use crate::opening::OpeningBook;
use crate::rules::{RenjuRules, RuleOracle};
use crate::search::{generate_moves, Searcher, TTStats, ThreatSearcher, TranspositionTable, ZobristTable};

/// VCT is only tried once this many stones are on the board
const VCT_MIN_STONES: u32 = 8;

/// One move request, as sent by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// 15 rows of 15 cells
    pub board: Vec<Vec<Stone>>,
    pub current_turn: Stone,
    pub difficulty: Difficulty,
}

impl MoveRequest {
    pub fn new(board: &Board, current_turn: Stone, difficulty: Difficulty) -> Self {
        Self {
            board: board.to_cells(),
            current_turn,
            difficulty,
        }
    }
}

/// Which stage produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveSource {
    Book,
    ImmediateWin,
    Block,
    Vcf,
    Vct,
    Search,
    #[default]
    Fallback,
}

impl fmt::Display for MoveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveSource::Book => "book",
            MoveSource::ImmediateWin => "five",
            MoveSource::Block => "block",
            MoveSource::Vcf => "vcf",
            MoveSource::Vct => "vct",
            MoveSource::Search => "search",
            MoveSource::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// The engine's answer to a [`MoveRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub position: Pos,
    pub score: i32,
    /// Wall-clock milliseconds, including any book delay
    pub thinking_time: u64,
    pub depth: u8,
    #[serde(skip)]
    pub source: MoveSource,
}

impl MoveResponse {
    fn fallback(elapsed: Duration) -> Self {
        Self {
            position: CENTER,
            score: 0,
            thinking_time: elapsed.as_millis() as u64,
            depth: 0,
            source: MoveSource::Fallback,
        }
    }
}

/// Per-engine search state: Zobrist keys, transposition table, RNG.
///
/// Built once per engine. The transposition table is reused across the
/// moves of a game played under one difficulty profile. It is cleared by
/// [`Engine::new_game`] and whenever the profile changes.
pub struct EngineContext {
    pub zobrist: ZobristTable,
    pub tt: TranspositionTable,
    pub rng: ChaCha8Rng,
    /// Profile whose scores the transposition table currently holds
    tt_profile: Option<DifficultyParams>,
}

impl EngineContext {
    /// Seeded contexts are fully reproducible; `None` draws from OS entropy.
    pub fn new(seed: Option<u64>, tt_size_mb: usize) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let zobrist = ZobristTable::new(&mut rng);
        Self {
            zobrist,
            tt: TranspositionTable::new(tt_size_mb),
            rng,
            tt_profile: None,
        }
    }

    /// Scores from another evaluator or depth are not comparable.
    fn bind_profile(&mut self, params: &DifficultyParams) {
        if self.tt_profile.as_ref() != Some(params) {
            if self.tt_profile.is_some() {
                debug!("difficulty profile changed, clearing transposition table");
            }
            self.tt.clear();
            self.tt_profile = Some(params.clone());
        }
    }
}

/// Main engine: opening book, forced-win stage and alpha-beta search.
pub struct Engine {
    rules: Box<dyn RuleOracle>,
    config: EngineConfig,
    table: DifficultyTable,
    book: OpeningBook,
    ctx: EngineContext,
}

impl Engine {
    /// Engine playing standard Renju rules.
    pub fn new(config: EngineConfig, table: DifficultyTable) -> Self {
        Self::with_rules(Box::new(RenjuRules), config, table)
    }

    pub fn with_rules(rules: Box<dyn RuleOracle>, config: EngineConfig, table: DifficultyTable) -> Self {
        let ctx = EngineContext::new(config.seed, config.tt_size_mb);
        Self {
            rules,
            config,
            table,
            book: OpeningBook::new(),
            ctx,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn difficulty_table(&self) -> &DifficultyTable {
        &self.table
    }

    pub fn tt_stats(&self) -> TTStats {
        self.ctx.tt.stats()
    }

    /// Forget cached positions from the previous game.
    pub fn new_game(&mut self) {
        self.ctx.tt.clear();
        self.ctx.tt_profile = None;
    }

    /// Answer a request. Never fails: problems yield the center fallback.
    pub fn handle(&mut self, request: &MoveRequest) -> MoveResponse {
        self.handle_with_cancel(request, None)
    }

    /// [`Engine::handle`] with a cooperative cancel flag for the search.
    pub fn handle_with_cancel(&mut self, request: &MoveRequest, cancel: Option<Arc<AtomicBool>>) -> MoveResponse {
        self.guarded(|engine, start| engine.try_handle(request, cancel, start))
    }

    /// Answer with explicit parameters instead of a named difficulty.
    /// Fails over to the center cell like [`Engine::handle`].
    pub fn play(&mut self, board: &Board, color: Stone, params: &DifficultyParams) -> MoveResponse {
        self.guarded(|engine, start| engine.think(board, color, params, None, start))
    }

    fn guarded<F>(&mut self, stage: F) -> MoveResponse
    where
        F: FnOnce(&mut Self, Instant) -> Result<MoveResponse, EngineError>,
    {
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| stage(self, start)));

        match outcome {
            Ok(Ok(response)) => {
                info!(
                    "{} move {} score {} depth {} in {}ms",
                    response.source, response.position, response.score, response.depth, response.thinking_time
                );
                response
            }
            Ok(Err(err)) => {
                warn!("falling back to center: {err}");
                MoveResponse::fallback(start.elapsed())
            }
            Err(payload) => {
                let err = EngineError::SearchPanicked(panic_message(payload.as_ref()));
                error!("{err}");
                // The table may hold entries from the interrupted search
                self.ctx.tt.clear();
                MoveResponse::fallback(start.elapsed())
            }
        }
    }

    fn try_handle(
        &mut self,
        request: &MoveRequest,
        cancel: Option<Arc<AtomicBool>>,
        start: Instant,
    ) -> Result<MoveResponse, EngineError> {
        let board = Board::from_cells(&request.board)?;
        if request.current_turn == Stone::Empty {
            return Err(EngineError::InvalidColor);
        }
        let params = self.table.get(request.difficulty).clone();
        self.think(&board, request.current_turn, &params, cancel, start)
    }

    /// Choose a move for `color` under `params`.
    pub fn think(
        &mut self,
        board: &Board,
        color: Stone,
        params: &DifficultyParams,
        cancel: Option<Arc<AtomicBool>>,
        start: Instant,
    ) -> Result<MoveResponse, EngineError> {
        if color == Stone::Empty {
            return Err(EngineError::InvalidColor);
        }
        self.ctx.bind_profile(params);
        let respond = |position: Pos, score: i32, depth: u8, source: MoveSource| MoveResponse {
            position,
            score,
            thinking_time: start.elapsed().as_millis() as u64,
            depth,
            source,
        };

        if let Some(book) = self.book.lookup(board, color, &mut self.ctx.rng) {
            if self.rules.is_legal(board, book.position, color) {
                let delay = self.config.book_delay(params);
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                return Ok(respond(book.position, 0, 0, MoveSource::Book));
            }
        }

        if params.threat_search {
            if let Some((position, score, depth, source)) = self.forced_move(board, color, params) {
                return Ok(respond(position, score, depth, source));
            }
        }

        let rules: &dyn RuleOracle = self.rules.as_ref();
        let evaluator = Evaluator::new(rules, params.evaluation_options);
        let mut limits = params.search_limits();
        limits.time_limit = limits.time_limit.saturating_sub(start.elapsed());
        if let Some(flag) = cancel {
            limits = limits.with_cancel(flag);
        }

        let mut searcher = Searcher::new(rules, evaluator, &self.ctx.zobrist, &mut self.ctx.tt);
        let result = searcher.find_best_move_iterative(board, color, &limits, &mut self.ctx.rng)?;
        Ok(respond(result.position, result.score, result.completed_depth, MoveSource::Search))
    }

    /// Forced-win stage: five, block, VCF, VCT.
    fn forced_move(
        &self,
        board: &Board,
        color: Stone,
        params: &DifficultyParams,
    ) -> Option<(Pos, i32, u8, MoveSource)> {
        let rules = self.rules.as_ref();
        let candidates = generate_moves(board, color, rules);

        if let Some(&win) = candidates.iter().find(|&&p| rules.completes_five(board, p, color)) {
            return Some((win, PatternScore::FIVE, 1, MoveSource::ImmediateWin));
        }

        let opponent = color.opponent();
        if let Some(&block) = candidates.iter().find(|&&p| rules.completes_five(board, p, opponent)) {
            let score = Evaluator::new(rules, params.evaluation_options).evaluate_position(board, block, color);
            return Some((block, score, 1, MoveSource::Block));
        }

        let mut threats = ThreatSearcher::new(rules);
        let vcf = threats.find_vcf(board, color);
        if let Some(first) = vcf.first_move() {
            return Some((first, PatternScore::FIVE, line_depth(&vcf.sequence), MoveSource::Vcf));
        }

        if board.stone_count() >= VCT_MIN_STONES {
            let vct = threats.find_vct(board, color);
            if let Some(first) = vct.first_move() {
                return Some((first, PatternScore::FIVE, line_depth(&vct.sequence), MoveSource::Vct));
            }
        }
        None
    }
}

fn line_depth(sequence: &[Pos]) -> u8 {
    u8::try_from(sequence.len()).unwrap_or(u8::MAX)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Panics on every query, to exercise the fallback path.
    struct BrokenRules;

    impl RuleOracle for BrokenRules {
        fn is_forbidden(&self, _: &Board, _: Pos) -> bool {
            panic!("oracle offline")
        }
        fn completes_five(&self, _: &Board, _: Pos, _: Stone) -> bool {
            panic!("oracle offline")
        }
        fn is_win(&self, _: &Board, _: Pos, _: Stone) -> bool {
            panic!("oracle offline")
        }
        fn recognize_line_patterns(&self, _: &Board, _: Pos, _: Stone) -> [crate::rules::PatternType; 4] {
            panic!("oracle offline")
        }
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::seeded(5), DifficultyTable::default())
    }

    fn setup_board(stones: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new();
        for &(r, c, s) in stones {
            board.place_stone(Pos::new(r, c), s);
        }
        board
    }

    fn ask(engine: &mut Engine, board: &Board, color: Stone, difficulty: Difficulty) -> MoveResponse {
        engine.handle(&MoveRequest::new(board, color, difficulty))
    }

    #[test]
    fn test_empty_board_center_from_book() {
        let mut e = engine();
        for d in Difficulty::ALL {
            let r = ask(&mut e, &Board::new(), Stone::Black, d);
            assert_eq!(r.position, CENTER);
            assert_eq!(r.source, MoveSource::Book);
            assert_eq!(r.depth, 0);
        }
    }

    #[test]
    fn test_book_delay_applied() {
        let mut table = DifficultyTable::default();
        let mut params = DifficultyParams::easy();
        params.time_limit_ms = 200;
        table.set(Difficulty::Easy, params);
        let config = EngineConfig {
            simulate_thinking: true,
            book_delay_percent: 50,
            ..EngineConfig::seeded(1)
        };
        let mut e = Engine::new(config, table);
        let r = ask(&mut e, &Board::new(), Stone::Black, Difficulty::Easy);
        assert!(r.thinking_time >= 100);
    }

    #[test]
    fn test_immediate_win_taken() {
        let board = setup_board(&[
            (7, 3, Stone::White),
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 2, Stone::Black),
            (8, 8, Stone::Black),
            (9, 9, Stone::Black),
        ]);
        let r = ask(&mut engine(), &board, Stone::White, Difficulty::Normal);
        assert_eq!(r.position, Pos::new(7, 7));
        assert_eq!(r.score, PatternScore::FIVE);
        assert_eq!(r.source, MoveSource::ImmediateWin);
    }

    #[test]
    fn test_opponent_five_blocked() {
        let board = setup_board(&[
            (7, 3, Stone::Black),
            (7, 4, Stone::Black),
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (7, 2, Stone::White),
            (8, 8, Stone::White),
            (9, 9, Stone::White),
        ]);
        let r = ask(&mut engine(), &board, Stone::White, Difficulty::Hard);
        assert_eq!(r.position, Pos::new(7, 7));
        assert_eq!(r.source, MoveSource::Block);
    }

    #[test]
    fn test_vcf_line_played() {
        let board = setup_board(&[
            (7, 2, Stone::Black),
            (7, 3, Stone::White),
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (5, 4, Stone::White),
            (6, 5, Stone::White),
            (0, 0, Stone::Black),
            (14, 14, Stone::Black),
        ]);
        let r = ask(&mut engine(), &board, Stone::White, Difficulty::Expert);
        assert_eq!(r.source, MoveSource::Vcf);
        assert_eq!(r.position, Pos::new(7, 6));
        assert_eq!(r.depth, 2);
    }

    #[test]
    fn test_search_move_is_legal_for_black() {
        // (7, 7) is a double three for Black
        let board = setup_board(&[
            (7, 6, Stone::Black),
            (7, 8, Stone::Black),
            (6, 7, Stone::Black),
            (8, 7, Stone::Black),
            (6, 6, Stone::White),
            (8, 8, Stone::White),
            (6, 8, Stone::White),
            (5, 5, Stone::White),
        ]);
        let r = ask(&mut engine(), &board, Stone::Black, Difficulty::Easy);
        assert_eq!(r.source, MoveSource::Search);
        assert!(RenjuRules.is_legal(&board, r.position, Stone::Black));
        assert!(r.depth >= 1);
    }

    #[test]
    fn test_malformed_board_falls_back() {
        let request = MoveRequest {
            board: vec![vec![Stone::Empty; 15]; 3],
            current_turn: Stone::Black,
            difficulty: Difficulty::Easy,
        };
        let r = engine().handle(&request);
        assert_eq!(r.position, CENTER);
        assert_eq!(r.score, 0);
        assert_eq!(r.depth, 0);
        assert_eq!(r.source, MoveSource::Fallback);
    }

    #[test]
    fn test_empty_color_falls_back() {
        let r = ask(&mut engine(), &setup_board(&[(3, 3, Stone::Black)]), Stone::Empty, Difficulty::Easy);
        assert_eq!(r.source, MoveSource::Fallback);
        assert_eq!(r.position, CENTER);
    }

    #[test]
    fn test_panic_is_contained() {
        let mut e = Engine::with_rules(Box::new(BrokenRules), EngineConfig::seeded(2), DifficultyTable::default());
        let board = setup_board(&[(7, 7, Stone::Black), (7, 8, Stone::White), (8, 8, Stone::Black)]);
        let r = ask(&mut e, &board, Stone::White, Difficulty::Normal);
        assert_eq!(r.source, MoveSource::Fallback);
        assert_eq!(r.position, CENTER);
        assert_eq!(r.depth, 0);
    }

    #[test]
    fn test_table_reused_then_cleared() {
        let mut e = engine();
        let board = setup_board(&[(7, 7, Stone::Black), (7, 8, Stone::White), (8, 8, Stone::Black)]);
        let _ = ask(&mut e, &board, Stone::White, Difficulty::Easy);
        assert!(e.tt_stats().used > 0);
        e.new_game();
        assert_eq!(e.tt_stats().used, 0);
    }

    #[test]
    fn test_table_cleared_on_difficulty_change() {
        let mut e = engine();
        let board = setup_board(&[(7, 7, Stone::Black), (7, 8, Stone::White), (8, 8, Stone::Black)]);
        let _ = ask(&mut e, &board, Stone::White, Difficulty::Easy);
        let used = e.tt_stats().used;
        assert!(used > 0);

        // Same profile: entries survive a book answer
        let _ = ask(&mut e, &Board::new(), Stone::Black, Difficulty::Easy);
        assert_eq!(e.tt_stats().used, used);

        let _ = ask(&mut e, &Board::new(), Stone::Black, Difficulty::Normal);
        assert_eq!(e.tt_stats().used, 0);
    }

    #[test]
    fn test_request_json_camel_case() {
        let mut board = Board::new();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        let request = MoveRequest::new(&board, Stone::White, Difficulty::Hard);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"currentTurn\":\"white\""));
        assert!(json.contains("\"difficulty\":\"hard\""));
        let back: MoveRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_response_json_shape() {
        let response = MoveResponse {
            position: Pos::new(3, 4),
            score: 12,
            thinking_time: 40,
            depth: 3,
            source: MoveSource::Search,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"position": {"row": 3, "col": 4}, "score": 12, "thinkingTime": 40, "depth": 3})
        );
    }

    #[test]
    fn test_seeded_engines_agree() {
        let board = setup_board(&[(7, 7, Stone::Black), (6, 8, Stone::White)]);
        let a = ask(&mut engine(), &board, Stone::Black, Difficulty::Normal);
        let b = ask(&mut engine(), &board, Stone::Black, Difficulty::Normal);
        assert_eq!(a.position, b.position);
        assert_eq!(a.source, MoveSource::Book);
    }
}
