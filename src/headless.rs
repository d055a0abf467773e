//! Headless self-play
//!
//! Drives two engine configurations through complete games without any UI,
//! for benchmarking difficulty profiles against each other. A match of
//! several games runs in parallel on rayon's pool; each game builds its own
//! engines, so nothing is shared between games.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::board::{Board, Pos, Stone, TOTAL_CELLS};
use crate::config::{Difficulty, DifficultyParams, DifficultyTable, EngineConfig};
use crate::engine::Engine;
use crate::rules::{RenjuRules, RuleOracle};
use crate::search::generate_moves;

pub const DEFAULT_ELO: f64 = 1500.0;
pub const ELO_K_FACTOR: f64 = 32.0;

/// A named engine configuration taking part in a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerConfig {
    pub name: String,
    pub params: DifficultyParams,
}

impl PlayerConfig {
    pub fn new(name: impl Into<String>, params: DifficultyParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn from_difficulty(table: &DifficultyTable, difficulty: Difficulty) -> Self {
        Self::new(difficulty.name(), table.get(difficulty).clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadlessOptions {
    /// Stones placed before the game is declared a draw by move cap
    pub max_moves: usize,
    /// Base seed; each engine derives its own from it
    pub seed: Option<u64>,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            max_moves: TOTAL_CELLS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    Five,
    /// Black played a forbidden cell, or a player chose an occupied one
    Forbidden,
    Draw,
    MaxMoves,
}

impl fmt::Display for GameEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameEndReason::Five => "five",
            GameEndReason::Forbidden => "forbidden",
            GameEndReason::Draw => "draw",
            GameEndReason::MaxMoves => "max_moves",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Option<Stone>,
    pub reason: GameEndReason,
    /// Stones placed; an illegal final move is not counted
    pub moves: usize,
    pub duration: Duration,
    pub move_history: Vec<Pos>,
}

/// Anything that can pick a move for one side.
pub trait Contestant {
    fn next_move(&mut self, board: &Board, color: Stone) -> Pos;
}

struct EngineContestant {
    engine: Engine,
    params: DifficultyParams,
}

impl EngineContestant {
    fn new(player: &PlayerConfig, seed: Option<u64>) -> Self {
        let config = EngineConfig {
            seed,
            tt_size_mb: 4,
            simulate_thinking: false,
            ..EngineConfig::default()
        };
        Self {
            engine: Engine::new(config, DifficultyTable::default()),
            params: player.params.clone(),
        }
    }
}

impl Contestant for EngineContestant {
    fn next_move(&mut self, board: &Board, color: Stone) -> Pos {
        self.engine.play(board, color, &self.params).position
    }
}

/// Play one game, `black` moving first.
pub fn run_headless_game(black: &PlayerConfig, white: &PlayerConfig, options: &HeadlessOptions) -> GameResult {
    let mut black_engine = EngineContestant::new(black, options.seed);
    let mut white_engine = EngineContestant::new(white, options.seed.map(|s| s.wrapping_add(0x9E37_79B9)));
    let result = play_game(&mut black_engine, &mut white_engine, &RenjuRules, options.max_moves);
    info!(
        "{} (black) vs {} (white): {:?} by {} after {} moves",
        black.name, white.name, result.winner, result.reason, result.moves
    );
    result
}

/// Core game loop shared by engines and scripted contestants.
pub fn play_game(
    black: &mut dyn Contestant,
    white: &mut dyn Contestant,
    rules: &dyn RuleOracle,
    max_moves: usize,
) -> GameResult {
    let start = Instant::now();
    let mut board = Board::new();
    let mut history = Vec::new();
    let mut color = Stone::Black;

    let finish = |winner, reason, history: Vec<Pos>| GameResult {
        winner,
        reason,
        moves: history.len(),
        duration: start.elapsed(),
        move_history: history,
    };

    loop {
        if history.len() >= max_moves {
            return finish(None, GameEndReason::MaxMoves, history);
        }
        if board.is_full() || generate_moves(&board, color, rules).is_empty() {
            return finish(None, GameEndReason::Draw, history);
        }

        let pos = match color {
            Stone::Black => black.next_move(&board, color),
            _ => white.next_move(&board, color),
        };
        if !rules.is_legal(&board, pos, color) {
            debug!("{color:?} played illegal {pos}");
            return finish(Some(color.opponent()), GameEndReason::Forbidden, history);
        }

        board.place_stone(pos, color);
        history.push(pos);
        if rules.is_win(&board, pos, color) {
            return finish(Some(color), GameEndReason::Five, history);
        }
        color = color.opponent();
    }
}

/// Which side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    A,
    B,
}

/// One game of a match with the winner reported by player rather than color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchGame {
    pub a_color: Stone,
    pub winner: Option<Side>,
    pub result: GameResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EloRating {
    pub rating: f64,
    pub games: u32,
}

impl Default for EloRating {
    fn default() -> Self {
        Self::new(DEFAULT_ELO)
    }
}

impl EloRating {
    pub fn new(rating: f64) -> Self {
        Self { rating, games: 0 }
    }

    /// Expected score against `opponent` on the logistic 400-point scale.
    pub fn expected_score(&self, opponent: &EloRating) -> f64 {
        1.0 / (1.0 + 10f64.powf((opponent.rating - self.rating) / 400.0))
    }

    /// Apply one game. `score` is this player's result: 1 win, 0.5 draw, 0 loss.
    pub fn update(&mut self, opponent: &mut EloRating, score: f64, k: f64) {
        let expected = self.expected_score(opponent);
        let delta = k * (score - expected);
        self.rating += delta;
        opponent.rating -= delta;
        self.games += 1;
        opponent.games += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub player_a: String,
    pub player_b: String,
    pub a_wins: u32,
    pub b_wins: u32,
    pub draws: u32,
    pub rating_a: EloRating,
    pub rating_b: EloRating,
    pub games: Vec<MatchGame>,
}

impl MatchReport {
    fn new(a: &PlayerConfig, b: &PlayerConfig) -> Self {
        Self {
            player_a: a.name.clone(),
            player_b: b.name.clone(),
            a_wins: 0,
            b_wins: 0,
            draws: 0,
            rating_a: EloRating::default(),
            rating_b: EloRating::default(),
            games: Vec::new(),
        }
    }

    fn record(&mut self, game: MatchGame) {
        let score_a = match game.winner {
            Some(Side::A) => {
                self.a_wins += 1;
                1.0
            }
            Some(Side::B) => {
                self.b_wins += 1;
                0.0
            }
            None => {
                self.draws += 1;
                0.5
            }
        };
        self.rating_a.update(&mut self.rating_b, score_a, ELO_K_FACTOR);
        self.games.push(game);
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} vs {} over {} games", self.player_a, self.player_b, self.games.len())?;
        writeln!(f, "  {:<10} wins {:>3}  elo {:>7.1}", self.player_a, self.a_wins, self.rating_a.rating)?;
        writeln!(f, "  {:<10} wins {:>3}  elo {:>7.1}", self.player_b, self.b_wins, self.rating_b.rating)?;
        write!(f, "  draws {}", self.draws)
    }
}

/// Play `games` games, `a` taking Black in even-numbered games.
///
/// Games run in parallel; ratings are updated in game order.
pub fn run_multiple_games(
    a: &PlayerConfig,
    b: &PlayerConfig,
    games: usize,
    options: &HeadlessOptions,
) -> MatchReport {
    let played: Vec<MatchGame> = (0..games)
        .into_par_iter()
        .map(|i| {
            let game_options = HeadlessOptions {
                seed: options.seed.map(|s| s.wrapping_add(i as u64)),
                ..*options
            };
            let a_black = i % 2 == 0;
            let result = if a_black {
                run_headless_game(a, b, &game_options)
            } else {
                run_headless_game(b, a, &game_options)
            };
            let a_color = if a_black { Stone::Black } else { Stone::White };
            let winner = result.winner.map(|w| if w == a_color { Side::A } else { Side::B });
            MatchGame {
                a_color,
                winner,
                result,
            }
        })
        .collect();

    let mut report = MatchReport::new(a, b);
    for game in played {
        report.record(game);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CENTER;

    struct Scripted(std::vec::IntoIter<Pos>);

    impl Scripted {
        fn new(moves: &[(u8, u8)]) -> Self {
            Self(moves.iter().map(|&(r, c)| Pos::new(r, c)).collect::<Vec<_>>().into_iter())
        }
    }

    impl Contestant for Scripted {
        fn next_move(&mut self, _: &Board, _: Stone) -> Pos {
            self.0.next().unwrap_or(CENTER)
        }
    }

    fn far_white() -> Scripted {
        Scripted::new(&[(0, 0), (0, 2), (0, 4), (0, 6), (0, 8)])
    }

    #[test]
    fn test_five_ends_game() {
        let mut black = Scripted::new(&[(7, 3), (7, 4), (7, 5), (7, 6), (7, 7)]);
        let result = play_game(&mut black, &mut far_white(), &RenjuRules, 100);
        assert_eq!(result.winner, Some(Stone::Black));
        assert_eq!(result.reason, GameEndReason::Five);
        assert_eq!(result.moves, 9);
        assert_eq!(result.move_history.last(), Some(&Pos::new(7, 7)));
    }

    #[test]
    fn test_forbidden_move_loses_for_black() {
        let mut black = Scripted::new(&[(7, 6), (7, 8), (6, 7), (8, 7), (7, 7)]);
        let result = play_game(&mut black, &mut far_white(), &RenjuRules, 100);
        assert_eq!(result.winner, Some(Stone::White));
        assert_eq!(result.reason, GameEndReason::Forbidden);
        assert_eq!(result.moves, 8);
    }

    #[test]
    fn test_occupied_cell_loses() {
        let mut black = Scripted::new(&[(7, 7), (3, 3)]);
        let mut white = Scripted::new(&[(7, 7)]);
        let result = play_game(&mut black, &mut white, &RenjuRules, 100);
        assert_eq!(result.winner, Some(Stone::Black));
        assert_eq!(result.reason, GameEndReason::Forbidden);
        assert_eq!(result.moves, 1);
    }

    #[test]
    fn test_move_cap() {
        let mut black = Scripted::new(&[(7, 7), (7, 9), (9, 9)]);
        let mut white = Scripted::new(&[(1, 1), (1, 3), (1, 5)]);
        let result = play_game(&mut black, &mut white, &RenjuRules, 4);
        assert_eq!(result.winner, None);
        assert_eq!(result.reason, GameEndReason::MaxMoves);
        assert_eq!(result.move_history.len(), 4);
    }

    #[test]
    fn test_engine_game_history_is_consistent() {
        let table = DifficultyTable::default();
        let easy = PlayerConfig::from_difficulty(&table, Difficulty::Easy);
        let options = HeadlessOptions {
            max_moves: 12,
            seed: Some(21),
        };
        let result = run_headless_game(&easy, &easy, &options);
        assert_eq!(result.move_history.len(), result.moves);
        assert!(result.moves <= 12);
        assert_eq!(result.move_history[0], CENTER);
        let mut seen = result.move_history.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), result.moves);
    }

    #[test]
    fn test_multiple_games_alternate_colors() {
        let table = DifficultyTable::default();
        let a = PlayerConfig::from_difficulty(&table, Difficulty::Easy);
        let b = PlayerConfig::new("easy-2", table.get(Difficulty::Easy).clone());
        let options = HeadlessOptions {
            max_moves: 6,
            seed: Some(4),
        };
        let report = run_multiple_games(&a, &b, 4, &options);
        assert_eq!(report.games.len(), 4);
        assert_eq!(report.a_wins + report.b_wins + report.draws, 4);
        let colors: Vec<Stone> = report.games.iter().map(|g| g.a_color).collect();
        assert_eq!(colors, vec![Stone::Black, Stone::White, Stone::Black, Stone::White]);
        assert_eq!(report.rating_a.games, 4);
    }

    #[test]
    fn test_elo_expected_and_update() {
        let mut a = EloRating::default();
        let mut b = EloRating::default();
        assert!((a.expected_score(&b) - 0.5).abs() < 1e-9);

        a.update(&mut b, 1.0, ELO_K_FACTOR);
        assert!((a.rating - 1516.0).abs() < 1e-9);
        assert!((b.rating - 1484.0).abs() < 1e-9);

        let stronger = EloRating::new(1900.0);
        let weaker = EloRating::new(1500.0);
        assert!((stronger.expected_score(&weaker) - 10.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_elo_draw_between_equals_is_neutral() {
        let mut report = MatchReport::new(
            &PlayerConfig::new("a", DifficultyParams::easy()),
            &PlayerConfig::new("b", DifficultyParams::easy()),
        );
        report.record(MatchGame {
            a_color: Stone::Black,
            winner: None,
            result: GameResult {
                winner: None,
                reason: GameEndReason::Draw,
                moves: 0,
                duration: Duration::ZERO,
                move_history: Vec::new(),
            },
        });
        assert_eq!(report.draws, 1);
        assert!((report.rating_a.rating - DEFAULT_ELO).abs() < 1e-9);
    }
}
