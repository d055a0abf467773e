use std::io::Write;

use renju::config::{Difficulty, DifficultyTable};
use renju::headless::{run_headless_game, run_multiple_games, GameEndReason, HeadlessOptions, PlayerConfig, Side};
use renju::{Board, RenjuRules, RuleOracle, Stone, CENTER};

fn quick_table() -> DifficultyTable {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[easy]
max_depth = 1
time_limit_ms = 50
random_factor = 0.0
threat_search = false

[normal]
max_depth = 2
time_limit_ms = 100
random_factor = 0.0
max_nodes = 5000
max_width = 6
"#
    )
    .unwrap();
    DifficultyTable::load(file.path()).unwrap()
}

#[test]
fn test_headless_game_replays_legally() {
    let table = quick_table();
    let black = PlayerConfig::from_difficulty(&table, Difficulty::Normal);
    let white = PlayerConfig::from_difficulty(&table, Difficulty::Easy);
    let options = HeadlessOptions {
        max_moves: 30,
        seed: Some(8),
    };
    let result = run_headless_game(&black, &white, &options);

    assert_eq!(result.move_history.len(), result.moves);
    assert_eq!(result.move_history.first(), Some(&CENTER));

    let mut board = Board::new();
    let mut color = Stone::Black;
    for &pos in &result.move_history {
        assert!(RenjuRules.is_legal(&board, pos, color), "{color:?} at {pos}");
        board.place_stone(pos, color);
        color = color.opponent();
    }

    match result.reason {
        GameEndReason::Five => {
            let last = *result.move_history.last().unwrap();
            let winner = result.winner.unwrap();
            assert!(RenjuRules.is_win(&board, last, winner));
        }
        GameEndReason::MaxMoves => {
            assert_eq!(result.moves, 30);
            assert_eq!(result.winner, None);
        }
        GameEndReason::Forbidden => assert!(result.winner.is_some()),
        GameEndReason::Draw => assert_eq!(result.winner, None),
    }
}

#[test]
fn test_seeded_games_are_reproducible() {
    let table = quick_table();
    let easy = PlayerConfig::from_difficulty(&table, Difficulty::Easy);
    let options = HeadlessOptions {
        max_moves: 16,
        seed: Some(77),
    };
    let first = run_headless_game(&easy, &easy, &options);
    let second = run_headless_game(&easy, &easy, &options);
    assert_eq!(first.move_history, second.move_history);
    assert_eq!(first.reason, second.reason);
}

#[test]
fn test_match_report_normalizes_winners() {
    let table = quick_table();
    let a = PlayerConfig::from_difficulty(&table, Difficulty::Normal);
    let b = PlayerConfig::from_difficulty(&table, Difficulty::Easy);
    let options = HeadlessOptions {
        max_moves: 40,
        seed: Some(3),
    };
    let report = run_multiple_games(&a, &b, 4, &options);

    assert_eq!(report.player_a, "normal");
    assert_eq!(report.player_b, "easy");
    assert_eq!(report.a_wins + report.b_wins + report.draws, 4);
    for game in &report.games {
        let expected = game.result.winner.map(|w| if w == game.a_color { Side::A } else { Side::B });
        assert_eq!(game.winner, expected);
    }
    // Rating points only move between the two players
    let total = report.rating_a.rating + report.rating_b.rating;
    assert!((total - 3000.0).abs() < 1e-6);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["games"].as_array().map(Vec::len), Some(4));
}
