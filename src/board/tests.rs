use super::*;

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(7, 7); // Center
    assert_eq!(pos.to_index(), 7 * 15 + 7);
    assert_eq!(pos.to_index(), 112);

    let pos2 = Pos::from_index(112);
    assert_eq!(pos2, CENTER);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0));
    assert!(Pos::is_valid(14, 14));
    assert!(!Pos::is_valid(-1, 0));
    assert!(!Pos::is_valid(0, -1));
    assert!(!Pos::is_valid(15, 0));
    assert!(!Pos::is_valid(0, 15));
}

#[test]
fn test_pos_try_new_rejects_out_of_range() {
    assert_eq!(Pos::try_new(3, 4).unwrap(), Pos::new(3, 4));
    assert!(matches!(
        Pos::try_new(15, 2),
        Err(EngineError::OutOfBounds { row: 15, col: 2 })
    ));
    assert!(Pos::try_new(-1, 7).is_err());
}

#[test]
fn test_board_constants() {
    assert_eq!(BOARD_SIZE, 15);
    assert_eq!(TOTAL_CELLS, 225);
}

#[test]
fn test_pos_ordering() {
    let pos1 = Pos::new(0, 0);
    let pos2 = Pos::new(0, 1);
    let pos3 = Pos::new(1, 0);

    assert!(pos1 < pos2);
    assert!(pos2 < pos3);
}

#[test]
fn test_pos_offset_and_distances() {
    assert_eq!(CENTER.offset(-2, 3), Some(Pos::new(5, 10)));
    assert_eq!(Pos::new(0, 0).offset(-1, 0), None);
    assert_eq!(Pos::new(14, 14).offset(0, 1), None);
    assert_eq!(Pos::new(2, 3).chebyshev(Pos::new(5, 4)), 3);
    assert_eq!(Pos::new(0, 0).manhattan(CENTER), 14);
}

#[test]
fn test_pos_corner_indices() {
    assert_eq!(Pos::new(0, 0).to_index(), 0);
    assert_eq!(Pos::new(0, 14).to_index(), 14);
    assert_eq!(Pos::new(14, 0).to_index(), 210);
    assert_eq!(Pos::new(14, 14).to_index(), 224);
}

#[test]
fn test_place_and_remove() {
    let mut board = Board::new();
    assert!(board.is_board_empty());

    board.place_stone(CENTER, Stone::Black);
    board.place_stone(Pos::new(7, 8), Stone::White);
    assert_eq!(board.get(CENTER), Stone::Black);
    assert_eq!(board.get(Pos::new(7, 8)), Stone::White);
    assert_eq!(board.stone_count(), 2);

    board.remove_stone(CENTER);
    assert!(board.is_empty(CENTER));
    assert_eq!(board.stone_count(), 1);
}

#[test]
fn test_get_checked_off_board() {
    let board = Board::new();
    assert_eq!(board.get_checked(-1, 3), None);
    assert_eq!(board.get_checked(3, 15), None);
    assert_eq!(board.get_checked(3, 3), Some(Stone::Empty));
}

#[test]
fn test_cells_roundtrip() {
    let mut board = Board::new();
    board.place_stone(Pos::new(0, 14), Stone::Black);
    board.place_stone(Pos::new(14, 0), Stone::White);

    let cells = board.to_cells();
    assert_eq!(cells[0][14], Stone::Black);
    assert_eq!(cells[14][0], Stone::White);
    assert_eq!(Board::from_cells(&cells).unwrap(), board);
}

#[test]
fn test_from_cells_rejects_wrong_shape() {
    let short = vec![vec![Stone::Empty; BOARD_SIZE]; 14];
    assert!(matches!(
        Board::from_cells(&short),
        Err(EngineError::MalformedBoard { rows: 14, .. })
    ));

    let mut ragged = vec![vec![Stone::Empty; BOARD_SIZE]; BOARD_SIZE];
    ragged[3].pop();
    assert!(matches!(
        Board::from_cells(&ragged),
        Err(EngineError::MalformedBoard { cols: 14, .. })
    ));
}

#[test]
fn test_stone_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Stone::Black).unwrap(), "\"black\"");
    let s: Stone = serde_json::from_str("\"empty\"").unwrap();
    assert_eq!(s, Stone::Empty);
}
