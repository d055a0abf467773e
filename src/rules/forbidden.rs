//! Renju forbidden moves for Black
//!
//! Black may not play a move that makes an overline (six or more), two or
//! more fours, or two or more open threes. A move that completes an exact
//! five is always allowed, whatever else it creates.
//!
//! The open-four cell of an open three is not itself checked for legality
//! (no recursive forbidden analysis).

use crate::board::{Board, Pos, Stone};

use super::line::{Four, Line, Three, DIRECTIONS};

/// Cheap pre-filter: can the stones around `pos` form any forbidden shape?
///
/// Overlines and two fours on one line need at least four other black
/// stones on that line. Every other forbidden shape needs two lines with at
/// least two other black stones each.
fn may_be_forbidden(board: &Board, pos: Pos) -> bool {
    let mut crowded = 0;
    for &(dr, dc) in &DIRECTIONS {
        let mut n = 0;
        for k in 1..=5 {
            for sign in [1, -1] {
                let r = pos.row as i32 + dr * k * sign;
                let c = pos.col as i32 + dc * k * sign;
                if board.get_checked(r, c) == Some(Stone::Black) {
                    n += 1;
                }
            }
        }
        if n >= 4 {
            return true;
        }
        if n >= 2 {
            crowded += 1;
        }
    }
    crowded >= 2
}

/// Count the fours Black would make at `pos`, two fours on one line counting twice.
pub fn count_fours(board: &Board, pos: Pos) -> u8 {
    DIRECTIONS
        .iter()
        .map(|&d| match Line::extract(board, pos, Stone::Black, d).four() {
            Four::None => 0,
            Four::Single | Four::Open => 1,
            Four::Double => 2,
        })
        .sum()
}

/// Count the lines on which Black would make an open three at `pos`.
pub fn count_open_threes(board: &Board, pos: Pos) -> u8 {
    DIRECTIONS
        .iter()
        .map(|&d| Line::extract(board, pos, Stone::Black, d))
        .filter(|line| line.four() == Four::None && line.three() == Three::Open)
        .count() as u8
}

/// Is `pos` a forbidden move for Black?
///
/// Occupied cells are reported as not forbidden; legality of occupied
/// cells is the caller's concern.
pub fn is_forbidden(board: &Board, pos: Pos) -> bool {
    if !board.is_empty(pos) || !may_be_forbidden(board, pos) {
        return false;
    }

    let lines = DIRECTIONS.map(|d| Line::extract(board, pos, Stone::Black, d));
    if lines.iter().any(Line::is_five) {
        return false;
    }
    if lines.iter().any(Line::is_overline) {
        return true;
    }

    let mut fours = 0;
    let mut open_threes = 0;
    for line in &lines {
        match line.four() {
            Four::Single | Four::Open => fours += 1,
            Four::Double => fours += 2,
            Four::None => {
                if line.three() == Three::Open {
                    open_threes += 1;
                }
            }
        }
    }
    fours >= 2 || open_threes >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_board(stones: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new();
        for &(r, c, s) in stones {
            board.place_stone(Pos::new(r, c), s);
        }
        board
    }

    #[test]
    fn test_empty_board_not_forbidden() {
        let board = Board::new();
        assert!(!is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_double_three_cross_pattern() {
        // Horizontal _ B _ B _ and vertical _ B _ B _ crossing at (7, 7)
        let board = setup_board(&[
            (7, 6, Stone::Black),
            (7, 8, Stone::Black),
            (6, 7, Stone::Black),
            (8, 7, Stone::Black),
        ]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7)), 2);
        assert!(is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_double_three_diagonal_cross() {
        let board = setup_board(&[
            (6, 6, Stone::Black),
            (8, 8, Stone::Black),
            (6, 8, Stone::Black),
            (8, 6, Stone::Black),
        ]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7)), 2);
        assert!(is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_single_open_three_allowed() {
        let board = setup_board(&[(7, 6, Stone::Black), (7, 8, Stone::Black)]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7)), 1);
        assert!(!is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_blocked_three_does_not_count() {
        // Vertical three is capped by White on one side
        let board = setup_board(&[
            (7, 6, Stone::Black),
            (7, 8, Stone::Black),
            (6, 7, Stone::Black),
            (8, 7, Stone::Black),
            (5, 7, Stone::White),
        ]);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7)), 1);
        assert!(!is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_double_four_cross() {
        let board = setup_board(&[
            (7, 4, Stone::Black),
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (4, 7, Stone::Black),
            (5, 7, Stone::Black),
            (6, 7, Stone::Black),
            (7, 3, Stone::White),
            (3, 7, Stone::White),
        ]);
        assert_eq!(count_fours(&board, Pos::new(7, 7)), 2);
        assert!(is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_double_four_on_one_line() {
        // B _ B B B _ B: the middle stone makes two fours on the same row
        let board = setup_board(&[
            (7, 3, Stone::Black),
            (7, 5, Stone::Black),
            (7, 7, Stone::Black),
            (7, 9, Stone::Black),
        ]);
        assert_eq!(count_fours(&board, Pos::new(7, 6)), 2);
        assert!(is_forbidden(&board, Pos::new(7, 6)));
    }

    #[test]
    fn test_overline_forbidden() {
        let board = setup_board(&[
            (7, 2, Stone::Black),
            (7, 3, Stone::Black),
            (7, 4, Stone::Black),
            (7, 6, Stone::Black),
            (7, 7, Stone::Black),
        ]);
        assert!(is_forbidden(&board, Pos::new(7, 5)));
    }

    #[test]
    fn test_five_overrides_forbidden() {
        // (7, 7) makes an exact five on the row and a double three elsewhere
        let board = setup_board(&[
            (7, 3, Stone::Black),
            (7, 4, Stone::Black),
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (6, 7, Stone::Black),
            (8, 7, Stone::Black),
            (6, 6, Stone::Black),
            (8, 8, Stone::Black),
        ]);
        assert!(!is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_four_three_allowed() {
        let board = setup_board(&[
            (7, 4, Stone::Black),
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (7, 3, Stone::White),
            (6, 7, Stone::Black),
            (8, 7, Stone::Black),
        ]);
        assert_eq!(count_fours(&board, Pos::new(7, 7)), 1);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7)), 1);
        assert!(!is_forbidden(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_occupied_cell_not_forbidden() {
        let board = setup_board(&[(7, 7, Stone::White)]);
        assert!(!is_forbidden(&board, Pos::new(7, 7)));
    }
}
