//! Single-line analysis around one cell
//!
//! A [`Line`] is an 11-cell window centred on the cell under test, seen from
//! one color: own stones, empty cells, and everything else (opponent stones
//! and off-board cells) as blocked. The centre is always treated as an own
//! stone, so the analysis answers "what does this line look like once the
//! stone is placed".

use crate::board::{Board, Pos, Stone};

/// Horizontal, vertical, diagonal, anti-diagonal
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

const HALF: usize = 5;
const LEN: usize = 2 * HALF + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Own,
    Empty,
    Blocked,
}

/// Four classification of a line through the centre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Four {
    None,
    /// One cell completes a five
    Single,
    /// Two five points on one line that are not an open four (`X_XXX_X`)
    Double,
    /// `_XXXX_`
    Open,
}

/// Three classification of a line through the centre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Three {
    None,
    /// One more stone makes a four
    Closed,
    /// One more stone makes an open four
    Open,
}

#[derive(Debug, Clone, Copy)]
pub struct Line {
    cells: [Cell; LEN],
    /// Black needs exactly five; longer runs are overlines
    exact_five: bool,
}

impl Line {
    pub fn extract(board: &Board, pos: Pos, color: Stone, (dr, dc): (i32, i32)) -> Self {
        let mut cells = [Cell::Blocked; LEN];
        for (i, cell) in cells.iter_mut().enumerate() {
            let k = i as i32 - HALF as i32;
            *cell = if k == 0 {
                Cell::Own
            } else {
                match board.get_checked(pos.row as i32 + dr * k, pos.col as i32 + dc * k) {
                    Some(s) if s == color => Cell::Own,
                    Some(Stone::Empty) => Cell::Empty,
                    _ => Cell::Blocked,
                }
            };
        }
        Self {
            cells,
            exact_five: color == Stone::Black,
        }
    }

    /// Length of the own run through the centre
    fn center_run(&self) -> usize {
        let mut lo = HALF;
        while lo > 0 && self.cells[lo - 1] == Cell::Own {
            lo -= 1;
        }
        let mut hi = HALF;
        while hi + 1 < LEN && self.cells[hi + 1] == Cell::Own {
            hi += 1;
        }
        hi - lo + 1
    }

    fn with_own(&self, idx: usize) -> Self {
        let mut line = *self;
        line.cells[idx] = Cell::Own;
        line
    }

    pub fn is_five(&self) -> bool {
        let n = self.center_run();
        if self.exact_five {
            n == 5
        } else {
            n >= 5
        }
    }

    pub fn is_overline(&self) -> bool {
        self.exact_five && self.center_run() >= 6
    }

    /// Bit mask of window indices whose filling completes a five through the centre.
    fn five_points(&self) -> u16 {
        let mut mask = 0u16;
        for i in (HALF - 4)..=(HALF + 4) {
            if self.cells[i] == Cell::Empty && self.with_own(i).is_five() {
                mask |= 1 << i;
            }
        }
        mask
    }

    /// Board offsets (relative to the centre) of the five points on this line.
    pub fn five_point_offsets(&self) -> Vec<i32> {
        let mask = self.five_points();
        (0..LEN)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| i as i32 - HALF as i32)
            .collect()
    }

    pub fn four(&self) -> Four {
        let mask = self.five_points();
        match mask.count_ones() {
            0 => Four::None,
            1 => Four::Single,
            2 => {
                let lo = mask.trailing_zeros();
                let hi = 15 - mask.leading_zeros();
                if hi - lo == 5 {
                    Four::Open
                } else {
                    Four::Double
                }
            }
            _ => Four::Double,
        }
    }

    pub fn three(&self) -> Three {
        let mut best = Three::None;
        for i in (HALF - 4)..=(HALF + 4) {
            if self.cells[i] != Cell::Empty {
                continue;
            }
            let next = self.with_own(i);
            if next.is_five() || next.is_overline() {
                continue;
            }
            match next.four() {
                Four::Open => return Three::Open,
                Four::Single | Four::Double => best = Three::Closed,
                Four::None => {}
            }
        }
        best
    }

    /// Board offsets (relative to the centre) of empty cells that turn this
    /// line into an open four.
    pub fn open_four_offsets(&self) -> Vec<i32> {
        ((HALF - 4)..=(HALF + 4))
            .filter(|&i| self.cells[i] == Cell::Empty && self.with_own(i).four() == Four::Open)
            .map(|i| i as i32 - HALF as i32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of(pattern: &str, color: Stone) -> Line {
        // `pattern` is written left to right with `*` marking the centre cell
        let center = pattern.find('*').unwrap();
        let mut board = Board::new();
        let row = 7u8;
        for (i, ch) in pattern.chars().enumerate() {
            let col = 7 + i as i32 - center as i32;
            let stone = match ch {
                'X' => color,
                'O' => color.opponent(),
                _ => continue,
            };
            board.place_stone(Pos::new(row, col as u8), stone);
        }
        Line::extract(&board, Pos::new(row, 7), color, (0, 1))
    }

    #[test]
    fn test_exact_five_for_black() {
        assert!(line_of("XX*XX", Stone::Black).is_five());
        let six = line_of("XX*XXX", Stone::Black);
        assert!(!six.is_five());
        assert!(six.is_overline());
    }

    #[test]
    fn test_white_overline_is_five() {
        let six = line_of("XX*XXX", Stone::White);
        assert!(six.is_five());
        assert!(!six.is_overline());
    }

    #[test]
    fn test_four_kinds() {
        assert_eq!(line_of("_XX*X_", Stone::Black).four(), Four::Open);
        assert_eq!(line_of("OXX*X_", Stone::Black).four(), Four::Single);
        assert_eq!(line_of("X_X*X_X", Stone::Black).four(), Four::Double);
        assert_eq!(line_of("_X*X__", Stone::Black).four(), Four::None);
    }

    #[test]
    fn test_black_four_blocked_by_overline() {
        // Filling the gap would make six for Black
        assert_eq!(line_of("OXX*X_XO", Stone::Black).four(), Four::None);
        assert_eq!(line_of("OXX*X_XO", Stone::White).four(), Four::Single);
    }

    #[test]
    fn test_three_kinds() {
        assert_eq!(line_of("__X*X__", Stone::Black).three(), Three::Open);
        assert_eq!(line_of("__X*_X__", Stone::Black).three(), Three::Open);
        assert_eq!(line_of("OX*X___", Stone::Black).three(), Three::Closed);
        assert_eq!(line_of("__*X___", Stone::Black).three(), Three::None);
    }

    #[test]
    fn test_five_point_offsets() {
        assert_eq!(line_of("OXX*X_", Stone::Black).five_point_offsets(), vec![2]);
        assert_eq!(line_of("_XX*X_", Stone::Black).five_point_offsets(), vec![-3, 2]);
    }

    #[test]
    fn test_open_four_offsets() {
        assert_eq!(line_of("___X*X___", Stone::Black).open_four_offsets(), vec![-2, 2]);
        assert_eq!(line_of("__X*_X__", Stone::Black).open_four_offsets(), vec![1]);
    }
}
