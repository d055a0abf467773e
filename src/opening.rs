//! Opening book
//!
//! Covers the first three stones of a game:
//! - empty board: Black takes the center;
//! - one stone on the center: White answers on one of its eight neighbours;
//! - Black center plus an adjacent White stone: Black picks one of the 26
//!   traditional openings, 13 for an orthogonal ("direct") White reply and
//!   13 for a diagonal ("indirect") one.
//!
//! Anything else defers to search.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::board::{Board, Pos, Stone, CENTER};

/// How White's first stone touches the center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningKind {
    /// White is orthogonally adjacent to the center
    Direct,
    /// White is diagonally adjacent to the center
    Indirect,
}

impl OpeningKind {
    /// White's offset in the canonical orientation of the table below
    fn canonical_white(self) -> (i32, i32) {
        match self {
            OpeningKind::Direct => (-1, 0),
            OpeningKind::Indirect => (-1, 1),
        }
    }
}

/// One traditional opening: where Black's second stone goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedOpening {
    pub name: &'static str,
    pub kind: OpeningKind,
    /// Black's third stone relative to the center, canonical orientation
    pub offset: (i32, i32),
    /// Relative strength for Black. Used only as the weight when the book
    /// picks Black's third stone; evaluation and search never read it.
    pub strategic_value: u32,
}

const fn direct(name: &'static str, dr: i32, dc: i32, strategic_value: u32) -> NamedOpening {
    NamedOpening {
        name,
        kind: OpeningKind::Direct,
        offset: (dr, dc),
        strategic_value,
    }
}

const fn indirect(name: &'static str, dr: i32, dc: i32, strategic_value: u32) -> NamedOpening {
    NamedOpening {
        name,
        kind: OpeningKind::Indirect,
        offset: (dr, dc),
        strategic_value,
    }
}

pub const DIRECT_OPENINGS: [NamedOpening; 13] = [
    direct("Kansei", -2, 0, 6),
    direct("Keigetsu", -2, 1, 7),
    direct("Sosei", -2, 2, 5),
    direct("Kagetsu", -1, 1, 10),
    direct("Zangetsu", -1, 2, 6),
    direct("Ugetsu", 0, 1, 9),
    direct("Kinsei", 0, 2, 6),
    direct("Shogetsu", 1, 1, 7),
    direct("Kyugetsu", 1, 2, 5),
    direct("Shingetsu", 1, 0, 6),
    direct("Zuisei", 2, 0, 4),
    direct("Sangetsu", 2, 1, 5),
    direct("Yusei", 2, 2, 3),
];

pub const INDIRECT_OPENINGS: [NamedOpening; 13] = [
    indirect("Chosei", -2, 2, 4),
    indirect("Kyogetsu", -2, 1, 7),
    indirect("Kogetsu", -1, 0, 9),
    indirect("Suigetsu", -2, 0, 7),
    indirect("Ryusei", 2, -2, 2),
    indirect("Ungetsu", 0, -1, 8),
    indirect("Hogetsu", -1, -1, 9),
    indirect("Gingetsu", -2, -1, 6),
    indirect("Myojo", 0, -2, 5),
    indirect("Shagetsu", 1, -2, 4),
    indirect("Meigetsu", -1, -2, 6),
    indirect("Suisei", -2, -2, 2),
    indirect("Yugetsu", 1, -1, 5),
];

/// The eight symmetries of the square, applied to an offset.
const SYMMETRIES: [fn((i32, i32)) -> (i32, i32); 8] = [
    |(r, c)| (r, c),
    |(r, c)| (c, -r),
    |(r, c)| (-r, -c),
    |(r, c)| (-c, r),
    |(r, c)| (r, -c),
    |(r, c)| (-r, c),
    |(r, c)| (c, r),
    |(r, c)| (-c, -r),
];

/// Move suggested by the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookMove {
    pub position: Pos,
    /// Name of the traditional opening, for Black's second stone
    pub opening: Option<&'static str>,
}

/// Stateless opening book; randomness comes from the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpeningBook;

impl OpeningBook {
    pub fn new() -> Self {
        Self
    }

    /// All 26 openings, direct first.
    pub fn openings(&self) -> impl Iterator<Item = &'static NamedOpening> {
        DIRECT_OPENINGS.iter().chain(INDIRECT_OPENINGS.iter())
    }

    /// Book move for `color`, or `None` to defer to search.
    pub fn lookup<R: Rng + ?Sized>(&self, board: &Board, color: Stone, rng: &mut R) -> Option<BookMove> {
        match board.stone_count() {
            0 => Some(BookMove {
                position: CENTER,
                opening: None,
            }),
            1 => {
                if board.get(CENTER) == Stone::Empty {
                    return None;
                }
                let neighbours: Vec<Pos> = neighbour_offsets()
                    .filter_map(|(dr, dc)| CENTER.offset(dr, dc))
                    .collect();
                let position = neighbours[rng.gen_range(0..neighbours.len())];
                Some(BookMove {
                    position,
                    opening: None,
                })
            }
            2 if color == Stone::Black => {
                let (kind, white) = classify_reply(board)?;
                let table = match kind {
                    OpeningKind::Direct => &DIRECT_OPENINGS,
                    OpeningKind::Indirect => &INDIRECT_OPENINGS,
                };
                let weights = WeightedIndex::new(table.iter().map(|o| o.strategic_value)).ok()?;
                let chosen = &table[weights.sample(rng)];

                let transforms: Vec<_> = orientations(kind, white).collect();
                let transform = transforms[rng.gen_range(0..transforms.len())];
                let (dr, dc) = transform(chosen.offset);
                let position = CENTER.offset(dr, dc)?;
                board.is_empty(position).then_some(BookMove {
                    position,
                    opening: Some(chosen.name),
                })
            }
            _ => None,
        }
    }

    /// Name the traditional opening formed by the first three stones.
    pub fn identify(&self, board: &Board) -> Option<&'static NamedOpening> {
        if board.stone_count() != 3 || board.get(CENTER) != Stone::Black {
            return None;
        }
        let (kind, white) = classify_reply(board)?;
        let third = board
            .black
            .iter_ones()
            .find(|&p| p != CENTER)?;
        let actual = (
            third.row as i32 - CENTER.row as i32,
            third.col as i32 - CENTER.col as i32,
        );

        let table = match kind {
            OpeningKind::Direct => &DIRECT_OPENINGS,
            OpeningKind::Indirect => &INDIRECT_OPENINGS,
        };
        orientations(kind, white).find_map(|transform| table.iter().find(|o| transform(o.offset) == actual))
    }
}

fn neighbour_offsets() -> impl Iterator<Item = (i32, i32)> {
    (-1..=1).flat_map(|dr| (-1..=1).map(move |dc| (dr, dc))).filter(|&d| d != (0, 0))
}

/// Black on the center and one White stone next to it.
fn classify_reply(board: &Board) -> Option<(OpeningKind, (i32, i32))> {
    if board.get(CENTER) != Stone::Black || board.white.count() != 1 {
        return None;
    }
    let white = board.white.iter_ones().next()?;
    if white.chebyshev(CENTER) != 1 {
        return None;
    }
    let offset = (
        white.row as i32 - CENTER.row as i32,
        white.col as i32 - CENTER.col as i32,
    );
    let kind = if offset.0 == 0 || offset.1 == 0 {
        OpeningKind::Direct
    } else {
        OpeningKind::Indirect
    };
    Some((kind, offset))
}

/// Symmetries that carry the canonical White stone onto the actual one.
fn orientations(kind: OpeningKind, white: (i32, i32)) -> impl Iterator<Item = fn((i32, i32)) -> (i32, i32)> {
    let canonical = kind.canonical_white();
    SYMMETRIES.into_iter().filter(move |t| t(canonical) == white)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_twenty_six_distinct_openings() {
        let book = OpeningBook::new();
        let names: HashSet<_> = book.openings().map(|o| o.name).collect();
        assert_eq!(names.len(), 26);
        for table in [&DIRECT_OPENINGS, &INDIRECT_OPENINGS] {
            let offsets: HashSet<_> = table.iter().map(|o| o.offset).collect();
            assert_eq!(offsets.len(), 13);
        }
    }

    #[test]
    fn test_offsets_avoid_occupied_cells() {
        for o in OpeningBook::new().openings() {
            let (dr, dc) = o.offset;
            assert!(dr.abs() <= 2 && dc.abs() <= 2, "{} outside the 5x5 area", o.name);
            assert_ne!(o.offset, (0, 0));
            assert_ne!(o.offset, o.kind.canonical_white());
            assert!(o.strategic_value > 0);
        }
    }

    #[test]
    fn test_empty_board_plays_center() {
        let mv = OpeningBook::new().lookup(&Board::new(), Stone::Black, &mut rng());
        assert_eq!(mv.map(|m| m.position), Some(CENTER));
    }

    #[test]
    fn test_second_stone_neighbours_center() {
        let mut board = Board::new();
        board.place_stone(CENTER, Stone::Black);
        let mut r = rng();
        for _ in 0..20 {
            let mv = OpeningBook::new().lookup(&board, Stone::White, &mut r).unwrap();
            assert_eq!(mv.position.chebyshev(CENTER), 1);
        }
    }

    #[test]
    fn test_second_stone_defers_off_center() {
        let mut board = Board::new();
        board.place_stone(Pos::new(3, 3), Stone::Black);
        assert_eq!(OpeningBook::new().lookup(&board, Stone::White, &mut rng()), None);
    }

    #[test]
    fn test_third_stone_is_named_and_identified() {
        let book = OpeningBook::new();
        let mut r = rng();
        for &(dr, dc) in &[(-1, 0), (0, 1), (1, 0), (0, -1), (-1, 1), (1, 1), (1, -1), (-1, -1)] {
            let mut board = Board::new();
            board.place_stone(CENTER, Stone::Black);
            board.place_stone(CENTER.offset(dr, dc).unwrap(), Stone::White);

            for _ in 0..10 {
                let mv = book.lookup(&board, Stone::Black, &mut r).unwrap();
                assert!(board.is_empty(mv.position));
                assert!(mv.position.chebyshev(CENTER) <= 2);

                let mut after = board.clone();
                after.place_stone(mv.position, Stone::Black);
                let named = book.identify(&after).unwrap();
                assert_eq!(Some(named.name), mv.opening);
                let expected = if dr == 0 || dc == 0 { OpeningKind::Direct } else { OpeningKind::Indirect };
                assert_eq!(named.kind, expected);
            }
        }
    }

    #[test]
    fn test_identify_canonical_kagetsu() {
        let mut board = Board::new();
        board.place_stone(CENTER, Stone::Black);
        board.place_stone(Pos::new(6, 7), Stone::White);
        board.place_stone(Pos::new(6, 8), Stone::Black);
        assert_eq!(OpeningBook::new().identify(&board).map(|o| o.name), Some("Kagetsu"));
    }

    #[test]
    fn test_third_stone_requires_black_to_move_and_adjacent_white() {
        let book = OpeningBook::new();
        let mut board = Board::new();
        board.place_stone(CENTER, Stone::Black);
        board.place_stone(Pos::new(6, 7), Stone::White);
        assert_eq!(book.lookup(&board, Stone::White, &mut rng()), None);

        let mut far = Board::new();
        far.place_stone(CENTER, Stone::Black);
        far.place_stone(Pos::new(4, 7), Stone::White);
        assert_eq!(book.lookup(&far, Stone::Black, &mut rng()), None);
    }

    #[test]
    fn test_strategic_value_weights_selection() {
        let book = OpeningBook::new();
        let mut board = Board::new();
        board.place_stone(CENTER, Stone::Black);
        board.place_stone(Pos::new(6, 7), Stone::White);

        let mut r = rng();
        let mut counts = std::collections::HashMap::new();
        for _ in 0..2_000 {
            let mv = book.lookup(&board, Stone::Black, &mut r).unwrap();
            *counts.entry(mv.opening.unwrap()).or_insert(0u32) += 1;
        }
        // Kagetsu carries the highest direct value, Yusei the lowest
        let strong = counts.get("Kagetsu").copied().unwrap_or(0);
        let weak = counts.get("Yusei").copied().unwrap_or(0);
        assert!(strong > 2 * weak, "Kagetsu {strong}, Yusei {weak}");
        assert_eq!(counts.len(), DIRECT_OPENINGS.len());
    }

    #[test]
    fn test_defers_from_three_stones() {
        let mut board = Board::new();
        board.place_stone(CENTER, Stone::Black);
        board.place_stone(Pos::new(6, 7), Stone::White);
        board.place_stone(Pos::new(6, 8), Stone::Black);
        assert_eq!(OpeningBook::new().lookup(&board, Stone::White, &mut rng()), None);
    }
}
