//! Pieces and their pseudo-legal reach.
//!
//! A piece's `Reach` is recomputed from the board by `Board::recalculate`.
//! It answers three questions: which cells the piece attacks, where it may
//! move ignoring self-check, and whether a hypothetical move by another
//! piece would leave a given cell out of its reach.

use crate::engine::board::Board;
use crate::engine::direction::Direction;
use crate::engine::types::{Bitboard, Color, PieceId, PieceKind, Square};

pub(crate) const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
pub(crate) const DIAGONAL: [(i8, i8); 4] = [(-1, 1), (1, 1), (-1, -1), (1, -1)];
const KING_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (1, 1),
    (-1, -1),
    (1, -1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A piece in the board's roster.
#[derive(Clone, Debug)]
pub struct Piece {
    pub(crate) id: PieceId,
    kind: PieceKind,
    color: Color,
    has_moved: bool,
    square: Square,
    pub(crate) reach: Reach,
    /// Cells this piece is registered on in the hit-by map.
    pub(crate) hitting: Bitboard,
    pub(crate) legal_moves: Vec<Square>,
}

impl Piece {
    pub(crate) fn new(kind: PieceKind, color: Color, has_moved: bool, square: Square) -> Self {
        Piece {
            id: PieceId(0),
            kind,
            color,
            has_moved,
            square,
            reach: Reach::Unplaced,
            hitting: Bitboard::EMPTY,
            legal_moves: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    #[inline]
    pub fn square(&self) -> Square {
        self.square
    }

    #[inline]
    pub fn reach(&self) -> &Reach {
        &self.reach
    }

    /// Cells currently attacked by this piece.
    #[inline]
    pub fn hitting(&self) -> Bitboard {
        self.hitting
    }

    /// Destinations accepted by the last `turn_start` for this piece's side.
    #[inline]
    pub fn legal_moves(&self) -> &[Square] {
        &self.legal_moves
    }

    pub fn possible_moves(&self) -> impl Iterator<Item = Square> + '_ {
        self.reach.possible_moves()
    }

    pub fn possible_move_count(&self) -> usize {
        self.reach.possible_move_count()
    }

    /// Would this piece still not attack `blocked` after `from` → `to`?
    pub fn is_blocked_if_move(&self, board: &Board, from: Square, to: Square, blocked: Square) -> bool {
        self.reach.is_blocked_if_move(board, from, to, blocked)
    }

    pub(crate) fn on_move(&mut self, to: Square) {
        self.square = to;
        self.has_moved = true;
    }
}

// ---------------------------------------------------------------------------
// Reach
// ---------------------------------------------------------------------------

/// Per-kind geometry of a piece, captured at its last recalculation.
#[derive(Clone, Debug, Default)]
pub enum Reach {
    /// Not yet recalculated since being placed.
    #[default]
    Unplaced,
    Pawn {
        /// Non-attacking push: two cells while unmoved, otherwise one.
        forward: Direction,
        /// Both diagonal-forward cells on the board, occupied or not.
        strikes: Vec<Square>,
        /// Strikes holding an enemy, plus the en-passant target when open.
        captures: Vec<Square>,
    },
    Knight {
        jumps: Vec<Square>,
        /// Jumps that are empty or hold an enemy.
        landings: Vec<Square>,
    },
    /// Bishop, rook or queen.
    Slider { directions: Vec<Direction> },
    King {
        steps: Vec<Direction>,
        castles: Vec<Square>,
    },
}

impl Reach {
    /// Build the reach of `piece` from the current board.
    pub fn compute(board: &Board, piece: &Piece) -> Reach {
        let from = piece.square();
        let color = piece.color();
        let open = |deltas: &[(i8, i8)], desired: u8| -> Vec<Direction> {
            deltas
                .iter()
                .map(|&delta| Direction::open(board, from, color, delta, desired, true))
                .collect()
        };

        match piece.kind() {
            PieceKind::Pawn => pawn_reach(board, piece),
            PieceKind::Knight => {
                let jumps: Vec<Square> = KNIGHT_JUMPS
                    .iter()
                    .filter_map(|&(dx, dy)| from.offset(dx, dy))
                    .collect();
                let landings = jumps
                    .iter()
                    .copied()
                    .filter(|&sq| board.piece_at(sq).is_none_or(|p| p.color() != color))
                    .collect();
                Reach::Knight { jumps, landings }
            }
            PieceKind::Bishop => Reach::Slider {
                directions: open(&DIAGONAL, 8),
            },
            PieceKind::Rook => Reach::Slider {
                directions: open(&ORTHOGONAL, 8),
            },
            PieceKind::Queen => Reach::Slider {
                directions: open(&KING_STEPS, 8),
            },
            PieceKind::King => Reach::King {
                steps: open(&KING_STEPS, 1),
                castles: castle_targets(board, piece),
            },
        }
    }

    /// Rays that carry moves, and whether an enemy on their last cell may be
    /// captured.
    fn lines(&self) -> (&[Direction], bool) {
        match self {
            Reach::Pawn { forward, .. } => (std::slice::from_ref(forward), false),
            Reach::Slider { directions } => (directions.as_slice(), true),
            Reach::King { steps, .. } => (steps.as_slice(), true),
            Reach::Unplaced | Reach::Knight { .. } => (&[], true),
        }
    }

    /// Destinations that do not come from a ray.
    fn targets(&self) -> &[Square] {
        match self {
            Reach::Pawn { captures, .. } => captures.as_slice(),
            Reach::Knight { landings, .. } => landings.as_slice(),
            Reach::King { castles, .. } => castles.as_slice(),
            Reach::Unplaced | Reach::Slider { .. } => &[],
        }
    }

    /// Cells to register in the hit-by map.
    pub fn attacks(&self) -> Bitboard {
        match self {
            Reach::Unplaced => Bitboard::EMPTY,
            Reach::Pawn { strikes, .. } => strikes.iter().copied().collect(),
            Reach::Knight { jumps, .. } => jumps.iter().copied().collect(),
            Reach::Slider { directions } | Reach::King { steps: directions, .. } => directions
                .iter()
                .fold(Bitboard::EMPTY, |acc, d| Bitboard(acc.0 | d.attacks().0)),
        }
    }

    /// Pseudo-legal destinations, lazily.
    pub fn possible_moves(&self) -> impl Iterator<Item = Square> + '_ {
        let (lines, capturable) = self.lines();
        lines
            .iter()
            .flat_map(move |d| d.possible_moves(capturable))
            .chain(self.targets().iter().copied())
    }

    pub fn possible_move_count(&self) -> usize {
        let (lines, capturable) = self.lines();
        lines
            .iter()
            .map(|d| d.possible_move_count(capturable))
            .sum::<usize>()
            + self.targets().len()
    }

    /// Would `blocked` remain out of reach after the piece on `from` moves
    /// to `to`?
    pub fn is_blocked_if_move(&self, board: &Board, from: Square, to: Square, blocked: Square) -> bool {
        match self {
            Reach::Unplaced => true,
            Reach::Pawn { strikes, .. } => !strikes.contains(&blocked),
            Reach::Knight { jumps, .. } => !jumps.contains(&blocked),
            Reach::Slider { directions } | Reach::King { steps: directions, .. } => directions
                .iter()
                .all(|d| d.is_blocked_if_move(board, from, to, blocked)),
        }
    }

    /// Does an attacking ray that ends on `vacated` continue to `target`
    /// once `vacated` is empty?
    pub fn reaches_past(&self, board: &Board, vacated: Square, target: Square) -> bool {
        match self {
            Reach::Slider { directions } => directions
                .iter()
                .any(|d| d.is_attacking() && d.reaches_past(board, vacated, target)),
            _ => false,
        }
    }
}

fn pawn_reach(board: &Board, piece: &Piece) -> Reach {
    let from = piece.square();
    let color = piece.color();
    let dy = color.forward();
    let push = if piece.has_moved() { 1 } else { 2 };
    let forward = Direction::open(board, from, color, (0, dy), push, false);

    let strikes: Vec<Square> = [-1, 1]
        .iter()
        .filter_map(|&dx| from.offset(dx, dy))
        .collect();

    let passed_enemy = board
        .en_passant_capture()
        .and_then(|sq| board.piece_at(sq))
        .is_some_and(|p| p.color() != color && p.kind() == PieceKind::Pawn);
    let captures = strikes
        .iter()
        .copied()
        .filter(|&sq| match board.piece_at(sq) {
            Some(p) => p.color() != color,
            None => passed_enemy && board.en_passant() == Some(sq),
        })
        .collect();

    Reach::Pawn {
        forward,
        strikes,
        captures,
    }
}

/// Castling destinations for an unmoved king on its home square: one per
/// side with an unmoved friendly rook in the corner and nothing in between.
/// Attacked transit cells are rejected by the legality check.
fn castle_targets(board: &Board, king: &Piece) -> Vec<Square> {
    let rank = king.color().home_rank();
    if king.has_moved() || king.square() != Square::from_file_rank(4, rank) {
        return Vec::new();
    }

    let sides: [(u8, &[u8], u8); 2] = [(7, &[5, 6], 6), (0, &[1, 2, 3], 2)];
    sides
        .iter()
        .filter(|(rook_file, between, _)| {
            let rook_ready = board
                .piece_at(Square::from_file_rank(*rook_file, rank))
                .is_some_and(|p| {
                    p.kind() == PieceKind::Rook && p.color() == king.color() && !p.has_moved()
                });
            rook_ready
                && between
                    .iter()
                    .all(|&file| !board.is_occupied(Square::from_file_rank(file, rank)))
        })
        .map(|&(_, _, target)| Square::from_file_rank(target, rank))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
