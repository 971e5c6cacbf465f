//! Cell-grid chess board with a live attack map.
//!
//! `Board` owns the 64 cells and an arena of pieces addressed by `PieceId`.
//! The cell → occupant mapping is authoritative; every other link (a piece's
//! square, its rays, the per-cell hit-by sets) is derived and rebuilt by
//! `recalculate` / `recompute_attacks`.

use tracing::{debug, warn};

use crate::engine::piece::{Piece, Reach};
use crate::engine::types::{Bitboard, Color, PieceId, PieceKind, PieceSet, Promotion, Square};

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One of the 64 board squares: its occupant and the pieces attacking it.
#[derive(Clone, Debug)]
pub struct Cell {
    square: Square,
    occupant: Option<PieceId>,
    hit_by: PieceSet,
}

impl Cell {
    fn new(square: Square) -> Self {
        Cell {
            square,
            occupant: None,
            hit_by: PieceSet::EMPTY,
        }
    }

    #[inline]
    pub fn square(&self) -> Square {
        self.square
    }

    #[inline]
    pub fn x(&self) -> i8 {
        self.square.x()
    }

    #[inline]
    pub fn y(&self) -> i8 {
        self.square.y()
    }

    #[inline]
    pub fn occupant(&self) -> Option<PieceId> {
        self.occupant
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Pieces whose currently registered attacks include this cell.
    #[inline]
    pub fn hit_by(&self) -> PieceSet {
        self.hit_by
    }
}

// ---------------------------------------------------------------------------
// Ray
// ---------------------------------------------------------------------------

/// Line of sight from a square in one unit direction.
///
/// Yields at most `max_steps` cells, stops before leaving the board and stops
/// after the first occupied cell (which is included).
#[derive(Clone, Debug)]
pub struct Ray<'a> {
    board: &'a Board,
    origin: Square,
    dx: i8,
    dy: i8,
    step: u8,
    max_steps: u8,
    done: bool,
}

impl Iterator for Ray<'_> {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.done || self.step >= self.max_steps {
            return None;
        }
        self.step += 1;
        let step = self.step as i8;
        let Some(sq) = self.origin.offset(self.dx * step, self.dy * step) else {
            self.done = true;
            return None;
        };
        if self.board.is_occupied(sq) {
            self.done = true;
        }
        Some(sq)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The 8×8 grid, the roster of pieces in play and the per-turn caches.
#[derive(Clone, Debug)]
pub struct Board {
    cells: [Cell; Square::NUM],

    /// Roster slots indexed by `PieceId`; `None` marks a free slot.
    pieces: Vec<Option<Piece>>,

    /// Square a pawn may move onto to capture en passant.
    en_passant: Option<Square>,

    /// Square of the pawn removed by that capture.
    en_passant_capture: Option<Square>,

    /// Whether `turn`'s king was attacked when its turn started.
    pub(crate) in_check: bool,

    /// Side for which `turn_start` last ran.
    pub(crate) turn: Option<Color>,
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    /// A board holding the standard starting position.
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.reset();
        board
    }

    /// A board with no pieces at all. Use `place` to build a position.
    pub fn empty() -> Self {
        Board {
            cells: std::array::from_fn(|i| Cell::new(Square(i as u8))),
            pieces: Vec::with_capacity(32),
            en_passant: None,
            en_passant_capture: None,
            in_check: false,
            turn: None,
        }
    }

    /// Reinitialise the standard 32-piece starting position and rebuild the
    /// attack map.
    pub fn reset(&mut self) {
        *self = Self::empty();

        for color in [Color::White, Color::Black] {
            let home = color.home_rank();
            let pawns = (home as i8 + color.forward()) as u8;
            for (file, kind) in BACK_RANK.iter().enumerate() {
                self.place(Square::from_file_rank(file as u8, home), color, *kind, false);
                self.place(Square::from_file_rank(file as u8, pawns), color, PieceKind::Pawn, false);
            }
        }

        self.recompute_attacks();
        debug!(pieces = self.pieces().count(), "board reset");
    }

    // -----------------------------------------------------------------------
    // Grid queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn cell(&self, sq: Square) -> &Cell {
        &self.cells[sq.index()]
    }

    /// Bounds-checked lookup by coordinates; `None` off the board.
    #[inline]
    pub fn cell_at(&self, x: i8, y: i8) -> Option<&Cell> {
        Square::from_xy(x, y).map(|sq| self.cell(sq))
    }

    /// The cell `(dx, dy)` away from `sq`, if it is on the board.
    #[inline]
    pub fn adjacent(&self, sq: Square, dx: i8, dy: i8) -> Option<Square> {
        sq.offset(dx, dy)
    }

    /// Lazily walk up to `max_steps` cells from `from` in direction `(dx, dy)`.
    pub fn ray(&self, from: Square, dx: i8, dy: i8, max_steps: u8) -> Ray<'_> {
        Ray {
            board: self,
            origin: from,
            dx,
            dy,
            step: 0,
            max_steps,
            done: false,
        }
    }

    #[inline]
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.cells[sq.index()].occupant.is_some()
    }

    // -----------------------------------------------------------------------
    // Piece queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// The piece standing on `sq`, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.cells[sq.index()].occupant.and_then(|id| self.piece(id))
    }

    /// All pieces in play.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().flatten()
    }

    pub(crate) fn piece_ids(&self) -> Vec<PieceId> {
        self.pieces().map(Piece::id).collect()
    }

    /// The king of `color`. Every real game has exactly one.
    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.pieces()
            .find(|p| p.kind() == PieceKind::King && p.color() == color)
    }

    /// Square a pawn may move onto to capture en passant this turn.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Square of the pawn that the en-passant capture removes.
    #[inline]
    pub fn en_passant_capture(&self) -> Option<Square> {
        self.en_passant_capture
    }

    /// Would moving the piece on `from` to `to` promote it?
    pub fn is_promotable(&self, from: Square, to: Square) -> bool {
        self.piece_at(from).is_some_and(|p| {
            p.kind() == PieceKind::Pawn && to.rank() == p.color().promotion_rank()
        })
    }

    // -----------------------------------------------------------------------
    // Roster manipulation
    // -----------------------------------------------------------------------

    /// Put a new piece on `sq`, replacing whatever stood there.
    ///
    /// Attacks are not registered until the next `recompute_attacks` (or
    /// `turn_start`).
    pub fn place(&mut self, sq: Square, color: Color, kind: PieceKind, has_moved: bool) -> PieceId {
        self.remove(sq);
        let id = self.insert(Piece::new(kind, color, has_moved, sq));
        self.cells[sq.index()].occupant = Some(id);
        id
    }

    /// Take the piece on `sq` off the board.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let id = self.cells[sq.index()].occupant.take()?;
        self.discard(id)
    }

    /// Store a piece in the first free roster slot.
    fn insert(&mut self, mut piece: Piece) -> PieceId {
        let slot = match self.pieces.iter().position(Option::is_none) {
            Some(slot) => slot,
            None => {
                self.pieces.push(None);
                self.pieces.len() - 1
            }
        };
        debug_assert!(slot < 64, "roster overflow");
        let id = PieceId(slot as u8);
        piece.id = id;
        self.pieces[slot] = Some(piece);
        id
    }

    /// Drop a piece from the roster and withdraw its attacks. The cell it
    /// stood on is left to the caller.
    fn discard(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.get_mut(id.index())?.take()?;
        for sq in piece.hitting.iter() {
            self.cells[sq.index()].hit_by.remove(id);
        }
        Some(piece)
    }

    // -----------------------------------------------------------------------
    // Attack map
    // -----------------------------------------------------------------------

    /// Rebuild one piece's rays from its current square, replacing its
    /// previous hit-by registrations.
    pub(crate) fn recalculate(&mut self, id: PieceId) {
        let stale = match self.piece(id) {
            Some(piece) => piece.hitting,
            None => return,
        };
        for sq in stale.iter() {
            self.cells[sq.index()].hit_by.remove(id);
        }

        let reach = match self.piece(id) {
            Some(piece) => Reach::compute(self, piece),
            None => return,
        };
        let hitting = reach.attacks();
        for sq in hitting.iter() {
            self.cells[sq.index()].hit_by.insert(id);
        }

        if let Some(piece) = self.piece_mut(id) {
            piece.reach = reach;
            piece.hitting = hitting;
        }
    }

    /// Clear every hit-by set and recalculate every piece.
    pub fn recompute_attacks(&mut self) {
        for cell in &mut self.cells {
            cell.hit_by = PieceSet::EMPTY;
        }
        for id in self.piece_ids() {
            if let Some(piece) = self.piece_mut(id) {
                piece.hitting = Bitboard::EMPTY;
            }
            self.recalculate(id);
        }
    }

    /// Is `sq` attacked by any piece of colour `by`?
    pub fn is_attacked_by(&self, sq: Square, by: Color) -> bool {
        self.hitters(sq).any(|p| p.color() == by)
    }

    /// Pieces currently attacking `sq`.
    pub fn hitters(&self, sq: Square) -> impl Iterator<Item = &Piece> {
        self.cells[sq.index()]
            .hit_by
            .iter()
            .filter_map(|id| self.piece(id))
    }

    // -----------------------------------------------------------------------
    // Move application
    // -----------------------------------------------------------------------

    /// Apply a move. Performs no validation: callers pick `(from, to)` from
    /// the legal-move set computed by `turn_start`. `promotion` is ignored
    /// unless a pawn reaches its last rank.
    pub fn move_piece(&mut self, from: Square, to: Square, promotion: Promotion) {
        let Some(mover) = self.cells[from.index()].occupant else {
            warn!(%from, %to, "move from an empty cell ignored");
            return;
        };
        let (kind, color) = match self.piece(mover) {
            Some(p) => (p.kind(), p.color()),
            None => return,
        };

        // Capture.
        if let Some(victim) = self.cells[to.index()].occupant {
            self.discard(victim);
        }

        self.cells[from.index()].occupant = None;
        self.cells[to.index()].occupant = Some(mover);

        // En passant removes the pawn that just double-stepped.
        if kind == PieceKind::Pawn
            && Some(to) == self.en_passant
            && let Some(captured) = self.en_passant_capture
        {
            self.remove(captured);
        }

        // Castling drags the rook to the far side of the king.
        if kind == PieceKind::King && (to.x() - from.x()).abs() == 2 {
            let (rook_from, rook_to) = if to.x() > from.x() {
                (Square::from_xy(7, to.y()), to.offset(-1, 0))
            } else {
                (Square::from_xy(0, to.y()), to.offset(1, 0))
            };
            if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
                self.move_piece(rook_from, rook_to, promotion);
            }
        }

        // Promotion replaces the pawn with a fresh piece.
        let mut landed = mover;
        if kind == PieceKind::Pawn && to.rank() == color.promotion_rank() {
            let has_moved = self.piece(mover).is_some_and(Piece::has_moved);
            self.discard(mover);
            landed = self.insert(Piece::new(promotion.kind(), color, has_moved, to));
            self.cells[to.index()].occupant = Some(landed);
            debug!(%to, piece = %promotion, "pawn promoted");
        }

        // Only now, with the board settled, does the mover see its new rays.
        if let Some(piece) = self.piece_mut(landed) {
            piece.on_move(to);
        }
        self.recalculate(landed);

        self.en_passant = None;
        self.en_passant_capture = None;
        if kind == PieceKind::Pawn && (to.y() - from.y()).abs() == 2 {
            self.en_passant = from.offset(0, (to.y() - from.y()).signum());
            self.en_passant_capture = Some(to);
        }

        debug!(%from, %to, %kind, %color, "move applied");
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.piece_at(sq) {
                    Some(p) => p.kind().to_char(p.color()),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }

    /// Verify that occupants, piece squares and hit-by sets agree.
    ///
    /// Test support for the integration suites; not part of the engine API.
    ///
    /// # Panics
    ///
    /// On the first inconsistency found.
    #[doc(hidden)]
    pub fn assert_consistent(&self) {
        for cell in &self.cells {
            if let Some(id) = cell.occupant {
                let Some(piece) = self.piece(id) else {
                    panic!("occupant {id:?} of {} is not in the roster", cell.square);
                };
                assert_eq!(piece.square(), cell.square, "piece {id:?} disagrees with its cell");
            }
            for id in cell.hit_by.iter() {
                let Some(piece) = self.piece(id) else {
                    panic!("{} is hit by {id:?}, which is not in the roster", cell.square);
                };
                assert!(
                    piece.hitting.is_set(cell.square),
                    "{} registered on {} without hitting it",
                    piece.kind(),
                    cell.square
                );
            }
        }
        for piece in self.pieces() {
            assert_eq!(
                self.cell(piece.square()).occupant,
                Some(piece.id()),
                "{} on {} missing from its cell",
                piece.kind(),
                piece.square()
            );
            for sq in piece.hitting.iter() {
                assert!(self.cell(sq).hit_by.contains(piece.id()));
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
