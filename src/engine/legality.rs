//! Turn start and move legality.
//!
//! `turn_start` rebuilds the attack map, then filters every pseudo-legal
//! move of the side to move through `is_move_legal`. A move is legal when
//! it does not leave the mover's own king attacked.

use tracing::debug;

use crate::engine::board::Board;
use crate::engine::piece::{DIAGONAL, ORTHOGONAL, Piece};
use crate::engine::types::{Color, PieceId, PieceKind, Square};

impl Board {
    /// Prepare `color`'s turn: recompute attacks, cache whether `color` is in
    /// check and store each of its pieces' legal moves.
    ///
    /// Returns whether `color` has at least one legal move. Combined with
    /// `is_in_check` this tells checkmate from stalemate.
    pub fn turn_start(&mut self, color: Color) -> bool {
        self.recompute_attacks();
        self.in_check = self.king_attacked(color);
        self.turn = Some(color);

        let mut total = 0usize;
        for id in self.piece_ids() {
            let legal: Vec<Square> = match self.piece(id) {
                Some(piece) if piece.color() == color => piece
                    .possible_moves()
                    .filter(|&to| self.is_move_legal(piece, to))
                    .collect(),
                _ => Vec::new(),
            };
            total += legal.len();
            if let Some(piece) = self.piece_mut(id) {
                piece.legal_moves = legal;
            }
        }

        debug!(%color, in_check = self.in_check, legal_moves = total, "turn started");
        total > 0
    }

    /// Is `color`'s king attacked?
    ///
    /// With `use_cache`, returns the value cached by the last `turn_start`
    /// when that call was for `color`; otherwise reads the live hit map.
    pub fn is_in_check(&self, color: Color, use_cache: bool) -> bool {
        if use_cache && self.turn == Some(color) {
            self.in_check
        } else {
            self.king_attacked(color)
        }
    }

    /// Legal destinations of piece `id`, as of the last `turn_start`.
    pub fn legal_moves_of(&self, id: PieceId) -> &[Square] {
        self.piece(id).map_or(&[][..], Piece::legal_moves)
    }

    /// Legal destinations of the piece on `sq`, as of the last `turn_start`.
    pub fn legal_moves_from(&self, sq: Square) -> &[Square] {
        self.piece_at(sq).map_or(&[][..], Piece::legal_moves)
    }

    /// Every legal `(from, to)` pair for the side the last `turn_start` ran for.
    pub fn legal_moves(&self) -> Vec<(Square, Square)> {
        self.pieces()
            .flat_map(|p| p.legal_moves().iter().map(move |&to| (p.square(), to)))
            .collect()
    }

    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.pieces()
            .any(|p| p.color() == color && !p.legal_moves().is_empty())
    }

    fn king_attacked(&self, color: Color) -> bool {
        self.king(color)
            .is_some_and(|king| self.is_attacked_by(king.square(), !color))
    }

    /// Enemy pieces of `color` currently attacking `sq`.
    fn enemy_hitters(&self, sq: Square, color: Color) -> impl Iterator<Item = &Piece> {
        self.hitters(sq).filter(move |p| p.color() != color)
    }

    /// Would moving `piece` to `to` keep its own king safe?
    ///
    /// Only meaningful right after `turn_start` for `piece`'s colour, while
    /// the hit map and the cached check flag are current.
    pub(crate) fn is_move_legal(&self, piece: &Piece, to: Square) -> bool {
        let color = piece.color();
        let from = piece.square();

        if piece.kind() == PieceKind::King {
            return self.is_king_move_legal(piece, to);
        }

        // Positions without a king have no self-check to avoid.
        let Some(king_sq) = self.king(color).map(Piece::square) else {
            return true;
        };

        let en_passant = piece.kind() == PieceKind::Pawn && Some(to) == self.en_passant();
        let captured = |sq: Square| {
            sq == to || (en_passant && Some(sq) == self.en_passant_capture())
        };

        // Every checker must be captured or cut off.
        if self.in_check {
            for checker in self.enemy_hitters(king_sq, color) {
                if captured(checker.square()) {
                    continue;
                }
                if !checker.is_blocked_if_move(self, from, to, king_sq) {
                    return false;
                }
            }
        }

        // Vacating `from` must not open a line onto the king.
        for hitter in self.enemy_hitters(from, color) {
            if captured(hitter.square()) {
                continue;
            }
            if !hitter.is_blocked_if_move(self, from, to, king_sq) {
                return false;
            }
        }

        if en_passant
            && let Some(passed) = self.en_passant_capture()
            && self.exposed_after_en_passant(king_sq, color, from, to, passed)
        {
            return false;
        }

        true
    }

    fn is_king_move_legal(&self, king: &Piece, to: Square) -> bool {
        let color = king.color();
        let from = king.square();

        if self.is_attacked_by(to, !color) {
            return false;
        }

        // A slider checking along a line still covers the cell behind the king.
        if self
            .enemy_hitters(from, color)
            .any(|h| h.reach().reaches_past(self, from, to))
        {
            return false;
        }

        let dx = to.x() - from.x();
        if dx.abs() == 2 {
            if self.in_check {
                return false;
            }
            match from.offset(dx.signum(), 0) {
                Some(transit) if !self.is_attacked_by(transit, !color) => {}
                _ => return false,
            }
        }

        true
    }

    /// After an en-passant capture both the mover's cell and the passed pawn's
    /// cell are empty at once. Scan outward from the king for a slider that
    /// the pair was screening.
    fn exposed_after_en_passant(
        &self,
        king_sq: Square,
        color: Color,
        from: Square,
        to: Square,
        passed: Square,
    ) -> bool {
        let lines = ORTHOGONAL
            .iter()
            .map(|d| (d, [PieceKind::Rook, PieceKind::Queen]))
            .chain(DIAGONAL.iter().map(|d| (d, [PieceKind::Bishop, PieceKind::Queen])));

        for (&(dx, dy), sliders) in lines {
            let mut cursor = king_sq;
            while let Some(sq) = cursor.offset(dx, dy) {
                cursor = sq;
                if sq == to {
                    break;
                }
                if sq == from || sq == passed {
                    continue;
                }
                if let Some(p) = self.piece_at(sq) {
                    if p.color() != color && sliders.contains(&p.kind()) {
                        return true;
                    }
                    break;
                }
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
