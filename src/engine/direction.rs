//! One ray of a sliding (or stepping) piece.
//!
//! A `Direction` is a snapshot of the cells a piece sees along one unit
//! vector. It is rebuilt whenever its owner is recalculated, so its cells
//! always reflect the occupancy at that moment.

use crate::engine::board::Board;
use crate::engine::types::{Bitboard, Color, Square};

/// Cells reachable from an origin along `(dx, dy)`, up to `desired` steps,
/// ending at the board edge or at (and including) the first occupied cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Direction {
    dx: i8,
    dy: i8,
    desired: u8,
    owner: Color,
    attacking: bool,
    cells: Vec<Square>,
    /// Colour of the piece on the last cell, if the ray ends on one.
    blocker: Option<Color>,
}

impl Direction {
    /// Scan the board from `origin`.
    ///
    /// `attacking` is false only for a pawn's forward push, whose cells are
    /// never attacked.
    pub fn open(
        board: &Board,
        origin: Square,
        owner: Color,
        (dx, dy): (i8, i8),
        desired: u8,
        attacking: bool,
    ) -> Self {
        let cells: Vec<Square> = board.ray(origin, dx, dy, desired).collect();
        let blocker = cells
            .last()
            .and_then(|&sq| board.piece_at(sq))
            .map(|p| p.color());
        Direction {
            dx,
            dy,
            desired,
            owner,
            attacking,
            cells,
            blocker,
        }
    }

    #[inline]
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Traversed cells, nearest first.
    #[inline]
    pub fn cells(&self) -> &[Square] {
        &self.cells
    }

    /// Cells this ray registers in the hit-by map.
    pub fn attacks(&self) -> Bitboard {
        if self.attacking {
            self.cells.iter().copied().collect()
        } else {
            Bitboard::EMPTY
        }
    }

    /// Destinations along the ray. The last cell is dropped when it holds a
    /// friendly piece, or an enemy piece that may not be captured this way.
    pub fn possible_moves(&self, enemy_capturable: bool) -> impl Iterator<Item = Square> + '_ {
        self.cells
            .iter()
            .copied()
            .take(self.possible_move_count(enemy_capturable))
    }

    pub fn possible_move_count(&self, enemy_capturable: bool) -> usize {
        match self.blocker {
            None => self.cells.len(),
            Some(color) if color != self.owner && enemy_capturable => self.cells.len(),
            Some(_) => self.cells.len().saturating_sub(1),
        }
    }

    /// Would this ray still fail to reach `blocked` after the piece on `from`
    /// moves to `to`?
    ///
    /// Returns false when the ray currently reaches `blocked` and `to` does
    /// not interpose, or when vacating `from` opens the ray onto `blocked`.
    pub fn is_blocked_if_move(&self, board: &Board, from: Square, to: Square, blocked: Square) -> bool {
        if self.cells.contains(&blocked) && !self.cells.contains(&to) {
            return false;
        }

        if self.cells.contains(&from) {
            if let Some(i) = self.cells.iter().position(|&sq| sq == to)
                && i + 1 < self.cells.len()
            {
                return true;
            }
            for sq in board.ray(from, self.dx, self.dy, self.remaining()) {
                if sq == to {
                    return true;
                }
                if sq == blocked {
                    return false;
                }
            }
        }

        true
    }

    /// Does the ray, once `vacated` is empty, run on to `target`?
    ///
    /// Used for a king stepping back along the line it is checked on.
    pub fn reaches_past(&self, board: &Board, vacated: Square, target: Square) -> bool {
        self.cells.last() == Some(&vacated)
            && board
                .ray(vacated, self.dx, self.dy, self.remaining())
                .any(|sq| sq == target)
    }

    /// Steps left before `desired` once the traversed cells are used up.
    fn remaining(&self) -> u8 {
        self.desired.saturating_sub(self.cells.len() as u8)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::PieceKind;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn squares(names: &[&str]) -> Vec<Square> {
        names.iter().map(|n| sq(n)).collect()
    }

    /// White rook on a1 looking up the a-file.
    fn rook_file(board: &Board) -> Direction {
        Direction::open(board, sq("a1"), Color::White, (0, 1), 8, true)
    }

    // ===================================================================
    // Scanning
    // ===================================================================

    #[test]
    fn open_ray_runs_to_edge() {
        let board = Board::empty();
        let d = rook_file(&board);
        assert_eq!(d.cells().len(), 7);
        assert_eq!(d.possible_move_count(true), 7);
        assert_eq!(d.possible_moves(false).last(), Some(sq("a8")));
    }

    #[test]
    fn friendly_blocker_is_excluded() {
        let mut board = Board::empty();
        board.place(sq("a4"), Color::White, PieceKind::Pawn, true);
        let d = rook_file(&board);
        assert_eq!(d.cells(), squares(&["a2", "a3", "a4"]).as_slice());
        assert_eq!(d.possible_moves(true).collect::<Vec<_>>(), squares(&["a2", "a3"]));
        // Still defended, so the ray attacks the friendly cell.
        assert!(d.attacks().is_set(sq("a4")));
    }

    #[test]
    fn enemy_blocker_depends_on_capturability() {
        let mut board = Board::empty();
        board.place(sq("a4"), Color::Black, PieceKind::Knight, true);
        let d = rook_file(&board);
        assert_eq!(d.possible_move_count(true), 3);
        assert_eq!(d.possible_move_count(false), 2);
    }

    #[test]
    fn adjacent_friend_leaves_no_moves() {
        let mut board = Board::empty();
        board.place(sq("a2"), Color::White, PieceKind::Pawn, false);
        let d = rook_file(&board);
        assert_eq!(d.possible_move_count(true), 0);
        assert_eq!(d.possible_moves(true).count(), 0);
    }

    #[test]
    fn desired_length_limits_steps() {
        let board = Board::empty();
        let d = Direction::open(&board, sq("e2"), Color::White, (0, 1), 2, false);
        assert_eq!(d.cells(), squares(&["e3", "e4"]).as_slice());
        assert!(d.attacks().is_empty());
    }

    // ===================================================================
    // is_blocked_if_move
    // ===================================================================

    /// White rook a1, white bishop a4 standing on the file, black king a8.
    fn pinned_file() -> Board {
        let mut board = Board::empty();
        board.place(sq("a1"), Color::White, PieceKind::Rook, true);
        board.place(sq("a4"), Color::White, PieceKind::Bishop, true);
        board.place(sq("a8"), Color::Black, PieceKind::King, true);
        board
    }

    #[test]
    fn reaching_target_without_interposition_is_unblocked() {
        let mut board = Board::empty();
        board.place(sq("a1"), Color::White, PieceKind::Rook, true);
        board.place(sq("a8"), Color::Black, PieceKind::King, true);
        let d = rook_file(&board);
        // A piece stepping off the file does not shield a8.
        assert!(!d.is_blocked_if_move(&board, sq("c3"), sq("b3"), sq("a8")));
    }

    #[test]
    fn interposing_on_the_ray_blocks() {
        let mut board = Board::empty();
        board.place(sq("a1"), Color::White, PieceKind::Rook, true);
        board.place(sq("a8"), Color::Black, PieceKind::King, true);
        let d = rook_file(&board);
        assert!(d.is_blocked_if_move(&board, sq("c5"), sq("a5"), sq("a8")));
    }

    #[test]
    fn vacating_a_blocker_opens_the_ray() {
        let board = pinned_file();
        let d = rook_file(&board);
        assert!(!d.is_blocked_if_move(&board, sq("a4"), sq("b5"), sq("a8")));
    }

    #[test]
    fn sliding_toward_origin_stays_blocked() {
        let board = pinned_file();
        let d = rook_file(&board);
        assert!(d.is_blocked_if_move(&board, sq("a4"), sq("a2"), sq("a8")));
    }

    #[test]
    fn sliding_away_from_origin_stays_blocked() {
        let board = pinned_file();
        let d = rook_file(&board);
        assert!(d.is_blocked_if_move(&board, sq("a4"), sq("a6"), sq("a8")));
    }

    #[test]
    fn vacating_with_something_else_behind_stays_blocked() {
        let mut board = pinned_file();
        board.place(sq("a6"), Color::Black, PieceKind::Pawn, true);
        let d = rook_file(&board);
        assert!(d.is_blocked_if_move(&board, sq("a4"), sq("b5"), sq("a8")));
    }

    #[test]
    fn unrelated_move_leaves_ray_blocked() {
        let board = pinned_file();
        let d = rook_file(&board);
        assert!(d.is_blocked_if_move(&board, sq("e2"), sq("e4"), sq("a8")));
    }

    #[test]
    fn short_ray_cannot_continue_past_its_length() {
        let mut board = Board::empty();
        board.place(sq("e1"), Color::White, PieceKind::King, true);
        board.place(sq("e2"), Color::White, PieceKind::Pawn, true);
        let step = Direction::open(&board, sq("e1"), Color::White, (0, 1), 1, true);
        assert!(step.is_blocked_if_move(&board, sq("e2"), sq("d3"), sq("e3")));
    }

    // ===================================================================
    // reaches_past
    // ===================================================================

    #[test]
    fn reaches_past_vacated_square() {
        let mut board = Board::empty();
        board.place(sq("a1"), Color::White, PieceKind::Rook, true);
        board.place(sq("a5"), Color::Black, PieceKind::King, true);
        let d = rook_file(&board);
        assert!(d.reaches_past(&board, sq("a5"), sq("a6")));
        assert!(!d.reaches_past(&board, sq("a5"), sq("b6")));
        assert!(!d.reaches_past(&board, sq("a3"), sq("a6")));
    }
}
