//! Turn controller wrapping `Board`.
//!
//! `Game` owns the board, the side to move and the player's input state:
//! nothing held, a piece held, a promotion menu open, or the game finished.
//! All validation happens here; the board itself trusts its caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::board::Board;
use crate::engine::types::{ChessError, Color, GameStatus, PieceKind, Promotion, Square};

// =========================================================================
// PlayerState
// =========================================================================

/// Where the player is in entering a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    /// Waiting for a piece to be selected.
    Idle,
    /// A piece is held and awaits its destination.
    Holding { from: Square },
    /// A pawn move to the last rank awaits the promotion choice.
    AwaitPromote {
        from: Square,
        to: Square,
        choice: Promotion,
    },
    /// No further moves are accepted.
    GameOver(GameStatus),
}

// =========================================================================
// GameSnapshot
// =========================================================================

/// Render-ready view of a game.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: String,
    /// Row-major, rank 8 first. Empty squares are empty strings, pieces are
    /// like `"wP"` or `"bK"`.
    pub board: [[String; 8]; 8],
    pub side_to_move: Color,
    pub status: GameStatus,
    pub check: bool,
    pub plies: u32,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// Game
// =========================================================================

/// A game session: board, turn and input state.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    state: PlayerState,
    status: GameStatus,
    plies: u32,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_board(Board::new(), Color::White)
    }

    /// Start a game from an arbitrary position with `side_to_move` to play.
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        let mut game = Self {
            board,
            side_to_move,
            state: PlayerState::Idle,
            status: GameStatus::Active,
            plies: 0,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };
        game.begin_turn();
        game
    }

    /// Back to the starting position. The session id is kept.
    pub fn reset(&mut self) {
        self.board.reset();
        self.side_to_move = Color::White;
        self.plies = 0;
        self.begin_turn();
        info!(game = %self.id, "game reset");
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Half-moves played since the start or the last reset.
    pub fn plies(&self) -> u32 {
        self.plies
    }

    /// Legal destinations of the side-to-move piece on `sq`.
    pub fn legal_moves_from(&self, sq: Square) -> &[Square] {
        self.board.legal_moves_from(sq)
    }

    // -----------------------------------------------------------------
    // Interactive input
    // -----------------------------------------------------------------

    /// Pick up the piece on `sq`. Re-selecting while holding switches pieces.
    pub fn select(&mut self, sq: Square) -> Result<(), ChessError> {
        self.ensure_active()?;
        if let PlayerState::AwaitPromote { .. } = self.state {
            return Err(ChessError::InvalidPromotion(
                "a promotion choice is pending".into(),
            ));
        }

        let movable = self.board.piece_at(sq).is_some_and(|p| {
            p.color() == self.side_to_move && !p.legal_moves().is_empty()
        });
        if !movable {
            return Err(ChessError::WrongSide {
                square: sq.to_algebraic(),
                side: self.side_to_move,
            });
        }

        self.state = PlayerState::Holding { from: sq };
        Ok(())
    }

    /// Drop the held piece on `to`. Opens the promotion menu when a pawn
    /// reaches the last rank, otherwise plays the move.
    pub fn choose(&mut self, to: Square) -> Result<PlayerState, ChessError> {
        self.ensure_active()?;
        let PlayerState::Holding { from } = self.state else {
            return Err(ChessError::NothingSelected);
        };
        self.check_legal(from, to)?;

        if self.board.is_promotable(from, to) {
            self.state = PlayerState::AwaitPromote {
                from,
                to,
                choice: Promotion::default(),
            };
        } else {
            self.finish_move(from, to, Promotion::default());
        }
        Ok(self.state)
    }

    /// Move the promotion menu cursor down (`true`) or up (`false`).
    pub fn cycle_promotion(&mut self, down: bool) -> Result<Promotion, ChessError> {
        match &mut self.state {
            PlayerState::AwaitPromote { choice, .. } => {
                *choice = if down { choice.next() } else { choice.prev() };
                Ok(*choice)
            }
            _ => Err(ChessError::NothingSelected),
        }
    }

    /// Play the pending promotion with the highlighted choice.
    pub fn confirm_promotion(&mut self) -> Result<GameStatus, ChessError> {
        let PlayerState::AwaitPromote { from, to, choice } = self.state else {
            return Err(ChessError::NothingSelected);
        };
        Ok(self.finish_move(from, to, choice))
    }

    /// Put down whatever is held.
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            PlayerState::Holding { .. } | PlayerState::AwaitPromote { .. }
        ) {
            self.state = PlayerState::Idle;
        }
    }

    // -----------------------------------------------------------------
    // One-shot moves
    // -----------------------------------------------------------------

    /// Validate and play `from` → `to`. `promotion` only matters for a pawn
    /// reaching the last rank. Any pending selection is discarded.
    pub fn play(&mut self, from: Square, to: Square, promotion: Promotion) -> Result<GameStatus, ChessError> {
        self.ensure_active()?;
        if self.board.piece_at(from).is_none_or(|p| p.color() != self.side_to_move) {
            return Err(ChessError::WrongSide {
                square: from.to_algebraic(),
                side: self.side_to_move,
            });
        }
        self.check_legal(from, to)?;
        Ok(self.finish_move(from, to, promotion))
    }

    fn check_legal(&self, from: Square, to: Square) -> Result<(), ChessError> {
        if self.board.legal_moves_from(from).contains(&to) {
            Ok(())
        } else {
            Err(ChessError::InvalidMove {
                from: from.to_algebraic(),
                to: to.to_algebraic(),
                reason: "not a legal move".into(),
            })
        }
    }

    fn ensure_active(&self) -> Result<(), ChessError> {
        match self.state {
            PlayerState::GameOver(status) => Err(ChessError::GameOver(status.to_string())),
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------
    // Turn handling
    // -----------------------------------------------------------------

    fn finish_move(&mut self, from: Square, to: Square, promotion: Promotion) -> GameStatus {
        self.board.move_piece(from, to, promotion);
        self.plies += 1;
        self.side_to_move = !self.side_to_move;
        self.begin_turn();
        debug!(game = %self.id, %from, %to, status = %self.status, "move played");
        self.status
    }

    fn begin_turn(&mut self) {
        let side = self.side_to_move;
        let has_moves = self.board.turn_start(side);
        let in_check = self.board.is_in_check(side, true);

        self.status = match (has_moves, in_check) {
            (false, true) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (true, false) => GameStatus::Active,
        };

        self.state = if self.status.is_game_over() {
            info!(game = %self.id, status = %self.status, plies = self.plies, "game over");
            PlayerState::GameOver(self.status)
        } else {
            PlayerState::Idle
        };
    }

    // -----------------------------------------------------------------
    // Board array (for rendering)
    // -----------------------------------------------------------------

    /// Generate an 8×8 board array (row-major, rank 8 first → rank 1 last).
    /// Empty squares are empty strings. Pieces are like "wP", "bK", etc.
    pub fn board_array(&self) -> [[String; 8]; 8] {
        let mut board = std::array::from_fn(|_| std::array::from_fn(|_| String::new()));
        for rank in 0..8u8 {
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, 7 - rank);
                if let Some(piece) = self.board.piece_at(sq) {
                    let c = match piece.color() {
                        Color::White => 'w',
                        Color::Black => 'b',
                    };
                    let p = match piece.kind() {
                        PieceKind::Pawn => 'P',
                        PieceKind::Knight => 'N',
                        PieceKind::Bishop => 'B',
                        PieceKind::Rook => 'R',
                        PieceKind::Queen => 'Q',
                        PieceKind::King => 'K',
                    };
                    board[rank as usize][file as usize] = format!("{c}{p}");
                }
            }
        }
        board
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id.clone(),
            board: self.board_array(),
            side_to_move: self.side_to_move,
            status: self.status,
            check: self.board.is_in_check(self.side_to_move, true),
            plies: self.plies,
            created_at: self.created_at,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
