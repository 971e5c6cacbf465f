pub mod board;
pub mod direction;
pub mod game;
mod legality;
pub mod piece;
pub mod types;

pub use board::{Board, Cell};
pub use direction::Direction;
pub use game::{Game, GameSnapshot, PlayerState};
pub use piece::{Piece, Reach};
pub use types::*;
