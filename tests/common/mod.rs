//! Shared helpers for the integration tests.

#![allow(dead_code)]

use console_chess::engine::{Board, Color, PieceKind, Promotion, Square};

pub fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

/// Build a board from an 8-row diagram, rank 8 first. Upper case is White,
/// lower case Black, `.` empty.
///
/// Pawns on their starting rank and kings or rooks on their starting squares
/// count as unmoved; everything else has moved.
pub fn diagram(rows: [&str; 8]) -> Board {
    let mut board = Board::empty();
    for (row, line) in rows.iter().enumerate() {
        let rank = 7 - row as u8;
        assert_eq!(line.len(), 8, "row {row} must have 8 cells");
        for (file, ch) in line.chars().enumerate() {
            let Some((color, kind)) = decode(ch) else {
                continue;
            };
            let sq = Square::from_file_rank(file as u8, rank);
            board.place(sq, color, kind, !is_home(sq, color, kind));
        }
    }
    board.recompute_attacks();
    board
}

fn decode(ch: char) -> Option<(Color, PieceKind)> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    let kind = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };
    Some((color, kind))
}

fn is_home(sq: Square, color: Color, kind: PieceKind) -> bool {
    let home = color.home_rank();
    match kind {
        PieceKind::Pawn => sq.rank() as i8 == home as i8 + color.forward(),
        PieceKind::King => sq == Square::from_file_rank(4, home),
        PieceKind::Rook => sq == Square::from_file_rank(0, home) || sq == Square::from_file_rank(7, home),
        _ => sq.rank() == home,
    }
}

/// Legal moves of `side`, expanding each promotion into its four choices.
pub fn expanded_moves(board: &mut Board, side: Color) -> Vec<(Square, Square, Promotion)> {
    board.turn_start(side);
    let mut moves = Vec::new();
    for (from, to) in board.legal_moves() {
        if board.is_promotable(from, to) {
            moves.extend(Promotion::ALL.iter().map(|&p| (from, to, p)));
        } else {
            moves.push((from, to, Promotion::Queen));
        }
    }
    moves
}

/// Play `(from, to)` pairs alternately from `side`, asserting each is legal.
pub fn play(board: &mut Board, mut side: Color, moves: &[(&str, &str)]) -> Color {
    for &(from, to) in moves {
        board.turn_start(side);
        assert!(
            board.legal_moves_from(sq(from)).contains(&sq(to)),
            "{from}{to} should be legal for {side}"
        );
        board.move_piece(sq(from), sq(to), Promotion::Queen);
        side = !side;
    }
    side
}
