//! End-to-end rule scenarios played through the public API.

mod common;

use common::{diagram, play, sq};
use console_chess::engine::{
    Board, ChessError, Color, Game, GameStatus, PieceKind, PlayerState, Promotion,
};

// =====================================================================
// Game end
// =====================================================================

#[test]
fn starting_position_is_quiet() {
    let mut board = Board::new();
    assert!(board.turn_start(Color::White));
    assert!(!board.is_in_check(Color::White, true));
    assert!(!board.is_in_check(Color::Black, false));
    board.assert_consistent();
}

#[test]
fn fools_mate() {
    let mut board = Board::new();
    let side = play(
        &mut board,
        Color::White,
        &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
    );
    assert_eq!(side, Color::White);
    assert!(!board.turn_start(Color::White));
    assert!(board.is_in_check(Color::White, true));
    assert!(board.legal_moves().is_empty());
}

#[test]
fn stalemate_is_not_check() {
    let mut board = diagram([
        "k.......",
        "..K.....",
        ".Q......",
        "........",
        "........",
        "........",
        "........",
        "........",
    ]);
    assert!(!board.turn_start(Color::Black));
    assert!(!board.is_in_check(Color::Black, true));
}

#[test]
fn discovered_check_is_seen_at_turn_start() {
    // Bishop steps off the e-file, uncovering the rook on e1.
    let mut board = diagram([
        "....k...",
        "........",
        "........",
        "........",
        "....B...",
        "........",
        "........",
        "K...R...",
    ]);
    play(&mut board, Color::White, &[("e4", "c6")]);
    assert!(board.turn_start(Color::Black));
    assert!(board.is_in_check(Color::Black, true));
    let mut king = board.legal_moves_from(sq("e8")).to_vec();
    king.sort();
    // e7 stays on the file, d7 is covered by the bishop.
    assert_eq!(king, vec![sq("f7"), sq("d8"), sq("f8")]);
}

// =====================================================================
// En passant
// =====================================================================

#[test]
fn en_passant_window_is_one_move() {
    let mut board = Board::new();
    play(
        &mut board,
        Color::White,
        &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")],
    );
    board.turn_start(Color::White);
    assert!(board.legal_moves_from(sq("e5")).contains(&sq("d6")));

    // White passes on the capture; the right lapses.
    play(&mut board, Color::White, &[("h2", "h3"), ("a6", "a5")]);
    board.turn_start(Color::White);
    assert!(!board.legal_moves_from(sq("e5")).contains(&sq("d6")));
}

#[test]
fn en_passant_removes_the_pawn() {
    let mut board = Board::new();
    play(
        &mut board,
        Color::White,
        &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("f7", "f5"), ("e5", "f6")],
    );
    assert!(board.piece_at(sq("f5")).is_none());
    assert_eq!(board.pieces().count(), 31);
    board.turn_start(Color::Black);
    board.assert_consistent();
}

// =====================================================================
// Castling
// =====================================================================

fn castling_board() -> Board {
    diagram([
        "r...k..r",
        "pppppppp",
        "........",
        "........",
        "........",
        "........",
        "PPPPPPPP",
        "R...K..R",
    ])
}

#[test]
fn castling_both_sides_available() {
    let mut board = castling_board();
    board.turn_start(Color::White);
    let king = board.legal_moves_from(sq("e1"));
    assert!(king.contains(&sq("g1")));
    assert!(king.contains(&sq("c1")));
}

#[test]
fn castling_moves_rook_and_ends_rights() {
    let mut board = castling_board();
    play(&mut board, Color::White, &[("e1", "g1")]);
    assert_eq!(board.piece_at(sq("f1")).map(|p| p.kind()), Some(PieceKind::Rook));
    assert!(board.piece_at(sq("h1")).is_none());

    play(&mut board, Color::Black, &[("e8", "c8")]);
    assert_eq!(board.piece_at(sq("d8")).map(|p| p.kind()), Some(PieceKind::Rook));
    assert!(board.piece_at(sq("a8")).is_none());
    board.assert_consistent();
}

#[test]
fn king_walk_forfeits_castling() {
    let mut board = castling_board();
    play(
        &mut board,
        Color::White,
        &[("e1", "f1"), ("a7", "a6"), ("f1", "e1"), ("a6", "a5")],
    );
    board.turn_start(Color::White);
    let king = board.legal_moves_from(sq("e1"));
    assert!(!king.contains(&sq("g1")));
    assert!(!king.contains(&sq("c1")));
}

#[test]
fn castling_blocked_by_attacked_transit() {
    // The bishop on h5 covers d1, so only the short castle remains.
    let mut board = diagram([
        "....k...",
        "........",
        "........",
        ".......b",
        "........",
        "........",
        "PPP.....",
        "R...K..R",
    ]);
    board.turn_start(Color::White);
    assert!(board.legal_moves_from(sq("e1")).contains(&sq("g1")));
    assert!(!board.legal_moves_from(sq("e1")).contains(&sq("c1")));

    // The rook on f8 covers f1, so only the long castle remains.
    let mut board = diagram([
        "....kr..",
        "........",
        "........",
        "........",
        "........",
        "........",
        "PPP.....",
        "R...K..R",
    ]);
    board.turn_start(Color::White);
    assert!(!board.legal_moves_from(sq("e1")).contains(&sq("g1")));
    assert!(board.legal_moves_from(sq("e1")).contains(&sq("c1")));
}

// =====================================================================
// Pins and checks
// =====================================================================

#[test]
fn pinned_pawn_cannot_capture_off_line() {
    let mut board = diagram([
        "....k...",
        "........",
        "........",
        "b.......",
        "........",
        "....n...",
        "...P....",
        "....K...",
    ]);
    board.turn_start(Color::White);
    assert!(board.legal_moves_from(sq("d2")).is_empty());
}

#[test]
fn pinned_pawn_may_capture_the_pinner() {
    let mut board = diagram([
        "....k...",
        "........",
        "........",
        "........",
        "........",
        "..b.....",
        "...P....",
        "....K...",
    ]);
    board.turn_start(Color::White);
    assert_eq!(board.legal_moves_from(sq("d2")), &[sq("c3")]);
}

#[test]
fn king_may_not_step_into_pawn_strike() {
    let mut board = diagram([
        "....k...",
        "........",
        "........",
        "........",
        "........",
        "...p....",
        "........",
        "....K...",
    ]);
    board.turn_start(Color::White);
    let king = board.legal_moves_from(sq("e1"));
    assert!(!king.contains(&sq("e2")));
    assert!(king.contains(&sq("d2")));
    assert!(king.contains(&sq("f2")));
}

// =====================================================================
// Promotion through the turn controller
// =====================================================================

#[test]
fn promotion_through_menu() {
    let board = diagram([
        "....k...",
        ".P......",
        "........",
        "........",
        "........",
        "........",
        "........",
        "....K...",
    ]);
    let mut game = Game::from_board(board, Color::White);
    game.select(sq("b7")).unwrap();
    assert!(matches!(game.choose(sq("b8")).unwrap(), PlayerState::AwaitPromote { .. }));
    game.cycle_promotion(true).unwrap();
    // Rook on b8 checks along the back rank.
    assert_eq!(game.confirm_promotion().unwrap(), GameStatus::Check);
    assert_eq!(
        game.board().piece_at(sq("b8")).map(|p| p.kind()),
        Some(PieceKind::Rook)
    );
}

#[test]
fn promotion_delivers_back_rank_mate() {
    let board = diagram([
        ".......k",
        "P.....pp",
        "........",
        "........",
        "........",
        "........",
        "........",
        "....K...",
    ]);
    let mut game = Game::from_board(board, Color::White);
    assert_eq!(
        game.play(sq("a7"), sq("a8"), Promotion::Queen).unwrap(),
        GameStatus::Checkmate
    );
    assert!(matches!(
        game.play(sq("h7"), sq("h6"), Promotion::Queen),
        Err(ChessError::GameOver(_))
    ));
}
