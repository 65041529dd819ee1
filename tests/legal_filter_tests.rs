//! Legal-move filtering (C4 rule 1): pinned pieces can't move off the pin
//! line, a king can't move into check, and a king in check must have every
//! generated move actually resolve the check.

use garrison::board::fen;
use garrison::moves::movegen::{self, GenMode};
use garrison::square::Square;

#[test]
fn a_pinned_bishop_cannot_step_off_the_pin_line() {
    // White bishop on f2 is pinned to the king on e1 by the black bishop on
    // h4 along the e1-h4 diagonal; it may only move along that diagonal.
    let pos = fen::from_fen("4k3/8/8/8/7b/8/5B2/4K3 w - - 0 1").unwrap();
    let moves = movegen::generate(&pos, GenMode::AllMoves);
    let bishop_from = Square::try_from_algebraic("f2").unwrap();
    let diagonal = bishop_from.file() as i16 - bishop_from.rank() as i16;
    let mut bishop_moves = 0;
    for mv in moves.iter().filter(|mv| mv.from == bishop_from) {
        bishop_moves += 1;
        let on_pin_line = mv.to.file() as i16 - mv.to.rank() as i16 == diagonal;
        assert!(on_pin_line, "pinned bishop moved off the pin diagonal to {:?}", mv.to);
    }
    assert!(bishop_moves > 0, "the pinned bishop should still have moves along the pin line");
}

#[test]
fn a_king_cannot_move_into_an_attacked_square() {
    let pos = fen::from_fen("4k3/8/4r3/8/8/8/8/4K3 w - - 0 1").unwrap();
    let moves = movegen::generate(&pos, GenMode::AllMoves);
    let king_from = Square::try_from_algebraic("e1").unwrap();
    for mv in moves.iter().filter(|mv| mv.from == king_from) {
        assert_ne!(mv.to.file(), king_from.file(), "king must not step back onto the attacked e-file");
    }
}

#[test]
fn every_move_while_in_check_actually_resolves_the_check() {
    let mut pos = fen::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
    assert!(pos.in_check(pos.side_to_move));
    let moves = movegen::generate(&pos, GenMode::AllMoves);
    assert!(!moves.is_empty());
    for mv in moves {
        let undo = garrison::moves::execute::make(&mut pos, mv).expect("generated move must be legal");
        assert!(!pos.in_check(garrison::board::piece::Color::White), "move {:?} left the king in check", mv);
        garrison::moves::execute::unmake(&mut pos, undo);
    }
}

#[test]
fn a_double_check_can_only_be_resolved_by_moving_the_king() {
    // Black king on e8 is attacked simultaneously by a rook on e1 (along
    // the file) and a bishop on h5 (along the diagonal); only king moves
    // can resolve a double check.
    let pos = fen::from_fen("4k3/8/8/7B/8/8/8/4R1K1 b - - 0 1").unwrap();
    let king_from = Square::try_from_algebraic("e8").unwrap();
    let moves = movegen::generate(&pos, GenMode::AllMoves);
    assert!(!moves.is_empty());
    for mv in moves {
        assert_eq!(mv.from, king_from, "only the king may move under double check, got {:?}", mv);
    }
}
