//! Testable Property 1: incrementally maintained signatures must always
//! match a from-scratch recomputation, across a sequence of make/unmake
//! pairs including captures, castling, en passant, and promotion.

use garrison::board::fen;
use garrison::moves::execute;
use garrison::moves::movegen::{self, GenMode};

fn assert_signatures_match(pos: &garrison::board::Position) {
    let (pawn, nonpawn) = pos.compute_signatures();
    assert_eq!(pawn, pos.pawn_sig, "pawn signature drifted");
    assert_eq!(nonpawn, pos.nonpawn_sig, "non-pawn signature drifted");
}

#[test]
fn startpos_signature_matches_its_own_recomputation() {
    let pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
    assert_signatures_match(&pos);
}

#[test]
fn signatures_survive_a_walk_of_six_plies() {
    let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
    for _ in 0..6 {
        let moves = movegen::generate(&pos, GenMode::AllMoves);
        let Some(mv) = moves.into_iter().next() else { break };
        execute::make(&mut pos, mv).expect("generated move must be legal");
        assert_signatures_match(&pos);
    }
}

#[test]
fn castling_updates_the_nonpawn_signature_consistently() {
    let mut pos = fen::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let moves = movegen::generate(&pos, GenMode::AllMoves);
    let castle = moves
        .into_iter()
        .find(|mv| mv.to_coordinate() == "e1g1")
        .expect("kingside castle should be legal here");
    let undo = execute::make(&mut pos, castle).unwrap();
    assert_signatures_match(&pos);
    execute::unmake(&mut pos, undo);
    assert_signatures_match(&pos);
}

#[test]
fn en_passant_capture_updates_both_signatures_consistently() {
    let mut pos = fen::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    let moves = movegen::generate(&pos, GenMode::AllMoves);
    let ep = moves
        .into_iter()
        .find(|mv| mv.is_en_passant())
        .expect("en passant should be available");
    let undo = execute::make(&mut pos, ep).unwrap();
    assert_signatures_match(&pos);
    execute::unmake(&mut pos, undo);
    assert_signatures_match(&pos);
}

#[test]
fn promotion_updates_both_signatures_consistently() {
    let mut pos = fen::from_fen("4k3/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let moves = movegen::generate(&pos, GenMode::AllMoves);
    let promo = moves
        .into_iter()
        .find(|mv| mv.is_promotion())
        .expect("a pawn on the seventh rank should be able to promote");
    let undo = execute::make(&mut pos, promo).unwrap();
    assert_signatures_match(&pos);
    execute::unmake(&mut pos, undo);
    assert_signatures_match(&pos);
}
