//! Static exchange evaluation correctness (C5): simple and layered capture
//! sequences where the sign and rough magnitude of the result is known by
//! hand.

use garrison::board::fen;
use garrison::board::piece::PieceType;
use garrison::search::see::static_exchange_eval;
use garrison::square::Square;

#[test]
fn free_pawn_capture_with_no_recapture_is_strictly_positive() {
    let pos = fen::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let see = static_exchange_eval(
        &pos,
        Square::try_from_algebraic("e4").unwrap(),
        Square::try_from_algebraic("d5").unwrap(),
        PieceType::Pawn,
        Some(PieceType::Pawn),
        None,
    );
    assert_eq!(see, PieceType::Pawn.value());
}

#[test]
fn defended_pawn_capture_with_a_queen_loses_material() {
    // White queen takes a pawn defended by a black pawn: Q captures P, then
    // PxQ — a clearly losing trade from White's perspective.
    let pos = fen::from_fen("4k3/3p4/8/3p4/8/8/8/3QK3 w - - 0 1").unwrap();
    let see = static_exchange_eval(
        &pos,
        Square::try_from_algebraic("d1").unwrap(),
        Square::try_from_algebraic("d5").unwrap(),
        PieceType::Queen,
        Some(PieceType::Pawn),
        None,
    );
    assert!(see < 0, "expected a losing trade, got {see}");
}

#[test]
fn rook_takes_undefended_rook_is_a_clean_win() {
    let pos = fen::from_fen("4k3/8/8/8/8/8/8/R3r1K1 w - - 0 1").unwrap();
    let see = static_exchange_eval(
        &pos,
        Square::try_from_algebraic("a1").unwrap(),
        Square::try_from_algebraic("e1").unwrap(),
        PieceType::Rook,
        Some(PieceType::Rook),
        None,
    );
    assert_eq!(see, PieceType::Rook.value());
}

#[test]
fn layered_defense_collapses_to_the_best_stopping_point() {
    // Rook takes a pawn defended by a rook which is itself defended by a
    // queen: taking should still net at least the pawn since the attacker
    // can "stand pat" after the first recapture rather than trading down.
    let pos = fen::from_fen("4k3/8/8/3r4/8/3Q4/8/3RK3 w - - 0 1").unwrap();
    let see = static_exchange_eval(
        &pos,
        Square::try_from_algebraic("d1").unwrap(),
        Square::try_from_algebraic("d5").unwrap(),
        PieceType::Rook,
        Some(PieceType::Rook),
        None,
    );
    assert!(see >= 0, "expected at least breaking even, got {see}");
}
