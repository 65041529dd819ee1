//! Square control primitives (`Position::is_attacked`/`attack_counter`),
//! relied on by check detection, legal-move filtering, and the evaluator's
//! king-safety term.

use garrison::board::fen;
use garrison::board::piece::Color;
use garrison::square::Square;

#[test]
fn a_rook_attacks_along_its_open_file() {
    let pos = fen::from_fen("4k3/8/8/8/4R3/8/8/4K3 w - - 0 1").unwrap();
    let target = Square::try_from_algebraic("e8").unwrap();
    assert!(pos.is_attacked(target, Color::White));
}

#[test]
fn a_blocked_ray_does_not_attack_past_the_blocker() {
    let pos = fen::from_fen("4k3/8/4p3/8/4R3/8/8/4K3 w - - 0 1").unwrap();
    let target = Square::try_from_algebraic("e8").unwrap();
    assert!(!pos.is_attacked(target, Color::White), "the e6 pawn should block the rook's file attack");
}

#[test]
fn a_knight_attacks_its_full_leaper_pattern() {
    let mut pos = fen::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
    pos.rebuild_attack_counters();
    for sq in ["b3", "c2"] {
        let square = Square::try_from_algebraic(sq).unwrap();
        assert!(pos.is_attacked(square, Color::White), "expected the knight on a1 to attack {sq}");
    }
}

#[test]
fn a_square_with_two_attackers_has_an_attack_counter_of_two() {
    let mut pos = fen::from_fen("4k3/8/8/8/8/8/1R3R2/4K3 w - - 0 1").unwrap();
    pos.rebuild_attack_counters();
    let target = Square::try_from_algebraic("e2").unwrap();
    assert_eq!(pos.attack_counter(target, Color::White), 2);
}

#[test]
fn in_check_agrees_with_is_attacked_on_the_king_square() {
    let pos = fen::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
    let king_square = pos.king_square(Color::Black);
    assert_eq!(pos.in_check(Color::Black), pos.is_attacked(king_square, Color::White));
}
