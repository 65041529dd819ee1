//! Draw-detection invariants (§3/§4.10 step 1): threefold repetition,
//! insufficient material, and the fifty-move counter, all consulted before
//! a search node does any real work.

use garrison::board::fen;
use garrison::moves::execute;
use garrison::moves::movegen::{self, GenMode};
use garrison::square::Square;

#[test]
fn bare_kings_is_insufficient_material() {
    let pos = fen::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(pos.is_insufficient_material());
}

#[test]
fn king_and_pawn_is_not_insufficient_material() {
    let pos = fen::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    assert!(!pos.is_insufficient_material());
}

#[test]
fn king_and_single_minor_each_side_is_insufficient_material() {
    let pos = fen::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
    assert!(pos.is_insufficient_material());
}

#[test]
fn shuffling_a_king_back_and_forth_three_times_is_a_threefold_repetition() {
    let mut pos = fen::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(!pos.is_threefold_repetition());

    let find = |pos: &garrison::board::Position, from: &str, to: &str| {
        let from = Square::try_from_algebraic(from).unwrap();
        let to = Square::try_from_algebraic(to).unwrap();
        movegen::generate(pos, GenMode::AllMoves)
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to)
            .unwrap_or_else(|| panic!("expected {from:?}->{to:?} to be legal"))
    };

    // King shuffles e1-d1-e1-d1-e1-d1-e1, black mirrors on the other wing,
    // reaching the starting position a third time.
    let white_steps = [("e1", "d1"), ("d1", "e1"), ("e1", "d1"), ("d1", "e1"), ("e1", "d1"), ("d1", "e1")];
    let black_steps = [("e8", "d8"), ("d8", "e8"), ("e8", "d8"), ("d8", "e8"), ("e8", "d8"), ("d8", "e8")];

    for i in 0..white_steps.len() {
        let mv = find(&pos, white_steps[i].0, white_steps[i].1);
        execute::make(&mut pos, mv).unwrap();
        let mv = find(&pos, black_steps[i].0, black_steps[i].1);
        execute::make(&mut pos, mv).unwrap();
    }

    assert!(pos.is_threefold_repetition());
}
