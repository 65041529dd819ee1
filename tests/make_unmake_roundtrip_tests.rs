//! Testable Property 2: for any reachable position and any sequence of
//! legal moves, making each move and then unmaking them in reverse order
//! returns the position to its exact starting FEN and signature. Exercised
//! with `proptest` by driving a random walk through the legal-move tree
//! from several structurally distinct starting positions.

use garrison::board::fen;
use garrison::moves::execute;
use garrison::moves::movegen::{self, GenMode};
use proptest::prelude::*;

const STARTING_POSITIONS: [&str; 3] = [
    fen::STARTPOS_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
];

fn walk_and_unwind(start_fen: &str, picks: &[u8]) {
    let mut pos = fen::from_fen(start_fen).unwrap();
    let before_fen = fen::to_fen(&pos);
    let before_sig = pos.signature();

    let mut undos = Vec::new();
    for &pick in picks {
        let moves = movegen::generate(&pos, GenMode::AllMoves);
        if moves.is_empty() {
            break;
        }
        let mv = moves[pick as usize % moves.len()];
        let undo = execute::make(&mut pos, mv).expect("a generated move must be legal");
        undos.push(undo);
        pos.assert_signatures_consistent();
    }

    for undo in undos.into_iter().rev() {
        execute::unmake(&mut pos, undo);
    }

    assert_eq!(pos.signature(), before_sig, "signature did not return to its original value");
    assert_eq!(fen::to_fen(&pos), before_fen, "board did not return to its original FEN");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn make_unmake_round_trips_from_the_starting_position(picks in prop::collection::vec(0u8..32, 0..10)) {
        walk_and_unwind(STARTING_POSITIONS[0], &picks);
    }

    #[test]
    fn make_unmake_round_trips_from_a_kiwipete_style_midgame(picks in prop::collection::vec(0u8..32, 0..10)) {
        walk_and_unwind(STARTING_POSITIONS[1], &picks);
    }

    #[test]
    fn make_unmake_round_trips_from_a_sparse_endgame(picks in prop::collection::vec(0u8..32, 0..10)) {
        walk_and_unwind(STARTING_POSITIONS[2], &picks);
    }
}

#[test]
fn move_stack_partitions_stay_disjoint_across_nested_plies() {
    use garrison::moves::types::{MoveStack, ScoredMove};

    let mut stack = MoveStack::default();
    let root_moves = movegen::generate(&fen::from_fen(fen::STARTPOS_FEN).unwrap(), GenMode::AllMoves);
    stack.open_ply(0);
    stack.push(0, ScoredMove { mv: root_moves[0], score: 0, flags: 0 });
    stack.open_ply(1);
    stack.push(1, ScoredMove { mv: root_moves[1], score: 0, flags: 0 });

    assert_eq!(stack.len_at(0), 1);
    assert_eq!(stack.len_at(1), 1);

    stack.close_ply(1);
    assert_eq!(stack.len_at(1), 0);
    assert_eq!(stack.len_at(0), 1, "closing ply 1 must not disturb ply 0's entries");

    stack.close_ply(0);
    assert_eq!(stack.len_at(0), 0);
}
