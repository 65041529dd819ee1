//! Perft: raw leaf-node counting for move-generator validation (Testable
//! Property 5), using `GenMode::DontScore` since ordering is irrelevant here.

use crate::board::Position;
use super::execute::{make, unmake};
use super::movegen::{GenMode, generate};

pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(pos, GenMode::DontScore);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let undo = make(pos, mv).expect("generate() only yields legal moves");
        nodes += perft(pos, depth - 1);
        unmake(pos, undo);
    }
    nodes
}

/// Perft broken down by the first move played, for debugging divergence
/// against a reference perft tool.
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate(pos, GenMode::DontScore);
    let mut out = Vec::with_capacity(moves.len());
    for mv in moves {
        let undo = make(pos, mv).expect("generate() only yields legal moves");
        let count = if depth == 0 { 1 } else { perft(pos, depth - 1) };
        unmake(pos, undo);
        out.push((mv.to_coordinate(), count));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;

    #[test]
    fn startpos_perft_depth_1_to_3() {
        let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8902);
    }

    #[test]
    #[ignore] // slow: exercised explicitly, not on every default `cargo test`
    fn startpos_perft_depth_4_5() {
        let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
        assert_eq!(perft(&mut pos, 4), 197_281);
        assert_eq!(perft(&mut pos, 5), 4_865_609);
    }

    #[test]
    fn kiwipete_perft_depth_1_2() {
        let mut pos = fen::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&mut pos, 1), 48);
        assert_eq!(perft(&mut pos, 2), 2039);
    }
}
