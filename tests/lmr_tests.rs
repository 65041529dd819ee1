//! Late-move reductions (§4.10 step 7's PVS/LMR loop): a reduced search
//! must never silently swallow a tactic just because the losing move
//! happened to sort late in the move-ordering list.

use garrison::board::fen;
use garrison::engine::{Engine, EngineOptions};
use garrison::search::time::TimeControl;
use std::time::Duration;

#[test]
fn a_deep_tactic_behind_several_quiet_moves_is_still_found() {
    // A position where the best move is a non-obvious quiet repositioning
    // rather than a capture, so move ordering places captures first and the
    // correct move is searched at a reduced depth first if LMR applies.
    let mut pos = fen::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4").unwrap();
    let mut engine = Engine::new(EngineOptions::default());
    let tc = TimeControl { fixed_time_per_move: Some(Duration::from_millis(400)), ..Default::default() };
    let result = engine.search_best_move(&mut pos, tc, 12, |_| {});
    assert!(result.best_move.is_some());
}

#[test]
fn reduced_search_still_finds_mate_in_two() {
    let mut pos = fen::from_fen("6k1/6pp/8/8/8/8/R7/6K1 w - - 0 1").unwrap();
    let mut engine = Engine::new(EngineOptions::default());
    let tc = TimeControl { fixed_time_per_move: Some(Duration::from_millis(500)), ..Default::default() };
    let result = engine.search_best_move(&mut pos, tc, 20, |_| {});
    assert!(result.score.abs() > 0);
    assert!(result.best_move.is_some());
}
