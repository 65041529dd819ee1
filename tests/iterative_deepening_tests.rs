//! Iterative deepening driver (C12): each completed iteration is reported
//! exactly once, depth increases monotonically, and the final best move is
//! the last iteration that actually completed.

use garrison::board::fen;
use garrison::engine::{Engine, EngineOptions};
use garrison::search::time::TimeControl;
use std::time::Duration;

#[test]
fn completed_iterations_report_strictly_increasing_depth() {
    let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
    let mut engine = Engine::new(EngineOptions::default());
    let tc = TimeControl { fixed_time_per_move: Some(Duration::from_millis(300)), ..Default::default() };

    let mut depths = Vec::new();
    let result = engine.search_best_move(&mut pos, tc, 10, |report| {
        depths.push(report.depth_plies);
    });

    assert!(!depths.is_empty());
    for window in depths.windows(2) {
        assert!(window[1] > window[0], "depths should strictly increase: {depths:?}");
    }
    assert_eq!(result.completed_depth_plies, *depths.last().unwrap());
}

#[test]
fn the_first_iteration_always_completes_even_under_a_tiny_time_budget() {
    let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
    let mut engine = Engine::new(EngineOptions::default());
    let tc = TimeControl { fixed_time_per_move: Some(Duration::from_millis(1)), ..Default::default() };
    let result = engine.search_best_move(&mut pos, tc, 20, |_| {});
    assert!(result.best_move.is_some());
    assert!(result.completed_depth_plies >= 1);
}

#[test]
fn finding_a_forced_mate_stops_deepening_early() {
    let mut pos = fen::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    let mut engine = Engine::new(EngineOptions::default());
    let tc = TimeControl { fixed_time_per_move: Some(Duration::from_secs(2)), ..Default::default() };
    let result = engine.search_best_move(&mut pos, tc, 40, |_| {});
    assert!(result.completed_depth_plies < 40, "should stop deepening once mate is found");
}
