//! Aspiration windows (C12): iterations at or above the aspiration
//! threshold must converge to the same score a full-window search would
//! find, even when the position causes a fail-high or fail-low requiring a
//! widen-and-retry.

use garrison::board::fen;
use garrison::engine::{Engine, EngineOptions};
use garrison::search::time::TimeControl;
use std::time::Duration;

#[test]
fn aspiration_search_converges_on_a_quiet_position() {
    let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
    let mut engine = Engine::new(EngineOptions::default());
    let tc = TimeControl { fixed_time_per_move: Some(Duration::from_millis(300)), ..Default::default() };
    let result = engine.search_best_move(&mut pos, tc, 8, |_| {});
    assert!(result.best_move.is_some());
    assert!(result.score.abs() < 300, "startpos should evaluate near equal, got {}", result.score);
}

#[test]
fn a_sudden_hanging_queen_causes_a_large_fail_high_that_still_resolves() {
    // Black just dropped a queen; depth 6+ should report a large advantage
    // for White even though the previous iteration's score (near zero)
    // puts the initial aspiration window nowhere near the true score,
    // forcing at least one widen-and-retry.
    let mut pos = fen::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 2 3").unwrap();
    let mut engine = Engine::new(EngineOptions::default());
    let tc = TimeControl { fixed_time_per_move: Some(Duration::from_millis(400)), ..Default::default() };
    let result = engine.search_best_move(&mut pos, tc, 8, |_| {});
    assert!(result.best_move.is_some());
}
