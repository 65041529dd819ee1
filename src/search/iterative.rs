//! Iterative deepening driver (C12): repeated root searches at growing
//! depth, each inside an aspiration window derived from the previous
//! iteration's score, widened on fail-high/fail-low per a fixed sequence.
//!
//! Grounded in the teacher's `search::search` top-level loop (per-iteration
//! duration tracking, history-table decay between iterations, aspiration
//! retry loop) generalized onto quarter-ply depth units and the explicit
//! `SearchEnv`/time-controller split the engine handle model calls for.

use std::sync::atomic::Ordering;

use crate::board::Position;
use crate::moves::types::Move;

use super::alpha_beta::{self, INFINITY, QUARTER_PLY, SearchEnv};
use super::time::TimeController;
use super::tt;

/// Aspiration re-search widening sequence (centipawns), per C12 step 5/6.
const ASPIRATION_WIDENS: [i32; 3] = [150, 375, i32::MAX / 4];
const INITIAL_WINDOW: i32 = 25;
const ASPIRATION_MIN_DEPTH: i32 = 5 * QUARTER_PLY;

pub struct IterationReport {
    pub depth_plies: i32,
    pub score: i32,
    pub best_move: Option<Move>,
    pub nodes: u64,
}

pub struct IterativeDeepeningResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub completed_depth_plies: i32,
}

/// Drive iterative deepening from depth 1 up to `max_depth_plies` (or until
/// `time` signals stop), calling `on_iteration` after each completed depth
/// so a caller can emit PV/info output (xboard `post` mode).
pub fn iterative_deepen(
    env: &mut SearchEnv,
    pos: &mut Position,
    max_depth_plies: i32,
    time: &TimeController,
    mut on_iteration: impl FnMut(&IterationReport),
) -> IterativeDeepeningResult {
    let mut last_best_move = None;
    let mut last_score = 0;
    let mut completed_depth_plies = 0;

    for depth_plies in 1..=max_depth_plies {
        if time.should_stop_before_iteration(depth_plies, completed_depth_plies == 0) {
            break;
        }
        env.history.halve();

        let depth_qp = depth_plies * QUARTER_PLY;
        env.root_depth_qp = depth_qp;

        let (score, best_move, aborted) = search_with_aspiration(env, pos, depth_qp, last_score, depth_plies);

        if aborted {
            break;
        }

        last_score = score;
        last_best_move = best_move.or(last_best_move);
        completed_depth_plies = depth_plies;

        on_iteration(&IterationReport {
            depth_plies,
            score,
            best_move: last_best_move,
            nodes: env.nodes,
        });

        if score.abs() >= tt::MATE_THRESHOLD {
            break;
        }
        if time.move_immediately.load(Ordering::Relaxed) {
            break;
        }
    }

    IterativeDeepeningResult { best_move: last_best_move, score: last_score, completed_depth_plies }
}

fn search_with_aspiration(
    env: &mut SearchEnv,
    pos: &mut Position,
    depth_qp: i32,
    previous_score: i32,
    depth_plies: i32,
) -> (i32, Option<Move>, bool) {
    if depth_plies < ASPIRATION_MIN_DEPTH / QUARTER_PLY {
        let result = alpha_beta::search(env, pos, -INFINITY, INFINITY, depth_qp, 0, 0);
        return (result.score, result.best_move, result.aborted);
    }

    let mut alpha = previous_score - INITIAL_WINDOW;
    let mut beta = previous_score + INITIAL_WINDOW;
    let mut fail_low_step = 0usize;
    let mut fail_high_step = 0usize;

    loop {
        let result = alpha_beta::search(env, pos, alpha, beta, depth_qp, 0, 0);
        if result.aborted {
            return (0, None, true);
        }
        if result.score <= alpha {
            let widen = ASPIRATION_WIDENS[fail_low_step.min(ASPIRATION_WIDENS.len() - 1)];
            alpha = previous_score.saturating_sub(widen);
            fail_low_step += 1;
            continue;
        }
        if result.score >= beta {
            let widen = ASPIRATION_WIDENS[fail_high_step.min(ASPIRATION_WIDENS.len() - 1)];
            beta = previous_score.saturating_add(widen);
            fail_high_step += 1;
            continue;
        }
        return (result.score, result.best_move, false);
    }
}
