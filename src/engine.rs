//! Engine handle: the one struct a protocol front end holds on to across
//! moves, bundling every table the search touches (Design Notes §9's
//! "explicit engine handle" rather than thread-locals or globals).
//!
//! Grounded in the teacher's top-level `Engine`/`SearchContext` pairing in
//! `search/mod.rs`, generalized onto the split pawn/non-pawn signature
//! model's table set: the transposition table, pawn hash, en-prise table,
//! history/fail-high ordering state, and the per-thread killer context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::board::Position;
use crate::moves::movegen::{self, GenMode};
use crate::moves::types::{Move, MoveStack, ScoredMove};
use crate::search::alpha_beta::{INFINITY, QUARTER_PLY, SearchEnv};
use crate::search::context::SearchContext;
use crate::search::enprise::EnpriseTable;
use crate::search::eval;
use crate::search::iterative::{self, IterationReport, IterativeDeepeningResult};
use crate::search::ordering::{self, FailHighStats, HistoryTable};
use crate::search::pawn_hash::PawnHash;
use crate::search::recognizers::{NoTablebase, Tablebase};
use crate::search::time::{TimeControl, TimeController};
use crate::search::tt::TranspositionTable;

/// Runtime-tunable options the protocol layer can set (xboard `option`
/// negotiation, SPEC_FULL.md §10.3). Serializable so a host can persist or
/// transmit a saved configuration without the library touching a file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EngineOptions {
    pub tt_size_mb: usize,
    pub pawn_hash_entries_pow2: usize,
    pub search_threads: usize,
    pub ponder: bool,
    pub contempt: i32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            tt_size_mb: 64,
            pawn_hash_entries_pow2: 1 << 16,
            search_threads: 1,
            ponder: false,
            contempt: 0,
        }
    }
}

/// Everything a single search needs, alive for as long as the process runs.
/// A new game (`setboard`/`new`) clears the transposition and pawn hash
/// tables but keeps the ordering state decaying across the new game, same
/// as the teacher clears its tables on `ucinewgame` but keeps history warm.
pub struct Engine {
    pub options: EngineOptions,
    tt: TranspositionTable,
    pawn_hash: PawnHash,
    enprise: EnpriseTable,
    history: HistoryTable,
    fail_high: FailHighStats,
    ctx: SearchContext,
    tablebase: Box<dyn Tablebase>,
    stop: AtomicBool,
    root_moves: Mutex<Box<MoveStack>>,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Engine {
            tt: TranspositionTable::new(options.tt_size_mb),
            pawn_hash: PawnHash::new(options.pawn_hash_entries_pow2),
            enprise: EnpriseTable::new(),
            history: HistoryTable::new(),
            fail_high: FailHighStats::new(),
            ctx: SearchContext::new(),
            tablebase: Box::new(NoTablebase),
            stop: AtomicBool::new(false),
            root_moves: Mutex::new(Box::new(MoveStack::new())),
            options,
        }
    }

    /// Forget everything keyed to the prior game: transposition table, pawn
    /// hash, en-prise cache and killer slots. History/fail-high decay on
    /// their own (`halve()` each iteration) rather than being wiped, since a
    /// fresh game still benefits from recently learned quiet-move ordering.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.pawn_hash.clear();
        self.enprise.clear();
        self.ctx.clear();
        self.stop.store(false, Ordering::Relaxed);
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// A quick static evaluation of `pos` from the side to move's
    /// perspective, used by the protocol layer's `.` and `eval`-style
    /// inspection commands without spending any search budget.
    pub fn evaluate(&mut self, pos: &mut Position) -> i32 {
        eval::evaluate(pos, &mut self.pawn_hash, -INFINITY, INFINITY)
    }

    /// Run iterative deepening from `pos` up to `max_depth_plies`, obeying
    /// `time`, and return the best move found. `on_iteration` is invoked
    /// once per completed depth (xboard `post` output hook).
    pub fn search_best_move(
        &mut self,
        pos: &mut Position,
        time_control: TimeControl,
        max_depth_plies: i32,
        mut on_iteration: impl FnMut(&IterationReport),
    ) -> IterativeDeepeningResult {
        self.stop.store(false, Ordering::Relaxed);
        let controller = TimeController::new(time_control);

        {
            let mut stack = self.root_moves.lock().unwrap();
            stack.open_ply(0);
            let root_moves = movegen::generate(pos, GenMode::AllMoves);
            for mv in &root_moves {
                stack.push(0, ScoredMove { mv: *mv, score: 0, flags: 0 });
            }
            controller
                .current_is_only_move
                .store(stack.len_at(0) == 1, Ordering::Relaxed);
            stack.close_ply(0);
        }
        controller.searching_first_move.store(true, Ordering::Relaxed);

        let mut env = SearchEnv {
            tt: &self.tt,
            pawn_hash: &mut self.pawn_hash,
            enprise: &self.enprise,
            history: &self.history,
            fail_high: &self.fail_high,
            ctx: &mut self.ctx,
            tablebase: self.tablebase.as_ref(),
            stop: &self.stop,
            controller: &controller,
            nodes: 0,
            root_depth_qp: QUARTER_PLY,
        };
        self.tt.new_search();

        let result = iterative::iterative_deepen(&mut env, pos, max_depth_plies, &controller, |report| {
            controller.searching_first_move.store(false, Ordering::Relaxed);
            on_iteration(report);
        });
        result
    }

    /// Score and order the legal moves at the root, for protocol commands
    /// that want to show a ranked move list (`.`, analysis output) without
    /// running a full search.
    pub fn ordered_root_moves(&mut self, pos: &Position, hash_move: Option<Move>) -> Vec<Move> {
        let in_check = pos.in_check(pos.side_to_move);
        let moves = movegen::generate(pos, GenMode::AllMoves);
        let mut scored: Vec<ScoredMove> = moves
            .into_iter()
            .map(|mv| ScoredMove { mv, score: 0, flags: 0 })
            .collect();
        ordering::order_moves(pos, &mut scored, 0, hash_move, &self.ctx, &self.history, in_check);
        scored.into_iter().map(|sm| sm.mv).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;
    use crate::search::time::TimeControl;
    use std::time::Duration;

    #[test]
    fn finds_an_immediate_mate_within_a_shallow_depth_budget() {
        let mut engine = Engine::new(EngineOptions::default());
        let mut pos = fen::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let time_control = TimeControl { fixed_time_per_move: Some(Duration::from_millis(200)), ..Default::default() };
        let result = engine.search_best_move(&mut pos, time_control, 16, |_| {});
        assert!(result.best_move.is_some());
        assert!(result.score >= crate::search::tt::MATE_THRESHOLD);
    }

    #[test]
    fn new_game_clears_the_transposition_table() {
        let mut engine = Engine::new(EngineOptions::default());
        let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
        let time_control = TimeControl { fixed_time_per_move: Some(Duration::from_millis(50)), ..Default::default() };
        engine.search_best_move(&mut pos, time_control, 4, |_| {});
        engine.new_game();
        assert!(engine.tt.probe(pos.signature()).is_none());
    }
}
