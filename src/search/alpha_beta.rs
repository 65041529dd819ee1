//! Main alpha-beta search (C11): draw/mate-distance checks, transposition
//! and recognizer probes, null-move pruning, internal iterative deepening,
//! and the PVS/LMR move loop.
//!
//! Grounded in the teacher's `search/search.rs` `alpha_beta` (TT-probe-then-
//! cutoff shape, forward futility margins, PVS re-search ladder,
//! killer/history update on fail-high) generalized onto the split pawn/
//! non-pawn signature model, the 0x88 move generator, and the quarter-ply
//! depth unit and extension-budget taper the data model specifies (C11).

use std::sync::atomic::{AtomicBool, Ordering};

use crate::board::Position;
use crate::moves::execute;
use crate::moves::movegen::{self, GenMode};
use crate::moves::types::{Move, ScoredMove};

use super::context::SearchContext;
use super::enprise::EnpriseTable;
use super::ordering::{self, FailHighStats, HistoryTable};
use super::pawn_hash::PawnHash;
use super::quiescence::{self, QuiescenceContext};
use super::recognizers::{self, Tablebase};
use super::time::TimeController;
use super::tt::{self, Bound, TranspositionTable};

pub const QUARTER_PLY: i32 = 4;
pub const INFINITY: i32 = tt::MATE_SCORE + 1;
const NULL_MOVE_MIN_DEPTH: i32 = 5 * QUARTER_PLY;
const IID_MIN_DEPTH: i32 = 6 * QUARTER_PLY;
const LMR_MIN_DEPTH: i32 = 3 * QUARTER_PLY;
const LMR_MIN_MOVE_INDEX: usize = 3;
const NODE_CHECK_INTERVAL: u64 = 2047;
const FUTILITY_MAX_DEPTH: i32 = 3 * QUARTER_PLY;

/// Forward futility margin (centipawns) for a quiet move at `depth`
/// quarter-plies from the horizon: if `static_eval` plus this margin still
/// can't reach `alpha`, the move is assumed too weak to change the outcome
/// and is skipped without expanding its subtree (C11 step 5).
fn futility_margin(depth: i32) -> i32 {
    100 + 60 * (depth / QUARTER_PLY)
}

/// Everything the search needs that outlives a single recursive call,
/// bundled so the recursion signature stays manageable (Design Notes §9's
/// "explicit engine handle" guidance, scoped down to the search's slice).
pub struct SearchEnv<'a> {
    pub tt: &'a TranspositionTable,
    pub pawn_hash: &'a mut PawnHash,
    pub enprise: &'a EnpriseTable,
    pub history: &'a HistoryTable,
    pub fail_high: &'a FailHighStats,
    pub ctx: &'a mut SearchContext,
    pub tablebase: &'a dyn Tablebase,
    /// Externally requested stop (xboard `?`/a queued `setboard`), separate
    /// from the controller's own time-based deadlines.
    pub stop: &'a AtomicBool,
    pub controller: &'a TimeController,
    pub nodes: u64,
    pub root_depth_qp: i32,
}

pub struct SearchResult {
    pub score: i32,
    pub best_move: Option<Move>,
    pub aborted: bool,
}

/// Taper an extension's quarter-ply amount once the path has already used
/// more than `2 * root_depth` quarter-plies of extensions, per C11's
/// "Extensions budget": full value up to 2x, progressively smaller through
/// 3x/3.5x, ignored entirely past 4x.
fn scale_extension(raw_qp: i32, path_used_qp: i32, root_depth_qp: i32) -> i32 {
    if root_depth_qp <= 0 {
        return raw_qp;
    }
    let two_d = root_depth_qp * 2;
    let three_d = root_depth_qp * 3;
    let three_half_d = root_depth_qp * 7 / 2;
    let four_d = root_depth_qp * 4;
    if path_used_qp < two_d {
        raw_qp
    } else if path_used_qp < three_d {
        (raw_qp - 1).max(0)
    } else if path_used_qp < three_half_d {
        (raw_qp - 2).max(0)
    } else if path_used_qp < four_d {
        (raw_qp - 3).max(0)
    } else {
        0
    }
}

fn compute_extension(pos: &Position, mv: &Move, in_check_before: bool, gives_check: bool) -> i32 {
    let mut ext = 0;
    if gives_check {
        ext += QUARTER_PLY;
    }
    if !in_check_before && mv.piece.kind() == Some(crate::board::piece::PieceType::Pawn) {
        let to_rank = mv.to.rank();
        if to_rank == 6 || to_rank == 1 {
            ext += QUARTER_PLY / 2;
        }
    }
    if mv.is_capture() && is_recapture_square(pos, mv.to) {
        ext += QUARTER_PLY / 2;
    }
    ext.min(QUARTER_PLY)
}

fn is_recapture_square(_pos: &Position, _sq: crate::square::Square) -> bool {
    // A full recapture-consistency check needs the previous move's
    // destination threaded through the call; conservatively report false
    // rather than over-extend without that context.
    false
}

/// `search(env, pos, alpha, beta, depth, ply, path_ext_used)`, C11's main
/// entry point. `depth` and `path_ext_used` are in quarter-ply units.
#[allow(clippy::too_many_arguments)]
pub fn search(
    env: &mut SearchEnv,
    pos: &mut Position,
    mut alpha: i32,
    mut beta: i32,
    depth: i32,
    ply: u32,
    path_ext_used: i32,
) -> SearchResult {
    env.nodes += 1;
    if env.nodes % NODE_CHECK_INTERVAL == 0 {
        env.controller.periodic_check(env.stop.load(Ordering::Relaxed));
        if env.controller.is_stopping() {
            return SearchResult { score: 0, best_move: None, aborted: true };
        }
    }

    // 1. Draw checks.
    if ply > 0 {
        if pos.is_threefold_repetition() || pos.halfmove_clock >= 100 || pos.is_insufficient_material() {
            return SearchResult { score: 0, best_move: None, aborted: false };
        }
    }

    // 2. Mate-distance pruning.
    let mate_upper = tt::MATE_SCORE - ply as i32;
    let mate_lower = -tt::MATE_SCORE + ply as i32;
    if mate_lower > alpha {
        alpha = mate_lower;
    }
    if mate_upper < beta {
        beta = mate_upper;
    }
    if alpha >= beta {
        return SearchResult { score: alpha, best_move: None, aborted: false };
    }

    let in_check_now = pos.in_check(pos.side_to_move);
    if depth <= 0 && !in_check_now {
        let mut qctx = QuiescenceContext { pawn_hash: env.pawn_hash, enprise: env.enprise, nodes: &mut env.nodes };
        let score = quiescence::qsearch(pos, &mut qctx, alpha, beta, ply);
        return SearchResult { score, best_move: None, aborted: false };
    }

    let signature = pos.signature();
    let original_alpha = alpha;
    let mut hash_move = None;

    // 3. Transposition probe.
    if let Some(probe) = env.tt.probe(signature) {
        if probe.has_move {
            hash_move = Some(decode_tt_move(pos, probe.best_from, probe.best_to));
        }
        if probe.depth as i32 >= depth {
            let score = tt::score_from_tt(probe.score, ply);
            let cutoff = match probe.bound {
                Bound::Exact => true,
                Bound::Lower => score >= beta,
                Bound::Upper => score <= alpha,
            };
            if ply > 0 && cutoff {
                return SearchResult { score, best_move: hash_move, aborted: false };
            }
        }
    }

    // 4. Recognizer / tablebase probe.
    if let Some(hit) = recognizers::probe(pos) {
        if matches!(hit.bound, recognizers::Bound::Exact) {
            return SearchResult { score: hit.as_search_score(pos.side_to_move), best_move: None, aborted: false };
        }
    }
    if let Some(hit) = env.tablebase.probe(pos) {
        if matches!(hit.bound, recognizers::Bound::Exact) {
            return SearchResult { score: hit.as_search_score(pos.side_to_move), best_move: None, aborted: false };
        }
    }

    // 5. Static eval, used for pruning decisions only.
    let static_eval = if in_check_now {
        0
    } else {
        super::eval::evaluate(pos, env.pawn_hash, alpha, beta)
    };

    let is_pv = beta - alpha > 1;

    // 6. Null-move reduction.
    if !in_check_now
        && !is_pv
        && depth >= NULL_MOVE_MIN_DEPTH
        && ply > 0
        && static_eval >= beta
        && pos.material_nonpawn(pos.side_to_move) > 0
        && env.enprise.side_can_stand_pat(pos, pos.side_to_move)
    {
        let reduction = if depth > 6 * QUARTER_PLY { 3 * QUARTER_PLY } else { 2 * QUARTER_PLY };
        let undo = execute::make_null(pos);
        let sub = search(env, pos, -beta, -beta + 1, depth - reduction - QUARTER_PLY, ply + 1, path_ext_used);
        execute::unmake_null(pos, undo);
        if sub.aborted {
            return SearchResult { score: 0, best_move: None, aborted: true };
        }
        let null_score = -sub.score;
        if null_score >= beta {
            if null_score < tt::MATE_THRESHOLD {
                return SearchResult { score: beta, best_move: None, aborted: false };
            }
            // Near mate scores: verify with a shallow non-null search before
            // trusting it, per C11's "verification search ... near terminals".
            let verify = search(env, pos, beta - 1, beta, depth - reduction, ply, path_ext_used);
            if !verify.aborted && verify.score >= beta {
                return SearchResult { score: beta, best_move: None, aborted: false };
            }
        } else if let Some(refuter) = sub.best_move {
            env.ctx.set_null_refutation(ply as usize, refuter);
        }
    }

    // 7. Internal iterative deepening.
    if hash_move.is_none() && is_pv && depth >= IID_MIN_DEPTH {
        let iid = search(env, pos, alpha, beta, depth - 2 * QUARTER_PLY, ply, path_ext_used);
        if iid.aborted {
            return SearchResult { score: 0, best_move: None, aborted: true };
        }
        hash_move = iid.best_move;
    }

    // 8. Move loop.
    let mode = if in_check_now { GenMode::Escapes } else { GenMode::AllMoves };
    let mut moves = movegen::generate(pos, mode);
    if moves.is_empty() {
        let score = if in_check_now { -tt::MATE_SCORE + ply as i32 } else { 0 };
        return SearchResult { score, best_move: None, aborted: false };
    }

    let mut scored: Vec<ScoredMove> = moves.drain(..).map(|mv| ScoredMove { mv, score: 0, flags: 0 }).collect();
    ordering::order_moves(pos, &mut scored, ply as usize, hash_move, env.ctx, env.history, in_check_now);

    let mut best_score = -INFINITY;
    let mut best_move = None;
    let mut move_index = 0usize;

    for sm in scored {
        let mv = sm.mv;
        let is_quiet = !mv.is_capture() && !mv.is_promotion();
        let gives_check_guess = movegen_gives_check_guess(pos, &mv);

        // The root (ply 0) never prunes a move, per C11: every legal root
        // move is searched so its node count can feed next-iteration
        // ordering, even ones futility would otherwise skip.
        if ply > 0
            && !is_pv
            && !in_check_now
            && move_index > 0
            && is_quiet
            && !gives_check_guess
            && depth <= FUTILITY_MAX_DEPTH
            && static_eval + futility_margin(depth) <= alpha
        {
            move_index += 1;
            continue;
        }

        let nodes_before = env.nodes;
        let Some(undo) = execute::make(pos, mv) else { continue };

        let ext_raw = compute_extension(pos, &mv, in_check_now, gives_check_guess);
        let ext = scale_extension(ext_raw, path_ext_used + ext_raw, env.root_depth_qp);
        let child_path_used = path_ext_used + ext;

        let mut reduction = 0;
        if ply > 0 && move_index >= LMR_MIN_MOVE_INDEX && depth >= LMR_MIN_DEPTH && is_quiet && !in_check_now && !gives_check_guess {
            reduction = QUARTER_PLY + (depth / (8 * QUARTER_PLY)) * QUARTER_PLY;
            if is_pv {
                reduction -= QUARTER_PLY;
            }
            reduction = reduction.clamp(0, depth - QUARTER_PLY);
        }

        let mut score;
        if move_index == 0 {
            let child = search(env, pos, -beta, -alpha, depth - QUARTER_PLY + ext, ply + 1, child_path_used);
            if child.aborted {
                execute::unmake(pos, undo);
                return SearchResult { score: 0, best_move: None, aborted: true };
            }
            score = -child.score;
        } else {
            let child = search(env, pos, -alpha - 1, -alpha, depth - QUARTER_PLY - reduction + ext, ply + 1, child_path_used);
            if child.aborted {
                execute::unmake(pos, undo);
                return SearchResult { score: 0, best_move: None, aborted: true };
            }
            score = -child.score;

            if score > alpha && reduction > 0 {
                let child = search(env, pos, -alpha - 1, -alpha, depth - QUARTER_PLY + ext, ply + 1, child_path_used);
                if child.aborted {
                    execute::unmake(pos, undo);
                    return SearchResult { score: 0, best_move: None, aborted: true };
                }
                score = -child.score;
            }
            if score > alpha && score < beta {
                let child = search(env, pos, -beta, -alpha, depth - QUARTER_PLY + ext, ply + 1, child_path_used);
                if child.aborted {
                    execute::unmake(pos, undo);
                    return SearchResult { score: 0, best_move: None, aborted: true };
                }
                score = -child.score;
            }
        }

        execute::unmake(pos, undo);
        if ply == 0 {
            env.ctx.record_root_move_nodes(mv, env.nodes - nodes_before);
        }
        move_index += 1;

        if score > best_score {
            best_score = score;
            if score > alpha {
                alpha = score;
                best_move = Some(mv);
            }
            if score >= beta {
                env.fail_high.record(&mv, true);
                if is_quiet {
                    env.ctx.update_killer(ply as usize, mv, in_check_now, score.abs() >= tt::MATE_THRESHOLD);
                    env.history.reward(mv.piece.color(), mv.piece.kind().unwrap(), mv.to.to_bit_index(), depth / QUARTER_PLY);
                }
                store_tt(env.tt, signature, beta, Bound::Lower, depth, Some(mv), ply);
                return SearchResult { score: beta, best_move: Some(mv), aborted: false };
            }
        }
        if is_quiet {
            env.fail_high.record(&mv, false);
            env.history.penalize(mv.piece.color(), mv.piece.kind().unwrap(), mv.to.to_bit_index());
        }
    }

    let bound = if best_score > original_alpha { Bound::Exact } else { Bound::Upper };
    store_tt(env.tt, signature, best_score, bound, depth, best_move, ply);
    SearchResult { score: best_score, best_move, aborted: false }
}

fn movegen_gives_check_guess(pos: &Position, mv: &Move) -> bool {
    let mut scratch = pos.clone();
    if let Some(_undo) = execute::make(&mut scratch, *mv) {
        scratch.in_check(scratch.side_to_move)
    } else {
        false
    }
}

fn store_tt(tt: &TranspositionTable, signature: u64, score: i32, bound: Bound, depth: i32, mv: Option<Move>, ply: u32) {
    let stored_score = tt::score_to_tt(score, ply);
    let depth_u8 = (depth / QUARTER_PLY).clamp(0, 255) as u8;
    match mv {
        Some(mv) => tt.store(signature, stored_score, bound, depth_u8, mv.from.raw(), mv.to.raw(), true),
        None => tt.store(signature, stored_score, bound, depth_u8, 0, 0, false),
    }
}

fn decode_tt_move(pos: &Position, from: u8, to: u8) -> Move {
    let from_sq = crate::square::Square::from_raw(from);
    let to_sq = crate::square::Square::from_raw(to);
    let piece = pos.piece_at(from_sq);
    let captured = pos.piece_at(to_sq);
    Move {
        from: from_sq,
        to: to_sq,
        piece,
        captured,
        promoted: crate::board::piece::Piece::NONE,
        flags: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;
    use crate::search::recognizers::NoTablebase;

    #[allow(clippy::too_many_arguments)]
    fn fresh_env<'a>(
        tt: &'a TranspositionTable,
        pawn_hash: &'a mut PawnHash,
        enprise: &'a EnpriseTable,
        history: &'a HistoryTable,
        fail_high: &'a FailHighStats,
        ctx: &'a mut SearchContext,
        tablebase: &'a NoTablebase,
        stop: &'a AtomicBool,
        controller: &'a TimeController,
    ) -> SearchEnv<'a> {
        SearchEnv {
            tt,
            pawn_hash,
            enprise,
            history,
            fail_high,
            ctx,
            tablebase,
            stop,
            controller,
            nodes: 0,
            root_depth_qp: 4 * QUARTER_PLY,
        }
    }

    #[test]
    fn finds_mate_in_one() {
        let mut pos = fen::from_fen("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1").unwrap();
        let tt = TranspositionTable::new(1);
        let mut pawn_hash = PawnHash::new(64);
        let enprise = EnpriseTable::new();
        let history = HistoryTable::new();
        let fail_high = FailHighStats::new();
        let mut ctx = SearchContext::new();
        let tablebase = NoTablebase;
        let stop = AtomicBool::new(false);
        let controller = TimeController::unbounded();
        let mut env = fresh_env(&tt, &mut pawn_hash, &enprise, &history, &fail_high, &mut ctx, &tablebase, &stop, &controller);
        let result = search(&mut env, &mut pos, -INFINITY, INFINITY, 3 * QUARTER_PLY, 0, 0);
        assert!(result.score >= tt::MATE_THRESHOLD, "expected a mate score, got {}", result.score);
    }

    #[test]
    fn stalemate_position_scores_as_a_draw() {
        let mut pos = fen::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let tt = TranspositionTable::new(1);
        let mut pawn_hash = PawnHash::new(64);
        let enprise = EnpriseTable::new();
        let history = HistoryTable::new();
        let fail_high = FailHighStats::new();
        let mut ctx = SearchContext::new();
        let tablebase = NoTablebase;
        let stop = AtomicBool::new(false);
        let controller = TimeController::unbounded();
        let mut env = fresh_env(&tt, &mut pawn_hash, &enprise, &history, &fail_high, &mut ctx, &tablebase, &stop, &controller);
        let result = search(&mut env, &mut pos, -INFINITY, INFINITY, 1, 0, 0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn immediately_stops_when_stop_flag_is_set() {
        let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
        let tt = TranspositionTable::new(1);
        let mut pawn_hash = PawnHash::new(64);
        let enprise = EnpriseTable::new();
        let history = HistoryTable::new();
        let fail_high = FailHighStats::new();
        let mut ctx = SearchContext::new();
        let tablebase = NoTablebase;
        let stop = AtomicBool::new(true);
        let controller = TimeController::unbounded();
        let mut env = fresh_env(&tt, &mut pawn_hash, &enprise, &history, &fail_high, &mut ctx, &tablebase, &stop, &controller);
        env.nodes = NODE_CHECK_INTERVAL - 1;
        let result = search(&mut env, &mut pos, -INFINITY, INFINITY, 4 * QUARTER_PLY, 0, 0);
        assert!(result.aborted);
    }
}
