//! Dynamic move ordering (C8): the global history/fail-high tables plus the
//! per-move scoring function C4 rule 5 specifies.
//!
//! Grounded in the teacher's `order_moves`/`mvv_lva_score` (hash move first
//! via sentinel, SEE-classified captures, killer bonuses, history fallback)
//! generalized onto the 0x88 `Move` record and the spec's explicit history
//! update rule (depth² on fail-high, decrement otherwise, periodic halving).

use crate::board::Position;
use crate::board::piece::{Color, PieceType};
use crate::moves::types::{HASH_MOVE_SCORE, Move, ScoredMove};
use super::context::SearchContext;
use super::see::static_exchange_eval;
use std::sync::Mutex;

const PROMO_BONUS: i32 = 7_000_000;
const GOOD_CAPTURE_BASE: i32 = 6_000_000;
const BAD_CAPTURE_PENALTY: i32 = -2_000_000;

/// Per (moved-piece-kind, to-square) accumulator, shared process-wide.
/// Protected by one mutex taken only on update; lookups may race (heuristic
/// data, per §5's "dynamic move ordering tables" concurrency note).
pub struct HistoryTable {
    inner: Mutex<Vec<i32>>, // [color][piece_kind-1][to 0..64]
}

const HISTORY_LEN: usize = 2 * 6 * 64;

impl HistoryTable {
    pub fn new() -> Self {
        HistoryTable { inner: Mutex::new(vec![0; HISTORY_LEN])}
    }

    fn index(color: Color, kind: PieceType, to_bit: u8) -> usize {
        color.index() * 6 * 64 + (kind as usize - 1) * 64 + to_bit as usize
    }

    pub fn get(&self, color: Color, kind: PieceType, to_bit: u8) -> i32 {
        let guard = self.inner.lock().unwrap();
        guard[Self::index(color, kind, to_bit)]
    }

    /// Reward a quiet move that caused a fail-high at `depth` remaining
    /// plies; `d^2`, saturating.
    pub fn reward(&self, color: Color, kind: PieceType, to_bit: u8, depth: i32) {
        let mut guard = self.inner.lock().unwrap();
        let idx = Self::index(color, kind, to_bit);
        guard[idx] = guard[idx].saturating_add(depth * depth);
    }

    /// Penalize a quiet move tried but not chosen at a node that fail-high'd
    /// on a different move.
    pub fn penalize(&self, color: Color, kind: PieceType, to_bit: u8) {
        let mut guard = self.inner.lock().unwrap();
        let idx = Self::index(color, kind, to_bit);
        guard[idx] = guard[idx].saturating_sub(1);
    }

    /// Halve every entry to keep the table responsive to the current game
    /// phase rather than dominated by stale early-game statistics.
    pub fn halve(&self) {
        let mut guard = self.inner.lock().unwrap();
        for v in guard.iter_mut() {
            *v /= 2;
        }
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// 16-bit (attempts, fail-highs) counters per move-index, used for late-move
/// pruning decisions (C8).
pub struct FailHighStats {
    inner: Mutex<Vec<(u16, u16)>>,
}

const FAIL_HIGH_LEN: usize = 1 << 16;

impl FailHighStats {
    pub fn new() -> Self {
        FailHighStats { inner: Mutex::new(vec![(0, 0); FAIL_HIGH_LEN]) }
    }

    fn index(mv: &Move) -> usize {
        let h = (mv.from.raw() as u32) << 16 | (mv.to.raw() as u32) << 8 | (mv.piece.0 as u32);
        (h as usize) & (FAIL_HIGH_LEN - 1)
    }

    pub fn record(&self, mv: &Move, failed_high: bool) {
        let mut guard = self.inner.lock().unwrap();
        let idx = Self::index(mv);
        let (attempts, highs) = &mut guard[idx];
        *attempts = attempts.saturating_add(1);
        if failed_high {
            *highs = highs.saturating_add(1);
        }
    }

    pub fn fail_high_rate(&self, mv: &Move) -> f32 {
        let guard = self.inner.lock().unwrap();
        let (attempts, highs) = guard[Self::index(mv)];
        if attempts == 0 {
            0.5
        } else {
            highs as f32 / attempts as f32
        }
    }
}

impl Default for FailHighStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Score `mv` for ordering at `ply`, per C4 rule 5: hash move first
/// (sentinel MAX), captures/promotions by SEE plus piece-value bias,
/// killers given fixed bonuses, remaining moves by history.
#[allow(clippy::too_many_arguments)]
pub fn score_move(
    pos: &Position,
    mv: &Move,
    ply: usize,
    hash_move: Option<Move>,
    ctx: &SearchContext,
    history: &HistoryTable,
    in_check: bool,
) -> i32 {
    if Some(*mv) == hash_move {
        return HASH_MOVE_SCORE;
    }

    if mv.is_promotion() {
        let promo_value = mv.promoted.kind().unwrap().value();
        return PROMO_BONUS + promo_value;
    }

    if mv.is_capture() || mv.is_en_passant() {
        let see = static_exchange_eval(
            pos,
            mv.from,
            mv.to,
            mv.piece.kind().unwrap(),
            mv.captured.kind(),
            mv.promoted.kind(),
        );
        return if see >= 0 {
            GOOD_CAPTURE_BASE + see
        } else {
            BAD_CAPTURE_PENALTY + see
        };
    }

    let killer = ctx.killer_bonus(ply, mv, in_check);
    if killer > 0 {
        return killer;
    }

    if let Some(refutation) = ctx.null_refutation(ply) {
        if refutation == *mv {
            return 7500;
        }
    }

    history.get(mv.piece.color(), mv.piece.kind().unwrap(), mv.to.to_bit_index())
}

/// Root moves get an extra nudge from how many nodes the previous iteration
/// spent under them (C11: "root ... tracks per-move node counts for
/// next-iteration ordering"), on top of the usual hash/capture/killer/
/// history scoring. Capped well below the capture/promotion tiers so it only
/// breaks ties within a tier, never reorders across one.
const ROOT_NODE_BONUS_CAP: i32 = 1_000_000;

pub fn order_moves(
    pos: &Position,
    moves: &mut [ScoredMove],
    ply: usize,
    hash_move: Option<Move>,
    ctx: &SearchContext,
    history: &HistoryTable,
    in_check: bool,
) {
    for sm in moves.iter_mut() {
        sm.score = score_move(pos, &sm.mv, ply, hash_move, ctx, history, in_check);
        if ply == 0 {
            if let Some((_, nodes)) = ctx.root_move_nodes().iter().find(|(m, _)| *m == sm.mv) {
                sm.score = sm.score.saturating_add((*nodes).min(ROOT_NODE_BONUS_CAP as u64) as i32);
            }
        }
    }
    moves.sort_unstable_by(|a, b| b.score.cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;

    #[test]
    fn hash_move_sorts_first() {
        let pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
        let legal = crate::moves::movegen::generate(&pos, crate::moves::movegen::GenMode::AllMoves);
        let hash_mv = legal[3];
        let mut scored: Vec<ScoredMove> = legal.iter().map(|&mv| ScoredMove { mv, score: 0, flags: 0 }).collect();
        let ctx = SearchContext::new();
        let history = HistoryTable::new();
        order_moves(&pos, &mut scored, 0, Some(hash_mv), &ctx, &history, false);
        assert_eq!(scored[0].mv, hash_mv);
    }

    #[test]
    fn good_capture_outranks_quiet_move() {
        let pos = fen::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let legal = crate::moves::movegen::generate(&pos, crate::moves::movegen::GenMode::AllMoves);
        let capture = legal.iter().find(|m| m.is_capture()).copied().unwrap();
        let quiet = legal.iter().find(|m| !m.is_capture()).copied().unwrap();
        let ctx = SearchContext::new();
        let history = HistoryTable::new();
        let cap_score = score_move(&pos, &capture, 0, None, &ctx, &history, false);
        let quiet_score = score_move(&pos, &quiet, 0, None, &ctx, &history, false);
        assert!(cap_score > quiet_score);
    }

    #[test]
    fn history_reward_raises_future_ordering_score() {
        let pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
        let legal = crate::moves::movegen::generate(&pos, crate::moves::movegen::GenMode::AllMoves);
        let quiet = legal.iter().find(|m| !m.is_capture() && !m.is_promotion()).copied().unwrap();
        let ctx = SearchContext::new();
        let history = HistoryTable::new();
        let before = score_move(&pos, &quiet, 0, None, &ctx, &history, false);
        history.reward(quiet.piece.color(), quiet.piece.kind().unwrap(), quiet.to.to_bit_index(), 4);
        let after = score_move(&pos, &quiet, 0, None, &ctx, &history, false);
        assert!(after > before);
    }
}
