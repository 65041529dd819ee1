//! Quiescence search (C10): a capture-only extension of the main search run
//! at every horizon node, so the static evaluator is never asked to judge a
//! position in the middle of an unresolved tactical exchange.
//!
//! Grounded in the teacher's `quiescence.rs` (stand-pat cutoff, SEE-ordered
//! captures, in-check escape generation) generalized onto 0x88 move
//! generation and the signature-keyed [`super::tt`]/[`super::pawn_hash`]
//! tables.

use crate::board::Position;
use crate::moves::execute;
use crate::moves::movegen::{self, GenMode};
use crate::moves::types::Move;
use super::eval;
use super::enprise::EnpriseTable;
use super::pawn_hash::PawnHash;
use super::see::static_exchange_eval;

pub struct QuiescenceContext<'a> {
    pub pawn_hash: &'a mut PawnHash,
    pub enprise: &'a EnpriseTable,
    pub nodes: &'a mut u64,
}

/// `qsearch(pos, alpha, beta, ply)`. Ply is only used to bound mate-distance
/// scores returned from a terminal checkmate found here (an in-check node
/// with no escape).
pub fn qsearch(pos: &mut Position, ctx: &mut QuiescenceContext, mut alpha: i32, beta: i32, ply: u32) -> i32 {
    *ctx.nodes += 1;

    let in_check = pos.in_check(pos.side_to_move);

    let stand_pat = if in_check {
        None
    } else {
        let can_stand_pat = ctx.enprise.side_can_stand_pat(pos, pos.side_to_move);
        let score = eval::evaluate(pos, ctx.pawn_hash, alpha, beta);
        if can_stand_pat {
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        Some(score)
    };

    let mode = if in_check { GenMode::Escapes } else { GenMode::Captures };
    let mut moves = movegen::generate(pos, mode);
    if in_check && moves.is_empty() {
        return -super::tt::MATE_SCORE + ply as i32;
    }
    if moves.is_empty() {
        return stand_pat.unwrap_or(alpha);
    }

    order_by_see(pos, &mut moves);

    let mut best = stand_pat.unwrap_or(alpha.min(-super::tt::MATE_SCORE));
    for mv in moves {
        if !in_check && mv.is_capture() {
            let see = static_exchange_eval(
                pos,
                mv.from,
                mv.to,
                mv.piece.kind().unwrap(),
                mv.captured.kind(),
                mv.promoted.kind(),
            );
            if see < 0 {
                continue;
            }
        }

        let Some(undo) = execute::make(pos, mv) else { continue };
        let score = -qsearch(pos, ctx, -beta, -alpha, ply + 1);
        execute::unmake(pos, undo);

        if score > best {
            best = score;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    best
}

fn order_by_see(pos: &Position, moves: &mut [Move]) {
    moves.sort_by_cached_key(|mv| {
        let see = static_exchange_eval(
            pos,
            mv.from,
            mv.to,
            mv.piece.kind().unwrap(),
            mv.captured.kind(),
            mv.promoted.kind(),
        );
        std::cmp::Reverse(see)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;

    #[test]
    fn quiet_position_returns_near_stand_pat_score() {
        let mut pos = fen::from_fen(fen::STARTPOS_FEN).unwrap();
        let mut pawn_hash = PawnHash::new(1024);
        let enprise = EnpriseTable::new();
        let mut nodes = 0u64;
        let mut ctx = QuiescenceContext { pawn_hash: &mut pawn_hash, enprise: &enprise, nodes: &mut nodes };
        let score = qsearch(&mut pos, &mut ctx, -10_000, 10_000, 0);
        assert!(score.abs() < 200);
    }

    #[test]
    fn hanging_queen_capture_is_found() {
        let mut pos = fen::from_fen("4k3/8/8/8/3q4/8/8/3RK3 w - - 0 1").unwrap();
        let mut pawn_hash = PawnHash::new(1024);
        let enprise = EnpriseTable::new();
        let mut nodes = 0u64;
        let mut ctx = QuiescenceContext { pawn_hash: &mut pawn_hash, enprise: &enprise, nodes: &mut nodes };
        let score = qsearch(&mut pos, &mut ctx, -10_000, 10_000, 0);
        assert!(score > 500, "expected qsearch to find RxQ, got {score}");
    }

    #[test]
    fn in_check_node_searches_all_evasions_not_just_captures() {
        let mut pos = fen::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        let mut pawn_hash = PawnHash::new(1024);
        let enprise = EnpriseTable::new();
        let mut nodes = 0u64;
        let mut ctx = QuiescenceContext { pawn_hash: &mut pawn_hash, enprise: &enprise, nodes: &mut nodes };
        let score = qsearch(&mut pos, &mut ctx, -10_000, 10_000, 0);
        assert!(score > -super::super::tt::MATE_SCORE + 100);
    }
}
