//! Positional evaluator (C6). Grounded in the teacher's tapered PeSTO-style
//! `eval.rs` (`calculate_phase`, lazy-eval margin cutoff, king-zone attack
//! counting, mop-up term for won endgames) generalized onto the 0x88 piece
//! lists and the split pawn/non-pawn signature model, with the pawn-
//! structure term delegated to [`crate::search::pawn_hash`] and low-material
//! positions short-circuited through [`crate::search::recognizers`] first.

use crate::board::Position;
use crate::board::piece::{Color, PieceType};
use crate::square::{self, Square};
use super::pawn_hash::PawnHash;
use super::recognizers;

/// Material + positional margin assumed to bound every unevaluated term,
/// used by the lazy-eval short-circuit (C6 "Lazy eval").
pub const LAZY_EVAL_MARGIN: i32 = 200;

/// Piece-square tables, midgame/endgame, indexed by `[color][kind-1][sq 0..64]`
/// in White's orientation (Black mirrors the rank). Values in centipawns,
/// grounded in the well-known PeSTO set the teacher's `eval.rs` also used.
mod pst {
    pub const PAWN_MG: [i32; 64] = [
        0, 0, 0, 0, 0, 0, 0, 0, 98, 134, 61, 95, 68, 126, 34, -11, -6, 7, 26, 31, 65, 56, 25, -20,
        -14, 13, 6, 21, 23, 12, 17, -23, -27, -2, -5, 12, 17, 6, 10, -25, -26, -4, -4, -10, 3, 3,
        33, -12, -35, -1, -20, -23, -15, 24, 38, -22, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    pub const PAWN_EG: [i32; 64] = [
        0, 0, 0, 0, 0, 0, 0, 0, 178, 173, 158, 134, 147, 132, 165, 187, 94, 100, 85, 67, 56, 53,
        82, 84, 32, 24, 13, 5, -2, 4, 17, 17, 13, 9, -3, -7, -7, -8, 3, -1, 4, 7, -6, 1, 0, -5,
        -1, -8, 13, 8, 8, 10, 13, 0, 2, -7, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    pub const KNIGHT_MG: [i32; 64] = [
        -167, -89, -34, -49, 61, -97, -15, -107, -73, -41, 72, 36, 23, 62, 7, -17, -47, 60, 37,
        65, 84, 129, 73, 44, -9, 17, 19, 53, 37, 69, 18, 22, -13, 4, 16, 13, 28, 19, 21, -8, -23,
        -9, 12, 10, 19, 17, 25, -16, -29, -53, -12, -3, -1, 18, -14, -19, -105, -21, -58, -33,
        -17, -28, -19, -23,
    ];
    pub const KNIGHT_EG: [i32; 64] = [
        -58, -38, -13, -28, -31, -27, -63, -99, -25, -8, -25, -2, -9, -25, -24, -52, -24, -20, 10,
        9, -1, -9, -19, -41, -17, 3, 22, 22, 22, 11, 8, -18, -18, -6, 16, 25, 16, 17, 4, -18, -23,
        -3, -1, 15, 10, -3, -20, -22, -42, -20, -10, -5, -2, -20, -23, -44, -29, -51, -23, -15,
        -22, -18, -50, -64,
    ];
    pub const BISHOP_MG: [i32; 64] = [
        -29, 4, -82, -37, -25, -42, 7, -8, -26, 16, -18, -13, 30, 59, 18, -47, -16, 37, 43, 40,
        35, 50, 37, -2, -4, 5, 19, 50, 37, 37, 7, -2, -6, 13, 13, 26, 34, 12, 10, 4, 0, 15, 15,
        15, 14, 27, 18, 10, 4, 15, 16, 0, 7, 21, 33, 1, -33, -3, -14, -21, -13, -12, -39, -21,
    ];
    pub const BISHOP_EG: [i32; 64] = [
        -14, -21, -11, -8, -7, -9, -17, -24, -8, -4, 7, -12, -3, -13, -4, -14, 2, -8, 0, -1, -2,
        6, 0, 4, -3, 9, 12, 9, 14, 10, 3, 2, -6, 3, 13, 19, 7, 10, -3, -9, -12, -3, 8, 10, 13, 3,
        -7, -15, -14, -18, -7, -1, 4, -9, -15, -27, -23, -9, -23, -5, -9, -16, -5, -17,
    ];
    pub const ROOK_MG: [i32; 64] = [
        32, 42, 32, 51, 63, 9, 31, 43, 27, 32, 58, 62, 80, 67, 26, 44, -5, 19, 26, 36, 17, 45, 61,
        16, -24, -11, 7, 26, 24, 35, -8, -20, -36, -26, -12, -1, 9, -7, 6, -23, -45, -25, -16,
        -17, 3, 0, -5, -33, -44, -16, -20, -9, -1, 11, -6, -71, -19, -13, 1, 17, 16, 7, -37, -26,
    ];
    pub const ROOK_EG: [i32; 64] = [
        13, 10, 18, 15, 12, 12, 8, 5, 11, 13, 13, 11, -3, 3, 8, 3, 7, 7, 7, 5, 4, -3, -5, -3, 4,
        3, 13, 1, 2, 1, -1, 2, 3, 5, 8, 4, -5, -6, -8, -11, -4, 0, -5, -1, -7, -12, -8, -16, -6,
        -6, 0, 2, -9, -9, -11, -3, -9, 2, 3, -1, -5, -13, 4, -20,
    ];
    pub const QUEEN_MG: [i32; 64] = [
        -28, 0, 29, 12, 59, 44, 43, 45, -24, -39, -5, 1, -16, 57, 28, 54, -13, -17, 7, 8, 29, 56,
        47, 57, -27, -27, -16, -16, -1, 17, -2, 1, -9, -26, -9, -10, -2, -4, 3, -3, -14, 2, -11,
        -2, -5, 2, 14, 5, -35, -8, 11, 2, 8, 15, -3, 1, -1, -18, -9, 10, -15, -25, -31, -50,
    ];
    pub const QUEEN_EG: [i32; 64] = [
        -9, 22, 22, 27, 27, 19, 10, 20, -17, 20, 32, 41, 58, 25, 30, 0, -20, 6, 9, 49, 47, 35, 19,
        9, 3, 22, 24, 45, 57, 40, 57, 36, -18, 28, 19, 47, 31, 34, 39, 23, -16, -27, 15, 6, 9, 17,
        10, 5, -22, -23, -30, -16, -16, -23, -36, -32, -33, -28, -22, -43, -5, -32, -20, -41,
    ];
    pub const KING_MG: [i32; 64] = [
        -65, 23, 16, -15, -56, -34, 2, 13, 29, -1, -20, -7, -8, -4, -38, -29, -9, 24, 2, -16, -20,
        6, 22, -22, -17, -20, -12, -27, -30, -25, -14, -36, -49, -1, -27, -39, -46, -44, -33,
        -51, -14, -14, -22, -46, -44, -30, -15, -27, 1, 7, -8, -64, -43, -16, 9, 8, -15, 36, 12,
        -54, 8, -28, 24, 14,
    ];
    pub const KING_EG: [i32; 64] = [
        -74, -35, -18, -18, -11, 15, 4, -17, -12, 17, 14, 17, 17, 38, 23, 11, 10, 17, 23, 15, 20,
        45, 44, 13, -8, 22, 24, 27, 26, 33, 26, 3, -18, -4, 21, 24, 27, 23, 9, -11, -19, -3, 11,
        21, 23, 16, 7, -9, -27, -11, 4, 13, 14, 4, -5, -17, -53, -34, -21, -11, -28, -14, -24,
        -43,
    ];

    pub fn table(kind: crate::board::piece::PieceType, mg: bool) -> &'static [i32; 64] {
        use crate::board::piece::PieceType::*;
        match (kind, mg) {
            (Pawn, true) => &PAWN_MG,
            (Pawn, false) => &PAWN_EG,
            (Knight, true) => &KNIGHT_MG,
            (Knight, false) => &KNIGHT_EG,
            (Bishop, true) => &BISHOP_MG,
            (Bishop, false) => &BISHOP_EG,
            (Rook, true) => &ROOK_MG,
            (Rook, false) => &ROOK_EG,
            (Queen, true) => &QUEEN_MG,
            (Queen, false) => &QUEEN_EG,
            (King, true) => &KING_MG,
            (King, false) => &KING_EG,
        }
    }
}

const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0]; // pawn,knight,bishop,rook,queen,king
const TOTAL_PHASE: i32 = PHASE_WEIGHT[1] * 4 + PHASE_WEIGHT[2] * 4 + PHASE_WEIGHT[3] * 4 + PHASE_WEIGHT[4] * 2;

fn game_phase(pos: &Position) -> i32 {
    let mut phase = TOTAL_PHASE;
    for &color in &[Color::White, Color::Black] {
        for &kind in &[PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
            phase -= PHASE_WEIGHT[kind as usize - 1] * pos.count_nonpawn(color, kind) as i32;
        }
    }
    phase.clamp(0, TOTAL_PHASE)
}

fn pst_square_index(color: Color, sq: Square) -> usize {
    // PST arrays are laid out rank-8-to-rank-1 for White's own perspective;
    // mirror the rank for Black so both colors read "forward" the same way.
    let rank = if color == Color::White { 7 - sq.rank() } else { sq.rank() };
    (rank * 8 + sq.file()) as usize
}

fn pst_score(pos: &Position, color: Color, mg: bool) -> i32 {
    let mut score = 0;
    for &sq in pos.pawns(color) {
        score += pst::table(PieceType::Pawn, mg)[pst_square_index(color, sq)];
    }
    for &sq in pos.nonpawns(color) {
        let kind = pos.piece_at(sq).kind().unwrap();
        score += pst::table(kind, mg)[pst_square_index(color, sq)];
    }
    score
}

/// Mobility bonus: count of pseudo-legal destination squares per non-pawn
/// piece, weighted lightly — a cheap proxy for piece activity.
fn mobility_score(pos: &Position, color: Color) -> i32 {
    let mut moves = Vec::with_capacity(32);
    crate::moves::movegen::generate_pseudo_legal(pos, color, crate::moves::movegen::GenMode::AllMoves, &mut moves);
    moves.len() as i32 * 2
}

/// King-danger counter: seeded by king square, incremented per enemy piece
/// whose move-vector reaches a square within one step of the king. Skipped
/// when the attacker has too little material for a real attack (C6).
fn king_safety_score(pos: &Position, color: Color) -> i32 {
    let opp = color.opposite();
    let attacker_material = pos.material_nonpawn(opp);
    if attacker_material < PieceType::Rook.value() + PieceType::Bishop.value() {
        return 0;
    }
    let king_sq = pos.king_square(color);
    let mut danger = 0i32;
    for dr in -1i16..=1 {
        for df in -1i16..=1 {
            if dr == 0 && df == 0 {
                continue;
            }
            let raw = king_sq.raw() as i16 + dr * 16 + df;
            if !(0..128).contains(&raw) || (raw as u8) & 0x88 != 0 {
                continue;
            }
            let zone_sq = Square::from_raw(raw as u8);
            let ctr = pos.attack_counter(zone_sq, opp);
            danger += ctr.count_ones() as i32;
        }
    }
    const DANGER_TABLE: [i32; 9] = [0, 0, 10, 25, 45, 70, 100, 135, 175];
    -DANGER_TABLE[(danger as usize).min(8)]
}

/// Won-endgame technique bonus: drive the enemy king to the edge/corner and
/// bring the winning king closer, active only when one side has overwhelming
/// material and few pawns remain.
fn mop_up_score(pos: &Position, color: Color) -> i32 {
    let opp = color.opposite();
    let material_edge = pos.material_nonpawn(color) - pos.material_nonpawn(opp);
    if material_edge < PieceType::Rook.value() {
        return 0;
    }
    let enemy_king = pos.king_square(opp);
    let own_king = pos.king_square(color);
    let corner_dist = corner_distance(enemy_king);
    let king_dist = square::distance(own_king, enemy_king);
    (4 - corner_dist as i32) * 10 + (14 - king_dist as i32) * 4
}

/// Passed-pawn bonuses matter more as the board empties: a passer is harder
/// to blockade or chase down once the defender's pieces are gone, and a
/// won pawn race swings the whole evaluation. Scales linearly from 1x at
/// full enemy material up to 2x against a bare king.
fn passer_scale(pos: &Position, runner: Color) -> i32 {
    let starting = 2 * PieceType::Knight.value()
        + 2 * PieceType::Bishop.value()
        + 2 * PieceType::Rook.value()
        + PieceType::Queen.value();
    let remaining = pos.material_nonpawn(runner.opposite()).clamp(0, starting);
    128 + (starting - remaining) * 128 / starting.max(1)
}

fn corner_distance(sq: Square) -> u8 {
    let f = sq.file().min(7 - sq.file());
    let r = sq.rank().min(7 - sq.rank());
    f.min(r)
}

/// Evaluate `pos` from the side-to-move's perspective, within `[alpha,
/// beta]`. May return a bound (outside the true window) via the lazy-eval
/// short-circuit rather than computing every term.
pub fn evaluate(pos: &mut Position, pawn_hash: &mut PawnHash, alpha: i32, beta: i32) -> i32 {
    if let Some(score) = recognizers::probe(pos) {
        return score.as_search_score(pos.side_to_move);
    }

    let stm = pos.side_to_move;
    let material = pos.material_pawn(stm) + pos.material_nonpawn(stm)
        - pos.material_pawn(stm.opposite())
        - pos.material_nonpawn(stm.opposite());

    if material - LAZY_EVAL_MARGIN >= beta {
        return beta;
    }
    if material + LAZY_EVAL_MARGIN <= alpha {
        return alpha;
    }

    pos.rebuild_attack_counters();
    let pawn_entry = pawn_hash.probe_or_build(pos, pos.pawn_sig);
    let phase = game_phase(pos);

    let mut mg = 0i32;
    let mut eg = 0i32;
    for &color in &[Color::White, Color::Black] {
        let sign = if color == stm { 1 } else { -1 };
        mg += sign * pst_score(pos, color, true);
        eg += sign * pst_score(pos, color, false);
        mg += sign * mobility_score(pos, color);
        eg += sign * mobility_score(pos, color);
        mg += sign * king_safety_score(pos, color);
        eg += sign * king_safety_score(pos, color) / 2;
        eg += sign * mop_up_score(pos, color);
    }

    let pawn_term = pawn_entry.score[stm.index()] - pawn_entry.score[stm.opposite().index()];
    mg += pawn_term;
    eg += pawn_term;

    let passer_term = passer_scale(pos, stm) * pawn_entry.passer_bonus[stm.index()] / 128
        - passer_scale(pos, stm.opposite()) * pawn_entry.passer_bonus[stm.opposite().index()] / 128;
    mg += passer_term;
    eg += passer_term * 3 / 2;

    let bishop_pair_bonus = |c: Color| -> i32 {
        if pos.count_nonpawn(c, PieceType::Bishop) >= 2 { 30 } else { 0 }
    };
    let pair_term = bishop_pair_bonus(stm) - bishop_pair_bonus(stm.opposite());
    mg += pair_term;
    eg += pair_term;

    let tapered = (mg * (256 - phase * 256 / TOTAL_PHASE.max(1)) + eg * (phase * 256 / TOTAL_PHASE.max(1))) / 256;
    material + tapered
}

/// Unwindowed evaluation convenience (e.g. for `bench`/`eval` protocol
/// commands), always computing the full term set.
pub fn evaluate_full(pos: &mut Position, pawn_hash: &mut PawnHash) -> i32 {
    evaluate(pos, pawn_hash, i32::MIN / 2, i32::MAX / 2)
}
