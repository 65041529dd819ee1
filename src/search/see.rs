//! Static Exchange Evaluator (C5).
//!
//! Grounded directly in `original_source/see.c`: `SlowGetAttacks()` gathers
//! attackers of a square via the vector_delta table plus ray-tracing for
//! x-ray attackers revealed mid-sequence, `SEE()` plays the least-valuable-
//! attacker-first capture sequence into a swap list and collapses it from
//! the tail with a min/max "stand pat or trade" rule. The teacher's
//! `search/see.rs` does the same shape over bitboards; this is the 0x88
//! equivalent, attacker-gathering by piece list scan instead of bitboard
//! intersection.

use crate::attack_tables::{self, ATK_BISHOP, ATK_KING, ATK_KNIGHT, ATK_QUEEN, ATK_ROOK};
use crate::board::Position;
use crate::board::piece::{Color, PieceType};
use crate::square::Square;

#[derive(Clone, Copy)]
struct Attacker {
    value: i32,
    square: Square,
    kind: PieceType,
}

/// Gather every piece of `color` that attacks `sq`, including sliders whose
/// ray to `sq` is clear once `vacated` squares (pieces already played out of
/// the simulated exchange) are treated as empty. `used` excludes pieces that
/// already took their turn in the sequence so they aren't re-offered.
/// Returned sorted ascending by piece value (least-valuable attacker first),
/// kings last regardless of value since a king may only capture when no
/// defenders remain.
fn attackers_of(pos: &Position, sq: Square, color: Color, vacated: &[Square], used: &[Square]) -> Vec<Attacker> {
    let tables = attack_tables::tables();
    let mut list = Vec::new();

    for &from in pos.pawns(color) {
        if used.contains(&from) {
            continue;
        }
        let e = tables.entry(from.raw(), sq.raw());
        let want = if color == Color::White {
            crate::attack_tables::ATK_PAWN_WHITE
        } else {
            crate::attack_tables::ATK_PAWN_BLACK
        };
        if e.flags & want != 0 {
            list.push(Attacker { value: PieceType::Pawn.value(), square: from, kind: PieceType::Pawn });
        }
    }

    for &from in pos.nonpawns(color) {
        if used.contains(&from) {
            continue;
        }
        let kind = pos.piece_at(from).kind().unwrap();
        let e = tables.entry(from.raw(), sq.raw());
        let hits = match kind {
            PieceType::Knight => e.flags & ATK_KNIGHT != 0,
            PieceType::King => e.flags & ATK_KING != 0,
            PieceType::Bishop => e.flags & ATK_BISHOP != 0 && ray_clear(pos, from, sq, e.step, vacated),
            PieceType::Rook => e.flags & ATK_ROOK != 0 && ray_clear(pos, from, sq, e.step, vacated),
            PieceType::Queen => e.flags & ATK_QUEEN != 0 && ray_clear(pos, from, sq, e.step, vacated),
            PieceType::Pawn => false,
        };
        if hits {
            list.push(Attacker { value: kind.value(), square: from, kind });
        }
    }

    list.sort_by(|a, b| {
        let ka = (a.kind == PieceType::King) as u8;
        let kb = (b.kind == PieceType::King) as u8;
        ka.cmp(&kb).then(a.value.cmp(&b.value))
    });
    list
}

/// A square blocks a ray unless it's actually empty or it's one of the
/// squares vacated so far by the simulated exchange (x-ray reveal).
fn ray_clear(pos: &Position, from: Square, to: Square, step: i8, vacated: &[Square]) -> bool {
    let mut cur = from.raw() as i16 + step as i16;
    while cur != to.raw() as i16 {
        if !(0..128).contains(&cur) || (cur as u8) & 0x88 != 0 {
            return false;
        }
        let cur_sq = Square::from_raw(cur as u8);
        if !pos.piece_at(cur_sq).is_none() && !vacated.contains(&cur_sq) {
            return false;
        }
        cur += step as i16;
    }
    true
}

/// Estimate the net material outcome of playing `mv` and the ensuing
/// least-valuable-attacker capture sequence on its destination square.
pub fn static_exchange_eval(pos: &Position, from: Square, to: Square, moved: PieceType, captured: Option<PieceType>, promoted: Option<PieceType>) -> i32 {
    let side = pos.piece_at(from).color();

    // The moving piece has already left `from`: it's excluded from the
    // attacker lists (its capture is the one already being played) and its
    // square counts as vacated from the start, so any slider lined up behind
    // it is picked up by the very first rescan below.
    let mut vacated = vec![from];
    let mut used = vec![from];

    let mut occupied_by = [
        attackers_of(pos, to, Color::White, &vacated, &used),
        attackers_of(pos, to, Color::Black, &vacated, &used),
    ];

    let mut gain = [0i32; 34];
    let mut depth = 0usize;
    let mut on_square_value = captured.map(|c| c.value()).unwrap_or(0);
    if let Some(p) = promoted {
        on_square_value += p.value() - PieceType::Pawn.value();
    }
    gain[0] = on_square_value;

    let mut attacker_value = moved.value();
    if let Some(p) = promoted {
        attacker_value = p.value();
    }

    let mut stm = side.opposite();

    loop {
        depth += 1;
        let list = &occupied_by[stm.index()];
        if list.is_empty() {
            break;
        }
        // Kings may capture only when the opponent has no more defenders.
        let next = list[0];
        if next.kind == PieceType::King {
            let opp_has_more = !occupied_by[stm.opposite().index()].is_empty();
            if opp_has_more {
                break;
            }
        }
        gain[depth] = attacker_value - gain[depth - 1];
        attacker_value = next.value;
        vacated.push(next.square);
        used.push(next.square);
        if depth >= 31 {
            break;
        }
        stm = stm.opposite();
        // Re-scan both sides: removing `next` may have unblocked an x-ray
        // slider sitting behind it on the line to `to` (C5).
        occupied_by = [
            attackers_of(pos, to, Color::White, &vacated, &used),
            attackers_of(pos, to, Color::Black, &vacated, &used),
        ];
    }

    // Min-max collapse from the tail: at each step the side to move prefers
    // the better of capturing (accepting the already-computed downstream
    // result) or stopping (standing pat at zero further exchange).
    for i in (1..depth).rev() {
        gain[i - 1] = -((-gain[i - 1]).max(gain[i]));
    }
    gain[0]
}
