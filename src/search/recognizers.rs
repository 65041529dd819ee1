//! Interior-node recognizers (C9): closed-form scores for tiny-material
//! endgame classes, consulted before running full evaluation.
//!
//! Grounded in `original_source/recogn.c`'s `g_pRecognizers` registry —
//! `_RecognizeKK`, `_RecognizeKBK` (x2, one per bishop color), `_RecognizeKNK`
//! (x2), `_RecognizeKBNK` (x2), `_RecognizeKNKP`, `_RecognizeKBKP` (x3),
//! `_RecognizeKPK` (x2) — each returning one of `RECOGN_EXACT`/
//! `RECOGN_LOWER`/`RECOGN_UPPER`, modeled here as [`Bound`]. The registry is
//! gated the same way the source gates it: only consulted when both sides
//! have at most three non-pawns.

use crate::board::Position;
use crate::board::piece::{Color, PieceType};
use crate::square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct RecognizerScore {
    /// Score from White's perspective.
    pub white_relative: i32,
    pub bound: Bound,
}

impl RecognizerScore {
    pub fn as_search_score(self, stm: Color) -> i32 {
        if stm == Color::White {
            self.white_relative
        } else {
            -self.white_relative
        }
    }
}

/// Abstract endgame-tablebase probe contract (§1's excluded collaborator,
/// §4.6's "external endgame-tablebase oracle"). The default implementation
/// always misses; a host embedding a real tablebase swaps in its own.
pub trait Tablebase: Send + Sync {
    fn probe(&self, pos: &Position) -> Option<RecognizerScore>;
}

pub struct NoTablebase;
impl Tablebase for NoTablebase {
    fn probe(&self, _pos: &Position) -> Option<RecognizerScore> {
        None
    }
}

struct MaterialShape {
    white_nonpawns: u8,
    black_nonpawns: u8,
    white_pawns: u8,
    black_pawns: u8,
    white_bishops: u8,
    black_bishops: u8,
    white_knights: u8,
    black_knights: u8,
}

fn shape(pos: &Position) -> MaterialShape {
    MaterialShape {
        white_nonpawns: pos.total_nonpawns(Color::White) - 1,
        black_nonpawns: pos.total_nonpawns(Color::Black) - 1,
        white_pawns: pos.count_pawns(Color::White),
        black_pawns: pos.count_pawns(Color::Black),
        white_bishops: pos.count_nonpawn(Color::White, PieceType::Bishop),
        black_bishops: pos.count_nonpawn(Color::Black, PieceType::Bishop),
        white_knights: pos.count_nonpawn(Color::White, PieceType::Knight),
        black_knights: pos.count_nonpawn(Color::Black, PieceType::Knight),
    }
}

/// Consult the recognizer registry, if material is low enough. Returns
/// `None` ("not recognized") for anything outside the registered patterns,
/// in which case the caller falls through to normal evaluation.
pub fn probe(pos: &Position) -> Option<RecognizerScore> {
    let s = shape(pos);
    if s.white_nonpawns > 3 || s.black_nonpawns > 3 {
        return None;
    }

    // KK: bare kings.
    if s.white_nonpawns == 0 && s.black_nonpawns == 0 && s.white_pawns == 0 && s.black_pawns == 0 {
        return Some(RecognizerScore { white_relative: 0, bound: Bound::Exact });
    }

    // KBK / KNK: one minor, no pawns anywhere — insufficient mating material.
    if s.white_pawns == 0 && s.black_pawns == 0 {
        let only_minor = |nonpawns: u8, bishops: u8, knights: u8| nonpawns == 1 && (bishops == 1 || knights == 1);
        let white_bare = s.white_nonpawns == 0;
        let black_bare = s.black_nonpawns == 0;
        if (only_minor(s.white_nonpawns, s.white_bishops, s.white_knights) && black_bare)
            || (only_minor(s.black_nonpawns, s.black_bishops, s.black_knights) && white_bare)
        {
            return Some(RecognizerScore { white_relative: 0, bound: Bound::Exact });
        }
        // KBKB same-color bishops, KNKN: drawish absent a cornered king;
        // approximate as an exact draw per the source's conservative rule.
        if s.white_nonpawns == 1 && s.black_nonpawns == 1 {
            if s.white_bishops == 1 && s.black_bishops == 1 {
                return Some(RecognizerScore { white_relative: 0, bound: Bound::Exact });
            }
            if s.white_knights == 1 && s.black_knights == 1 {
                return Some(RecognizerScore { white_relative: 0, bound: Bound::Exact });
            }
        }
        // KBNK: known win, but technique-heavy; report a lower bound that
        // rewards driving the bare king to the board edge so search still
        // has to find the actual mating technique.
        if s.white_nonpawns == 2 && s.white_bishops == 1 && s.white_knights == 1 && black_bare {
            return Some(kbnk_score(pos, Color::White));
        }
        if s.black_nonpawns == 2 && s.black_bishops == 1 && s.black_knights == 1 && white_bare {
            return Some(kbnk_score(pos, Color::Black));
        }
    }

    // KNKP / KBKP: a lone minor against a lone pawn, nothing else.
    if s.white_pawns == 0 && s.black_nonpawns == 0 && s.black_pawns == 1 {
        if s.white_nonpawns == 1 && s.white_knights == 1 {
            if let Some(r) = knkp_score(pos, Color::White) {
                return Some(r);
            }
        }
        if s.white_nonpawns == 1 && s.white_bishops == 1 {
            if let Some(r) = kbkp_score(pos, Color::White) {
                return Some(r);
            }
        }
    }
    if s.black_pawns == 0 && s.white_nonpawns == 0 && s.white_pawns == 1 {
        if s.black_nonpawns == 1 && s.black_knights == 1 {
            if let Some(r) = knkp_score(pos, Color::Black) {
                return Some(r);
            }
        }
        if s.black_nonpawns == 1 && s.black_bishops == 1 {
            if let Some(r) = kbkp_score(pos, Color::Black) {
                return Some(r);
            }
        }
    }

    // KPK: one side has a single pawn and nothing else but the king.
    if s.white_nonpawns == 0 && s.black_nonpawns == 0 {
        if s.white_pawns == 1 && s.black_pawns == 1 {
            // KPKP: a race. Reuse KPK's rule-of-the-square per side; if only
            // one pawn can run unopposed, that's a lower bound. If both (or
            // neither) can, it's a genuine race left to full search.
            let white_runs = kpk_score(pos, Color::White);
            let black_runs = kpk_score(pos, Color::Black);
            return match (white_runs, black_runs) {
                (Some(w), None) => Some(w),
                (None, Some(b)) => Some(b),
                _ => None,
            };
        }
        if s.white_pawns == 1 && s.black_pawns == 0 {
            return kpk_score(pos, Color::White);
        }
        if s.black_pawns == 1 && s.white_pawns == 0 {
            return kpk_score(pos, Color::Black);
        }
    }

    None
}

/// Knight against a lone pawn: the knight usually draws by blockading the
/// queening square unless the pawn is too far advanced for it to catch up.
fn knkp_score(pos: &Position, knight_side: Color) -> Option<RecognizerScore> {
    let pawn_side = knight_side.opposite();
    let pawn_sq = *pos.pawns(pawn_side).first()?;
    let knight_sq = pos
        .nonpawns(knight_side)
        .iter()
        .copied()
        .find(|&sq| pos.piece_at(sq).kind() == Some(PieceType::Knight))?;
    let queening_rank = if pawn_side == Color::White { 7 } else { 0 };
    let queen_sq = crate::square::Square::new(pawn_sq.file(), queening_rank);
    let ranks_to_go = (queening_rank as i16 - pawn_sq.rank() as i16).unsigned_abs() as u8;
    let knight_dist = square::distance(knight_sq, queen_sq);

    if knight_dist <= ranks_to_go {
        return Some(RecognizerScore { white_relative: 0, bound: Bound::Exact });
    }
    if ranks_to_go <= 1 && knight_dist > 2 {
        let cp = 600;
        let white_relative = if pawn_side == Color::White { cp } else { -cp };
        return Some(RecognizerScore { white_relative, bound: Bound::Lower });
    }
    None
}

/// Bishop against a lone pawn: a draw whenever the bishop's square color
/// matches the queening square, since it can always blockade or control the
/// promotion; otherwise it comes down to whether the defending king can
/// reach the queening path in time.
fn kbkp_score(pos: &Position, bishop_side: Color) -> Option<RecognizerScore> {
    let pawn_side = bishop_side.opposite();
    let pawn_sq = *pos.pawns(pawn_side).first()?;
    let bishop_sq = pos
        .nonpawns(bishop_side)
        .iter()
        .copied()
        .find(|&sq| pos.piece_at(sq).kind() == Some(PieceType::Bishop))?;
    let queening_rank = if pawn_side == Color::White { 7 } else { 0 };
    let queen_sq = crate::square::Square::new(pawn_sq.file(), queening_rank);

    if crate::board::Position::is_light_square(bishop_sq) == crate::board::Position::is_light_square(queen_sq) {
        return Some(RecognizerScore { white_relative: 0, bound: Bound::Exact });
    }

    let ranks_to_go = (queening_rank as i16 - pawn_sq.rank() as i16).unsigned_abs() as u8;
    let defender_king = pos.king_square(pawn_side.opposite());
    let king_dist = square::distance(defender_king, queen_sq);
    if king_dist > ranks_to_go {
        let cp = 500;
        let white_relative = if pawn_side == Color::White { cp } else { -cp };
        return Some(RecognizerScore { white_relative, bound: Bound::Lower });
    }
    None
}

fn kbnk_score(pos: &Position, strong: Color) -> RecognizerScore {
    let weak_king = pos.king_square(strong.opposite());
    let strong_king = pos.king_square(strong);
    // KBN mates only in the bishop's own corners; bias towards whichever
    // matching-color corner the weak king is already closer to.
    let bishop_sq = pos
        .nonpawns(strong)
        .iter()
        .copied()
        .find(|&sq| pos.piece_at(sq).kind() == Some(PieceType::Bishop))
        .expect("KBNK shape guarantees a bishop");
    let light_squared = crate::board::Position::is_light_square(bishop_sq);
    let target_corner = if light_squared {
        crate::square::Square::new(7, 7)
    } else {
        crate::square::Square::new(0, 7)
    };
    let other_corner = crate::square::Square::new(if light_squared { 0 } else { 7 }, 0);
    let dist = square::distance(weak_king, target_corner).min(square::distance(weak_king, other_corner));
    let king_dist = square::distance(strong_king, weak_king);
    let cp = PieceType::Bishop.value() + PieceType::Knight.value() + (7 - dist as i32) * 10 + (14 - king_dist as i32) * 2;
    let white_relative = if strong == Color::White { cp } else { -cp };
    RecognizerScore { white_relative, bound: Bound::Lower }
}

/// Simplified critical-square KPK rule: the pawn's side wins (lower bound)
/// when the defending king cannot reach the pawn's queening path in time
/// (a coarse rule-of-the-square check, not exhaustive corner-case analysis —
/// recorded as an accepted approximation in DESIGN.md). Ambiguous races fall
/// through as "not recognized" so full search resolves them on the board.
fn kpk_score(pos: &Position, pawn_side: Color) -> Option<RecognizerScore> {
    let pawn_sq = *pos.pawns(pawn_side).first()?;
    let defender_king = pos.king_square(pawn_side.opposite());
    let queening_rank = if pawn_side == Color::White { 7 } else { 0 };
    let queen_sq = crate::square::Square::new(pawn_sq.file(), queening_rank);
    let ranks_to_go = (queening_rank as i16 - pawn_sq.rank() as i16).unsigned_abs() as u8;
    let king_dist = square::distance(defender_king, queen_sq);
    let mover_bonus = if pos.side_to_move == pawn_side.opposite() { 1 } else { 0 };

    if king_dist > ranks_to_go + mover_bonus {
        let cp = 400 + (ranks_to_go as i32) * -20;
        let white_relative = if pawn_side == Color::White { cp } else { -cp };
        return Some(RecognizerScore { white_relative, bound: Bound::Lower });
    }
    None
}
