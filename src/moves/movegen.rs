//! Legal-move enumeration (C4). Grounded in the teacher's per-piece
//! generator functions (one routine per leaper/slider kind feeding a shared
//! buffer) generalized onto the 0x88 `vector_delta` table instead of
//! per-piece bitboard masks. Legality itself is generate-then-filter, same
//! as `original_source/movesup.c`'s shape, but the filter is "does `make`
//! accept it" (full make/unmake plus an in-check test) rather than a
//! standalone pin-ray check, since that's the only way to get en passant's
//! double-removal pin case right for free.

use crate::attack_tables::{self, ATK_BISHOP, ATK_KING, ATK_KNIGHT, ATK_QUEEN, ATK_ROOK};
use crate::board::Position;
use crate::board::piece::{Color, Piece, PieceType};
use crate::castle::{BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE};
use crate::square::Square;
use super::types::{
    FLAG_CASTLE_KINGSIDE, FLAG_CASTLE_QUEENSIDE, FLAG_DOUBLE_PUSH, FLAG_EN_PASSANT, Move,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenMode {
    AllMoves,
    Escapes,
    Captures,
    /// Same legality as `AllMoves` but callers skip scoring (perft).
    DontScore,
}

/// Enumerate every pseudo-legal-then-filtered-legal move for the side to
/// move, per `mode`. Returns only moves that leave the mover's own king
/// unattacked (rule 1).
pub fn generate(pos: &Position, mode: GenMode) -> Vec<Move> {
    let color = pos.side_to_move;
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal(pos, color, mode, &mut pseudo);

    pseudo.into_iter().filter(|mv| is_legal(pos, mv)).collect()
}

/// A pseudo-legal move is legal iff playing it does not leave the mover's
/// own king attacked. `execute::make` already performs and reverts this
/// check internally (C4's make/unmake contract), so legality here is just
/// "did make accept it".
fn is_legal(pos: &Position, mv: &Move) -> bool {
    let mut scratch = pos.clone();
    super::execute::make(&mut scratch, *mv).is_some()
}

pub(crate) fn generate_pseudo_legal(pos: &Position, color: Color, mode: GenMode, out: &mut Vec<Move>) {
    generate_pawn_moves(pos, color, mode, out);
    for &sq in pos.nonpawns(color) {
        let kind = pos.piece_at(sq).kind().unwrap();
        match kind {
            PieceType::Knight => generate_leaper(pos, sq, color, ATK_KNIGHT, mode, out),
            PieceType::King => {
                generate_leaper(pos, sq, color, ATK_KING, mode, out);
                if mode != GenMode::Captures {
                    generate_castling(pos, color, out);
                }
            }
            PieceType::Bishop => generate_slider(pos, sq, color, ATK_BISHOP, mode, out),
            PieceType::Rook => generate_slider(pos, sq, color, ATK_ROOK, mode, out),
            PieceType::Queen => generate_slider(pos, sq, color, ATK_QUEEN, mode, out),
            PieceType::Pawn => unreachable!(),
        }
    }
}

fn generate_leaper(pos: &Position, from: Square, color: Color, want_flag: u8, mode: GenMode, out: &mut Vec<Move>) {
    let tables = attack_tables::tables();
    let piece = pos.piece_at(from);
    for to_raw in 0u8..128 {
        if to_raw & 0x88 != 0 {
            continue;
        }
        let e = tables.entry(from.raw(), to_raw);
        if e.flags & want_flag == 0 {
            continue;
        }
        let to = Square::from_raw(to_raw);
        let target = pos.piece_at(to);
        if target.is_color(color) {
            continue;
        }
        if mode == GenMode::Captures && target.is_none() {
            continue;
        }
        out.push(Move {
            from,
            to,
            piece,
            captured: target,
            promoted: Piece::NONE,
            flags: 0,
        });
    }
}

fn generate_slider(pos: &Position, from: Square, color: Color, want_flag: u8, mode: GenMode, out: &mut Vec<Move>) {
    let tables = attack_tables::tables();
    let piece = pos.piece_at(from);
    for to_raw in 0u8..128 {
        if to_raw & 0x88 != 0 || to_raw == from.raw() {
            continue;
        }
        let e = tables.entry(from.raw(), to_raw);
        if e.flags & want_flag == 0 {
            continue;
        }
        // Walk the ray, stopping at the first obstruction.
        let mut cur = from.raw() as i16 + e.step as i16;
        let to = Square::from_raw(to_raw);
        let mut blocked = false;
        while cur != to_raw as i16 {
            if !pos.piece_at(Square::from_raw(cur as u8)).is_none() {
                blocked = true;
                break;
            }
            cur += e.step as i16;
        }
        if blocked {
            continue;
        }
        let target = pos.piece_at(to);
        if target.is_color(color) {
            continue;
        }
        if mode == GenMode::Captures && target.is_none() {
            continue;
        }
        out.push(Move {
            from,
            to,
            piece,
            captured: target,
            promoted: Piece::NONE,
            flags: 0,
        });
    }
}

const PROMOTION_PIECES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

fn generate_pawn_moves(pos: &Position, color: Color, mode: GenMode, out: &mut Vec<Move>) {
    let piece = Piece::new(PieceType::Pawn, color);
    let (dir, start_rank, promo_rank): (i16, u8, u8) = if color == Color::White {
        (16, 1, 7)
    } else {
        (-16, 6, 0)
    };

    let pawn_squares: Vec<Square> = pos.pawns(color).to_vec();
    for from in pawn_squares {
        // Single push.
        if mode != GenMode::Captures {
            let one_raw = from.raw() as i16 + dir;
            if (0..128).contains(&one_raw) {
                let one = Square::from_raw(one_raw as u8);
                if one.is_on_board() && pos.piece_at(one).is_none() {
                    push_pawn_move(out, from, one, piece, Piece::NONE, 0, promo_rank);
                    if from.rank() == start_rank {
                        let two_raw = one_raw + dir;
                        let two = Square::from_raw(two_raw as u8);
                        if two.is_on_board() && pos.piece_at(two).is_none() {
                            out.push(Move {
                                from,
                                to: two,
                                piece,
                                captured: Piece::NONE,
                                promoted: Piece::NONE,
                                flags: FLAG_DOUBLE_PUSH,
                            });
                        }
                    }
                }
            }
        }

        // Captures (including en passant).
        for df in [-1i16, 1] {
            let to_raw = from.raw() as i16 + dir + df;
            if !(0..128).contains(&to_raw) {
                continue;
            }
            let to = Square::from_raw(to_raw as u8);
            if !to.is_on_board() {
                continue;
            }
            let target = pos.piece_at(to);
            if target.is_color(color.opposite()) {
                push_pawn_move(out, from, to, piece, target, 0, promo_rank);
            } else if target.is_none() && Some(to) == pos.en_passant {
                let captured_sq = Square::new(to.file(), from.rank());
                let captured_piece = pos.piece_at(captured_sq);
                out.push(Move {
                    from,
                    to,
                    piece,
                    captured: captured_piece,
                    promoted: Piece::NONE,
                    flags: FLAG_EN_PASSANT,
                });
            }
        }
    }
}

fn push_pawn_move(
    out: &mut Vec<Move>,
    from: Square,
    to: Square,
    piece: Piece,
    captured: Piece,
    flags: u8,
    promo_rank: u8,
) {
    if to.rank() == promo_rank {
        for &promo_kind in &PROMOTION_PIECES {
            out.push(Move {
                from,
                to,
                piece,
                captured,
                promoted: Piece::new(promo_kind, piece.color()),
                flags,
            });
        }
    } else {
        out.push(Move {
            from,
            to,
            piece,
            captured,
            promoted: Piece::NONE,
            flags,
        });
    }
}

fn generate_castling(pos: &Position, color: Color, out: &mut Vec<Move>) {
    let opp = color.opposite();
    let king_sq = pos.king_square(color);
    if pos.is_attacked(king_sq, opp) {
        return; // rule 4(c): not while in check
    }

    let (kingside_right, queenside_right, rank) = if color == Color::White {
        (WHITE_KINGSIDE, WHITE_QUEENSIDE, 0u8)
    } else {
        (BLACK_KINGSIDE, BLACK_QUEENSIDE, 7u8)
    };

    if pos.castling.has(kingside_right) {
        let f = Square::new(5, rank);
        let g = Square::new(6, rank);
        if pos.piece_at(f).is_none()
            && pos.piece_at(g).is_none()
            && !pos.is_attacked(f, opp)
            && !pos.is_attacked(g, opp)
        {
            out.push(Move {
                from: king_sq,
                to: g,
                piece: Piece::new(PieceType::King, color),
                captured: Piece::NONE,
                promoted: Piece::NONE,
                flags: FLAG_CASTLE_KINGSIDE,
            });
        }
    }
    if pos.castling.has(queenside_right) {
        let d = Square::new(3, rank);
        let c = Square::new(2, rank);
        let b = Square::new(1, rank);
        if pos.piece_at(d).is_none()
            && pos.piece_at(c).is_none()
            && pos.piece_at(b).is_none()
            && !pos.is_attacked(d, opp)
            && !pos.is_attacked(c, opp)
        {
            out.push(Move {
                from: king_sq,
                to: c,
                piece: Piece::new(PieceType::King, color),
                captured: Piece::NONE,
                promoted: Piece::NONE,
                flags: FLAG_CASTLE_QUEENSIDE,
            });
        }
    }
}
