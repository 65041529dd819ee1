//! Make/unmake (C4). Grounded in `original_source/movesup.c`'s apply/undo
//! pair and the teacher's `Undo`-capturing approach, adapted to update the
//! 0x88 piece lists (O(1) via back-indices) and the two split signatures
//! incrementally instead of one combined Zobrist key.

use crate::board::Position;
use crate::board::piece::{Color, PieceType};
use crate::castle::{BLACK_KINGSIDE, BLACK_QUEENSIDE, CastlingRights, WHITE_KINGSIDE, WHITE_QUEENSIDE};
use crate::square::Square;
use super::types::{Move, Undo};

/// Apply `mv` to `pos`. Returns `Some(Undo)` on success; if the mover's king
/// ends up in check, the move is fully reverted and `None` is returned,
/// matching the spec's "returns false… in which case it fully reverts"
/// contract (translated to `Option` for idiomatic reversibility).
pub fn make(pos: &mut Position, mv: Move) -> Option<Undo> {
    let color = pos.side_to_move;
    let undo = Undo {
        mv,
        prior_castling: pos.castling.0,
        prior_en_passant: pos.en_passant,
        prior_halfmove_clock: pos.halfmove_clock,
        prior_pawn_sig: pos.pawn_sig,
        prior_nonpawn_sig: pos.nonpawn_sig,
        rook_from: None,
        rook_to: None,
    };

    let is_pawn_move = mv.piece.kind() == Some(PieceType::Pawn);
    let resets_clock = is_pawn_move || mv.is_capture();

    if mv.is_en_passant() {
        let captured_sq = Square::new(mv.to.file(), mv.from.rank());
        pos.remove_piece(captured_sq);
    } else if mv.is_capture() {
        pos.remove_piece(mv.to);
    }

    pos.remove_piece(mv.from);
    let placed = if mv.is_promotion() { mv.promoted } else { mv.piece };
    pos.place_piece(mv.to, placed);

    let mut undo = undo;
    if mv.is_castle() {
        let rank = mv.from.rank();
        let (rook_from, rook_to) = if mv.to.file() == 6 {
            (Square::new(7, rank), Square::new(5, rank))
        } else {
            (Square::new(0, rank), Square::new(3, rank))
        };
        let rook = pos.remove_piece(rook_from);
        pos.place_piece(rook_to, rook);
        undo.rook_from = Some(rook_from);
        undo.rook_to = Some(rook_to);
    }

    pos.set_en_passant(if mv.is_double_push() {
        Some(Square::new(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2))
    } else {
        None
    });

    update_castling_rights_after_move(pos, &mv, color);

    if resets_clock {
        pos.halfmove_clock = 0;
    } else {
        pos.halfmove_clock += 1;
    }
    if color == Color::Black {
        pos.fullmove_number += 1;
    }

    pos.toggle_side_to_move();

    if pos.in_check(color) {
        unmake(pos, undo);
        return None;
    }

    pos.history.push(pos.signature());

    #[cfg(debug_assertions)]
    if cfg!(feature = "paranoid_hash") {
        pos.assert_signatures_consistent();
    }

    Some(undo)
}

fn update_castling_rights_after_move(pos: &mut Position, mv: &Move, color: Color) {
    let mut rights = pos.castling;
    if rights.0 == 0 {
        return;
    }
    if mv.piece.kind() == Some(PieceType::King) {
        if color == Color::White {
            rights.clear(WHITE_KINGSIDE | WHITE_QUEENSIDE);
        } else {
            rights.clear(BLACK_KINGSIDE | BLACK_QUEENSIDE);
        }
    }
    for &sq in &[mv.from, mv.to] {
        match sq.raw() {
            s if s == Square::new(0, 0).raw() => rights.clear(WHITE_QUEENSIDE),
            s if s == Square::new(7, 0).raw() => rights.clear(WHITE_KINGSIDE),
            s if s == Square::new(0, 7).raw() => rights.clear(BLACK_QUEENSIDE),
            s if s == Square::new(7, 7).raw() => rights.clear(BLACK_KINGSIDE),
            _ => {}
        }
    }
    if rights != pos.castling {
        pos.set_castling(CastlingRights(rights.0));
    }
}

/// Restore `pos` to exactly the state it was in before `make` was called
/// with `undo.mv`. The LIFO pairing invariant (C4, Testable Property 2)
/// requires callers to unmake in the reverse order they made.
pub fn unmake(pos: &mut Position, undo: Undo) {
    pos.history.pop();
    pos.toggle_side_to_move();
    let color = pos.side_to_move;
    if color == Color::Black {
        pos.fullmove_number -= 1;
    }

    let mv = undo.mv;
    pos.remove_piece(mv.to);
    pos.place_piece(mv.from, mv.piece);

    if mv.is_en_passant() {
        let captured_sq = Square::new(mv.to.file(), mv.from.rank());
        pos.place_piece(captured_sq, mv.captured);
    } else if mv.is_capture() {
        pos.place_piece(mv.to, mv.captured);
    }

    if let (Some(rook_from), Some(rook_to)) = (undo.rook_from, undo.rook_to) {
        let rook = pos.remove_piece(rook_to);
        pos.place_piece(rook_from, rook);
    }

    pos.set_castling(CastlingRights(undo.prior_castling));
    pos.set_en_passant(undo.prior_en_passant);
    pos.halfmove_clock = undo.prior_halfmove_clock;
    pos.pawn_sig = undo.prior_pawn_sig;
    pos.nonpawn_sig = undo.prior_nonpawn_sig;
}

/// Play a null move: flip side to move and clear en passant, without moving
/// any piece. Used by null-move pruning (C11 step 6).
pub struct NullUndo {
    prior_en_passant: Option<Square>,
    prior_nonpawn_sig: u64,
}

pub fn make_null(pos: &mut Position) -> NullUndo {
    let undo = NullUndo {
        prior_en_passant: pos.en_passant,
        prior_nonpawn_sig: pos.nonpawn_sig,
    };
    pos.set_en_passant(None);
    pos.toggle_side_to_move();
    undo
}

pub fn unmake_null(pos: &mut Position, undo: NullUndo) {
    pos.toggle_side_to_move();
    pos.en_passant = undo.prior_en_passant;
    pos.nonpawn_sig = undo.prior_nonpawn_sig;
}
