//! FEN parsing/printing (`from_fen`/`to_fen` from C2's operation list).
//!
//! Grounded in the teacher's constant-mask startpos setup in `board/mod.rs`
//! (`new()` placing pieces via fixed masks) generalized to parse an
//! arbitrary FEN string field-by-field, enforcing the data-model invariants
//! as it goes rather than trusting the input.

use super::Position;
use super::piece::{Color, Piece};
use crate::castle::CastlingRights;
use crate::error::FenError;
use crate::square::Square;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn from_fen(text: &str) -> Result<Position, FenError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::WrongFieldCount(fields.len()));
    }
    let [placement, stm, castling, ep, halfmove, fullmove] = [
        fields[0], fields[1], fields[2], fields[3], fields[4], fields[5],
    ];

    let mut pos = Position::new_empty();

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadPiecePlacement(placement.to_string()));
    }
    // FEN lists rank 8 first; our internal rank index is 0-based from rank 1.
    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                if file > 8 {
                    return Err(FenError::RankTooLong { rank: rank + 1 });
                }
            } else {
                if file >= 8 {
                    return Err(FenError::RankTooLong { rank: rank + 1 });
                }
                let piece = Piece::from_fen_char(c)
                    .ok_or_else(|| FenError::BadPiecePlacement(placement.to_string()))?;
                pos.place_piece(Square::new(file, rank), piece);
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::RankTooShort { rank: rank + 1 });
        }
    }

    if pos.count_nonpawn(Color::White, super::piece::PieceType::King) == 0 {
        return Err(FenError::MissingKing { white: true });
    }
    if pos.count_nonpawn(Color::White, super::piece::PieceType::King) > 1 {
        return Err(FenError::TooManyKings { white: true });
    }
    if pos.count_nonpawn(Color::Black, super::piece::PieceType::King) == 0 {
        return Err(FenError::MissingKing { white: false });
    }
    if pos.count_nonpawn(Color::Black, super::piece::PieceType::King) > 1 {
        return Err(FenError::TooManyKings { white: false });
    }

    let side_to_move = match stm {
        "w" => Color::White,
        "b" => Color::Black,
        _ => return Err(FenError::BadSideToMove(stm.to_string())),
    };
    pos.side_to_move = side_to_move;

    let rights = CastlingRights::from_fen_str(castling)
        .ok_or_else(|| FenError::BadCastlingRights(castling.to_string()))?;
    pos.castling = rights;

    let ep_square = if ep == "-" {
        None
    } else {
        Some(Square::try_from_algebraic(ep).ok_or_else(|| FenError::BadEnPassant(ep.to_string()))?)
    };
    pos.en_passant = ep_square;

    pos.halfmove_clock = halfmove
        .parse()
        .map_err(|_| FenError::BadHalfmoveClock(halfmove.to_string()))?;
    pos.fullmove_number = fullmove
        .parse()
        .map_err(|_| FenError::BadFullmoveNumber(fullmove.to_string()))?;

    let (pawn_sig, nonpawn_sig) = pos.compute_signatures();
    pos.pawn_sig = pawn_sig;
    pos.nonpawn_sig = nonpawn_sig;

    Ok(pos)
}

pub fn to_fen(pos: &Position) -> String {
    let mut out = String::new();
    for i in 0..8u8 {
        let rank = 7 - i;
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let piece = pos.piece_at(Square::new(file, rank));
            if piece.is_none() {
                empty_run += 1;
            } else {
                if empty_run > 0 {
                    out.push((b'0' + empty_run) as char);
                    empty_run = 0;
                }
                out.push(piece.abbrev());
            }
        }
        if empty_run > 0 {
            out.push((b'0' + empty_run) as char);
        }
        if i != 7 {
            out.push('/');
        }
    }
    out.push(' ');
    out.push(if pos.side_to_move == Color::White { 'w' } else { 'b' });
    out.push(' ');
    out.push_str(&pos.castling.to_fen_str());
    out.push(' ');
    match pos.en_passant {
        Some(sq) => out.push_str(&sq.to_string()),
        None => out.push('-'),
    }
    out.push(' ');
    out.push_str(&pos.halfmove_clock.to_string());
    out.push(' ');
    out.push_str(&pos.fullmove_number.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_round_trips() {
        let pos = from_fen(STARTPOS_FEN).unwrap();
        assert_eq!(to_fen(&pos), STARTPOS_FEN);
    }

    #[test]
    fn kiwipete_round_trips() {
        let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = from_fen(kiwipete).unwrap();
        assert_eq!(to_fen(&pos), kiwipete);
    }

    #[test]
    fn rejects_missing_king() {
        let bad = "8/8/8/8/8/8/8/k7 w - - 0 1";
        assert!(matches!(from_fen(bad), Err(FenError::MissingKing { white: true })));
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(matches!(
            from_fen("8/8/8/8/8/8/8/8 w - -"),
            Err(FenError::WrongFieldCount(4))
        ));
    }

    #[test]
    fn signatures_match_full_recompute_after_parse() {
        let pos = from_fen(STARTPOS_FEN).unwrap();
        let (p, n) = pos.compute_signatures();
        assert_eq!(p, pos.pawn_sig);
        assert_eq!(n, pos.nonpawn_sig);
    }
}
