//! Compact piece/color encoding (Design Notes §9: enum + associated
//! functions in place of the source's `PIECE_TYPE`/`PIECE_COLOR` macros).
//! The low bit of a `Piece` byte is always the color — move generation and
//! make/unmake rely on this, so `PieceType`/`Color` are kept as thin views
//! over the same `u8` rather than independent types.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    #[inline(always)]
    pub const fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn from_index(i: usize) -> Color {
        if i == 1 { Color::White } else { Color::Black }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

pub const PIECE_TYPES: [PieceType; 6] = [
    PieceType::Pawn,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
    PieceType::King,
];

impl PieceType {
    #[inline(always)]
    pub const fn from_u8(v: u8) -> Option<PieceType> {
        match v {
            1 => Some(PieceType::Pawn),
            2 => Some(PieceType::Knight),
            3 => Some(PieceType::Bishop),
            4 => Some(PieceType::Rook),
            5 => Some(PieceType::Queen),
            6 => Some(PieceType::King),
            _ => None,
        }
    }

    /// Standard material value in centipawns. Kings carry no material value;
    /// callers that sum material must special-case King if they ever see one
    /// (they normally don't, since kings aren't captured).
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            PieceType::King => 20000,
        }
    }

    #[inline]
    pub const fn abbrev(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }
}

/// `(type << 1) | color`. `Piece::NONE` (0) never decodes to a valid type,
/// which is what lets the 128-entry board grid use 0 as "empty" for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Piece(pub u8);

impl Piece {
    pub const NONE: Piece = Piece(0);

    #[inline(always)]
    pub const fn new(kind: PieceType, color: Color) -> Piece {
        Piece(((kind as u8) << 1) | (color as u8))
    }

    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn kind(self) -> Option<PieceType> {
        PieceType::from_u8(self.0 >> 1)
    }

    #[inline(always)]
    pub const fn color(self) -> Color {
        if (self.0 & 1) != 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    pub const fn is_color(self, c: Color) -> bool {
        !self.is_none() && (self.0 & 1) == (c as u8)
    }

    pub fn abbrev(self) -> char {
        match self.kind() {
            None => '.',
            Some(k) => {
                let c = k.abbrev();
                if self.color() == Color::White {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            }
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some(Piece::new(kind, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_low_bit() {
        let wp = Piece::new(PieceType::Pawn, Color::White);
        let bp = Piece::new(PieceType::Pawn, Color::Black);
        assert_eq!(wp.0 & 1, 1);
        assert_eq!(bp.0 & 1, 0);
        assert_eq!(wp.0 & !1, bp.0 & !1);
    }

    #[test]
    fn round_trips_every_piece_through_fen_char() {
        for &k in &PIECE_TYPES {
            for &c in &[Color::White, Color::Black] {
                let p = Piece::new(k, c);
                let ch = p.abbrev();
                let back = Piece::from_fen_char(ch).unwrap();
                assert_eq!(back.kind(), Some(k));
                assert_eq!(back.color(), c);
            }
        }
    }

    #[test]
    fn none_has_no_kind() {
        assert!(Piece::NONE.is_none());
        assert_eq!(Piece::NONE.kind(), None);
    }
}
