//! Position representation (C2): piece grid + piece lists + signatures +
//! castle/en-passant state.
//!
//! Grounded in the teacher's `board/mod.rs` (a `Board` struct that keeps a
//! mailbox array alongside its core representation, incrementally maintains
//! a Zobrist signature through a single `set_bb` choke point, and exposes
//! `validate()`/`compute_zobrist_full()` for consistency checking) — adapted
//! from a bitboard+mailbox hybrid to the spec's 0x88 mailbox + piece-list
//! model, with the single signature split into `pawn_sig`/`nonpawn_sig`.

pub mod fen;
pub mod piece;

use crate::attack_tables::{self, ATK_BISHOP, ATK_KING, ATK_KNIGHT, ATK_PAWN_BLACK, ATK_PAWN_WHITE, ATK_QUEEN, ATK_ROOK};
use crate::castle::CastlingRights;
use crate::square::Square;
use crate::zobrist;
use piece::{Color, Piece, PieceType};

/// Per-square, per-color attack-counter bitvector. One bit per attacking
/// piece *kind* (not per attacker — the data model asks only "could some
/// piece of this kind be attacking this square", used by king-safety and
/// null-move veto heuristics, not for exact attacker counting).
pub const CTR_PAWN: u8 = 1 << 0;
pub const CTR_KNIGHT: u8 = 1 << 1;
pub const CTR_BISHOP: u8 = 1 << 2;
pub const CTR_ROOK: u8 = 1 << 3;
pub const CTR_QUEEN: u8 = 1 << 4;
pub const CTR_KING: u8 = 1 << 5;

const MAX_NONPAWNS: usize = 16;
const MAX_PAWNS: usize = 8;

/// A single color's non-pawn piece list. Index 0 is always the king; the
/// rest are in no particular order. `squares[i]` and `back_index[sq]` are
/// kept mutually consistent: removing an entry swaps the last list entry
/// into the gap and updates its back-index, giving O(1) deletion.
#[derive(Debug, Clone)]
pub struct PieceList {
    pub squares: Vec<Square>,
}

impl PieceList {
    fn new() -> Self {
        PieceList {
            squares: Vec::with_capacity(MAX_NONPAWNS),
        }
    }

    fn push(&mut self, sq: Square) -> u8 {
        let idx = self.squares.len() as u8;
        self.squares.push(sq);
        idx
    }

    /// Remove the entry at `idx`, swapping the last entry into its place.
    /// Returns the square that was moved into `idx`, if any (the caller must
    /// update that square's back-index record).
    fn swap_remove(&mut self, idx: u8) -> Option<(Square, u8)> {
        let last = self.squares.len() - 1;
        self.squares.swap(idx as usize, last);
        self.squares.pop();
        if (idx as usize) < self.squares.len() {
            Some((self.squares[idx as usize], idx))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SquareRecord {
    piece: Piece,
    /// Back-index into the owning color's pawn list or non-pawn list
    /// (whichever matches `piece`'s kind). Meaningless when `piece` is none.
    back_index: u8,
}

#[derive(Debug, Clone)]
pub struct Position {
    grid: [SquareRecord; 128],
    atk_white: [u8; 128],
    atk_black: [u8; 128],
    attack_counters_valid: bool,

    nonpawn_list: [PieceList; 2],
    pawn_list: [PieceList; 2],

    count_nonpawn_by_type: [[u8; 6]; 2],
    count_pawns: [u8; 2],
    white_square_bishops: [u8; 2],
    material_pawn: [i32; 2],
    material_nonpawn: [i32; 2],

    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    pub pawn_sig: u64,
    pub nonpawn_sig: u64,

    /// Append-only (signature) history for repetition detection, distinct
    /// from the search tree's ply stack.
    pub history: Vec<u64>,
}

impl Position {
    pub fn new_empty() -> Self {
        Position {
            grid: [SquareRecord::default(); 128],
            atk_white: [0; 128],
            atk_black: [0; 128],
            attack_counters_valid: false,
            nonpawn_list: [PieceList::new(), PieceList::new()],
            pawn_list: [PieceList::new(), PieceList::new()],
            count_nonpawn_by_type: [[0; 6]; 2],
            count_pawns: [0; 2],
            white_square_bishops: [0; 2],
            material_pawn: [0; 2],
            material_nonpawn: [0; 2],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            pawn_sig: 0,
            nonpawn_sig: 0,
            history: Vec::with_capacity(64),
        }
    }

    pub fn startpos() -> Self {
        fen::from_fen(fen::STARTPOS_FEN).expect("startpos FEN must parse")
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.grid[sq.raw() as usize].piece
    }

    pub fn signature(&self) -> u64 {
        self.pawn_sig ^ self.nonpawn_sig
    }

    pub fn king_square(&self, color: Color) -> Square {
        *self.nonpawn_list[color.index()]
            .squares
            .first()
            .unwrap_or_else(|| panic!("no king for {color:?} in position {}", fen::to_fen(self)))
    }

    pub fn nonpawns(&self, color: Color) -> &[Square] {
        &self.nonpawn_list[color.index()].squares
    }

    pub fn pawns(&self, color: Color) -> &[Square] {
        &self.pawn_list[color.index()].squares
    }

    pub fn count_nonpawn(&self, color: Color, kind: PieceType) -> u8 {
        self.count_nonpawn_by_type[color.index()][kind as usize - 1]
    }

    pub fn total_nonpawns(&self, color: Color) -> u8 {
        self.count_nonpawn_by_type[color.index()].iter().sum()
    }

    pub fn count_pawns(&self, color: Color) -> u8 {
        self.count_pawns[color.index()]
    }

    pub fn white_square_bishop_count(&self, color: Color) -> u8 {
        self.white_square_bishops[color.index()]
    }

    pub fn material_pawn(&self, color: Color) -> i32 {
        self.material_pawn[color.index()]
    }

    pub fn material_nonpawn(&self, color: Color) -> i32 {
        self.material_nonpawn[color.index()]
    }

    /// `true` iff `sq` is on a light ("white") square, used for bishop-pair
    /// and wrong-color-bishop tests.
    #[inline]
    pub fn is_light_square(sq: Square) -> bool {
        (sq.file() + sq.rank()) % 2 != 0
    }

    /// Place `piece` on `sq`, which must currently be empty. Updates piece
    /// lists, counts, material sums and both signatures incrementally.
    pub fn place_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.grid[sq.raw() as usize].piece.is_none());
        let color = piece.color();
        let kind = piece.kind().expect("place_piece with Piece::NONE");
        let back_index = match kind {
            PieceType::Pawn => {
                let idx = self.pawn_list[color.index()].push(sq);
                self.count_pawns[color.index()] += 1;
                self.material_pawn[color.index()] += kind.value();
                self.pawn_sig ^= zobrist::keys().pawn_key(color, sq.to_bit_index());
                idx
            }
            _ => {
                let idx = self.nonpawn_list[color.index()].push(sq);
                self.count_nonpawn_by_type[color.index()][kind as usize - 1] += 1;
                if kind != PieceType::King {
                    self.material_nonpawn[color.index()] += kind.value();
                }
                if kind == PieceType::Bishop && Self::is_light_square(sq) {
                    self.white_square_bishops[color.index()] += 1;
                }
                self.nonpawn_sig ^= zobrist::keys().nonpawn_piece_key(color, kind, sq.to_bit_index());
                idx
            }
        };
        self.grid[sq.raw() as usize] = SquareRecord { piece, back_index };
        self.attack_counters_valid = false;
    }

    /// Remove whatever piece sits on `sq` (must be occupied) and return it.
    pub fn remove_piece(&mut self, sq: Square) -> Piece {
        let rec = self.grid[sq.raw() as usize];
        let piece = rec.piece;
        debug_assert!(!piece.is_none());
        let color = piece.color();
        let kind = piece.kind().unwrap();

        match kind {
            PieceType::Pawn => {
                if let Some((moved_sq, idx)) = self.pawn_list[color.index()].swap_remove(rec.back_index) {
                    self.grid[moved_sq.raw() as usize].back_index = idx;
                }
                self.count_pawns[color.index()] -= 1;
                self.material_pawn[color.index()] -= kind.value();
                self.pawn_sig ^= zobrist::keys().pawn_key(color, sq.to_bit_index());
            }
            _ => {
                if let Some((moved_sq, idx)) = self.nonpawn_list[color.index()].swap_remove(rec.back_index) {
                    self.grid[moved_sq.raw() as usize].back_index = idx;
                }
                self.count_nonpawn_by_type[color.index()][kind as usize - 1] -= 1;
                if kind != PieceType::King {
                    self.material_nonpawn[color.index()] -= kind.value();
                }
                if kind == PieceType::Bishop && Self::is_light_square(sq) {
                    self.white_square_bishops[color.index()] -= 1;
                }
                self.nonpawn_sig ^= zobrist::keys().nonpawn_piece_key(color, kind, sq.to_bit_index());
            }
        }
        self.grid[sq.raw() as usize] = SquareRecord::default();
        self.attack_counters_valid = false;
        piece
    }

    pub fn toggle_side_to_move(&mut self) {
        self.nonpawn_sig ^= zobrist::keys().side_to_move;
        self.side_to_move = self.side_to_move.opposite();
    }

    pub fn set_castling(&mut self, rights: CastlingRights) {
        self.nonpawn_sig ^= zobrist::keys().castling_key(self.castling.0);
        self.castling = rights;
        self.nonpawn_sig ^= zobrist::keys().castling_key(self.castling.0);
    }

    pub fn set_en_passant(&mut self, sq: Option<Square>) {
        if let Some(s) = self.en_passant {
            self.nonpawn_sig ^= zobrist::keys().ep_key(s.file());
        }
        self.en_passant = sq;
        if let Some(s) = sq {
            self.nonpawn_sig ^= zobrist::keys().ep_key(s.file());
        }
    }

    /// Full recomputation of both signatures from scratch, used to validate
    /// incremental updates (Testable Property 1).
    pub fn compute_signatures(&self) -> (u64, u64) {
        let keys = zobrist::keys();
        let mut pawn_sig = 0u64;
        let mut nonpawn_sig = 0u64;

        for &color in &[Color::White, Color::Black] {
            for &sq in &self.pawn_list[color.index()].squares {
                pawn_sig ^= keys.pawn_key(color, sq.to_bit_index());
            }
            for &sq in &self.nonpawn_list[color.index()].squares {
                let kind = self.piece_at(sq).kind().unwrap();
                nonpawn_sig ^= keys.nonpawn_piece_key(color, kind, sq.to_bit_index());
            }
        }
        if self.side_to_move == Color::White {
            nonpawn_sig ^= keys.side_to_move;
        }
        nonpawn_sig ^= keys.castling_key(self.castling.0);
        if let Some(ep) = self.en_passant {
            nonpawn_sig ^= keys.ep_key(ep.file());
        }
        (pawn_sig, nonpawn_sig)
    }

    #[cfg(debug_assertions)]
    pub fn assert_signatures_consistent(&self) {
        let (p, n) = self.compute_signatures();
        debug_assert_eq!(
            p,
            self.pawn_sig,
            "pawn signature drifted from incremental update in position {}",
            fen::to_fen(self)
        );
        debug_assert_eq!(
            n,
            self.nonpawn_sig,
            "non-pawn signature drifted from incremental update in position {}",
            fen::to_fen(self)
        );
    }

    /// Rebuild the per-square attack-counter bitvectors. Deliberately lazy —
    /// not maintained incrementally by make/unmake — and only needed by the
    /// evaluator's king-safety term, so callers invoke this once before
    /// reading `attackers_of`.
    pub fn rebuild_attack_counters(&mut self) {
        self.atk_white = [0; 128];
        self.atk_black = [0; 128];

        for &color in &[Color::White, Color::Black] {
            let mut contributions: Vec<(u8, u8)> = Vec::new();

            let nonpawn_squares = self.nonpawn_list[color.index()].squares.clone();
            for sq in nonpawn_squares {
                let kind = self.piece_at(sq).kind().unwrap();
                self.accumulate_attacks(sq, kind, color, &mut contributions);
            }
            let pawn_squares = self.pawn_list[color.index()].squares.clone();
            for sq in pawn_squares {
                self.accumulate_attacks(sq, PieceType::Pawn, color, &mut contributions);
            }

            let ctr_array: &mut [u8; 128] = if color == Color::White {
                &mut self.atk_white
            } else {
                &mut self.atk_black
            };
            for (target, bit) in contributions {
                ctr_array[target as usize] |= bit;
            }
        }
        self.attack_counters_valid = true;
    }

    fn accumulate_attacks(
        &self,
        from: Square,
        kind: PieceType,
        color: Color,
        out: &mut Vec<(u8, u8)>,
    ) {
        let tables = attack_tables::tables();
        match kind {
            PieceType::Pawn => {
                let want = if color == Color::White {
                    ATK_PAWN_WHITE
                } else {
                    ATK_PAWN_BLACK
                };
                for df in [-1i8, 1] {
                    let to_raw = from.raw() as i16 + if color == Color::White { 16 } else { -16 } + df as i16;
                    if !(0..128).contains(&to_raw) {
                        continue;
                    }
                    let to = Square::from_raw(to_raw as u8);
                    if !to.is_on_board() {
                        continue;
                    }
                    let e = tables.entry(from.raw(), to.raw());
                    if e.flags & want != 0 {
                        out.push((to.raw(), CTR_PAWN));
                    }
                }
            }
            PieceType::Knight | PieceType::King => {
                let want_flag = if kind == PieceType::Knight { ATK_KNIGHT } else { ATK_KING };
                let ctr_bit = if kind == PieceType::Knight { CTR_KNIGHT } else { CTR_KING };
                for to_raw in 0u8..128 {
                    if to_raw & 0x88 != 0 {
                        continue;
                    }
                    let e = tables.entry(from.raw(), to_raw);
                    if e.flags & want_flag != 0 {
                        out.push((to_raw, ctr_bit));
                    }
                }
            }
            PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
                let (want_flag, ctr_bit) = match kind {
                    PieceType::Bishop => (ATK_BISHOP, CTR_BISHOP),
                    PieceType::Rook => (ATK_ROOK, CTR_ROOK),
                    _ => (ATK_QUEEN, CTR_QUEEN),
                };
                for to_raw in 0u8..128 {
                    if to_raw & 0x88 != 0 || to_raw == from.raw() {
                        continue;
                    }
                    let e = tables.entry(from.raw(), to_raw);
                    if e.flags & want_flag == 0 {
                        continue;
                    }
                    if self.ray_clear(from.raw(), to_raw, e.step) {
                        out.push((to_raw, ctr_bit));
                    }
                }
            }
        }
    }

    /// Walk from `from` towards `to` by `step`, returning true iff every
    /// intermediate square (exclusive of both ends) is empty.
    fn ray_clear(&self, from: u8, to: u8, step: i8) -> bool {
        let mut cur = from as i16 + step as i16;
        while cur != to as i16 {
            if !(0..128).contains(&cur) || (cur as u8) & 0x88 != 0 {
                return false;
            }
            if !self.grid[cur as usize].piece.is_none() {
                return false;
            }
            cur += step as i16;
        }
        true
    }

    /// Attack-counter bitvector (`CTR_*` bits) for pieces of `attacker_color`
    /// reaching `sq`. Requires `rebuild_attack_counters` to have been called
    /// since the last position mutation.
    pub fn attack_counter(&self, sq: Square, attacker_color: Color) -> u8 {
        debug_assert!(self.attack_counters_valid, "attack counters stale; call rebuild_attack_counters first");
        if attacker_color == Color::White {
            self.atk_white[sq.raw() as usize]
        } else {
            self.atk_black[sq.raw() as usize]
        }
    }

    pub fn in_check(&self, color: Color) -> bool {
        let king_sq = self.king_square(color);
        self.is_attacked(king_sq, color.opposite())
    }

    /// Scans `by_color`'s piece list (king last, per the source-grounded
    /// ordering) verifying attack vector and, for sliders, ray clarity; and
    /// the two pawn-capture squares directly.
    pub fn is_attacked(&self, sq: Square, by_color: Color) -> bool {
        let tables = attack_tables::tables();

        for &from in &self.pawn_list[by_color.index()].squares {
            let e = tables.entry(from.raw(), sq.raw());
            let want = if by_color == Color::White {
                ATK_PAWN_WHITE
            } else {
                ATK_PAWN_BLACK
            };
            if e.flags & want != 0 {
                return true;
            }
        }

        for &from in &self.nonpawn_list[by_color.index()].squares {
            let kind = self.piece_at(from).kind().unwrap();
            let e = tables.entry(from.raw(), sq.raw());
            let hits = match kind {
                PieceType::Knight => e.flags & ATK_KNIGHT != 0,
                PieceType::King => e.flags & ATK_KING != 0,
                PieceType::Bishop => e.flags & ATK_BISHOP != 0 && self.ray_clear(from.raw(), sq.raw(), e.step),
                PieceType::Rook => e.flags & ATK_ROOK != 0 && self.ray_clear(from.raw(), sq.raw(), e.step),
                PieceType::Queen => e.flags & ATK_QUEEN != 0 && self.ray_clear(from.raw(), sq.raw(), e.step),
                PieceType::Pawn => false,
            };
            if hits {
                return true;
            }
        }
        false
    }

    pub fn is_insufficient_material(&self) -> bool {
        let wp = self.count_pawns(Color::White);
        let bp = self.count_pawns(Color::Black);
        if wp != 0 || bp != 0 {
            return false;
        }
        let wn = self.total_nonpawns(Color::White) - 1;
        let bn = self.total_nonpawns(Color::Black) - 1;
        let w_heavy = self.count_nonpawn(Color::White, PieceType::Rook) > 0
            || self.count_nonpawn(Color::White, PieceType::Queen) > 0;
        let b_heavy = self.count_nonpawn(Color::Black, PieceType::Rook) > 0
            || self.count_nonpawn(Color::Black, PieceType::Queen) > 0;
        if w_heavy || b_heavy {
            return false;
        }
        // King vs king, king+minor vs king, or king+minor vs king+minor (the
        // last only when neither side could ever force mate: two minors on
        // one side still might, so only same-or-fewer-than-one each side).
        wn <= 1 && bn <= 1
    }

    pub fn repetition_count(&self) -> u32 {
        let sig = self.signature();
        self.history.iter().filter(|&&s| s == sig).count() as u32
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }
}
