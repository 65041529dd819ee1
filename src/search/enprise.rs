//! Position hash (enprise/trapped cache): a small side table keyed by the
//! position signature with the side-to-move bit masked out, remembering
//! which non-pawn square is en-prise or trapped per color. Consulted as a
//! cheap pre-check before null-move and quiescence stand-pat decisions.
//!
//! Grounded directly in `original_source/poshash.c`: `StoreEnprisePiece`/
//! `StoreTrappedPiece`/`GetEnprisePiece`/`GetTrappedPiece`/`SideCanStandPat`/
//! `ValueOfMaterialInTroubleDespiteMove`/`ValueOfMaterialInTroubleAfterNull`,
//! including its exact "new signature clears everything, including the other
//! color" invalidation rule and the `uEnpriseCount >= 2` stand-pat veto
//! threshold. The source's 512-way striped spinlock becomes one `Mutex` per
//! entry here (§5's concurrency model, adapted to safe Rust — see
//! DESIGN.md for why striping buys nothing once locks are mutexes).

use crate::board::Position;
use crate::board::piece::{Color, PieceType};
use crate::square::Square;
use std::sync::Mutex;

const NUM_ENTRIES: usize = 1 << 20; // 16 Mb worth of slots, matching the source's sizing

#[derive(Clone, Copy)]
struct Entry {
    signature: u64,
    enprise: [Option<Square>; 2],
    enprise_count: [u8; 2],
    trapped: [Option<Square>; 2],
}

impl Entry {
    const EMPTY: Entry = Entry {
        signature: 0,
        enprise: [None, None],
        enprise_count: [0, 0],
        trapped: [None, None],
    };
}

pub struct EnpriseTable {
    entries: Vec<Mutex<Entry>>,
}

fn signature_ignoring_move(pos: &Position) -> u64 {
    (pos.nonpawn_sig ^ pos.pawn_sig) >> 1
}

fn bucket_index(sig: u64) -> usize {
    (sig as usize) & (NUM_ENTRIES - 1)
}

impl EnpriseTable {
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(NUM_ENTRIES);
        entries.resize_with(NUM_ENTRIES, || Mutex::new(Entry::EMPTY));
        EnpriseTable { entries }
    }

    pub fn clear(&self) {
        for e in &self.entries {
            *e.lock().unwrap() = Entry::EMPTY;
        }
    }

    fn slot(&self, sig: u64) -> &Mutex<Entry> {
        &self.entries[bucket_index(sig)]
    }

    /// Record that the piece of `color` on `square` (a non-pawn) is en
    /// prise in the current position. A stale entry (different signature)
    /// is reset first, clearing both colors, exactly as the source does.
    pub fn store_enprise(&self, pos: &Position, square: Square, color: Color) {
        let sig = signature_ignoring_move(pos);
        let mut e = self.slot(sig).lock().unwrap();
        if e.signature != sig {
            *e = Entry::EMPTY;
            e.signature = sig;
        }
        let c = color.index();
        e.enprise[c] = Some(square);
        e.enprise_count[c] = e.enprise_count[c].saturating_add(1).min(16);
    }

    /// Record that the piece of `color` on `square` is trapped (cannot
    /// safely move) in the current position.
    pub fn store_trapped(&self, pos: &Position, square: Square, color: Color) {
        let sig = signature_ignoring_move(pos);
        let mut e = self.slot(sig).lock().unwrap();
        if e.signature != sig {
            *e = Entry::EMPTY;
            e.signature = sig;
        }
        e.trapped[color.index()] = Some(square);
    }

    pub fn enprise_square(&self, pos: &Position, side: Color) -> Option<Square> {
        let sig = signature_ignoring_move(pos);
        let e = self.slot(sig).lock().unwrap();
        if e.signature == sig { e.enprise[side.index()] } else { None }
    }

    pub fn trapped_square(&self, pos: &Position, side: Color) -> Option<Square> {
        let sig = signature_ignoring_move(pos);
        let e = self.slot(sig).lock().unwrap();
        if e.signature == sig { e.trapped[side.index()] } else { None }
    }

    /// `true` unless `side` has a known trapped piece, or two-or-more known
    /// en-prise pieces, in the cached record for this exact position.
    pub fn side_can_stand_pat(&self, pos: &Position, side: Color) -> bool {
        let sig = signature_ignoring_move(pos);
        let e = self.slot(sig).lock().unwrap();
        if e.signature != sig {
            return true;
        }
        let c = side.index();
        e.trapped[c].is_none() && e.enprise_count[c] < 2
    }

    /// Worst-case material `side` stands to lose despite having just moved:
    /// the value of a multiply-attacked en-prise piece, or a trapped piece,
    /// whichever is larger. Used to veto an otherwise-attractive move.
    pub fn material_in_trouble_despite_move(&self, pos: &Position, side: Color) -> i32 {
        let sig = signature_ignoring_move(pos);
        let e = self.slot(sig).lock().unwrap();
        if e.signature != sig {
            return 0;
        }
        let c = side.index();
        let mut worst = 0;
        if e.enprise_count[c] > 1 {
            if let Some(sq) = e.enprise[c] {
                worst = piece_value_at(pos, sq);
            }
        }
        if let Some(sq) = e.trapped[c] {
            worst = worst.max(piece_value_at(pos, sq));
        }
        worst
    }

    /// Same idea, but used right after a null move: any known en-prise
    /// piece counts, not only a multiply-attacked one.
    pub fn material_in_trouble_after_null(&self, pos: &Position, side: Color) -> i32 {
        let sig = signature_ignoring_move(pos);
        let e = self.slot(sig).lock().unwrap();
        if e.signature != sig {
            return 0;
        }
        let c = side.index();
        let mut worst = 0;
        if e.enprise_count[c] > 0 {
            if let Some(sq) = e.enprise[c] {
                worst += piece_value_at(pos, sq);
            }
        }
        if let Some(sq) = e.trapped[c] {
            worst = worst.max(piece_value_at(pos, sq));
        }
        worst
    }
}

fn piece_value_at(pos: &Position, sq: Square) -> i32 {
    pos.piece_at(sq).kind().map(PieceType::value).unwrap_or(0)
}

impl Default for EnpriseTable {
    fn default() -> Self {
        Self::new()
    }
}
