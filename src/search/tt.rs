//! Transposition table (C7): a large direct-mapped table keyed by the low
//! bits of the position signature, with lock-free self-verifying entries.
//!
//! Grounded in the teacher's `search/tt.rs` (`TTEntry`/`NodeType`, depth-
//! preferred replacement, generation-based aging) extended with the XOR
//! self-verification trick §4.7/§5 require for concurrent access: each
//! stored entry keeps `key ^ payload` alongside the plain fields, and a
//! reader recomputes the XOR and discards the entry on mismatch instead of
//! trusting a torn read.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact = 0,
    Lower = 1,
    Upper = 2,
}

impl Bound {
    fn from_u8(v: u8) -> Bound {
        match v {
            0 => Bound::Exact,
            1 => Bound::Lower,
            _ => Bound::Upper,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProbeResult {
    pub score: i32,
    pub bound: Bound,
    pub depth: u8,
    pub best_from: u8,
    pub best_to: u8,
    pub has_move: bool,
}

/// Packed payload: score(i32) | depth(u8) | bound(2 bits) | age(6 bits) |
/// best_from(u8) | best_to(u8) | has_move(1 bit), fit into one u64 so the
/// whole entry is two atomic words (signature, payload) whose XOR is
/// verified on read.
#[inline]
fn pack(score: i32, depth: u8, bound: Bound, age: u8, best_from: u8, best_to: u8, has_move: bool) -> u64 {
    let score_bits = (score as i64 as u64) & 0xFFFF_FFFF;
    score_bits
        | ((depth as u64) << 32)
        | ((bound as u64) << 40)
        | (((age & 0x3F) as u64) << 42)
        | ((best_from as u64) << 48)
        | ((best_to as u64) << 56)
        | ((has_move as u64) << 63)
}

#[inline]
fn unpack(payload: u64) -> ProbeResult {
    let score = (payload & 0xFFFF_FFFF) as i32;
    let depth = ((payload >> 32) & 0xFF) as u8;
    let bound = Bound::from_u8(((payload >> 40) & 0x3) as u8);
    let best_from = ((payload >> 48) & 0xFF) as u8;
    let best_to = ((payload >> 56) & 0x7F) as u8;
    let has_move = (payload >> 63) & 1 != 0;
    ProbeResult { score, bound, depth, best_from, best_to, has_move }
}

fn entry_age(payload: u64) -> u8 {
    ((payload >> 42) & 0x3F) as u8
}

struct Slot {
    signature: AtomicU64,
    payload: AtomicU64,
}

impl Slot {
    fn empty() -> Slot {
        Slot { signature: AtomicU64::new(0), payload: AtomicU64::new(0) }
    }
}

pub struct TranspositionTable {
    slots: Vec<Slot>,
    mask: usize,
    generation: std::sync::atomic::AtomicU8,
}

const BYTES_PER_SLOT: usize = 16;

impl TranspositionTable {
    pub fn new(size_mb: usize) -> Self {
        let requested = (size_mb * 1024 * 1024 / BYTES_PER_SLOT).max(1024);
        let count = requested.next_power_of_two();
        let mut slots = Vec::with_capacity(count);
        slots.resize_with(count, Slot::empty);
        TranspositionTable { slots, mask: count - 1, generation: std::sync::atomic::AtomicU8::new(0) }
    }

    pub fn clear(&self) {
        for s in &self.slots {
            s.signature.store(0, Ordering::Relaxed);
            s.payload.store(0, Ordering::Relaxed);
        }
    }

    /// Advance the age tag for a new root search, so stale entries lose
    /// replacement priority without being explicitly cleared.
    pub fn new_search(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    fn index(&self, signature: u64) -> usize {
        (signature as usize) & self.mask
    }

    /// Store an entry, verified self-consistent for lock-free readers: the
    /// signature word written is `signature ^ payload`, so any reader that
    /// recomputes `stored_signature ^ stored_payload` and checks it against
    /// the plain key can detect a torn concurrent write and discard the
    /// entry rather than act on corrupted fields.
    pub fn store(&self, signature: u64, score: i32, bound: Bound, depth: u8, best_from: u8, best_to: u8, has_move: bool) {
        let idx = self.index(signature);
        let slot = &self.slots[idx];
        let age = self.generation.load(Ordering::Relaxed);

        let existing_payload = slot.payload.load(Ordering::Relaxed);
        let existing_signature = slot.signature.load(Ordering::Relaxed);
        let verified = (existing_signature ^ existing_payload) == signature;
        if verified {
            let existing = unpack(existing_payload);
            let existing_age = entry_age(existing_payload);
            if existing_age == age && existing.depth > depth && bound != Bound::Exact {
                return; // depth-preferred replacement: keep the deeper entry
            }
            let keep_best = !has_move && existing.has_move;
            let (bf, bt, hm) = if keep_best {
                (existing.best_from, existing.best_to, true)
            } else {
                (best_from, best_to, has_move)
            };
            let payload = pack(score, depth, bound, age, bf, bt, hm);
            slot.payload.store(payload, Ordering::Relaxed);
            slot.signature.store(signature ^ payload, Ordering::Relaxed);
            return;
        }

        let payload = pack(score, depth, bound, age, best_from, best_to, has_move);
        slot.payload.store(payload, Ordering::Relaxed);
        slot.signature.store(signature ^ payload, Ordering::Relaxed);
    }

    /// Look up `signature`. Returns `None` on a miss or a failed consistency
    /// check (treated identically, per §7's "hash inconsistency ... silently
    /// treated as a miss").
    pub fn probe(&self, signature: u64) -> Option<ProbeResult> {
        let idx = self.index(signature);
        let slot = &self.slots[idx];
        let stored_signature = slot.signature.load(Ordering::Relaxed);
        let payload = slot.payload.load(Ordering::Relaxed);
        if (stored_signature ^ payload) != signature {
            return None;
        }
        Some(unpack(payload))
    }
}

/// Adjust a mate score found at `ply` plies from the current root into a
/// ply-independent "mate distance from here" representation for storage,
/// and back again on retrieval. Grounded in the teacher's `score_to_tt`/
/// `score_from_tt` pattern (C7 store/probe contract).
pub const MATE_SCORE: i32 = 30000;
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1024;

pub fn score_to_tt(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

pub fn score_from_tt(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}
