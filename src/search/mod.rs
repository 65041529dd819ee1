//! Search and evaluation (C5-C13): static exchange evaluation, pawn-
//! structure caching, positional evaluation, interior-node recognizers, the
//! transposition table, move-ordering heuristics, the en-prise/trapped side
//! table, quiescence search, the main alpha-beta searcher, the iterative
//! deepening driver, and the time controller.

pub mod alpha_beta;
pub mod context;
pub mod enprise;
pub mod eval;
pub mod iterative;
pub mod ordering;
pub mod pawn_hash;
pub mod quiescence;
pub mod recognizers;
pub mod see;
pub mod time;
pub mod tt;
