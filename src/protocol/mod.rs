//! Host-facing protocol front end (excluded from the core engine's own
//! scope, built here only as thin glue so the engine can be driven end to
//! end over stdio, per SPEC_FULL.md §10.5).

pub mod xboard;
