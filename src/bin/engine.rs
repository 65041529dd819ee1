//! `garrison`: an xboard/WinBoard-protocol chess engine binary. Thin glue
//! over the `garrison` library's [`protocol::xboard`] command loop — the
//! command-line surface itself sits outside the core engine's scope
//! (spec.md's Non-goals), built here only so the search can be exercised
//! end to end over stdio.

#[cfg(feature = "cli")]
fn main() {
    garrison::logger::init_logging("logs/garrison.log", "garrison=info");
    tracing::info!("garrison starting");
    garrison::protocol::xboard::run();
}

#[cfg(not(feature = "cli"))]
fn main() {
    garrison::protocol::xboard::run();
}
