//! End-to-end exercise of the xboard command loop (C11-C13 driven over
//! stdio), beyond the module's own inline unit tests: clock parsing, a
//! short full game, and undo/remove history correctness.

use garrison::protocol::xboard::run_with_io;
use std::io::Cursor;

fn run_lines(lines: &[&str]) -> String {
    let input = lines.join("\n") + "\n";
    let mut output = Vec::new();
    run_with_io(Cursor::new(input), &mut output);
    String::from_utf8(output).unwrap()
}

#[test]
fn a_short_forced_game_produces_a_move_reply_for_each_side_to_move_go() {
    let out = run_lines(&[
        "new",
        "force",
        "e2e4",
        "e7e5",
        "st 1",
        "go",
        "quit",
    ]);
    assert!(out.contains("move "), "expected at least one move reply, got: {out}");
}

#[test]
fn level_command_is_parsed_without_crashing_the_session() {
    // "level 40 5 0": 40 moves per session, 5-minute base, no increment.
    let out = run_lines(&["level 40 5 0", "st 1", "go", "quit"]);
    assert!(out.contains("move "));
}

#[test]
fn level_with_minutes_and_seconds_base_is_also_accepted() {
    let out = run_lines(&["level 0 5:30 12", "st 1", "go", "quit"]);
    assert!(out.contains("move "));
}

#[test]
fn undo_reverts_the_last_applied_move_before_a_search() {
    // Force e2e4 then immediately undo it; setboard should still read back
    // as the starting position since the session never commits past undo.
    let out = run_lines(&[
        "force",
        "e2e4",
        "undo",
        "setboard rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "quit",
    ]);
    assert!(!out.to_lowercase().contains("error"), "setboard after undo should still parse cleanly: {out}");
}

#[test]
fn remove_takes_back_a_full_move_pair() {
    let out = run_lines(&[
        "force",
        "e2e4",
        "e7e5",
        "remove",
        "e2e4",
        "quit",
    ]);
    assert!(!out.to_lowercase().contains("error"), "e2e4 should still be legal after remove: {out}");
}

#[test]
fn time_and_otim_are_accepted_without_disturbing_the_command_loop() {
    let out = run_lines(&["time 3000", "otim 3000", "ping 1", "quit"]);
    assert!(out.contains("pong 1"));
}

#[test]
fn protover_reports_a_feature_line() {
    let out = run_lines(&["protover 2", "quit"]);
    assert!(out.contains("feature"));
}

#[test]
fn post_mode_emits_depth_score_nodes_lines_before_the_move() {
    let out = run_lines(&["post", "st 1", "go", "quit"]);
    let move_pos = out.find("move ").expect("expected a move reply");
    assert!(move_pos > 0, "expected at least one post line ahead of the move reply");
}

#[test]
fn setboard_rejects_a_malformed_fen_with_an_error_reply() {
    let out = run_lines(&["setboard not-a-fen", "quit"]);
    assert!(out.to_lowercase().contains("error"));
}

#[test]
fn dot_command_reports_a_stat_line_without_advancing_the_game() {
    let out = run_lines(&[".", "quit"]);
    assert!(out.contains("Stat01"));
}
