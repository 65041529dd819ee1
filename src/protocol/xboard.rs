//! xboard/WinBoard command loop (§6, original_source/command.c's command
//! table): reads line-oriented commands from a host, drives an [`Engine`]
//! across them, and writes back the wire-format replies (`move ...`,
//! `pong N`, `Error (...)`) the protocol specifies.
//!
//! Grounded in the teacher's `bin/cli.rs` stdin read-loop shape (read a
//! line, split into words, `match` on the first word) generalized from its
//! UCI verb set onto xboard's line-oriented one.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::board::fen;
use crate::board::Position;
use crate::engine::{Engine, EngineOptions};
use crate::error::ProtocolError;
use crate::moves::execute;
use crate::moves::movegen::{self, GenMode};
use crate::moves::types::{Move, Undo};
use crate::search::time::TimeControl;

/// `level MOVES TIME INC` / `st` / `sd` / `time` / `otim` state accumulated
/// between `go`s, mirroring the source's per-session clock bookkeeping.
struct ClockState {
    moves_per_session: u32,
    base: Duration,
    increment: Duration,
    fixed_seconds: Option<u32>,
    max_depth_plies: i32,
    my_time: Duration,
    opponent_time: Duration,
}

impl Default for ClockState {
    fn default() -> Self {
        ClockState {
            moves_per_session: 40,
            base: Duration::from_secs(300),
            increment: Duration::ZERO,
            fixed_seconds: None,
            max_depth_plies: 64,
            my_time: Duration::from_secs(300),
            opponent_time: Duration::from_secs(300),
        }
    }
}

impl ClockState {
    fn to_time_control(&self) -> TimeControl {
        if let Some(secs) = self.fixed_seconds {
            return TimeControl { fixed_time_per_move: Some(Duration::from_secs(secs as u64)), ..Default::default() };
        }
        TimeControl {
            remaining: self.my_time,
            increment: self.increment,
            moves_to_go: Some(self.moves_per_session),
            fixed_time_per_move: None,
            pondering: false,
        }
    }
}

struct Session {
    engine: Engine,
    pos: Position,
    history: Vec<Undo>,
    played: Vec<Move>,
    force_mode: bool,
    post: bool,
    clock: ClockState,
}

impl Session {
    fn new() -> Self {
        Session {
            engine: Engine::new(EngineOptions::default()),
            pos: fen::from_fen(fen::STARTPOS_FEN).expect("startpos FEN always parses"),
            history: Vec::new(),
            played: Vec::new(),
            force_mode: false,
            post: false,
            clock: ClockState::default(),
        }
    }

    fn new_game(&mut self) {
        self.engine.new_game();
        self.pos = fen::from_fen(fen::STARTPOS_FEN).expect("startpos FEN always parses");
        self.history.clear();
        self.played.clear();
        self.force_mode = false;
        self.clock = ClockState::default();
    }
}

fn parse_coordinate_move(pos: &Position, text: &str) -> Option<Move> {
    let bytes = text.as_bytes();
    if bytes.len() < 4 {
        return None;
    }
    let from = crate::square::Square::try_from_algebraic(&text[0..2])?;
    let to = crate::square::Square::try_from_algebraic(&text[2..4])?;
    let promo = text.get(4..5).and_then(|c| match c {
        "q" => Some(crate::board::piece::PieceType::Queen),
        "r" => Some(crate::board::piece::PieceType::Rook),
        "b" => Some(crate::board::piece::PieceType::Bishop),
        "n" => Some(crate::board::piece::PieceType::Knight),
        _ => None,
    });

    movegen::generate(pos, GenMode::AllMoves)
        .into_iter()
        .find(|mv| mv.from == from && mv.to == to && mv.promoted.kind() == promo)
}

/// Run the command loop against `input`/`output` until `quit` or EOF. Split
/// out from `run()` so tests can drive it with in-memory buffers instead of
/// real stdio.
pub fn run_with_io(input: impl BufRead, mut output: impl Write) {
    let mut session = Session::new();

    for line in input.lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = words[0];

        if handle_command(&mut session, command, &words[1..], &mut output) {
            break;
        }
    }
}

pub fn run() {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with_io(stdin.lock(), stdout.lock());
}

/// Returns `true` if the loop should terminate (the `quit` command).
fn handle_command(session: &mut Session, command: &str, args: &[&str], out: &mut impl Write) -> bool {
    match command {
        "quit" => return true,
        "new" => session.new_game(),
        "force" => session.force_mode = true,
        "white" | "black" | "playother" => {}
        "random" | "variant" | "computer" | "rating" | "name" | "accepted" | "script" => {}
        "protover" => {
            let _ = writeln!(out, "feature myname=\"garrison\" setboard=1 analyze=0 colors=0 sigint=0 done=1");
        }
        "easy" => session.clock.fixed_seconds = session.clock.fixed_seconds.or(None),
        "hard" => {}
        "post" => session.post = true,
        "nopost" => session.post = false,
        "level" => apply_level(session, args),
        "st" => {
            if let Some(secs) = args.first().and_then(|s| s.parse::<u32>().ok()) {
                session.clock.fixed_seconds = Some(secs);
            }
        }
        "sd" => {
            if let Some(depth) = args.first().and_then(|s| s.parse::<i32>().ok()) {
                session.clock.max_depth_plies = depth;
            }
        }
        "sn" => {}
        "time" => {
            if let Some(cs) = args.first().and_then(|s| s.parse::<u64>().ok()) {
                session.clock.my_time = Duration::from_millis(cs * 10);
            }
        }
        "otim" => {
            if let Some(cs) = args.first().and_then(|s| s.parse::<u64>().ok()) {
                session.clock.opponent_time = Duration::from_millis(cs * 10);
            }
        }
        "setboard" => {
            let text = args.join(" ");
            match fen::from_fen(&text) {
                Ok(p) => {
                    session.pos = p;
                    session.history.clear();
                    session.played.clear();
                }
                Err(e) => {
                    let err = ProtocolError::MalformedArguments { command: "setboard".into(), detail: e.to_string() };
                    let _ = writeln!(out, "{err}");
                }
            }
        }
        "ping" => {
            if let Some(n) = args.first() {
                let _ = writeln!(out, "pong {n}");
            }
        }
        "?" => session.engine.request_stop(),
        "." => {
            let score = session.engine.evaluate(&mut session.pos);
            let _ = writeln!(out, "Stat01: score {score}");
        }
        "undo" => undo_one(session),
        "remove" => {
            undo_one(session);
            undo_one(session);
        }
        "go" => {
            session.force_mode = false;
            do_search(session, out);
        }
        _ => {
            if let Some(mv) = parse_coordinate_move(&session.pos, command) {
                apply_move(session, mv);
                if !session.force_mode {
                    do_search(session, out);
                }
            } else {
                let err = ProtocolError::UnknownCommand(command.to_string());
                let _ = writeln!(out, "{err}");
            }
        }
    }
    false
}

fn apply_level(session: &mut Session, args: &[&str]) {
    if args.len() < 3 {
        return;
    }
    if let Ok(moves) = args[0].parse::<u32>() {
        session.clock.moves_per_session = if moves == 0 { 1 } else { moves };
    }
    if let Some((mins, secs)) = args[1].split_once(':') {
        if let (Ok(m), Ok(s)) = (mins.parse::<u64>(), secs.parse::<u64>()) {
            session.clock.base = Duration::from_secs(m * 60 + s);
        }
    } else if let Ok(mins) = args[1].parse::<u64>() {
        session.clock.base = Duration::from_secs(mins * 60);
    }
    if let Ok(inc) = args[2].parse::<u64>() {
        session.clock.increment = Duration::from_secs(inc);
    }
    session.clock.my_time = session.clock.base;
    session.clock.fixed_seconds = None;
}

fn apply_move(session: &mut Session, mv: Move) {
    if let Some(undo) = execute::make(&mut session.pos, mv) {
        session.history.push(undo);
        session.played.push(mv);
    }
}

fn undo_one(session: &mut Session) {
    if let Some(undo) = session.history.pop() {
        execute::unmake(&mut session.pos, undo);
        session.played.pop();
    }
}

fn do_search(session: &mut Session, out: &mut impl Write) {
    let tc = session.clock.to_time_control();
    let depth = session.clock.max_depth_plies;
    let post = session.post;
    let result = session.engine.search_best_move(&mut session.pos, tc, depth, |report| {
        if post {
            let _ = writeln!(
                out,
                "{} {} {} {}",
                report.depth_plies,
                report.score,
                0,
                report.nodes
            );
        }
    });

    match result.best_move {
        Some(mv) => {
            apply_move(session, mv);
            let _ = writeln!(out, "move {}", mv.to_coordinate());
        }
        None => {
            let _ = writeln!(out, "resign");
        }
    }
}
