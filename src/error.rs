//! Boundary error types. Internal invariant breaks never go through these —
//! they panic with context per the logic-error handling rule; these enums
//! are strictly for user-facing input (FEN text, protocol command lines).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    WrongFieldCount(usize),
    BadPiecePlacement(String),
    BadSideToMove(String),
    BadCastlingRights(String),
    BadEnPassant(String),
    BadHalfmoveClock(String),
    BadFullmoveNumber(String),
    RankTooShort { rank: u8 },
    RankTooLong { rank: u8 },
    MissingKing { white: bool },
    TooManyKings { white: bool },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::WrongFieldCount(n) => {
                write!(f, "FEN must have 6 space-separated fields, got {n}")
            }
            FenError::BadPiecePlacement(s) => write!(f, "bad piece placement field: {s}"),
            FenError::BadSideToMove(s) => write!(f, "bad side-to-move field: {s}"),
            FenError::BadCastlingRights(s) => write!(f, "bad castling rights field: {s}"),
            FenError::BadEnPassant(s) => write!(f, "bad en-passant field: {s}"),
            FenError::BadHalfmoveClock(s) => write!(f, "bad halfmove clock field: {s}"),
            FenError::BadFullmoveNumber(s) => write!(f, "bad fullmove number field: {s}"),
            FenError::RankTooShort { rank } => write!(f, "rank {rank} has fewer than 8 files"),
            FenError::RankTooLong { rank } => write!(f, "rank {rank} has more than 8 files"),
            FenError::MissingKing { white } => {
                write!(f, "missing {} king", if *white { "white" } else { "black" })
            }
            FenError::TooManyKings { white } => write!(
                f,
                "more than one {} king",
                if *white { "white" } else { "black" }
            ),
        }
    }
}

impl std::error::Error for FenError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownCommand(String),
    MalformedArguments { command: String, detail: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownCommand(s) => write!(f, "Error (unknown command): {s}"),
            ProtocolError::MalformedArguments { command, detail } => {
                write!(f, "Error ({command}): {detail}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Top-level error type for crate consumers that don't care which boundary
/// failed — the protocol loop reports both kinds of error the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Fen(FenError),
    Protocol(ProtocolError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Fen(e) => write!(f, "{e}"),
            EngineError::Protocol(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        EngineError::Fen(e)
    }
}

impl From<ProtocolError> for EngineError {
    fn from(e: ProtocolError) -> Self {
        EngineError::Protocol(e)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
