//! Error types for the chess core
//!
//! Every fallible operation in the domain and models layers returns one of
//! these. None of them leave a [`crate::models::GameSession`] half-updated.

use thiserror::Error;

use crate::domain::GameStatus;

/// Errors that can occur in the chess core
#[derive(Error, Debug)]
pub enum ChessError {
    /// Candidate move failed validation; the board is unchanged
    #[error("Illegal move {notation}: {reason}")]
    IllegalMove { notation: String, reason: String },

    /// A move was attempted after the game reached a terminal status
    #[error("Game is over ({status})")]
    GameOver { status: GameStatus },

    /// The move oracle could not supply a usable reply
    #[error("Move oracle failed: {0}")]
    OracleFailure(#[from] OracleError),

    /// Malformed FEN
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// History index outside `[0, len]`
    #[error("History index {index} out of range (0..={len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Human input arrived while an oracle request is still pending
    #[error("Waiting for the move oracle to reply")]
    AwaitingOracle,

    /// An oracle reply was delivered but no request is pending
    #[error("No oracle request is pending")]
    NoPendingOracle,

    /// An oracle reply for an abandoned request
    #[error("Oracle reply for abandoned request #{ticket}")]
    StaleOracleReply { ticket: u64 },

    /// Text that is neither SAN nor coordinate notation
    #[error("Unrecognised move notation '{0}'")]
    InvalidNotation(String),

    /// A recorded tutorial move that does not apply to its position
    #[error("Tutorial move {index} ('{token}') cannot be played: {source}")]
    TutorialMove {
        index: usize,
        token: String,
        #[source]
        source: Box<ChessError>,
    },

    /// The tutorial catalog could not be read or decoded
    #[error("Tutorial catalog unavailable: {0}")]
    Catalog(String),
}

/// Ways the move oracle round-trip can fail
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with an explicit `error` field
    #[error("service reported: {0}")]
    Service(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("suggested move {0} is not legal in the current position")]
    IllegalSuggestion(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OracleError::Malformed(err.to_string())
        } else {
            OracleError::Transport(err.to_string())
        }
    }
}

impl ChessError {
    pub(crate) fn illegal(notation: impl Into<String>, reason: impl Into<String>) -> Self {
        ChessError::IllegalMove {
            notation: notation.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for chess core operations
pub type ChessResult<T> = Result<T, ChessError>;
