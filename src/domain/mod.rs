//! Pure chess rules: no I/O, no async, no logging.

pub mod board;
pub mod chess;
pub mod fen;
pub mod history;
pub mod movegen;
pub mod notation;
pub mod status;

pub use board::{Board, PositionKey};
pub use chess::{CastleSide, CastlingRights, Move, MoveKind, Piece, PieceColor, PieceKind, Square};
pub use history::{History, MoveRecord, Step};
pub use status::GameStatus;
