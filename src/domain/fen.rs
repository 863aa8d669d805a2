//! Forsyth–Edwards Notation encode/decode.
//!
//! FEN is the only interchange format with the move oracle and the tutorial
//! catalog, so decoding is strict: all six fields, standard castling letters
//! only, and a position shakmaty accepts without any relaxation (one king
//! per side, side not to move out of check, consistent en passant).

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode};

use super::board::Board;
use crate::error::{ChessError, ChessResult};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn encode(board: &Board) -> String {
    Fen::from_position(board.position(), EnPassantMode::Always).to_string()
}

pub fn decode(fen: &str) -> ChessResult<Board> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(invalid(format!("expected 6 fields, found {}", fields.len())));
    }
    check_castling(fields[2])?;
    fields[4]
        .parse::<u32>()
        .map_err(|_| invalid(format!("bad half-move clock '{}'", fields[4])))?;
    fields[5]
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| invalid(format!("bad full-move number '{}'", fields[5])))?;

    let parsed: Fen = fields
        .join(" ")
        .parse()
        .map_err(|e| invalid(format!("{e}")))?;
    let position: Chess = parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{e}")))?;
    Ok(Board::from_position(position))
}

/// `-` or a subset of `KQkq` without repeats
fn check_castling(text: &str) -> ChessResult<()> {
    if text == "-" {
        return Ok(());
    }
    let mut seen = String::new();
    for c in text.chars() {
        if !"KQkq".contains(c) {
            return Err(invalid(format!("bad castling field '{text}'")));
        }
        if seen.contains(c) {
            return Err(invalid(format!("repeated castling flag '{c}'")));
        }
        seen.push(c);
    }
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ChessError {
    ChessError::InvalidPosition(msg.into())
}
