//! Move notation: SAN output, SAN / coordinate input, PGN movetext tokens.

use shakmaty::Position;
use shakmaty::san::{San, SanError, SanPlus};
use shakmaty::uci::UciMove;

use super::board::Board;
use super::chess::Move;
use crate::error::{ChessError, ChessResult};

/// Standard Algebraic Notation for a legal move, with `+`/`#` suffix
pub fn san(board: &Board, mv: &Move) -> ChessResult<String> {
    let legal = board
        .find_legal(mv)
        .ok_or_else(|| ChessError::illegal(mv.coordinate(), "not legal in this position"))?;
    Ok(SanPlus::from_move(board.position().clone(), legal).to_string())
}

/// Parse a move typed by a person or stored in a tutorial.
///
/// Accepts coordinate form (`e2e4`, `e7e8q`) and SAN (`Nf3`, `exd5`,
/// `e8=Q+`, `O-O`, `0-0-0`), tolerating a dropped capture mark or `=`
/// (`ed5`, `e8Q`). The result is the generator's legal move.
pub fn parse_move(board: &Board, text: &str) -> ChessResult<Move> {
    let trimmed = text.trim();
    if let Some(candidate) = parse_coordinate(trimmed) {
        return board
            .find_legal(&candidate)
            .and_then(|m| Move::try_from(m).ok())
            .ok_or_else(|| ChessError::illegal(trimmed, "not legal in this position"));
    }

    let wanted = normalize(trimmed);
    if wanted.is_empty() {
        return Err(ChessError::InvalidNotation(text.to_string()));
    }

    let position = board.position();
    let legal = position.legal_moves();
    let unusable = || ChessError::InvalidNotation(text.to_string());
    let parsed = SanPlus::from_ascii(wanted.as_bytes());
    if let Ok(san) = &parsed {
        match san.san.find_move(&legal) {
            Ok(m) => return Move::try_from(*m).map_err(|_| unusable()),
            Err(SanError::AmbiguousSan) => {
                return Err(ChessError::illegal(trimmed, "ambiguous move"));
            }
            Err(SanError::IllegalSan) => {}
        }
    }

    let loose = |s: &str| s.replace(['x', '='], "");
    let relaxed: Vec<&shakmaty::Move> = legal
        .iter()
        .filter(|m| loose(&San::from_move(position, **m).to_string()) == loose(&wanted))
        .collect();
    match relaxed.as_slice() {
        [m] => Move::try_from(**m).map_err(|_| unusable()),
        [] if parsed.is_ok() => Err(ChessError::illegal(trimmed, "not legal in this position")),
        [] => Err(ChessError::InvalidNotation(text.to_string())),
        _ => Err(ChessError::illegal(trimmed, "ambiguous move")),
    }
}

/// `e2e4` / `e7e8q` style, without checking legality
pub fn parse_coordinate(text: &str) -> Option<Move> {
    match UciMove::from_ascii(text.as_bytes()).ok()? {
        UciMove::Normal {
            from,
            to,
            promotion,
        } => Some(Move::new(from.into(), to.into(), promotion.map(Into::into))),
        UciMove::Put { .. } | UciMove::Null => None,
    }
}

/// Split PGN-style movetext into move tokens.
///
/// Move numbers (`1.`, `12...`, `3.e4`), results, comments in braces and
/// NAG annotations are dropped.
pub fn movetext_tokens(movetext: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut in_comment = false;
    for raw in movetext.split_whitespace() {
        if in_comment {
            in_comment = !raw.contains('}');
            continue;
        }
        if raw.starts_with('{') {
            in_comment = !raw.contains('}');
            continue;
        }
        if raw.starts_with('$') || matches!(raw, "1-0" | "0-1" | "1/2-1/2" | "*" | "e.p.") {
            continue;
        }
        // "1.", "12...", or a number glued to its move as in "3.e4"
        let token = match raw.split_once('.') {
            Some((num, rest)) if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) => {
                rest.trim_start_matches('.')
            }
            _ => raw,
        };
        if token.is_empty() || token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        tokens.push(token.to_string());
    }
    tokens
}

/// Strip annotations and accept zeros for castling
fn normalize(text: &str) -> String {
    text.trim_end_matches(['+', '#', '!', '?'])
        .replace('0', "O")
        .replace("e.p.", "")
}
