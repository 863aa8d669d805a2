//! Game status classification.

use std::fmt;

use shakmaty::Position;

use super::board::Board;
use super::chess::PieceColor;

/// Half-moves without a pawn move or capture before the fifty-move draw
pub const FIFTY_MOVE_PLIES: u32 = 100;
/// Occurrences of one position that end the game
pub const REPETITION_LIMIT: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum GameStatus {
    #[default]
    InProgress,
    Check,
    Checkmate,
    Stalemate,
    DrawFiftyMove,
    DrawInsufficientMaterial,
    DrawRepetition,
}

impl GameStatus {
    /// Classify a position.
    ///
    /// `occurrences` is how many times this exact position (placement, side,
    /// rights, en passant) has been reached so far, itself included.
    pub fn classify(board: &Board, occurrences: u32) -> GameStatus {
        let position = board.position();
        let in_check = position.is_check();
        if position.legal_moves().is_empty() {
            return if in_check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if is_insufficient_material(board) {
            GameStatus::DrawInsufficientMaterial
        } else if board.halfmove_clock() >= FIFTY_MOVE_PLIES {
            GameStatus::DrawFiftyMove
        } else if occurrences >= REPETITION_LIMIT {
            GameStatus::DrawRepetition
        } else if in_check {
            GameStatus::Check
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress | GameStatus::Check)
    }

    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::DrawFiftyMove
                | GameStatus::DrawInsufficientMaterial
                | GameStatus::DrawRepetition
        )
    }

    /// The side that won, given who was to move in the classified position
    pub fn winner(self, side_to_move: PieceColor) -> Option<PieceColor> {
        (self == GameStatus::Checkmate).then(|| side_to_move.opponent())
    }

    /// PGN result token
    pub fn result_token(self, side_to_move: PieceColor) -> &'static str {
        match self.winner(side_to_move) {
            Some(PieceColor::White) => "1-0",
            Some(PieceColor::Black) => "0-1",
            None if self.is_draw() => "1/2-1/2",
            None => "*",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameStatus::InProgress => "in progress",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::DrawFiftyMove => "draw by fifty-move rule",
            GameStatus::DrawInsufficientMaterial => "draw by insufficient material",
            GameStatus::DrawRepetition => "draw by threefold repetition",
        };
        f.write_str(text)
    }
}

/// Neither side can force mate: bare kings, a single minor piece, or only
/// bishops that all stand on one square colour.
pub fn is_insufficient_material(board: &Board) -> bool {
    board.position().is_insufficient_material()
}
