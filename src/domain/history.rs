//! Linear move history with random-access replay.
//!
//! Every record keeps the board it produced, so moving the cursor is a
//! snapshot lookup and never replays or re-validates moves.

use super::board::Board;
use super::chess::{Move, PieceColor};
use super::status::GameStatus;
use crate::error::{ChessError, ChessResult};

/// One applied move and the position it produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub san: String,
    pub board: Board,
    pub status: GameStatus,
}

/// Outcome of a single step through the history
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a> {
    Moved(&'a Board),
    BoundaryReached,
}

#[derive(Clone, Debug)]
pub struct History {
    initial: Board,
    initial_status: GameStatus,
    records: Vec<MoveRecord>,
    /// 0 is the initial position, N is after the Nth record
    cursor: usize,
}

impl History {
    pub fn new(initial: Board, initial_status: GameStatus) -> Self {
        Self {
            initial,
            initial_status,
            records: Vec::new(),
            cursor: 0,
        }
    }

    pub fn initial(&self) -> &Board {
        &self.initial
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor == self.records.len()
    }

    /// Board after the first `index` moves
    pub fn board_at(&self, index: usize) -> ChessResult<&Board> {
        match index {
            0 => Ok(&self.initial),
            i if i <= self.records.len() => Ok(&self.records[i - 1].board),
            _ => Err(self.out_of_range(index)),
        }
    }

    pub fn status_at(&self, index: usize) -> ChessResult<GameStatus> {
        match index {
            0 => Ok(self.initial_status),
            i if i <= self.records.len() => Ok(self.records[i - 1].status),
            _ => Err(self.out_of_range(index)),
        }
    }

    pub fn current(&self) -> &Board {
        match self.cursor {
            0 => &self.initial,
            i => &self.records[i - 1].board,
        }
    }

    pub fn current_status(&self) -> GameStatus {
        match self.cursor {
            0 => self.initial_status,
            i => self.records[i - 1].status,
        }
    }

    /// Record at the cursor, if the cursor is past the initial position
    pub fn last_played(&self) -> Option<&MoveRecord> {
        self.cursor.checked_sub(1).map(|i| &self.records[i])
    }

    /// Append after the cursor and move onto the new record.
    ///
    /// Records beyond the cursor are dropped and handed back so the caller
    /// can unwind anything it derived from them.
    pub fn append(&mut self, record: MoveRecord) -> Vec<MoveRecord> {
        let discarded = self.records.split_off(self.cursor);
        self.records.push(record);
        self.cursor = self.records.len();
        discarded
    }

    pub fn go_to(&mut self, index: usize) -> ChessResult<&Board> {
        if index > self.records.len() {
            return Err(self.out_of_range(index));
        }
        self.cursor = index;
        Ok(self.current())
    }

    pub fn step_forward(&mut self) -> Step<'_> {
        if self.is_at_end() {
            return Step::BoundaryReached;
        }
        self.cursor += 1;
        Step::Moved(self.current())
    }

    pub fn step_backward(&mut self) -> Step<'_> {
        if self.cursor == 0 {
            return Step::BoundaryReached;
        }
        self.cursor -= 1;
        Step::Moved(self.current())
    }

    pub fn go_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn go_to_end(&mut self) {
        self.cursor = self.records.len();
    }

    pub fn san_moves(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.san.as_str()).collect()
    }

    /// `(move number, is black)` for the record at `index` (0-based)
    pub fn move_number(&self, index: usize) -> (u32, bool) {
        let black_first = self.initial.side_to_move() == PieceColor::Black;
        let ply = index as u32 + u32::from(black_first);
        (self.initial.fullmove_number() + ply / 2, ply % 2 == 1)
    }

    /// PGN movetext of every record, closed by the result token of the
    /// final position.
    pub fn pgn_movetext(&self) -> String {
        let mut parts = Vec::with_capacity(self.records.len() + self.records.len() / 2 + 1);
        for (i, record) in self.records.iter().enumerate() {
            let (number, is_black) = self.move_number(i);
            if !is_black {
                parts.push(format!("{number}."));
            } else if i == 0 {
                parts.push(format!("{number}..."));
            }
            parts.push(record.san.clone());
        }
        let (last_board, last_status) = match self.records.last() {
            Some(r) => (&r.board, r.status),
            None => (&self.initial, self.initial_status),
        };
        parts.push(last_status.result_token(last_board.side_to_move()).to_string());
        parts.join(" ")
    }

    fn out_of_range(&self, index: usize) -> ChessError {
        ChessError::IndexOutOfRange {
            index,
            len: self.records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fen, notation};

    fn record(board: &Board, text: &str) -> MoveRecord {
        let mv = notation::parse_move(board, text).unwrap();
        let san = notation::san(board, &mv).unwrap();
        let next = board.apply(&mv).unwrap();
        let status = GameStatus::classify(&next, 1);
        MoveRecord { mv, san, board: next, status }
    }

    fn played(moves: &[&str]) -> History {
        let mut history = History::new(Board::starting(), GameStatus::InProgress);
        for m in moves {
            let rec = record(history.current(), m);
            history.append(rec);
        }
        history
    }

    #[test]
    fn test_new_history() {
        let history = played(&[]);
        assert!(history.is_empty());
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.current(), &Board::starting());
        assert!(history.is_at_end());
    }

    #[test]
    fn test_goto_matches_sequential_application() {
        let moves = ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"];
        let mut history = played(&moves);

        let mut expected = Board::starting();
        for k in 0..=moves.len() {
            assert_eq!(history.go_to(k).unwrap(), &expected);
            if k < moves.len() {
                let mv = notation::parse_move(&expected, moves[k]).unwrap();
                expected = expected.apply(&mv).unwrap();
            }
        }
    }

    #[test]
    fn test_goto_out_of_range() {
        let mut history = played(&["e4"]);
        assert!(matches!(
            history.go_to(2),
            Err(ChessError::IndexOutOfRange { index: 2, len: 1 })
        ));
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn test_step_boundaries() {
        let mut history = played(&["e4", "e5"]);
        assert_eq!(history.step_forward(), Step::BoundaryReached);
        assert!(matches!(history.step_backward(), Step::Moved(_)));
        assert!(matches!(history.step_backward(), Step::Moved(_)));
        assert_eq!(history.step_backward(), Step::BoundaryReached);
        assert_eq!(history.cursor(), 0);
        assert!(matches!(history.step_forward(), Step::Moved(b) if b.side_to_move() == PieceColor::Black));
    }

    #[test]
    fn test_append_from_rewound_cursor_discards_redo() {
        let mut history = played(&["e4", "e5", "Nf3"]);
        history.go_to(1).unwrap();
        let rec = record(history.current(), "c5");
        let discarded = history.append(rec);

        assert_eq!(discarded.iter().map(|r| r.san.as_str()).collect::<Vec<_>>(), ["e5", "Nf3"]);
        assert_eq!(history.san_moves(), ["e4", "c5"]);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn test_pgn_movetext() {
        let history = played(&["f3", "e5", "g4", "Qh4"]);
        assert_eq!(history.pgn_movetext(), "1. f3 e5 2. g4 Qh4# 0-1");

        let start = fen::decode("4k3/8/8/8/8/8/4P3/4K3 b - - 0 7").unwrap();
        let mut history = History::new(start, GameStatus::InProgress);
        let rec = record(history.current(), "Kd7");
        history.append(rec);
        let rec = record(history.current(), "e4");
        history.append(rec);
        assert_eq!(history.pgn_movetext(), "7... Kd7 8. e4 *");
    }
}
