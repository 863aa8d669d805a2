//! Game session model - the state machine over one game.
//!
//! A session owns the history (and through it the current board), the
//! repetition side table, and the oracle turn bookkeeping. Every mutating
//! call either succeeds completely or leaves all three untouched.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::domain::{
    Board, GameStatus, History, Move, MoveRecord, PositionKey, Step, fen, movegen, notation,
};
use crate::error::{ChessError, ChessResult, OracleError};
use crate::models::oracle::{Difficulty, OracleCall, OracleRequest, SuggestedMove};

/// One game: current position, replayable history, and oracle turn state
#[derive(Clone, Debug)]
pub struct GameSession {
    history: History,
    /// Occurrences of each position along the line up to the last record
    repetitions: HashMap<PositionKey, u32>,
    pending_oracle: Option<u64>,
    next_ticket: u64,
}

impl GameSession {
    /// A fresh game from the standard starting position
    pub fn new() -> Self {
        Self::with_initial(Board::starting())
    }

    pub fn from_fen(text: &str) -> ChessResult<Self> {
        Ok(Self::with_initial(fen::decode(text)?))
    }

    pub fn with_initial(initial: Board) -> Self {
        let status = GameStatus::classify(&initial, 1);
        let mut repetitions = HashMap::new();
        repetitions.insert(initial.position_key(), 1);
        Self {
            history: History::new(initial, status),
            repetitions,
            pending_oracle: None,
            next_ticket: 0,
        }
    }

    /// Discard everything and start again from the standard position.
    ///
    /// Any pending oracle request is abandoned; its ticket stays retired.
    pub fn reset(&mut self) {
        let next_ticket = self.next_ticket;
        *self = Self::new();
        self.next_ticket = next_ticket;
        info!("new game");
    }

    /// The board at the history cursor
    pub fn board(&self) -> &Board {
        self.history.current()
    }

    pub fn status(&self) -> GameStatus {
        self.history.current_status()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    pub fn fen(&self) -> String {
        fen::encode(self.board())
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(self.board())
    }

    pub fn is_awaiting_oracle(&self) -> bool {
        self.pending_oracle.is_some()
    }

    /// Validate and apply a move for the side to move.
    ///
    /// Rejected while an oracle request is pending or once the position at
    /// the cursor is terminal. Applying from a rewound cursor discards the
    /// moves that followed it.
    pub fn apply_move(&mut self, candidate: &Move) -> ChessResult<MoveRecord> {
        self.ensure_human_turn()?;
        self.commit(candidate)
    }

    /// [`apply_move`](Self::apply_move) with SAN or coordinate input
    pub fn play_notation(&mut self, text: &str) -> ChessResult<MoveRecord> {
        self.ensure_human_turn()?;
        let candidate = notation::parse_move(self.board(), text)?;
        self.commit(&candidate)
    }

    /// Move the cursor; 0 is the initial position
    pub fn goto(&mut self, index: usize) -> ChessResult<&Board> {
        self.ensure_idle()?;
        self.history.go_to(index)
    }

    pub fn step_forward(&mut self) -> ChessResult<Step<'_>> {
        self.ensure_idle()?;
        Ok(self.history.step_forward())
    }

    pub fn step_backward(&mut self) -> ChessResult<Step<'_>> {
        self.ensure_idle()?;
        Ok(self.history.step_backward())
    }

    /// Mark the session as awaiting the oracle and build its request
    pub fn request_oracle(&mut self, difficulty: Difficulty) -> ChessResult<OracleCall> {
        self.ensure_human_turn()?;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending_oracle = Some(ticket);
        debug!(ticket, "oracle request issued");
        Ok(OracleCall {
            ticket,
            request: OracleRequest {
                fen: self.fen(),
                difficulty,
            },
        })
    }

    /// Accept the oracle's reply for `ticket`.
    ///
    /// Whatever the reply, the session stops awaiting. A failed or illegal
    /// reply becomes [`ChessError::OracleFailure`] and the board stays as
    /// it was when the request was issued.
    pub fn resolve_oracle(
        &mut self,
        ticket: u64,
        reply: Result<SuggestedMove, OracleError>,
    ) -> ChessResult<MoveRecord> {
        match self.pending_oracle {
            None => return Err(ChessError::NoPendingOracle),
            Some(pending) if pending != ticket => {
                return Err(ChessError::StaleOracleReply { ticket });
            }
            Some(_) => self.pending_oracle = None,
        }

        let suggestion = reply?;
        let candidate = suggestion.candidate(self.board())?;
        match self.commit(&candidate) {
            Err(ChessError::IllegalMove { notation, reason }) => {
                warn!(%notation, %reason, "oracle suggested an illegal move");
                Err(OracleError::IllegalSuggestion(notation).into())
            }
            other => other,
        }
    }

    /// Abandon a pending oracle request; returns whether one was pending
    pub fn cancel_oracle(&mut self) -> bool {
        let pending = self.pending_oracle.take();
        if let Some(ticket) = pending {
            debug!(ticket, "oracle request cancelled");
        }
        pending.is_some()
    }

    /// Occurrences of the cursor position along the current line
    pub fn repetition_count(&self) -> u32 {
        self.repetition_count_of(&self.board().position_key())
    }

    /// PGN movetext for the whole recorded line
    pub fn pgn(&self) -> String {
        self.history.pgn_movetext()
    }

    fn ensure_idle(&self) -> ChessResult<()> {
        if self.pending_oracle.is_some() {
            return Err(ChessError::AwaitingOracle);
        }
        Ok(())
    }

    fn ensure_human_turn(&self) -> ChessResult<()> {
        self.ensure_idle()?;
        let status = self.status();
        if status.is_terminal() {
            return Err(ChessError::GameOver { status });
        }
        Ok(())
    }

    fn commit(&mut self, candidate: &Move) -> ChessResult<MoveRecord> {
        let status = self.status();
        if status.is_terminal() {
            return Err(ChessError::GameOver { status });
        }

        let board = self.board();
        let mv = movegen::resolve(board, candidate)
            .ok_or_else(|| rejection(board, candidate))?;
        let san = notation::san(board, &mv)?;
        let next = board.apply(&mv)?;

        // occurrences on the line that survives the append
        let key = next.position_key();
        let occurrences = self.repetition_count_of(&key) + 1;
        let status = GameStatus::classify(&next, occurrences);

        let record = MoveRecord {
            mv,
            san,
            board: next,
            status,
        };

        for dropped in self.history.append(record.clone()) {
            self.forget(&dropped.board.position_key());
        }
        *self.repetitions.entry(key).or_insert(0) += 1;

        debug!(san = %record.san, fen = %fen::encode(&record.board), "move applied");
        if status.is_terminal() {
            info!(%status, pgn = %self.pgn(), "game over");
        }
        Ok(record)
    }

    /// Occurrences of `key` up to and including the cursor position
    fn repetition_count_of(&self, key: &PositionKey) -> u32 {
        let beyond = self.history.records()[self.history.cursor()..]
            .iter()
            .filter(|r| &r.board.position_key() == key)
            .count() as u32;
        self.repetitions
            .get(key)
            .copied()
            .unwrap_or(0)
            .saturating_sub(beyond)
    }

    fn forget(&mut self, key: &PositionKey) {
        if let Some(count) = self.repetitions.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.repetitions.remove(key);
            }
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Explain why `candidate` is not among the legal moves
fn rejection(board: &Board, candidate: &Move) -> ChessError {
    let same_path = movegen::legal_moves_from(board, candidate.from)
        .into_iter()
        .filter(|mv| mv.to == candidate.to)
        .collect::<Vec<_>>();
    let reason = match (same_path.first(), candidate.promotion) {
        (Some(mv), None) if mv.promotion.is_some() => "promotion piece required",
        (Some(mv), Some(_)) if mv.promotion.is_none() => "promotion not allowed here",
        (Some(_), Some(_)) => "cannot promote to that piece",
        _ if board.piece_at(candidate.from).is_none() => "no piece on the origin square",
        _ if board
            .piece_at(candidate.from)
            .is_some_and(|p| p.color != board.side_to_move()) =>
        {
            "not that side's turn"
        }
        _ => "not legal in this position",
    };
    ChessError::illegal(candidate.coordinate(), reason)
}
