//! Move oracle model - the external opponent that suggests replies.
//!
//! The oracle is consulted with a FEN and a difficulty and answers with one
//! candidate move. Its answer is untrusted: [`GameSession::resolve_oracle`]
//! validates it exactly like human input before anything is applied.
//!
//! A round-trip is split in two so it can be abandoned:
//! - [`GameSession::request_oracle`] marks the session as awaiting and hands
//!   out a ticket with the request payload
//! - [`GameSession::resolve_oracle`] accepts the reply for that ticket only
//!
//! [`consult`] drives both halves against any [`MoveOracle`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{Board, Move, MoveRecord, PieceKind, Square, notation};
use crate::error::{ChessError, ChessResult, OracleError};
use crate::models::GameSession;

/// Path of the move endpoint below the service base URL
pub const MOVE_ENDPOINT: &str = "/api/chess/move";

/// Oracle playing strength, 1 (weakest) to 20
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 20;

    pub fn new(level: u8) -> Result<Self, String> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(format!(
                "difficulty must be between {} and {}, got {level}",
                Self::MIN,
                Self::MAX
            ))
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.0
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("difficulty must be a number, got '{s}'"))?;
        Self::new(level)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body POSTed to the move endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OracleRequest {
    pub fen: String,
    pub difficulty: Difficulty,
}

/// A request the session is waiting on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleCall {
    pub ticket: u64,
    pub request: OracleRequest,
}

/// The move as the service reports it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestedMove {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Lowercase piece letter (`q`, `r`, `b`, `n`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    /// Only consulted when `from`/`to` are missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
}

impl SuggestedMove {
    /// The candidate this suggestion names on `board`, not yet checked for
    /// legality when it came as squares.
    ///
    /// A reply carrying only `san` is read as notation against `board`.
    pub fn candidate(&self, board: &Board) -> Result<Move, OracleError> {
        match (self.from.as_deref(), self.to.as_deref(), self.san.as_deref()) {
            (Some(from), Some(to), _) => self.from_squares(from, to),
            (None, None, Some(san)) => match notation::parse_move(board, san) {
                Ok(mv) => Ok(mv),
                Err(ChessError::IllegalMove { notation, .. }) => {
                    Err(OracleError::IllegalSuggestion(notation))
                }
                Err(err) => Err(OracleError::Malformed(err.to_string())),
            },
            _ => Err(OracleError::Malformed(
                "move needs both 'from' and 'to', or 'san'".into(),
            )),
        }
    }

    fn from_squares(&self, from: &str, to: &str) -> Result<Move, OracleError> {
        let square = |text: &str| {
            text.trim()
                .to_ascii_lowercase()
                .parse::<Square>()
                .map_err(|e| OracleError::Malformed(format!("bad square '{text}': {e}")))
        };
        let from = square(from)?;
        let to = square(to)?;
        let promotion = match self.promotion.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => {
                let mut chars = text.chars();
                let kind = chars
                    .next()
                    .and_then(PieceKind::from_letter)
                    .filter(|_| chars.next().is_none())
                    .ok_or_else(|| OracleError::Malformed(format!("bad promotion '{text}'")))?;
                Some(kind)
            }
        };
        Ok(Move::new(from, to, promotion))
    }
}

/// Payload of the `move` field: a move, or a nested refusal such as
/// "No legal moves available"
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MoveField {
    // tried first: every field of a suggestion is optional
    Refused { error: String },
    Suggested(SuggestedMove),
}

/// Full response body of the move endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OracleResponse {
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub mv: Option<MoveField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OracleResponse {
    pub fn into_suggestion(self) -> Result<SuggestedMove, OracleError> {
        match (self.mv, self.error) {
            (Some(MoveField::Suggested(mv)), _) => Ok(mv),
            (Some(MoveField::Refused { error }), _) | (None, Some(error)) => {
                Err(OracleError::Service(error))
            }
            (None, None) => Err(OracleError::Malformed("response has no 'move' field".into())),
        }
    }

    pub fn from_json(body: &str) -> Result<SuggestedMove, OracleError> {
        serde_json::from_str::<OracleResponse>(body)
            .map_err(|e| OracleError::Malformed(e.to_string()))?
            .into_suggestion()
    }
}

/// Anything that can answer "what would you play here?"
pub trait MoveOracle {
    fn suggest(
        &self,
        request: &OracleRequest,
    ) -> impl Future<Output = Result<SuggestedMove, OracleError>> + Send;
}

/// Oracle reached over HTTP with a JSON body
#[derive(Clone, Debug)]
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOracle {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{MOVE_ENDPOINT}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl MoveOracle for HttpOracle {
    async fn suggest(&self, request: &OracleRequest) -> Result<SuggestedMove, OracleError> {
        debug!(endpoint = %self.endpoint, fen = %request.fen, "posting oracle request");
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // error replies carry a JSON body with a non-2xx status
        match OracleResponse::from_json(&body) {
            Err(OracleError::Malformed(_)) if !status.is_success() => {
                Err(OracleError::Transport(format!("HTTP {status}")))
            }
            other => other,
        }
    }
}

/// How a consultation ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OracleOutcome {
    Played(MoveRecord),
    Abandoned,
}

/// Ask `oracle` for a reply in the session's current position and apply it.
///
/// If `cancel` completes first the request is abandoned and the session is
/// left exactly as it was before the call.
pub async fn consult<O, C>(
    session: &mut GameSession,
    oracle: &O,
    difficulty: Difficulty,
    cancel: C,
) -> ChessResult<OracleOutcome>
where
    O: MoveOracle,
    C: Future<Output = ()>,
{
    let call = session.request_oracle(difficulty)?;
    info!(ticket = call.ticket, difficulty = %difficulty, "consulting move oracle");

    tokio::select! {
        reply = oracle.suggest(&call.request) => {
            if let Err(err) = &reply {
                warn!(ticket = call.ticket, error = %err, "oracle request failed");
            }
            session.resolve_oracle(call.ticket, reply).map(OracleOutcome::Played)
        }
        () = cancel => {
            session.cancel_oracle();
            info!(ticket = call.ticket, "oracle request abandoned");
            Ok(OracleOutcome::Abandoned)
        }
    }
}
