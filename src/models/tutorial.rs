//! Tutorial catalog and move-by-move replay.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Board, GameStatus, History, MoveRecord, Step, fen, notation};
use crate::error::{ChessError, ChessResult};
use crate::models::GameSession;

/// Path of the catalog listing below the service base URL
pub const CATALOG_ENDPOINT: &str = "/api/tutorials/";

/// One lesson: a starting position and the moves that illustrate it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tutorial {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Free-form label such as `beginner` or `advanced`
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub category: String,
    /// FEN, or `start` / empty for the standard position
    #[serde(default)]
    pub position_fen: String,
    /// Space-separated SAN or coordinate moves; PGN movetext is accepted
    #[serde(default)]
    pub moves: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Tutorial {
    pub fn initial_board(&self) -> ChessResult<Board> {
        match self.position_fen.trim() {
            "" | "start" | "startpos" => Ok(Board::starting()),
            text => fen::decode(text),
        }
    }

    pub fn move_tokens(&self) -> Vec<String> {
        notation::movetext_tokens(&self.moves)
    }

    pub fn replay(&self) -> ChessResult<TutorialReplay> {
        TutorialReplay::new(self.initial_board()?, &self.move_tokens())
    }
}

/// Criteria for [`TutorialCatalog::filter`]; `None` matches anything
#[derive(Clone, Debug, Default)]
pub struct TutorialFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

impl TutorialFilter {
    pub fn matches(&self, tutorial: &Tutorial) -> bool {
        let field_matches = |wanted: &Option<String>, actual: &str| {
            wanted
                .as_deref()
                .is_none_or(|w| w.trim().eq_ignore_ascii_case(actual.trim()))
        };
        field_matches(&self.category, &tutorial.category)
            && field_matches(&self.difficulty, &tutorial.difficulty)
    }
}

/// The catalog body: a list, or an object carrying `error`
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogBody {
    Tutorials(Vec<Tutorial>),
    Failure { error: String },
}

/// Read-only list of tutorials, in catalog order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TutorialCatalog {
    tutorials: Vec<Tutorial>,
}

impl TutorialCatalog {
    pub fn new(tutorials: Vec<Tutorial>) -> Self {
        Self { tutorials }
    }

    pub fn from_json(body: &str) -> ChessResult<Self> {
        match serde_json::from_str::<CatalogBody>(body) {
            Ok(CatalogBody::Tutorials(tutorials)) => Ok(Self::new(tutorials)),
            Ok(CatalogBody::Failure { error }) => Err(ChessError::Catalog(error)),
            Err(e) => Err(ChessError::Catalog(format!("malformed catalog: {e}"))),
        }
    }

    pub fn load_file(path: impl AsRef<Path>) -> ChessResult<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)
            .map_err(|e| ChessError::Catalog(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_json(&body)?;
        debug!(path = %path.display(), count = catalog.len(), "loaded tutorial catalog");
        Ok(catalog)
    }

    /// Fetch the catalog once from the tutorial service
    pub async fn fetch(client: &reqwest::Client, base_url: &str) -> ChessResult<Self> {
        let url = format!("{}{CATALOG_ENDPOINT}", base_url.trim_end_matches('/'));
        let fetch_error = |e: reqwest::Error| ChessError::Catalog(format!("{url}: {e}"));

        let body = client
            .get(&url)
            .send()
            .await
            .map_err(fetch_error)?
            .text()
            .await
            .map_err(fetch_error)?;
        let catalog = Self::from_json(&body)?;
        info!(%url, count = catalog.len(), "fetched tutorial catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.tutorials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tutorials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tutorial> {
        self.tutorials.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Tutorial> {
        self.tutorials.iter().find(|t| t.id == id)
    }

    pub fn filter<'a>(&'a self, filter: &'a TutorialFilter) -> impl Iterator<Item = &'a Tutorial> {
        self.tutorials.iter().filter(move |t| filter.matches(t))
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for t in &self.tutorials {
            if !t.category.is_empty() && !seen.contains(&t.category.as_str()) {
                seen.push(&t.category);
            }
        }
        seen
    }
}

/// Step-through of a tutorial's moves, independent of any live game.
///
/// Every move is validated once when the replay is built; stepping only
/// moves a cursor over the stored boards.
#[derive(Clone, Debug)]
pub struct TutorialReplay {
    history: History,
}

impl TutorialReplay {
    /// Play `tokens` from `initial`. Fails on the first token that is not a
    /// legal move, naming its 1-based index.
    pub fn new(initial: Board, tokens: &[String]) -> ChessResult<Self> {
        let mut session = GameSession::with_initial(initial);
        for (i, token) in tokens.iter().enumerate() {
            session
                .play_notation(token)
                .map_err(|source| ChessError::TutorialMove {
                    index: i + 1,
                    token: token.clone(),
                    source: Box::new(source),
                })?;
        }
        let mut history = session.into_history();
        history.go_to_start();
        Ok(Self { history })
    }

    pub fn board(&self) -> &Board {
        self.history.current()
    }

    pub fn status(&self) -> GameStatus {
        self.history.current_status()
    }

    pub fn fen(&self) -> String {
        fen::encode(self.board())
    }

    /// Moves played so far
    pub fn cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The move that produced the current board
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last_played()
    }

    pub fn records(&self) -> &[MoveRecord] {
        self.history.records()
    }

    pub fn goto(&mut self, index: usize) -> ChessResult<&Board> {
        self.history.go_to(index)
    }

    pub fn next(&mut self) -> Step<'_> {
        self.history.step_forward()
    }

    pub fn prev(&mut self) -> Step<'_> {
        self.history.step_backward()
    }

    pub fn rewind(&mut self) {
        self.history.go_to_start();
    }
}
