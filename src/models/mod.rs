//! Application models built on the pure domain layer.

pub mod game;
pub mod oracle;
pub mod tutorial;

pub use game::GameSession;
pub use oracle::{
    Difficulty, HttpOracle, MoveOracle, OracleCall, OracleOutcome, OracleRequest, OracleResponse,
    SuggestedMove, consult,
};
pub use tutorial::{Tutorial, TutorialCatalog, TutorialFilter, TutorialReplay};
