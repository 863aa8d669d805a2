//! Chess rules engine with replayable history, an external move oracle,
//! and tutorial step-through.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod ui;

pub use error::{ChessError, ChessResult, OracleError};
