//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::Difficulty;
use crate::models::TutorialFilter;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

#[derive(Parser, Debug, Clone)]
#[command(name = "chess-tutor", version, about = "Play chess against a move oracle and step through tutorials")]
pub struct Config {
    /// Base URL of the move oracle and tutorial service
    #[arg(long, env = "CHESS_ORACLE_URL", default_value = DEFAULT_SERVICE_URL, global = true)]
    pub oracle_url: String,

    /// Oracle strength, 1 to 20
    #[arg(long, env = "CHESS_DIFFICULTY", default_value_t = Difficulty::default(), global = true)]
    pub difficulty: Difficulty,

    /// Log filter, e.g. `info` or `chess_tutor=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play against the oracle (the default)
    Play {
        /// Start from this position instead of the standard one
        #[arg(long)]
        fen: Option<String>,
    },
    /// List tutorials
    Tutorials {
        /// Read the catalog from a JSON file instead of the service
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long)]
        category: Option<String>,
        /// Difficulty label such as `beginner`
        #[arg(long = "difficulty-label")]
        difficulty_label: Option<String>,
    },
    /// Step through one tutorial
    Tutorial {
        id: u64,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print the JSON schemas of the oracle and catalog wire formats
    Schema,
}

impl Config {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Play { fen: None })
    }
}

impl Command {
    /// Catalog filter for `tutorials`; empty for anything else
    pub fn tutorial_filter(&self) -> TutorialFilter {
        match self {
            Command::Tutorials {
                category,
                difficulty_label,
                ..
            } => TutorialFilter {
                category: category.clone(),
                difficulty: difficulty_label.clone(),
            },
            _ => TutorialFilter::default(),
        }
    }
}
