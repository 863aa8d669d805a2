//! Terminal front end: reads commands line by line and drives the models.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use crate::config::{Command, Config};
use crate::domain::Step;
use crate::error::ChessError;
use crate::models::{
    GameSession, HttpOracle, OracleOutcome, OracleRequest, OracleResponse, Tutorial,
    TutorialCatalog, TutorialFilter, TutorialReplay, consult,
};
use crate::ui::display;

const PLAY_HELP: &str = "\
Enter a move in SAN (Nf3, exd5, O-O, e8=Q) or coordinates (e2e4, e7e8q).
Commands: back, forward, goto N, moves, board, fen, pgn, retry, new, help, quit";

const TUTORIAL_HELP: &str = "Commands: next, prev, goto N, start, end, moves, fen, help, quit";

/// A line typed during play
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayInput {
    Move(String),
    Back,
    Forward,
    Goto(usize),
    Moves,
    Board,
    Fen,
    Pgn,
    Retry,
    New,
    Help,
    Quit,
}

impl PlayInput {
    pub fn parse(line: &str) -> Option<PlayInput> {
        let mut words = line.split_whitespace();
        let first = words.next()?;
        let input = match first.to_ascii_lowercase().as_str() {
            "back" | "b" => PlayInput::Back,
            "forward" | "f" => PlayInput::Forward,
            "goto" | "g" => PlayInput::Goto(words.next()?.parse().ok()?),
            "moves" => PlayInput::Moves,
            "board" => PlayInput::Board,
            "fen" => PlayInput::Fen,
            "pgn" => PlayInput::Pgn,
            "retry" => PlayInput::Retry,
            "new" => PlayInput::New,
            "help" | "?" => PlayInput::Help,
            "quit" | "exit" | "q" => PlayInput::Quit,
            _ => PlayInput::Move(first.to_string()),
        };
        Some(input)
    }
}

/// A line typed while stepping through a tutorial
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TutorialInput {
    Next,
    Prev,
    Goto(usize),
    Start,
    End,
    Moves,
    Fen,
    Help,
    Quit,
}

impl TutorialInput {
    pub fn parse(line: &str) -> Option<TutorialInput> {
        let mut words = line.split_whitespace();
        let input = match words.next()?.to_ascii_lowercase().as_str() {
            "next" | "n" => TutorialInput::Next,
            "prev" | "p" => TutorialInput::Prev,
            "goto" | "g" => TutorialInput::Goto(words.next()?.parse().ok()?),
            "start" => TutorialInput::Start,
            "end" => TutorialInput::End,
            "moves" => TutorialInput::Moves,
            "fen" => TutorialInput::Fen,
            "help" | "?" => TutorialInput::Help,
            "quit" | "exit" | "q" => TutorialInput::Quit,
            _ => return None,
        };
        Some(input)
    }
}

/// Run the selected subcommand
pub async fn run(config: Config) -> Result<()> {
    let command = config.command();
    match &command {
        Command::Play { fen } => play(&config, fen.as_deref()).await,
        Command::Tutorials { catalog, .. } => {
            let catalog = load_catalog(&config, catalog.as_deref()).await?;
            list_tutorials(&catalog, &command.tutorial_filter());
            Ok(())
        }
        Command::Tutorial { id, catalog } => {
            let catalog = load_catalog(&config, catalog.as_deref()).await?;
            let tutorial = catalog
                .get(*id)
                .with_context(|| format!("no tutorial with id {id}"))?;
            step_through(tutorial).await
        }
        Command::Schema => print_schemas(),
    }
}

async fn play(config: &Config, fen: Option<&str>) -> Result<()> {
    let mut session = match fen {
        Some(fen) => GameSession::from_fen(fen).context("invalid --fen")?,
        None => GameSession::new(),
    };
    let oracle = HttpOracle::new(&config.oracle_url);
    info!(oracle = oracle.endpoint(), difficulty = %config.difficulty, "starting game");

    println!("{PLAY_HELP}\n");
    println!("{}", display::render_position(session.board(), session.status()));

    let mut lines = stdin_lines();
    while let Some(line) = next_line(&mut lines).await? {
        let Some(input) = PlayInput::parse(&line) else {
            continue;
        };
        debug!(?input, "play input");
        match input {
            PlayInput::Quit => break,
            PlayInput::Help => println!("{PLAY_HELP}"),
            PlayInput::Move(text) => match session.play_notation(&text) {
                Ok(record) => {
                    println!("You played {}", record.san);
                    if record.status.is_terminal() {
                        println!("{}", display::render_position(session.board(), session.status()));
                    } else {
                        oracle_turn(&mut session, &oracle, config).await;
                    }
                }
                Err(err) => println!("{err}"),
            },
            PlayInput::Retry => {
                if session.status().is_terminal() {
                    println!("{}", ChessError::GameOver { status: session.status() });
                } else {
                    oracle_turn(&mut session, &oracle, config).await;
                }
            }
            PlayInput::Back => {
                let moved = session.step_backward().map(|s| matches!(s, Step::Moved(_)));
                report_step(moved, &session);
            }
            PlayInput::Forward => {
                let moved = session.step_forward().map(|s| matches!(s, Step::Moved(_)));
                report_step(moved, &session);
            }
            PlayInput::Goto(index) => match session.goto(index) {
                Ok(_) => show(&session),
                Err(err) => println!("{err}"),
            },
            PlayInput::Moves => println!("{}", display::render_move_list(session.history())),
            PlayInput::Board => show(&session),
            PlayInput::Fen => println!("{}", session.fen()),
            PlayInput::Pgn => println!("{}", session.pgn()),
            PlayInput::New => {
                session.reset();
                show(&session);
            }
        }
    }
    Ok(())
}

/// Ask the oracle for its reply; Ctrl-C abandons the request
async fn oracle_turn(session: &mut GameSession, oracle: &HttpOracle, config: &Config) {
    println!("Waiting for the oracle (Ctrl-C to cancel)...");
    let cancel = async {
        // if the handler cannot be installed, never cancel
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    match consult(session, oracle, config.difficulty, cancel).await {
        Ok(OracleOutcome::Played(record)) => {
            println!("Oracle played {}", record.san);
            show(session);
        }
        Ok(OracleOutcome::Abandoned) => {
            println!("Oracle request cancelled; enter a move or 'retry'");
        }
        Err(err) => {
            println!("{err}");
            println!("Enter a move for the other side or 'retry'");
        }
    }
}

fn report_step(moved: Result<bool, ChessError>, session: &GameSession) {
    match moved {
        Ok(true) => show(session),
        Ok(false) => println!("No more moves in that direction"),
        Err(err) => println!("{err}"),
    }
}

fn show(session: &GameSession) {
    let history = session.history();
    println!(
        "{}\nMove {}/{}",
        display::render_position(session.board(), session.status()),
        history.cursor(),
        history.len()
    );
}

async fn load_catalog(config: &Config, path: Option<&Path>) -> Result<TutorialCatalog> {
    let catalog = match path {
        Some(path) => TutorialCatalog::load_file(path)?,
        None => TutorialCatalog::fetch(&reqwest::Client::new(), &config.oracle_url).await?,
    };
    Ok(catalog)
}

fn list_tutorials(catalog: &TutorialCatalog, filter: &TutorialFilter) {
    let mut shown = 0;
    for tutorial in catalog.filter(filter) {
        println!(
            "{:>4}  {:<32} {:<12} {}",
            tutorial.id, tutorial.title, tutorial.category, tutorial.difficulty
        );
        shown += 1;
    }
    if shown == 0 {
        println!("No tutorials match");
    }
}

async fn step_through(tutorial: &Tutorial) -> Result<()> {
    let mut replay: TutorialReplay = tutorial
        .replay()
        .with_context(|| format!("tutorial {} cannot be replayed", tutorial.id))?;
    info!(id = tutorial.id, moves = replay.len(), "opened tutorial");

    println!("{}\n", tutorial.title);
    if !tutorial.content.is_empty() {
        println!("{}\n", tutorial.content);
    }
    println!("{TUTORIAL_HELP}\n");
    show_replay(&replay);

    let mut lines = stdin_lines();
    while let Some(line) = next_line(&mut lines).await? {
        let Some(input) = TutorialInput::parse(&line) else {
            if !line.trim().is_empty() {
                println!("{TUTORIAL_HELP}");
            }
            continue;
        };
        let moved = match input {
            TutorialInput::Quit => break,
            TutorialInput::Help => {
                println!("{TUTORIAL_HELP}");
                continue;
            }
            TutorialInput::Moves => {
                let moves: Vec<&str> = replay.records().iter().map(|r| r.san.as_str()).collect();
                println!("{}", moves.join(" "));
                continue;
            }
            TutorialInput::Fen => {
                println!("{}", replay.fen());
                continue;
            }
            TutorialInput::Next => matches!(replay.next(), Step::Moved(_)),
            TutorialInput::Prev => matches!(replay.prev(), Step::Moved(_)),
            TutorialInput::Start => {
                replay.rewind();
                true
            }
            TutorialInput::End => replay.goto(replay.len()).is_ok(),
            TutorialInput::Goto(index) => match replay.goto(index) {
                Ok(_) => true,
                Err(err) => {
                    println!("{err}");
                    false
                }
            },
        };
        if moved {
            show_replay(&replay);
        } else {
            println!("No more moves in that direction");
        }
    }
    Ok(())
}

fn show_replay(replay: &TutorialReplay) {
    if let Some(record) = replay.last_move() {
        println!("Played {}", record.san);
    }
    println!(
        "{}\nStep {}/{}",
        display::render_position(replay.board(), replay.status()),
        replay.cursor(),
        replay.len()
    );
}

fn print_schemas() -> Result<()> {
    let schemas = [
        ("oracle request", schemars::schema_for!(OracleRequest)),
        ("oracle response", schemars::schema_for!(OracleResponse)),
        ("tutorial catalog", schemars::schema_for!(Vec<Tutorial>)),
    ];
    for (name, schema) in schemas {
        println!("// {name}");
        println!("{}", serde_json::to_string_pretty(&schema)?);
    }
    Ok(())
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Next input line; `None` on end of input or Ctrl-C at the prompt
async fn next_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    tokio::select! {
        line = lines.next_line() => line.context("reading stdin"),
        _ = tokio::signal::ctrl_c() => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_input() {
        assert_eq!(PlayInput::parse("e4"), Some(PlayInput::Move("e4".into())));
        assert_eq!(PlayInput::parse("  Nf3  "), Some(PlayInput::Move("Nf3".into())));
        assert_eq!(PlayInput::parse("goto 3"), Some(PlayInput::Goto(3)));
        assert_eq!(PlayInput::parse("goto"), None);
        assert_eq!(PlayInput::parse("BACK"), Some(PlayInput::Back));
        assert_eq!(PlayInput::parse("q"), Some(PlayInput::Quit));
        assert_eq!(PlayInput::parse("   "), None);
    }

    #[test]
    fn test_parse_tutorial_input() {
        assert_eq!(TutorialInput::parse("next"), Some(TutorialInput::Next));
        assert_eq!(TutorialInput::parse("g 2"), Some(TutorialInput::Goto(2)));
        assert_eq!(TutorialInput::parse("g x"), None);
        assert_eq!(TutorialInput::parse("e4"), None);
    }

    #[test]
    fn test_schemas_serialize() {
        print_schemas().unwrap();
    }
}
