//! Text rendering for the terminal front end.
//!
//! This module turns game state into display-ready strings.
//! It lives in the UI layer and depends on domain + models, not vice versa.

use crate::domain::{Board, GameStatus, History, PieceColor};
use crate::ui::view_models::{MoveListEntry, MoveListRow};

/// Every recorded move, flagged with the cursor position
pub fn move_list(history: &History) -> Vec<MoveListEntry> {
    history
        .records()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let (move_num, is_black) = history.move_number(i);
            MoveListEntry {
                index: i + 1,
                move_num,
                is_black,
                san: record.san.clone(),
                is_current: history.cursor() == i + 1,
            }
        })
        .collect()
}

/// Moves paired into numbered rows; a game starting with black leaves the
/// first white slot empty
pub fn move_list_rows(history: &History) -> Vec<MoveListRow> {
    let mut rows: Vec<MoveListRow> = Vec::new();
    for entry in move_list(history) {
        match rows.last_mut() {
            Some(row) if entry.is_black && row.move_num == entry.move_num && row.black.is_none() => {
                row.black = Some(entry);
            }
            _ => {
                let move_num = entry.move_num;
                let (white, black) = if entry.is_black {
                    (None, Some(entry))
                } else {
                    (Some(entry), None)
                };
                rows.push(MoveListRow {
                    move_num,
                    white,
                    black,
                });
            }
        }
    }
    rows
}

/// Move list as text, the current move in brackets
pub fn render_move_list(history: &History) -> String {
    let rows = move_list_rows(history);
    if rows.is_empty() {
        return "No moves yet".to_string();
    }

    let cell = |entry: &Option<MoveListEntry>| match entry {
        Some(e) if e.is_current => format!("[{}]", e.san),
        Some(e) => format!(" {} ", e.san),
        None => " ...".to_string(),
    };
    rows.iter()
        .map(|row| {
            let black = if row.black.is_some() { cell(&row.black) } else { String::new() };
            format!("{:>3}. {:<10}{}", row.move_num, cell(&row.white), black)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of whose turn it is or how the game ended
pub fn status_line(status: GameStatus, board: &Board) -> String {
    let side = board.side_to_move();
    match status {
        GameStatus::InProgress => format!("{} to move", capitalized(side)),
        GameStatus::Check => format!("Check! {} to move", capitalized(side)),
        GameStatus::Checkmate => {
            format!("Checkmate! {} wins", capitalized(side.opponent()))
        }
        draw => format!("Draw: {draw}"),
    }
}

/// Board diagram followed by the status line
pub fn render_position(board: &Board, status: GameStatus) -> String {
    format!("{board}\n\n{}", status_line(status, board))
}

fn capitalized(color: PieceColor) -> &'static str {
    match color {
        PieceColor::White => "White",
        PieceColor::Black => "Black",
    }
}
