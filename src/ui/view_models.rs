//! View models for the move list.
//!
//! Plain data prepared from a [`History`](crate::domain::History) so the
//! terminal front end never walks records itself.

/// A single move in the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveListEntry {
    /// History index reached by `goto` on this move (1-based)
    pub index: usize,
    pub move_num: u32,
    pub is_black: bool,
    pub san: String,
    /// Whether the history cursor sits on this move
    pub is_current: bool,
}

/// One numbered row: white's move and black's reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveListRow {
    pub move_num: u32,
    pub white: Option<MoveListEntry>,
    pub black: Option<MoveListEntry>,
}
