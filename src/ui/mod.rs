pub mod display;
pub mod view_models;

pub use view_models::{MoveListEntry, MoveListRow};
