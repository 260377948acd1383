//! Core value types shared by every harmonization stage.

mod cell;
mod identifier;
mod table_row;

pub use cell::{Cell, ColumnType};
pub use identifier::TrialId;
pub use table_row::TableRow;
