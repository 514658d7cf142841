// src/forecast/engine/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Select a period (and a branch where required) first.")]
    NoSelection,
    #[error("Rows are still loading.")]
    NotReady,
    #[error("A save or post request is already in flight.")]
    Busy,
    #[error("Column '{0}' is not an editable forecast column.")]
    NotEditable(String),
    #[error("Row '{0}' is not part of the current data set.")]
    UnknownRow(String),
    #[error("There are no forecast edits to save.")]
    NothingToSave,
    #[error("Saving is locked for this period.")]
    SaveNotAllowed,
    #[error("Cannot post: {0}.")]
    PostNotEligible(String),
    #[error("{0} cell(s) contain values that are not numbers.")]
    InvalidCells(usize),
}
