//! Error types for statement building.

use thiserror::Error;

/// Errors that can occur while building a statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    /// No columns were given for the insert.
    #[error("No columns given for insert into '{table}'")]
    NoColumns { table: String },

    /// Every column is a key and no custom update clause was given.
    #[error("No non-key columns to update for insert into '{table}'")]
    NothingToUpdate { table: String },
}
