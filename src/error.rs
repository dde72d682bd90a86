//! Error types for the comparison engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiffError>;

/// Precondition failures detected before any comparison work starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Configuration error: at least one key column is required")]
    MissingKeys,

    #[error("Configuration error: key column '{column}' not found in {}", .missing_in.join(", "))]
    KeyColumnAbsent {
        column: String,
        missing_in: Vec<String>,
    },
}
