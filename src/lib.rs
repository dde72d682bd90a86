//! quietdiff - Key-based diff for tabular data
//!
//! Compares two tables (CSV or spreadsheet) row by row using one or more key
//! columns, with optional numeric tolerance and fuzzy rematching of rows whose
//! key values shifted slightly.

pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use config::{Config, DiffOptions};
pub use diff::{compute_diff, DiffResult};
pub use error::DiffError;
pub use model::Table;
