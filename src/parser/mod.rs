//! Parser layer for reading tabular data files into a `Table`

mod csv;
mod excel;

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table; `sheet` selects a worksheet where
    /// the format has them
    fn parse(&self, path: &Path, sheet: Option<&str>) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(ExcelParser)],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!(
            "Unsupported file format: {} (expected .csv, .tsv or .xlsx)",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
        )
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, sheet: Option<&str>) -> Result<Table> {
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, sheet)?;
        log::debug!(
            "read {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            path.display()
        );
        Ok(table)
    }
}

/// Header cell text, or a positional `ColumnN` name when it is blank
pub(crate) fn header_name(index: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("Column{}", index + 1)
    } else {
        raw.to_string()
    }
}

/// Display name of a table read from `path`
pub(crate) fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
