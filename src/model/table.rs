//! Table, Row, and Cell data structures

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Trim and collapse internal whitespace runs to a single space
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A scalar cell value as handed over by a table provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    /// True for absent values, whitespace-only text and NaN
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(f) => f.is_nan(),
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Parse as a finite number.
    ///
    /// Native numbers are taken as-is; text has thousands separators stripped
    /// before parsing. NaN and infinities are rejected.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Empty => return None,
            CellValue::Number(f) => *f,
            CellValue::Text(s) => {
                let cleaned = s.trim().replace(',', "");
                if cleaned.is_empty() {
                    return None;
                }
                cleaned.parse::<f64>().ok()?
            }
        };
        n.is_finite().then_some(n)
    }

    /// Normalized string form used for keys, text comparison and reports
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Empty => Cow::Borrowed(""),
            CellValue::Number(f) => Cow::Owned(format_number(*f)),
            CellValue::Text(s) => {
                if s.contains(char::is_whitespace) {
                    Cow::Owned(normalize_text(s))
                } else {
                    Cow::Borrowed(s.as_str())
                }
            }
        }
    }
}

fn format_number(f: f64) -> String {
    if f.is_nan() {
        String::new()
    } else if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Number(f)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Number(i as f64)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Empty,
        }
    }
}

/// A row keyed by (normalized) column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Values in source column order
    pub values: IndexMap<String, CellValue>,
    /// Original line/row number in source file (1-indexed)
    pub source_line: usize,
}

static EMPTY: CellValue = CellValue::Empty;

impl Row {
    pub fn new(values: IndexMap<String, CellValue>, source_line: usize) -> Self {
        Self {
            values,
            source_line,
        }
    }

    /// Build a row from `(column, value)` pairs; column names are normalized
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (normalize_text(k.as_ref()), v.into()))
            .collect();
        Self {
            values,
            source_line: 0,
        }
    }

    /// Value for a column; a missing column reads as empty
    pub fn get(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&EMPTY)
    }
}

/// Errors raised while assembling a table
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table '{table}' has duplicate column '{column}' after normalization")]
    DuplicateColumn { table: String, column: String },
}

/// An immutable, fully materialized input table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Display name (usually the file name)
    pub name: String,
    /// Distinct, normalized column names in source order
    pub columns: Vec<String>,
    /// All rows in source order
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table, normalizing column names and rejecting duplicates
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        columns: &[S],
        rows: Vec<Row>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        let mut normalized: Vec<String> = Vec::with_capacity(columns.len());
        for column in columns {
            let column = normalize_text(column.as_ref());
            if normalized.contains(&column) {
                return Err(TableError::DuplicateColumn {
                    table: name,
                    column,
                });
            }
            normalized.push(column);
        }

        Ok(Self {
            name,
            columns: normalized,
            rows,
        })
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \t b\n c  "), "a b c");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::from("   ").is_empty());
        assert!(CellValue::Number(f64::NAN).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
        assert!(!CellValue::from("0").is_empty());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(CellValue::from("1,234.5").as_number(), Some(1234.5));
        assert_eq!(CellValue::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(CellValue::Number(3.5).as_number(), Some(3.5));
        assert_eq!(CellValue::Number(f64::INFINITY).as_number(), None);
        assert_eq!(CellValue::from("inf").as_number(), None);
        assert_eq!(CellValue::from("NaN").as_number(), None);
        assert_eq!(CellValue::from("abc").as_number(), None);
        assert_eq!(CellValue::from(",").as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(10.0).display(), "10");
        assert_eq!(CellValue::Number(10.5).display(), "10.5");
        assert_eq!(CellValue::from(" Acme   Corp ").display(), "Acme Corp");
        assert_eq!(CellValue::Empty.display(), "");
    }

    #[test]
    fn test_table_rejects_duplicate_columns() {
        let err = Table::new("t.csv", &["id", " id "], Vec::new()).unwrap_err();
        assert_eq!(
            err,
            TableError::DuplicateColumn {
                table: "t.csv".into(),
                column: "id".into()
            }
        );
    }

    #[test]
    fn test_row_missing_column_is_empty() {
        let row = Row::from_pairs([("id", "1")]);
        assert_eq!(row.get("id"), &CellValue::from("1"));
        assert!(row.get("missing").is_empty());
    }
}
