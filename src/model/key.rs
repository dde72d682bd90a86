//! Composite key handling

use serde::{Serialize, Serializer};

use super::table::Row;

/// Separator used when rendering a composite key for display
pub const KEY_SEPARATOR: &str = " | ";

/// Ordered tuple of a row's normalized key-column values.
///
/// Equality and hashing are structural, so a key part containing the
/// separator text never collides with a different tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(Vec<String>);

impl CompositeKey {
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    /// Compute the key of a row; missing columns contribute an empty part
    pub fn from_row(row: &Row, key_columns: &[String]) -> Self {
        Self(
            key_columns
                .iter()
                .map(|column| row.get(column).display().into_owned())
                .collect(),
        )
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Human-readable label, the parts joined by `" | "`
    pub fn label(&self) -> String {
        self.0.join(KEY_SEPARATOR)
    }
}

impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for CompositeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
