//! Data model for tabular data representation

mod key;
mod table;

pub use key::{CompositeKey, KEY_SEPARATOR};
pub use table::{normalize_text, CellValue, Row, Table, TableError};
