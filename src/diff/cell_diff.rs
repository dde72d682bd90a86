//! Cell-level comparison logic

use crate::model::{CellValue, Row};

use super::CellChange;

/// Compare two cells.
///
/// Empty values (absent, blank text, NaN) are equal to each other. Two values
/// that both parse as finite numbers are equal when they differ by at most
/// `tolerance`. Anything else compares by normalized text.
pub fn cell_equal(old: &CellValue, new: &CellValue, tolerance: f64) -> bool {
    if old.is_empty() && new.is_empty() {
        return true;
    }

    if let (Some(a), Some(b)) = (old.as_number(), new.as_number()) {
        return (a - b).abs() <= tolerance;
    }

    old.display() == new.display()
}

/// Cell comparator with a fixed numeric tolerance
#[derive(Debug, Clone, Copy, Default)]
pub struct CellComparator {
    tolerance: f64,
}

impl CellComparator {
    /// Create a new cell comparator
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Compare two cell values for equality
    pub fn equal(&self, a: &CellValue, b: &CellValue) -> bool {
        cell_equal(a, b, self.tolerance)
    }

    /// Cell changes between two rows over `columns`, in column order
    pub fn compare_rows(&self, old_row: &Row, new_row: &Row, columns: &[String]) -> Vec<CellChange> {
        columns
            .iter()
            .filter_map(|column| {
                let old_value = old_row.get(column);
                let new_value = new_row.get(column);
                if self.equal(old_value, new_value) {
                    None
                } else {
                    Some(CellChange {
                        column: column.clone(),
                        old_value: old_value.clone(),
                        new_value: new_value.clone(),
                    })
                }
            })
            .collect()
    }
}

/// Calculate percentage change for numeric values
pub fn percentage_change(old: &CellValue, new: &CellValue) -> Option<f64> {
    let old_num = old.as_number()?;
    let new_num = new.as_number()?;

    if old_num == 0.0 {
        if new_num == 0.0 {
            Some(0.0)
        } else {
            None // Infinite change
        }
    } else {
        Some((new_num - old_num) / old_num * 100.0)
    }
}
