//! Diff engine for comparing tables

pub mod cell_diff;
pub mod fuzzy;
mod index;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::DiffOptions;
use crate::error::{DiffError, Result};
use crate::model::{CellValue, CompositeKey, Row, Table};

pub use cell_diff::{cell_equal, CellComparator};
pub use index::RowIndex;

/// A change to a single cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellChange {
    /// Column name
    pub column: String,
    /// Old value
    pub old_value: CellValue,
    /// New value
    pub new_value: CellValue,
}

/// Classification of a row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Changed => "changed",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change to a row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowChange {
    /// Display key; `"<old> -> <new>"` for fuzzy matches
    pub key: String,
    /// Key of the old row, if any
    pub old_key: Option<CompositeKey>,
    /// Key of the new row, if any
    pub new_key: Option<CompositeKey>,
    /// Row from the left table
    pub old_row: Option<Row>,
    /// Row from the right table
    pub new_row: Option<Row>,
    /// Differing cells, in compared-column order
    pub changes: Vec<CellChange>,
}

impl RowChange {
    /// Row present only in the right table
    pub fn added(key: &CompositeKey, row: &Row) -> Self {
        Self {
            key: key.label(),
            old_key: None,
            new_key: Some(key.clone()),
            old_row: None,
            new_row: Some(row.clone()),
            changes: Vec::new(),
        }
    }

    /// Row present only in the left table
    pub fn removed(key: &CompositeKey, row: &Row) -> Self {
        Self {
            key: key.label(),
            old_key: Some(key.clone()),
            new_key: None,
            old_row: Some(row.clone()),
            new_row: None,
            changes: Vec::new(),
        }
    }

    /// Matched pair of rows with differing cells
    pub fn changed(
        key: String,
        old_key: &CompositeKey,
        new_key: &CompositeKey,
        old_row: &Row,
        new_row: &Row,
        changes: Vec<CellChange>,
    ) -> Self {
        Self {
            key,
            old_key: Some(old_key.clone()),
            new_key: Some(new_key.clone()),
            old_row: Some(old_row.clone()),
            new_row: Some(new_row.clone()),
            changes,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match (&self.old_row, &self.new_row) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Removed,
            _ => ChangeKind::Changed,
        }
    }
}

/// Order row changes by display key, then by the structured keys
pub(crate) fn sort_changes(changes: &mut [RowChange]) {
    changes.sort_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then_with(|| a.old_key.cmp(&b.old_key))
            .then_with(|| a.new_key.cmp(&b.new_key))
    });
}

/// Statistics about the diff
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub left_row_count: usize,
    pub right_row_count: usize,
    pub rows_added: usize,
    pub rows_removed: usize,
    pub rows_changed: usize,
    pub rows_unchanged: usize,
    pub cells_changed: usize,
}

impl DiffStats {
    fn tally(
        left_row_count: usize,
        right_row_count: usize,
        rows_unchanged: usize,
        added: &[RowChange],
        removed: &[RowChange],
        changed: &[RowChange],
    ) -> Self {
        Self {
            left_row_count,
            right_row_count,
            rows_added: added.len(),
            rows_removed: removed.len(),
            rows_changed: changed.len(),
            rows_unchanged,
            cells_changed: changed.iter().map(|c| c.changes.len()).sum(),
        }
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.rows_added > 0 || self.rows_removed > 0 || self.rows_changed > 0
    }
}

/// Result of comparing two tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffResult {
    pub left_name: String,
    pub right_name: String,
    /// Key columns used for matching
    pub keys: Vec<String>,
    /// Non-key columns compared cell by cell, sorted
    pub compared_columns: Vec<String>,
    pub added: Vec<RowChange>,
    pub removed: Vec<RowChange>,
    pub changed: Vec<RowChange>,
    /// Duplicate keys in the left table, deduplicated and sorted
    pub duplicate_keys_left: Vec<String>,
    /// Duplicate keys in the right table, deduplicated and sorted
    pub duplicate_keys_right: Vec<String>,
    pub stats: DiffStats,
}

impl DiffResult {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.stats.has_changes()
    }

    /// Check if either table contained duplicate keys
    pub fn has_duplicates(&self) -> bool {
        !self.duplicate_keys_left.is_empty() || !self.duplicate_keys_right.is_empty()
    }

    /// Recount statistics after the change collections were rebuilt
    pub(crate) fn restat(&mut self) {
        self.stats = DiffStats::tally(
            self.stats.left_row_count,
            self.stats.right_row_count,
            self.stats.rows_unchanged,
            &self.added,
            &self.removed,
            &self.changed,
        );
    }
}

/// Main diff engine
pub struct DiffEngine {
    options: DiffOptions,
    cell_comparator: CellComparator,
}

impl DiffEngine {
    /// Create a new diff engine with configuration
    pub fn new(options: DiffOptions) -> Self {
        let cell_comparator = CellComparator::new(options.tolerance);
        Self {
            options,
            cell_comparator,
        }
    }

    /// Compare two tables, running the fuzzy pass when enabled
    pub fn diff(&self, left: &Table, right: &Table) -> Result<DiffResult> {
        let exact = self.diff_exact(left, right)?;

        if self.options.fuzzy && (!exact.added.is_empty() || !exact.removed.is_empty()) {
            Ok(fuzzy::rematch(
                exact,
                &self.cell_comparator,
                self.options.fuzzy_threshold,
            ))
        } else {
            Ok(exact)
        }
    }

    /// Key-exact comparison without fuzzy rematching
    pub fn diff_exact(&self, left: &Table, right: &Table) -> Result<DiffResult> {
        self.validate(left, right)?;

        let keys = &self.options.key_columns;
        let compared_columns = self.compared_columns(left, right);

        let left_index = RowIndex::build(&left.rows, keys);
        let right_index = RowIndex::build(&right.rows, keys);
        log::debug!(
            "indexed {} distinct keys in '{}' and {} in '{}'",
            left_index.len(),
            left.name,
            right_index.len(),
            right.name
        );

        let mut removed = Vec::new();
        let mut changed = Vec::new();
        let mut unchanged = 0;

        for (key, old_row) in left_index.iter() {
            match right_index.get(key) {
                Some(new_row) => {
                    let changes =
                        self.cell_comparator
                            .compare_rows(old_row, new_row, &compared_columns);
                    if changes.is_empty() {
                        unchanged += 1;
                    } else {
                        changed.push(RowChange::changed(
                            key.label(),
                            key,
                            key,
                            old_row,
                            new_row,
                            changes,
                        ));
                    }
                }
                None => removed.push(RowChange::removed(key, old_row)),
            }
        }

        let mut added: Vec<RowChange> = right_index
            .iter()
            .filter(|(key, _)| !left_index.contains_key(key))
            .map(|(key, row)| RowChange::added(key, row))
            .collect();

        sort_changes(&mut added);
        sort_changes(&mut removed);
        sort_changes(&mut changed);

        let duplicate_keys_left = dedup_labels(left_index.duplicates());
        let duplicate_keys_right = dedup_labels(right_index.duplicates());
        if !duplicate_keys_left.is_empty() {
            log::warn!(
                "{} duplicate key(s) in '{}'; later occurrences ignored",
                duplicate_keys_left.len(),
                left.name
            );
        }
        if !duplicate_keys_right.is_empty() {
            log::warn!(
                "{} duplicate key(s) in '{}'; later occurrences ignored",
                duplicate_keys_right.len(),
                right.name
            );
        }

        let stats = DiffStats::tally(
            left.row_count(),
            right.row_count(),
            unchanged,
            &added,
            &removed,
            &changed,
        );
        log::debug!(
            "exact pass: {} added, {} removed, {} changed, {} unchanged",
            stats.rows_added,
            stats.rows_removed,
            stats.rows_changed,
            stats.rows_unchanged
        );

        Ok(DiffResult {
            left_name: left.name.clone(),
            right_name: right.name.clone(),
            keys: keys.clone(),
            compared_columns,
            added,
            removed,
            changed,
            duplicate_keys_left,
            duplicate_keys_right,
            stats,
        })
    }

    fn validate(&self, left: &Table, right: &Table) -> Result<()> {
        if self.options.key_columns.is_empty() {
            return Err(DiffError::MissingKeys);
        }

        for column in &self.options.key_columns {
            let missing_in: Vec<String> = [left, right]
                .iter()
                .filter(|t| !t.has_column(column))
                .map(|t| t.name.clone())
                .collect();
            if !missing_in.is_empty() {
                return Err(DiffError::KeyColumnAbsent {
                    column: column.clone(),
                    missing_in,
                });
            }
        }

        Ok(())
    }

    /// Union of both tables' non-key columns, filtered by include/ignore, sorted
    fn compared_columns(&self, left: &Table, right: &Table) -> Vec<String> {
        let keys = &self.options.key_columns;
        let all = left
            .columns
            .iter()
            .chain(right.columns.iter())
            .filter(|c| !keys.contains(c));

        let selected: BTreeSet<&String> = match (
            &self.options.include_columns,
            &self.options.ignore_columns,
        ) {
            (Some(include), _) => all.filter(|c| include.contains(c)).collect(),
            (None, Some(ignore)) => all.filter(|c| !ignore.contains(c)).collect(),
            (None, None) => all.collect(),
        };

        selected.into_iter().cloned().collect()
    }
}

fn dedup_labels(keys: &[CompositeKey]) -> Vec<String> {
    keys.iter()
        .map(CompositeKey::label)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Convenience function to compute diff
pub fn compute_diff(left: &Table, right: &Table, options: &DiffOptions) -> Result<DiffResult> {
    DiffEngine::new(options.clone()).diff(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<&str>>) -> Table {
        let rows = rows
            .into_iter()
            .map(|values| Row::from_pairs(columns.iter().copied().zip(values)))
            .collect();
        Table::new(name, columns, rows).unwrap()
    }

    fn keys_of(changes: &[RowChange]) -> Vec<&str> {
        changes.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn test_basic_diff_with_tolerance() {
        let left = table(
            "a.csv",
            &["id", "name", "total"],
            vec![vec!["1", "A", "10.00"], vec!["2", "B", "20.00"]],
        );
        let right = table(
            "b.csv",
            &["id", "name", "total"],
            vec![vec!["1", "A", "10.01"], vec!["3", "C", "30.00"]],
        );

        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"]).with_tolerance(0.02))
            .unwrap();
        assert_eq!(keys_of(&diff.added), vec!["3"]);
        assert_eq!(keys_of(&diff.removed), vec!["2"]);
        assert!(diff.changed.is_empty());
        assert_eq!(diff.stats.rows_unchanged, 1);
        assert_eq!(diff.added[0].kind(), ChangeKind::Added);
        assert_eq!(diff.removed[0].kind(), ChangeKind::Removed);
    }

    #[test]
    fn test_changed_cells() {
        let left = table("a", &["id", "name", "total"], vec![vec!["1", "A", "10"]]);
        let right = table("b", &["id", "name", "total"], vec![vec!["1", "Z", "11"]]);

        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"])).unwrap();
        assert_eq!(diff.changed.len(), 1);
        let change = &diff.changed[0];
        assert_eq!(change.kind(), ChangeKind::Changed);
        let columns: Vec<_> = change.changes.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["name", "total"]);
        assert_eq!(diff.stats.cells_changed, 2);
        assert!(diff.has_changes());
    }

    #[test]
    fn test_missing_keys() {
        let t = table("a", &["id"], vec![]);
        let err = compute_diff(&t, &t, &DiffOptions::default()).unwrap_err();
        assert_eq!(err, DiffError::MissingKeys);
    }

    #[test]
    fn test_key_column_absent_names_tables() {
        let left = table("left.csv", &["id", "sku"], vec![]);
        let right = table("right.csv", &["id"], vec![]);

        let err = compute_diff(&left, &right, &DiffOptions::new(["sku"])).unwrap_err();
        assert_eq!(
            err,
            DiffError::KeyColumnAbsent {
                column: "sku".into(),
                missing_in: vec!["right.csv".into()],
            }
        );
        assert!(err.to_string().contains("right.csv"));
    }

    #[test]
    fn test_column_selection() {
        let left = table("a", &["id", "b", "a"], vec![vec!["1", "x", "y"]]);
        let right = table("b", &["id", "c", "a"], vec![vec!["1", "z", "y"]]);

        let all = compute_diff(&left, &right, &DiffOptions::new(["id"])).unwrap();
        assert_eq!(all.compared_columns, vec!["a", "b", "c"]);
        assert_eq!(all.changed[0].changes.len(), 2);

        let ignored = compute_diff(
            &left,
            &right,
            &DiffOptions::new(["id"]).with_ignore_columns(["b", "c"]),
        )
        .unwrap();
        assert_eq!(ignored.compared_columns, vec!["a"]);
        assert!(ignored.changed.is_empty());

        let included = compute_diff(
            &left,
            &right,
            &DiffOptions::new(["id"])
                .with_include_columns(["c", "id"])
                .with_ignore_columns(["c"]),
        )
        .unwrap();
        assert_eq!(included.compared_columns, vec!["c"]);
        assert_eq!(included.changed.len(), 1);
    }

    #[test]
    fn test_duplicates_reported_and_first_wins() {
        let left = table(
            "a",
            &["id", "v"],
            vec![vec!["1", "a"], vec!["1", "b"], vec!["1", "c"], vec!["2", "x"]],
        );
        let right = table("b", &["id", "v"], vec![vec!["1", "a"], vec!["2", "x"]]);

        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"])).unwrap();
        assert!(!diff.has_changes());
        assert_eq!(diff.duplicate_keys_left, vec!["1"]);
        assert!(diff.duplicate_keys_right.is_empty());
        assert!(diff.has_duplicates());
    }

    #[test]
    fn test_identical_tables() {
        let t = table(
            "a",
            &["id", "v"],
            vec![vec!["2", "b"], vec!["1", "a"], vec!["3", ""]],
        );
        let diff = compute_diff(&t, &t.clone(), &DiffOptions::new(["id"]).with_fuzzy(true))
            .unwrap();
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert!(diff.changed.is_empty());
        assert!(!diff.has_duplicates());
        assert_eq!(diff.stats.rows_unchanged, 3);
    }

    #[test]
    fn test_disjoint_keys_partition() {
        let left = table("a", &["id", "v"], vec![vec!["b", "1"], vec!["a", "2"]]);
        let right = table("b", &["id", "v"], vec![vec!["y", "1"], vec!["x", "2"]]);

        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"])).unwrap();
        assert_eq!(keys_of(&diff.removed), vec!["a", "b"]);
        assert_eq!(keys_of(&diff.added), vec!["x", "y"]);
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_composite_key_labels() {
        let left = table("a", &["k1", "k2", "v"], vec![vec!["a", "1", "x"]]);
        let right = table("b", &["k1", "k2", "v"], vec![vec!["a", "1", "y"]]);

        let diff = compute_diff(&left, &right, &DiffOptions::new(["k1", "k2"])).unwrap();
        assert_eq!(keys_of(&diff.changed), vec!["a | 1"]);
        assert_eq!(diff.compared_columns, vec!["v"]);
    }
    #[test]
    fn test_keys_with_separator_text_stay_distinct() {
        // both tuples render as "a | b | c"
        let rows = vec![vec!["a | b", "c", "1"], vec!["a", "b | c", "2"]];
        let left = table("a", &["k1", "k2", "v"], rows.clone());
        let right = table("b", &["k1", "k2", "v"], rows);

        let options = DiffOptions::new(["k1", "k2"]);
        let diff = compute_diff(&left, &right, &options).unwrap();
        assert!(!diff.has_changes());
        assert!(!diff.has_duplicates());
        assert_eq!(diff.stats.rows_unchanged, 2);

        let left = table("a", &["k1", "k2", "v"], vec![vec!["a | b", "c", "1"]]);
        let right = table("b", &["k1", "k2", "v"], vec![vec!["a", "b | c", "1"]]);
        let diff = compute_diff(&left, &right, &options).unwrap();
        assert_eq!(keys_of(&diff.removed), vec!["a | b | c"]);
        assert_eq!(keys_of(&diff.added), vec!["a | b | c"]);
        assert!(diff.changed.is_empty());
    }
}
