//! Flattened CSV output: one line per changed cell

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::diff::{DiffResult, RowChange};

use super::OutputFormatter;

/// One line of the flattened report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRow {
    #[serde(rename = "type")]
    pub change_type: String,
    pub key: String,
    pub column: String,
    pub old: String,
    pub new: String,
}

fn push_change(rows: &mut Vec<FlatRow>, change: &RowChange) {
    let change_type = change.kind().to_string();
    if change.changes.is_empty() {
        rows.push(FlatRow {
            change_type,
            key: change.key.clone(),
            column: String::new(),
            old: String::new(),
            new: String::new(),
        });
        return;
    }

    rows.extend(change.changes.iter().map(|cell| FlatRow {
        change_type: change_type.clone(),
        key: change.key.clone(),
        column: cell.column.clone(),
        old: cell.old_value.display().into_owned(),
        new: cell.new_value.display().into_owned(),
    }));
}

/// Flatten a diff into report lines: added, then removed, then changed
pub fn flatten(diff: &DiffResult) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    for change in diff
        .added
        .iter()
        .chain(diff.removed.iter())
        .chain(diff.changed.iter())
    {
        push_change(&mut rows, change);
    }
    rows
}

/// CSV output formatter
pub struct CsvOutput;

impl CsvOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for CsvOutput {
    fn render(&self, diff: &DiffResult, writer: &mut dyn Write) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        // Header is written explicitly so an empty diff still has one
        csv_writer.write_record(["type", "key", "column", "old", "new"])?;
        for row in flatten(diff) {
            csv_writer.write_record([
                row.change_type.as_str(),
                row.key.as_str(),
                row.column.as_str(),
                row.old.as_str(),
                row.new.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
