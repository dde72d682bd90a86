//! Excel file parser (xlsx, xls, ods)

use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use indexmap::IndexMap;

use crate::model::{CellValue, Row, Table};

use super::{header_name, table_name, Parser};

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, sheet: Option<&str>) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .context("No sheets found in workbook")?,
        };

        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        parse_range(&range, table_name(path))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "xlsx" | "xls" | "ods" | "xlsm")
    }
}

fn parse_range(range: &Range<Data>, name: String) -> Result<Table> {
    let mut rows = range.rows();

    // First row is header
    let Some(header_row) = rows.next() else {
        bail!("Empty sheet");
    };
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(i, &convert_cell(cell).display()))
        .collect();

    let mut table = Table::new(name, headers.as_slice(), Vec::new())?;

    // The used range starts at the first non-empty row of the sheet
    let first_line = range.start().map_or(0, |(r, _)| r as usize) + 2;

    for (line_num, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let values: IndexMap<String, CellValue> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = row.get(i).map(convert_cell).unwrap_or(CellValue::Empty);
                (column.clone(), value)
            })
            .collect();

        table.rows.push(Row::new(values, first_line + line_num));
    }

    Ok(table)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == chrono::NaiveTime::MIN => {
                CellValue::Text(dt.date().format("%Y-%m-%d").to_string())
            }
            Some(dt) => CellValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Text(cell.to_string()),
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}
