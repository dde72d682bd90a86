//! CSV file parser

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;

use crate::model::{CellValue, Row, Table};

use super::{header_name, table_name, Parser};

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _sheet: Option<&str>) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        read_csv(BufReader::new(file), table_name(path), delimiter_for(path))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv")
    }
}

/// Field delimiter implied by the file extension
fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Read delimited text with a header row; every value is kept as text
pub fn read_csv<R: Read>(reader: R, name: String, delimiter: u8) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            header_name(i, h)
        })
        .collect();

    // Normalize and validate the header before reading rows
    let mut table = Table::new(name, headers.as_slice(), Vec::new())?;

    for (line_num, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?; // +2 for 1-indexing and header

        let values: IndexMap<String, CellValue> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = record
                    .get(i)
                    .map(|s| CellValue::Text(s.to_string()))
                    .unwrap_or(CellValue::Empty);
                (column.clone(), value)
            })
            .collect();

        table.rows.push(Row::new(values, line_num + 2));
    }

    Ok(table)
}
