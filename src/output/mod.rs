//! Output formatting for diff results

mod csv;
mod html;
mod json;
mod terminal;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ReportFormat;
use crate::diff::DiffResult;

pub use self::csv::{flatten, CsvOutput, FlatRow};
pub use self::html::HtmlOutput;
pub use self::json::JsonOutput;
pub use self::terminal::TerminalOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render diff result to a writer
    fn render(&self, diff: &DiffResult, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: ReportFormat) -> Box<dyn OutputFormatter> {
        match format {
            ReportFormat::Json => Box::new(JsonOutput::new()),
            ReportFormat::Csv => Box::new(CsvOutput::new()),
            ReportFormat::Html => Box::new(HtmlOutput::new()),
        }
    }
}

/// Write each requested report into `out_dir`, returning the written paths
pub fn write_reports(
    diff: &DiffResult,
    out_dir: &Path,
    formats: &[ReportFormat],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = out_dir.join(format.file_name());
        let file = File::create(&path)
            .with_context(|| format!("Failed to create report: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        OutputFactory::create(format)
            .render(diff, &mut writer)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        writer.flush()?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Render the terminal summary to stdout
pub fn render_to_stdout(diff: &DiffResult) -> Result<()> {
    TerminalOutput::new().print(diff)
}
