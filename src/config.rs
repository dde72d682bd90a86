//! Configuration handling for quietdiff

use std::path::PathBuf;

use crate::model::normalize_text;

/// Default similarity threshold for fuzzy key rematching
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.92;

/// Report formats written to the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Json,
    Csv,
    Html,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Json, ReportFormat::Csv, ReportFormat::Html];

    /// File name of the report inside the output directory
    pub fn file_name(self) -> &'static str {
        match self {
            ReportFormat::Json => "diff.json",
            ReportFormat::Csv => "diff.csv",
            ReportFormat::Html => "report.html",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

/// Parameters of a single comparison
#[derive(Debug, Clone, PartialEq)]
pub struct DiffOptions {
    /// Columns identifying a row, in order
    pub key_columns: Vec<String>,
    /// Compare only these columns (takes precedence over `ignore_columns`)
    pub include_columns: Option<Vec<String>>,
    /// Columns excluded from comparison
    pub ignore_columns: Option<Vec<String>>,
    /// Absolute tolerance for numeric comparisons
    pub tolerance: f64,
    /// Re-pair unmatched rows whose keys are textually similar
    pub fuzzy: bool,
    /// Minimum similarity ratio for a fuzzy match
    pub fuzzy_threshold: f64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            include_columns: None,
            ignore_columns: None,
            tolerance: 0.0,
            fuzzy: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

fn normalize_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| normalize_text(n.as_ref()))
        .collect()
}

impl DiffOptions {
    /// Create options keyed on the given columns
    pub fn new<S: AsRef<str>>(key_columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            key_columns: normalize_names(key_columns),
            ..Default::default()
        }
    }

    /// Restrict comparison to these columns
    pub fn with_include_columns<S: AsRef<str>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.include_columns = Some(normalize_names(columns));
        self
    }

    /// Set columns to ignore
    pub fn with_ignore_columns<S: AsRef<str>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.ignore_columns = Some(normalize_names(columns));
        self
    }

    /// Set numeric tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enable fuzzy rematching of unmatched rows
    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Set the fuzzy similarity threshold
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }
}

/// Configuration for a command-line run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the left (old) file
    pub left_file: PathBuf,
    /// Path to the right (new) file
    pub right_file: PathBuf,
    /// Spreadsheet sheet to read from the left file
    pub sheet_left: Option<String>,
    /// Spreadsheet sheet to read from the right file
    pub sheet_right: Option<String>,
    /// Directory receiving the report files
    pub out_dir: PathBuf,
    /// Reports to write
    pub formats: Vec<ReportFormat>,
    /// Print a summary to stdout
    pub summary: bool,
    /// Comparison parameters
    pub diff: DiffOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_file: PathBuf::new(),
            right_file: PathBuf::new(),
            sheet_left: None,
            sheet_right: None,
            out_dir: PathBuf::from("out"),
            formats: ReportFormat::ALL.to_vec(),
            summary: true,
            diff: DiffOptions::default(),
        }
    }
}

impl Config {
    /// Create a new Config with file paths
    pub fn new(left_file: PathBuf, right_file: PathBuf) -> Self {
        Self {
            left_file,
            right_file,
            ..Default::default()
        }
    }

    /// Set the comparison parameters
    pub fn with_diff_options(mut self, options: DiffOptions) -> Self {
        self.diff = options;
        self
    }

    /// Set the output directory
    pub fn with_out_dir(mut self, out_dir: PathBuf) -> Self {
        self.out_dir = out_dir;
        self
    }

    /// Set which reports to write
    pub fn with_formats(mut self, formats: Vec<ReportFormat>) -> Self {
        self.formats = formats;
        self
    }
}
