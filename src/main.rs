//! quietdiff - Key-based diff for tabular data

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use quietdiff::config::{Config, DiffOptions, ReportFormat, DEFAULT_FUZZY_THRESHOLD};
use quietdiff::diff::compute_diff;
use quietdiff::output::{render_to_stdout, write_reports};
use quietdiff::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliReportFormat {
    Json,
    Csv,
    Html,
}

impl From<CliReportFormat> for ReportFormat {
    fn from(f: CliReportFormat) -> Self {
        match f {
            CliReportFormat::Json => ReportFormat::Json,
            CliReportFormat::Csv => ReportFormat::Csv,
            CliReportFormat::Html => ReportFormat::Html,
        }
    }
}

/// Compare two tables (CSV, Excel) by key columns
#[derive(Parser, Debug)]
#[command(name = "quietdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Left (old) input file (.csv or .xlsx)
    left: PathBuf,

    /// Right (new) input file (.csv or .xlsx)
    right: PathBuf,

    /// Sheet to read from the left file
    #[arg(long)]
    sheet_left: Option<String>,

    /// Sheet to read from the right file
    #[arg(long)]
    sheet_right: Option<String>,

    /// Key column(s) for row matching (repeatable or comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    key: Vec<String>,

    /// Compare only these columns (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    include: Vec<String>,

    /// Ignore these columns (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Tolerance for numeric comparisons (e.g., 0.01)
    #[arg(long, default_value_t = 0.0)]
    tolerance: f64,

    /// Re-pair removed/added rows whose keys are textually similar
    #[arg(long)]
    fuzzy: bool,

    /// Minimum key similarity for a fuzzy match
    #[arg(long, default_value_t = DEFAULT_FUZZY_THRESHOLD)]
    fuzzy_threshold: f64,

    /// Directory for report files
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Reports to write (default: all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    format: Vec<CliReportFormat>,

    /// Do not print the summary to stdout
    #[arg(long)]
    no_summary: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut options = DiffOptions::new(&self.key)
            .with_tolerance(self.tolerance)
            .with_fuzzy(self.fuzzy)
            .with_fuzzy_threshold(self.fuzzy_threshold);
        if !self.include.is_empty() {
            options = options.with_include_columns(&self.include);
        }
        if !self.ignore.is_empty() {
            options = options.with_ignore_columns(&self.ignore);
        }

        let formats = if self.format.is_empty() {
            ReportFormat::ALL.to_vec()
        } else {
            self.format.into_iter().map(ReportFormat::from).collect()
        };

        let mut config = Config::new(self.left, self.right)
            .with_diff_options(options)
            .with_out_dir(self.out_dir)
            .with_formats(formats);
        config.sheet_left = self.sheet_left;
        config.sheet_right = self.sheet_right;
        config.summary = !self.no_summary;
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    match run(cli.into_config()) {
        Ok(has_changes) => {
            if has_changes {
                ExitCode::from(1) // Differences found
            } else {
                ExitCode::SUCCESS // No differences
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(config: Config) -> Result<bool> {
    let factory = ParserFactory::new();

    let (left, right) = rayon::join(
        || {
            factory
                .parse(&config.left_file, config.sheet_left.as_deref())
                .with_context(|| {
                    format!("Failed to parse left file: {}", config.left_file.display())
                })
        },
        || {
            factory
                .parse(&config.right_file, config.sheet_right.as_deref())
                .with_context(|| {
                    format!("Failed to parse right file: {}", config.right_file.display())
                })
        },
    );
    let (left, right) = (left?, right?);

    let diff = compute_diff(&left, &right, &config.diff)?;

    write_reports(&diff, &config.out_dir, &config.formats)?;

    if config.summary {
        render_to_stdout(&diff)?;
        println!();
        println!("Reports written to {}", config.out_dir.display());
    }

    Ok(diff.has_changes())
}
