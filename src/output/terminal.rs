//! Colored terminal summary

use std::io::{IsTerminal, Write};

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Color, ColorChoice, ColorSpec, NoColor, StandardStream, WriteColor};

use crate::diff::cell_diff::percentage_change;
use crate::diff::{DiffResult, RowChange};

use super::OutputFormatter;

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
}

impl TerminalOutput {
    pub fn new() -> Self {
        let color_choice = if std::io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self { color_choice }
    }

    pub fn with_color_choice(color_choice: ColorChoice) -> Self {
        Self { color_choice }
    }

    /// Print the summary to stdout
    pub fn print(&self, diff: &DiffResult) -> Result<()> {
        let mut stdout = StandardStream::stdout(self.color_choice);
        self.write_summary(diff, &mut stdout)
    }

    /// Write the full summary to a color-capable writer
    pub fn write_summary(&self, diff: &DiffResult, writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(
            writer,
            "quietdiff: {} → {} (keys: {})",
            diff.left_name,
            diff.right_name,
            diff.keys.join(", ")
        )?;
        self.write_counts(diff, writer)?;
        self.write_duplicates(&diff.left_name, &diff.duplicate_keys_left, writer)?;
        self.write_duplicates(&diff.right_name, &diff.duplicate_keys_right, writer)?;
        self.write_keys("Added", '+', Color::Green, &diff.added, writer)?;
        self.write_keys("Removed", '-', Color::Red, &diff.removed, writer)?;
        self.write_changed(&diff.changed, writer)?;
        Ok(())
    }

    fn write_counts(&self, diff: &DiffResult, writer: &mut dyn WriteColor) -> Result<()> {
        let stats = &diff.stats;
        write!(writer, "Summary: ")?;
        colored(writer, Color::Green, &format!("+{} added", stats.rows_added))?;
        write!(writer, ", ")?;
        colored(writer, Color::Red, &format!("-{} removed", stats.rows_removed))?;
        write!(writer, ", ")?;
        colored(writer, Color::Yellow, &format!("~{} changed", stats.rows_changed))?;
        writeln!(
            writer,
            ", {} unchanged (out of {} → {} rows)",
            stats.rows_unchanged, stats.left_row_count, stats.right_row_count
        )?;
        Ok(())
    }

    fn write_duplicates(
        &self,
        table_name: &str,
        keys: &[String],
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        colored(
            writer,
            Color::Yellow,
            &format!("Warning: duplicate keys in {}: {}", table_name, keys.join(", ")),
        )?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_keys(
        &self,
        title: &str,
        marker: char,
        color: Color,
        changes: &[RowChange],
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        writeln!(writer)?;
        writeln!(writer, "{} Rows:", title)?;
        for change in changes {
            colored(writer, color, &format!("  {} {}", marker, change.key))?;
            writeln!(writer)?;
        }
        Ok(())
    }

    fn write_changed(&self, changes: &[RowChange], writer: &mut dyn WriteColor) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut builder = Builder::default();
        builder.push_record(["key", "column", "old", "new", "change"].map(String::from));
        for change in changes {
            if change.changes.is_empty() {
                builder.push_record([change.key.clone(), String::new(), String::new(), String::new(), String::new()]);
            }
            for cell in &change.changes {
                let pct = percentage_change(&cell.old_value, &cell.new_value)
                    .map(|p| format!("{:+.1}%", p))
                    .unwrap_or_default();
                builder.push_record([
                    change.key.clone(),
                    cell.column.clone(),
                    cell.old_value.display().into_owned(),
                    cell.new_value.display().into_owned(),
                    pct,
                ]);
            }
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        writeln!(writer)?;
        writeln!(writer, "Changed Rows:")?;
        writeln!(writer, "{}", table)?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn colored(writer: &mut dyn WriteColor, color: Color, text: &str) -> Result<()> {
    writer.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(writer, "{}", text)?;
    writer.reset()?;
    Ok(())
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, diff: &DiffResult, writer: &mut dyn Write) -> Result<()> {
        let mut plain = NoColor::new(writer);
        self.write_summary(diff, &mut plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffOptions;
    use crate::diff::compute_diff;
    use crate::model::{Row, Table};

    #[test]
    fn test_plain_summary() {
        let left = Table::new(
            "a.csv",
            &["id", "total"],
            vec![
                Row::from_pairs([("id", "1"), ("total", "100")]),
                Row::from_pairs([("id", "2"), ("total", "5")]),
            ],
        )
        .unwrap();
        let right = Table::new(
            "b.csv",
            &["id", "total"],
            vec![
                Row::from_pairs([("id", "1"), ("total", "150")]),
                Row::from_pairs([("id", "3"), ("total", "5")]),
            ],
        )
        .unwrap();
        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"])).unwrap();

        let mut buf = Vec::new();
        TerminalOutput::new().render(&diff, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Summary: +1 added, -1 removed, ~1 changed, 0 unchanged"));
        assert!(text.contains("  + 3"));
        assert!(text.contains("  - 2"));
        assert!(text.contains("+50.0%"));
    }
}
