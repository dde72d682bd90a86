//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::diff::DiffResult;

use super::OutputFormatter;

/// Pretty-printed JSON output formatter
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    diff: &'a DiffResult,
}

/// Full JSON dump of a diff, stamped with the generation time
pub fn to_json_string(diff: &DiffResult, pretty: bool) -> Result<String> {
    let report = JsonReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        diff,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

impl OutputFormatter for JsonOutput {
    fn render(&self, diff: &DiffResult, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "{}", to_json_string(diff, true)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffOptions;
    use crate::diff::compute_diff;
    use crate::model::{Row, Table};

    #[test]
    fn test_json_exposes_every_field() {
        let left = Table::new(
            "a.csv",
            &["id", "v"],
            vec![
                Row::from_pairs([("id", "1"), ("v", "x")]),
                Row::from_pairs([("id", "1"), ("v", "y")]),
            ],
        )
        .unwrap();
        let right = Table::new("b.csv", &["id", "v"], vec![Row::from_pairs([("id", "1"), ("v", "z")])])
            .unwrap();
        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"])).unwrap();

        let mut buf = Vec::new();
        JsonOutput::new().render(&diff, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["left_name"], "a.csv");
        assert_eq!(value["keys"], serde_json::json!(["id"]));
        assert_eq!(value["compared_columns"], serde_json::json!(["v"]));
        assert_eq!(value["duplicate_keys_left"], serde_json::json!(["1"]));
        assert_eq!(value["changed"][0]["key"], "1");
        assert_eq!(value["changed"][0]["changes"][0]["old_value"], "x");
        assert_eq!(value["changed"][0]["changes"][0]["new_value"], "z");
        assert_eq!(value["stats"]["rows_changed"], 1);
        assert!(value["generated_at"].is_string());
    }
}
