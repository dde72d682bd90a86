//! Self-contained HTML viewer

use std::io::Write;

use anyhow::Result;
use tera::{Context, Tera};

use crate::diff::DiffResult;

use super::json::to_json_string;
use super::OutputFormatter;

/// HTML report output
pub struct HtmlOutput;

impl HtmlOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep embedded JSON from closing the surrounding script element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}

impl OutputFormatter for HtmlOutput {
    fn render(&self, diff: &DiffResult, writer: &mut dyn Write) -> Result<()> {
        let mut context = Context::new();
        context.insert("left_name", &diff.left_name);
        context.insert("right_name", &diff.right_name);
        context.insert("keys", &diff.keys.join(", "));
        context.insert("stats", &diff.stats);
        context.insert("duplicate_keys_left", &diff.duplicate_keys_left);
        context.insert("duplicate_keys_right", &diff.duplicate_keys_right);
        context.insert("data", &script_safe(&to_json_string(diff, false)?));

        let html = Tera::one_off(TEMPLATE, &context, true)?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>quietdiff: {{ left_name }} → {{ right_name }}</title>
  <style>
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 20px; background: #f6f8fa; color: #24292f; }
    .header { background: #24292f; color: #fff; padding: 16px 24px; border-radius: 6px; margin-bottom: 20px; }
    .header h1 { margin: 0 0 4px 0; font-size: 22px; }
    .header p { margin: 0; opacity: 0.8; }
    .summary { display: flex; gap: 12px; margin-bottom: 20px; }
    .stat { background: #fff; border: 1px solid #d0d7de; border-radius: 6px; padding: 12px 18px; min-width: 90px; }
    .stat .num { display: block; font-size: 22px; font-weight: 600; }
    .stat.added .num { color: #1a7f37; }
    .stat.removed .num { color: #cf222e; }
    .stat.changed .num { color: #9a6700; }
    .section { background: #fff; border: 1px solid #d0d7de; border-radius: 6px; padding: 16px; margin-bottom: 16px; }
    .section h2 { margin-top: 0; font-size: 16px; }
    .warning { border-color: #d4a72c; background: #fff8c5; }
    table { border-collapse: collapse; width: 100%; font-size: 13px; }
    th, td { border: 1px solid #d0d7de; padding: 4px 8px; text-align: left; vertical-align: top; }
    th { background: #f6f8fa; }
    td.old { background: #ffebe9; }
    td.new { background: #dafbe1; }
    input { padding: 6px 8px; width: 300px; margin-bottom: 16px; border: 1px solid #d0d7de; border-radius: 6px; }
  </style>
</head>
<body>
  <div class="header">
    <h1>quietdiff</h1>
    <p>{{ left_name }} → {{ right_name }} · keys: {{ keys }}</p>
  </div>

  <div class="summary">
    <div class="stat added"><span class="num">+{{ stats.rows_added }}</span>added</div>
    <div class="stat removed"><span class="num">-{{ stats.rows_removed }}</span>removed</div>
    <div class="stat changed"><span class="num">~{{ stats.rows_changed }}</span>changed</div>
    <div class="stat"><span class="num">{{ stats.left_row_count }} → {{ stats.right_row_count }}</span>rows</div>
  </div>

  {% if duplicate_keys_left or duplicate_keys_right %}
  <div class="section warning">
    <h2>Duplicate keys</h2>
    {% if duplicate_keys_left %}<p>{{ left_name }}: {{ duplicate_keys_left | join(sep=", ") }}</p>{% endif %}
    {% if duplicate_keys_right %}<p>{{ right_name }}: {{ duplicate_keys_right | join(sep=", ") }}</p>{% endif %}
  </div>
  {% endif %}

  <input id="filter" type="search" placeholder="Filter by key">
  <div id="sections"></div>

  <script id="diff-data" type="application/json">{{ data | safe }}</script>
  <script>
    (function () {
      var diff = JSON.parse(document.getElementById("diff-data").textContent);
      var root = document.getElementById("sections");

      function text(v) { return v === null || v === undefined ? "" : String(v); }

      function el(tag, cls, content) {
        var node = document.createElement(tag);
        if (cls) node.className = cls;
        if (content !== undefined) node.textContent = content;
        return node;
      }

      function section(title, rows, render) {
        var box = el("div", "section");
        box.appendChild(el("h2", null, title + " (" + rows.length + ")"));
        var table = el("table");
        render(table, rows);
        box.appendChild(table);
        root.appendChild(box);
      }

      function rowTable(side) {
        return function (table, rows) {
          var head = el("tr");
          head.appendChild(el("th", null, "key"));
          var columns = [];
          rows.forEach(function (r) {
            Object.keys(r[side].values).forEach(function (c) {
              if (columns.indexOf(c) < 0) columns.push(c);
            });
          });
          columns.forEach(function (c) { head.appendChild(el("th", null, c)); });
          table.appendChild(head);
          rows.forEach(function (r) {
            var tr = el("tr");
            tr.dataset.key = r.key;
            tr.appendChild(el("td", null, r.key));
            columns.forEach(function (c) { tr.appendChild(el("td", null, text(r[side].values[c]))); });
            table.appendChild(tr);
          });
        };
      }

      function changeTable(table, rows) {
        var head = el("tr");
        ["key", "column", "old", "new"].forEach(function (h) { head.appendChild(el("th", null, h)); });
        table.appendChild(head);
        rows.forEach(function (r) {
          var cells = r.changes.length ? r.changes : [{ column: "", old_value: "", new_value: "" }];
          cells.forEach(function (c) {
            var tr = el("tr");
            tr.dataset.key = r.key;
            tr.appendChild(el("td", null, r.key));
            tr.appendChild(el("td", null, c.column));
            tr.appendChild(el("td", "old", text(c.old_value)));
            tr.appendChild(el("td", "new", text(c.new_value)));
            table.appendChild(tr);
          });
        });
      }

      section("Added rows", diff.added, rowTable("new_row"));
      section("Removed rows", diff.removed, rowTable("old_row"));
      section("Changed rows", diff.changed, changeTable);

      document.getElementById("filter").addEventListener("input", function (e) {
        var needle = e.target.value.toLowerCase();
        root.querySelectorAll("tr[data-key]").forEach(function (tr) {
          tr.style.display = tr.dataset.key.toLowerCase().indexOf(needle) >= 0 ? "" : "none";
        });
      });
    })();
  </script>
</body>
</html>
"#;
