//! Rendering of records and totals as JSON, markdown tables, or CSV.

use crate::commands::OutputFormat;
use crate::error::Res;
use crate::model::{value_text, Record};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Debug, Display, Formatter};

/// Command result rows in the requested output format.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// JSON value, usually an array of objects.
    Json(Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({v:?})"),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => write!(f, "{s}"),
                Err(_) => write!(f, "{v}"),
            },
            Rows::Table(s) | Rows::Csv(s) => write!(f, "{s}"),
        }
    }
}

/// The columns to print: `configured` if it is non-empty, otherwise every key in the order it is
/// first seen across `records`.
pub(super) fn columns(records: &[Record], configured: &[String]) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }
    let mut out: Vec<String> = Vec::new();
    for record in records {
        for key in record.fields().keys() {
            if !out.iter().any(|c| c == key) {
                out.push(key.clone());
            }
        }
    }
    out
}

/// Renders `records` in `format`. JSON output keeps the whole record, the other formats show only
/// `columns`.
pub(super) fn render_records(
    records: &[Record],
    columns: &[String],
    format: OutputFormat,
) -> Res<Rows> {
    match format {
        OutputFormat::Json => Ok(Rows::Json(
            serde_json::to_value(records).context("Unable to serialize records")?,
        )),
        OutputFormat::Table | OutputFormat::Csv => {
            let rows: Vec<Vec<String>> = records
                .iter()
                .map(|r| {
                    columns
                        .iter()
                        .map(|c| r.get(c).map(value_text).unwrap_or_default())
                        .collect()
                })
                .collect();
            render_grid(columns, &rows, format)
        }
    }
}

/// Renders a header and string rows as a table or CSV. JSON is not a grid format and is rendered
/// as an array of objects keyed by the header.
pub(super) fn render_grid(
    header: &[String],
    rows: &[Vec<String>],
    format: OutputFormat,
) -> Res<Rows> {
    match format {
        OutputFormat::Table => Ok(Rows::Table(markdown(header, rows))),
        OutputFormat::Csv => Ok(Rows::Csv(csv_string(header, rows)?)),
        OutputFormat::Json => Ok(Rows::Json(Value::Array(
            rows.iter()
                .map(|row| {
                    Value::Object(
                        header
                            .iter()
                            .cloned()
                            .zip(row.iter().cloned().map(Value::String))
                            .collect(),
                    )
                })
                .collect(),
        ))),
    }
}

fn markdown(header: &[String], rows: &[Vec<String>]) -> String {
    if header.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    out.push_str(&markdown_line(header.iter().map(String::as_str)));
    out.push('\n');
    out.push_str(&markdown_line(header.iter().map(|_| "---")));
    for row in rows {
        out.push('\n');
        out.push_str(&markdown_line(row.iter().map(String::as_str)));
    }
    out
}

fn markdown_line<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let cells: Vec<String> = cells.map(markdown_cell).collect();
    format!("| {} |", cells.join(" | "))
}

fn markdown_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn csv_string(header: &[String], rows: &[Vec<String>]) -> Res<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !header.is_empty() {
        writer.write_record(header).context("Unable to write CSV header")?;
    }
    for row in rows {
        writer.write_record(row).context("Unable to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Record> {
        serde_json::from_value(json!([
            {"id": "c1", "type": "Rent", "amount": 1200, "bank": {"id": "b1"}},
            {"id": "c2", "note": "a | b\nc", "type": "Sale"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_columns_first_seen_union() {
        assert_eq!(
            columns(&records(), &[]),
            ["id", "type", "amount", "bank", "note"]
        );
        let configured = vec!["type".to_string()];
        assert_eq!(columns(&records(), &configured), ["type"]);
    }

    #[test]
    fn test_render_table_escapes_cells() {
        let cols = vec!["id".to_string(), "note".to_string()];
        let rows = render_records(&records(), &cols, OutputFormat::Table).unwrap();
        let expected = "| id | note |\n| --- | --- |\n| c1 |  |\n| c2 | a \\| b c |";
        assert_eq!(rows, Rows::Table(expected.to_string()));
    }

    #[test]
    fn test_render_csv_quotes_and_nested_values() {
        let cols = vec!["id".to_string(), "bank".to_string(), "amount".to_string()];
        let rows = render_records(&records(), &cols, OutputFormat::Csv).unwrap();
        let expected = "id,bank,amount\nc1,\"{\"\"id\"\":\"\"b1\"\"}\",1200\nc2,,\n";
        assert_eq!(rows.to_string(), expected);
    }

    #[test]
    fn test_render_json_keeps_whole_record() {
        let rows = render_records(&records(), &["id".to_string()], OutputFormat::Json).unwrap();
        let Rows::Json(Value::Array(items)) = rows else {
            panic!("expected a JSON array");
        };
        assert_eq!(items[0]["amount"], json!(1200));
    }

    #[test]
    fn test_render_grid_json() {
        let header = vec!["key".to_string(), "total".to_string()];
        let rows = vec![vec!["A".to_string(), "60.00".to_string()]];
        let out = render_grid(&header, &rows, OutputFormat::Json).unwrap();
        assert_eq!(out, Rows::Json(json!([{"key": "A", "total": "60.00"}])));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(
            render_records(&[], &[], OutputFormat::Table).unwrap(),
            Rows::Table(String::new())
        );
    }
}
