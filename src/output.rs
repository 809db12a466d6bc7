//! Terminal rendering of records

use crate::resource::{Property, PropertyType, Record};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// Widest a table column may grow before values are truncated
const MAX_COLUMN_WIDTH: usize = 40;

/// Render records as a plain-text table, one column per property
pub fn render_table(columns: &[Property], records: &[Record]) -> String {
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| truncate(&display_value(record.get(col.path()), col.kind())))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.path().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| c.path().to_uppercase()).collect();
    push_row(&mut out, &header, &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, row: &[String], widths: &[usize]) {
    let line: Vec<String> = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_COLUMN_WIDTH {
        return text.to_string();
    }
    let kept: String = text.chars().take(MAX_COLUMN_WIDTH - 3).collect();
    format!("{}...", kept)
}

/// Display text for one field value
pub fn display_value(value: Option<&Value>, kind: &PropertyType) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => match kind {
            PropertyType::Datetime | PropertyType::Date => format_timestamp_short(s),
            _ => s.clone(),
        },
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(arr)) => format!("[{} items]", arr.len()),
        Some(Value::Object(_)) => "[object]".to_string(),
    }
}

/// Format timestamp to `YYYY-MM-DD HH:MM`, or the date part if unparseable
fn format_timestamp_short(timestamp: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    timestamp.chars().take(10).collect()
}
