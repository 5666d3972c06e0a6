//! Output rendering: JSON, aligned tables, CSV and the key/value tree.
//!
//! Renderers return strings; the caller decides where they go. Section rules
//! and notices are written to stderr so stdout stays pipeable.

use crate::domain::DomainError;
use clap::ValueEnum;
use crossterm::style::{Color, Stylize};
use serde_json::Value;
use std::io::{Write, stderr};

const RULE_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Tree,
    Csv,
}

/// Rows and headers ready for table or CSV output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Print a titled rule to stderr, e.g. `── Users ─────`.
pub fn section(title: &str) {
    let head = format!("── {title} ");
    let fill = RULE_WIDTH.saturating_sub(head.chars().count());
    let line = format!("{head}{}", "─".repeat(fill));
    let _ = writeln!(stderr(), "{}", line.with(Color::Cyan).bold());
}

pub fn notice(message: &str) {
    let _ = writeln!(stderr(), "{}", message.with(Color::Yellow));
}

pub fn success(message: &str) {
    let _ = writeln!(stderr(), "{} {}", "OK".with(Color::Green).bold(), message);
}

pub fn failure(message: &str) {
    let _ = writeln!(stderr(), "{} {}", "Error:".with(Color::Red).bold(), message);
}

/// Text of a scalar cell. `null` is empty, nested values are compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

pub fn render_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Generic grid: rows are the `value` array, a list, or the single object;
/// columns are the union of keys in first-seen order.
pub fn generic_grid(value: &Value) -> Grid {
    let rows: Vec<&Value> = match value {
        Value::Object(map) => match map.get("value") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        Value::Array(items) => items.iter().collect(),
        _ => vec![value],
    };

    let mut headers: Vec<String> = Vec::new();
    for row in &rows {
        match row {
            Value::Object(map) => {
                for key in map.keys() {
                    if !headers.iter().any(|h| h == key) {
                        headers.push(key.clone());
                    }
                }
            }
            _ => {
                if !headers.iter().any(|h| h == "value") {
                    headers.push("value".to_string());
                }
            }
        }
    }

    let rows = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| match row {
                    Value::Object(map) => map.get(h).map(cell_text).unwrap_or_default(),
                    other if h == "value" => cell_text(other),
                    _ => String::new(),
                })
                .collect()
        })
        .collect();
    Grid { headers, rows }
}

/// Left-aligned columns separated by two spaces, with a dashed line under the header.
pub fn render_table(grid: &Grid) -> String {
    let mut widths: Vec<usize> = grid.headers.iter().map(|h| h.chars().count()).collect();
    for row in &grid.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&grid.headers)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(grid.rows.iter().map(|row| line(row)));
    out.join("\n")
}

pub fn render_csv(grid: &Grid) -> Result<String, DomainError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&grid.headers)
        .map_err(|e| DomainError::Io(format!("csv: {}", e)))?;
    for row in &grid.rows {
        writer
            .write_record(row)
            .map_err(|e| DomainError::Io(format!("csv: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Io(format!("csv: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Io(format!("csv: {}", e)))
}

/// Objects expand by key, arrays show `[len]` and expand by `[index]`,
/// scalars print `key: value`.
pub fn render_tree(value: &Value) -> String {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                push_node(key, child, 0, &mut out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                push_node(&format!("[{i}]"), child, 0, &mut out);
            }
        }
        scalar => out.push(cell_text(scalar)),
    }
    out.join("\n")
}

fn push_node(label: &str, value: &Value, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            out.push(format!("{indent}{label}"));
            for (key, child) in map {
                push_node(key, child, depth + 1, out);
            }
        }
        Value::Array(items) => {
            out.push(format!("{indent}{label} [{}]", items.len()));
            for (i, child) in items.iter().enumerate() {
                push_node(&format!("[{i}]"), child, depth + 1, out);
            }
        }
        scalar => out.push(
            format!("{indent}{label}: {}", cell_text(scalar))
                .trim_end()
                .to_string(),
        ),
    }
}
