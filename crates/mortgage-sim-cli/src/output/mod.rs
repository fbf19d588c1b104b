pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

/// Render a JSON value as a single cell. Decimals arrive as strings.
pub(crate) fn scalar(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|v| scalar(v, null))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Column headers taken from the first object of a row set.
pub(crate) fn headers(rows: &[Value]) -> Option<Vec<String>> {
    match rows.first() {
        Some(Value::Object(first)) => Some(first.keys().cloned().collect()),
        _ => None,
    }
}

/// Cells of `row` in `headers` order.
pub(crate) fn cells(row: &Value, headers: &[String], null: &str) -> Vec<String> {
    headers
        .iter()
        .map(|h| row.get(h.as_str()).map(|v| scalar(v, null)).unwrap_or_default())
        .collect()
}
