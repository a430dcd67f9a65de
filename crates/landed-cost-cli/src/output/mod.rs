pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys (`breakdown.landed_cost`).
/// Arrays are kept as leaf values.
pub fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&full, inner, out),
            _ => out.push((full, val.clone())),
        }
    }
}

/// Split a result object into its `lines` rows (if any) and the remaining
/// summary fields.
pub fn split_lines(result: &Map<String, Value>) -> (Option<&Vec<Value>>, Map<String, Value>) {
    let lines = result.get("lines").and_then(Value::as_array);
    let summary = result
        .iter()
        .filter(|(k, _)| lines.is_none() || k.as_str() != "lines")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (lines, summary)
}

/// Column headers across heterogeneous rows, in first-seen order.
pub fn row_headers(rows: &[Vec<(String, Value)>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for (key, _) in row {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

/// Render a scalar for a table cell or CSV field.
pub fn format_value(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        Value::Array(arr) => arr
            .iter()
            .map(|v| format_value(v, null))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
