use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_value, row_headers, split_lines};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_fields(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let (lines, summary) = split_lines(result);
    if let Some(lines) = lines {
        print_rows(lines);
        println!();
    }
    print_fields(&summary);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(map) {
        builder.push_record([key, format_value(&val, "null")]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let rows: Vec<Vec<(String, Value)>> = arr
        .iter()
        .filter_map(Value::as_object)
        .map(flatten)
        .collect();
    if rows.is_empty() {
        for item in arr {
            println!("{}", format_value(item, "null"));
        }
        return;
    }

    let headers = row_headers(&rows);
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in &rows {
        builder.push_record(headers.iter().map(|h| {
            row.iter()
                .find(|(k, _)| k == h)
                .map(|(_, v)| format_value(v, ""))
                .unwrap_or_default()
        }));
    }
    println!("{}", Table::from(builder));
}
