use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cells, headers, scalar};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Array(rows) => print_rows(rows),
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_fields(result);
                print_envelope_notes(map);
            }
            Some(Value::Array(rows)) => {
                print_rows(rows);
                print_envelope_notes(map);
            }
            _ => print_fields(map),
        },
        _ => println!("{}", value),
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &scalar(val, "null")]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }
    let Some(header) = headers(rows) else {
        for item in rows {
            println!("{}", scalar(item, "null"));
        }
        return;
    };
    let mut builder = Builder::default();
    builder.push_record(&header);
    for row in rows {
        builder.push_record(cells(row, &header, "null"));
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
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
