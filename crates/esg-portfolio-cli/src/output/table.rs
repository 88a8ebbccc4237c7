use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, HOLDING_COLUMNS};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_report(result, map),
            None => print_sections(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_report(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res) = result else {
        print_sections(envelope);
        return;
    };

    let mut summary = Builder::default();
    summary.push_record(["Field", "Value"]);
    for key in ["status", "objective_value", "message"] {
        if let Some(val) = res.get(key).filter(|v| !v.is_null()) {
            summary.push_record([key.to_string(), cell(val)]);
        }
    }
    println!("{}", Table::from(summary));

    if let Some(rows) = res
        .get("allocation")
        .and_then(|a| a.get("holdings"))
        .and_then(Value::as_array)
    {
        if !rows.is_empty() {
            println!("\n{}", "Holdings".bold());
            print_rows(rows, &HOLDING_COLUMNS);
        }
    }

    if let Some(Value::Object(metrics)) = res.get("metrics") {
        println!("\n{}", "Portfolio metrics".bold());
        print_flat_object(metrics);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Objects whose values are themselves objects print one table per section.
fn print_sections(map: &Map<String, Value>) {
    if !map.values().all(Value::is_object) {
        print_flat_object(map);
        return;
    }
    for (i, (name, section)) in map.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", name.bold());
        if let Value::Object(inner) = section {
            print_flat_object(inner);
        }
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    match arr.first() {
        None => println!("(empty)"),
        Some(Value::Object(first)) => {
            let headers: Vec<&str> = first.keys().map(String::as_str).collect();
            print_rows(arr, &headers);
        }
        Some(_) => {
            for item in arr {
                println!("{}", cell(item));
            }
        }
    }
}

fn print_rows(rows: &[Value], headers: &[&str]) {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
