use serde_json::Value;
use std::io;

use super::{cell, holdings, HOLDING_COLUMNS};

/// Write output as CSV to stdout.
///
/// An optimisation report becomes one row per holding; anything else is
/// written as rows of an array or as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(rows) = holdings(value) {
        write_rows(&mut wtr, rows, &HOLDING_COLUMNS);
    } else {
        match value {
            Value::Object(map) => {
                let source = match map.get("result") {
                    Some(Value::Object(result)) => result,
                    _ => map,
                };
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in source {
                    let _ = wtr.write_record([key.as_str(), &cell(val)]);
                }
            }
            Value::Array(arr) => write_array_csv(&mut wtr, arr),
            _ => {
                let _ = wtr.write_record([&cell(value)]);
            }
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&cell(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    write_rows(wtr, arr, &headers);
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value], headers: &[&str]) {
    let _ = wtr.write_record(headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
