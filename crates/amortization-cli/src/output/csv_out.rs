use serde_json::{Map, Value};
use std::io;

use super::{column_names, format_scalar, series_of};

/// Write output as CSV to stdout.
///
/// Schedules and chart series print one record per row/point; other
/// results print as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match series_of(result) {
                Some(series) => write_series(&mut wtr, series),
                None => write_fields(&mut wtr, result),
            },
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(arr) => write_series(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_scalar(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
    }
}

fn write_series<W: io::Write>(wtr: &mut csv::Writer<W>, items: &[Value]) {
    if items.is_empty() {
        return;
    }

    let headers = column_names(items);
    let _ = wtr.write_record(&headers);
    for item in items {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
