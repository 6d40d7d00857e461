use std::str::FromStr;

use amortization_core::{round_currency, CURRENCY_DP};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{column_names, format_scalar, series_of};

/// Format output as tables using the tabled crate.
///
/// Scalar and nested-object fields go in a Field/Value table; a schedule's
/// rows or a chart's points get their own table underneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_fields(map),
        },
        Value::Array(arr) => print_series(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut any_field = false;
    for (key, val) in result {
        match val {
            Value::Array(_) => {}
            Value::Object(nested) => {
                for (sub, v) in nested {
                    builder.push_record([format!("{key}.{sub}"), format_cell(v)]);
                    any_field = true;
                }
            }
            _ => {
                builder.push_record([key.clone(), format_cell(val)]);
                any_field = true;
            }
        }
    }
    if any_field {
        println!("{}", Table::from(builder));
    }

    if let Some(series) = series_of(result) {
        println!();
        print_series(series);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
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
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_series(items: &[Value]) {
    if items.is_empty() {
        println!("(empty)");
        return;
    }

    let headers = column_names(items);
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in items {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

/// Decimal strings are shown to the cent; everything else as-is.
fn format_cell(value: &Value) -> String {
    if let Value::String(s) = value {
        if let Ok(amount) = Decimal::from_str(s) {
            let mut shown = round_currency(amount);
            shown.rescale(CURRENCY_DP);
            return shown.to_string();
        }
    }
    format_scalar(value)
}
