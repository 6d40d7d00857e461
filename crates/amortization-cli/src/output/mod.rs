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

/// The tabular part of a result: schedule `rows` or chart `points`.
pub(crate) fn series_of(result: &Map<String, Value>) -> Option<&Vec<Value>> {
    ["rows", "points"]
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array))
}

/// Column names across all objects, in first-seen order.
///
/// Schedule rows omit `one_time_payment` when none was applied, so the
/// first row alone does not always carry every column.
pub(crate) fn column_names(items: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for item in items {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    headers
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
