use serde_json::Value;

use super::format_scalar;

/// Print just the key answer value from the output.
///
/// Looks for the headline figure of each command in priority order, first
/// in the result itself and then in its `summary`.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "path",
        "monthly_payment",
        "payoff_period",
        "total_interest",
    ];

    let scopes = [Some(result_obj), result_obj.get("summary")];
    for scope in scopes.into_iter().flatten() {
        if let Value::Object(map) = scope {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        println!("{}", format_scalar(val));
                        return;
                    }
                }
            }
        }
    }

    // Chart series: the final cumulative total
    if let Some(last) = result_obj
        .get("points")
        .and_then(Value::as_array)
        .and_then(|p| p.last())
    {
        if let Some(total) = last.get("cumulative_total") {
            println!("{}", format_scalar(total));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
