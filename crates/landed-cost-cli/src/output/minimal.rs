use serde_json::Value;

use super::format_value;

/// Fields printed by `--output minimal`, in priority order.
const PRIORITY_KEYS: [&str; 4] = ["final_price", "total_final_price", "valid", "source"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    println!("{}", format_value(val, "null"));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val, "null"));
            return;
        }
    }

    println!("{}", format_value(result_obj, "null"));
}
