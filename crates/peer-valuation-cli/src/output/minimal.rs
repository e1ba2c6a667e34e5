use serde_json::Value;

use super::{failure_lists, text};

/// Output fields that answer the question, in order of preference.
const PRIORITY_KEYS: [&str; 4] = ["median_share_price", "valuation_range", "normalized", "ok"];

/// Print just the key answer: the median share price for a valuation, the
/// normalized amount for a conversion, one error per line for a failure.
pub fn print_minimal(value: &Value) {
    if let Some((errors, _)) = failure_lists(value) {
        for e in errors {
            println!("{}", e);
        }
        return;
    }

    for key in PRIORITY_KEYS {
        if let Some(found) = find_key(value, key) {
            if !found.is_null() {
                println!("{}", format_minimal(found));
                return;
            }
        }
    }

    println!("{}", format_minimal(value));
}

/// Breadth-first search for `key` in nested objects.
fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut queue = vec![value];
    while !queue.is_empty() {
        let mut next = Vec::new();
        for v in queue {
            if let Value::Object(map) = v {
                if let Some(found) = map.get(key) {
                    return Some(found);
                }
                next.extend(map.values().filter(|c| c.is_object()));
            }
        }
        queue = next;
    }
    None
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => text(Some(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_nested_summary_field() {
        let v = json!({
            "result": {"outcome": "computed", "detail": {"summary": {"median_share_price": "245000"}}},
            "methodology": "x"
        });
        assert_eq!(find_key(&v, "median_share_price"), Some(&json!("245000")));
        assert_eq!(find_key(&v, "absent"), None);
    }

    #[test]
    fn test_shallow_match_wins() {
        let v = json!({"ok": true, "normalized": {"ok": false}});
        assert_eq!(find_key(&v, "ok"), Some(&json!(true)));
    }
}
