pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-print JSON to stdout.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Result slots of a computed valuation, in display order.
const METHOD_SLOTS: [(&str, &str); 3] = [
    ("revenue_multiple", "EV/Revenue"),
    ("ebitda_multiple", "EV/EBITDA"),
    ("earnings_multiple", "P/E"),
];

/// One valuation method flattened to display strings.
pub(crate) struct MethodRow {
    pub method: &'static str,
    pub status: String,
    pub median_multiple: String,
    pub range: String,
    pub enterprise_value: String,
    pub equity_value: String,
    pub share_price: String,
}

/// The `detail` of a computed valuation inside the output envelope.
pub(crate) fn computed_detail(value: &Value) -> Option<&Map<String, Value>> {
    let result = value.get("result")?;
    if result.get("outcome")?.as_str()? != "computed" {
        return None;
    }
    result.get("detail")?.as_object()
}

/// Parallel error / suggestion lists, from the envelope or a bare failure.
pub(crate) fn failure_lists(value: &Value) -> Option<(Vec<String>, Vec<String>)> {
    let failure = match value.get("result") {
        Some(result) if result.get("outcome").and_then(Value::as_str) == Some("failed") => {
            result.get("detail")?
        }
        _ => value,
    };
    let errors = strings(failure.get("errors")?)?;
    let suggestions = strings(failure.get("suggestions")?)?;
    Some((errors, suggestions))
}

pub(crate) fn method_rows(detail: &Map<String, Value>) -> Vec<MethodRow> {
    METHOD_SLOTS
        .iter()
        .filter_map(|&(key, label)| {
            let slot = detail.get(key)?;
            let status = slot.get("status")?.as_str()?.to_string();
            let inner = slot.get("detail")?;
            let row = if status == "computed" {
                let multiple = inner.get("multiple");
                MethodRow {
                    method: label,
                    status,
                    median_multiple: text(multiple.and_then(|m| m.get("median_multiple"))),
                    range: text(multiple.and_then(|m| m.get("range"))),
                    enterprise_value: text(inner.get("enterprise_value")),
                    equity_value: text(inner.get("equity_value")),
                    share_price: text(inner.get("share_price")),
                }
            } else {
                MethodRow {
                    method: label,
                    status: format!("{} ({})", status, skip_reason(inner)),
                    median_multiple: String::new(),
                    range: String::new(),
                    enterprise_value: String::new(),
                    equity_value: String::new(),
                    share_price: String::new(),
                }
            };
            Some(row)
        })
        .collect()
}

fn skip_reason(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.replace('_', " "),
        Value::Object(map) => {
            if let Some(d) = map.get("non_positive_driver") {
                format!(
                    "{} not positive: {}",
                    text(d.get("driver")),
                    text(d.get("value"))
                )
            } else if let Some(o) = map.get("arithmetic_overflow") {
                format!("{} out of range", text(o.get("quantity")))
            } else {
                serde_json::to_string(detail).unwrap_or_default()
            }
        }
        other => text(Some(other)),
    }
}

fn strings(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()
        .map(|arr| arr.iter().map(|v| text(Some(v))).collect())
}

/// Scalar to display string; missing and null become empty.
pub(crate) fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> Value {
        json!({
            "result": {
                "outcome": "computed",
                "detail": {
                    "revenue_multiple": {
                        "status": "computed",
                        "detail": {
                            "method": "ev_revenue",
                            "multiple": {"median_multiple": "2.8", "range": "2.5x - 3.0x"},
                            "enterprise_value": "2800000000",
                            "equity_value": "2550000000",
                            "share_price": "255000"
                        }
                    },
                    "ebitda_multiple": {
                        "status": "skipped",
                        "detail": {"non_positive_driver": {"driver": "ebitda", "value": "0"}}
                    },
                    "earnings_multiple": {
                        "status": "skipped",
                        "detail": {"arithmetic_overflow": {"quantity": "share_price"}}
                    },
                    "summary": {"status": "priced"}
                }
            },
            "warnings": []
        })
    }

    #[test]
    fn test_method_rows_from_envelope() {
        let v = envelope();
        let rows = method_rows(computed_detail(&v).unwrap());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].method, "EV/Revenue");
        assert_eq!(rows[0].share_price, "255000");
        assert_eq!(rows[0].range, "2.5x - 3.0x");
        assert_eq!(rows[1].status, "skipped (ebitda not positive: 0)");
        assert_eq!(rows[2].status, "skipped (share_price out of range)");
        assert!(rows[2].share_price.is_empty());
    }

    #[test]
    fn test_plain_skip_reason_text() {
        assert_eq!(skip_reason(&json!("no_peer_values")), "no peer values");
    }

    #[test]
    fn test_failure_lists_from_envelope_and_bare() {
        let env = json!({
            "result": {
                "outcome": "failed",
                "detail": {"errors": ["e1"], "suggestions": ["s1"], "issues": []}
            }
        });
        assert_eq!(
            failure_lists(&env),
            Some((vec!["e1".to_string()], vec!["s1".to_string()]))
        );

        let bare = json!({"success": false, "errors": ["e"], "suggestions": ["s"]});
        assert!(failure_lists(&bare).is_some());
        assert!(failure_lists(&envelope()).is_none());
    }
}
