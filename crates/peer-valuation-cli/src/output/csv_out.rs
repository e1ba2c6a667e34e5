use serde_json::Value;
use std::io;

use super::{computed_detail, failure_lists, method_rows, text};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(detail) = computed_detail(value) {
        // One row per method
        let _ = wtr.write_record([
            "method",
            "status",
            "median_multiple",
            "range",
            "enterprise_value",
            "equity_value",
            "share_price",
        ]);
        for row in method_rows(detail) {
            let _ = wtr.write_record([
                row.method.to_string(),
                row.status,
                row.median_multiple,
                row.range,
                row.enterprise_value,
                row.equity_value,
                row.share_price,
            ]);
        }
    } else if let Some((errors, suggestions)) = failure_lists(value) {
        let _ = wtr.write_record(["error", "suggestion"]);
        for (error, suggestion) in errors.iter().zip(&suggestions) {
            let _ = wtr.write_record([error, suggestion]);
        }
    } else if let Value::Object(map) = value {
        // Two-column CSV: field, value
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &text(Some(val))]);
        }
    } else {
        let _ = wtr.write_record([&text(Some(value))]);
    }

    let _ = wtr.flush();
}
