use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{computed_detail, failure_lists, method_rows, text};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(detail) = computed_detail(value) {
        print_valuation(detail);
        print_envelope_notes(value);
    } else if let Some((errors, suggestions)) = failure_lists(value) {
        print_failure(&errors, &suggestions);
    } else {
        match value {
            Value::Object(map) => print_flat_object(map),
            _ => println!("{}", value),
        }
    }
}

fn print_valuation(detail: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record([
        "Method",
        "Status",
        "Median multiple",
        "Peer range",
        "Enterprise value",
        "Equity value",
        "Price / share",
    ]);
    for row in method_rows(detail) {
        builder.push_record([
            row.method.to_string(),
            row.status,
            row.median_multiple,
            row.range,
            row.enterprise_value,
            row.equity_value,
            row.share_price,
        ]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Object(summary)) = detail.get("summary") {
        println!("\nSummary:");
        print_flat_object(summary);
    }
}

fn print_failure(errors: &[String], suggestions: &[String]) {
    let mut builder = Builder::default();
    builder.push_record(["#", "Error", "Suggestion"]);
    for (i, (error, suggestion)) in errors.iter().zip(suggestions).enumerate() {
        builder.push_record([(i + 1).to_string(), error.clone(), suggestion.clone()]);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Value) {
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

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Null => "null".to_string(),
        other => text(Some(other)),
    }
}
