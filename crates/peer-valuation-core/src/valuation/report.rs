//! Flat report in the key layout the existing front-ends read.
//!
//! Unlike the envelope, every figure here is a JSON number: the front-ends
//! apply numeric format specs to them directly.

use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use super::engine::{ValuationOutcome, ValuationResult};
use super::validation::ValidationFailure;
use crate::types::{Money, Multiple, Shares};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipleEntry {
    #[serde(with = "rust_decimal::serde::float")]
    pub median_multiple: Multiple,
    pub range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    #[serde(with = "rust_decimal::serde::float")]
    pub average_share_price: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub median_share_price: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_share_price: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_share_price: Money,
    pub valuation_range: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_debt: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub shares_outstanding: Shares,
}

/// Figures keyed by method (`from_revenue`, `from_ebitda`, `from_pe`).
pub type MethodFigures = BTreeMap<&'static str, Money>;

/// Success: per-method maps plus a summary, which is `None` when no method
/// produced a price. Failure: errors and suggestions only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValuationReport {
    Success {
        success: bool,
        multiples: BTreeMap<&'static str, MultipleEntry>,
        #[serde(serialize_with = "figures_as_numbers")]
        enterprise_values: MethodFigures,
        #[serde(serialize_with = "figures_as_numbers")]
        equity_values: MethodFigures,
        #[serde(serialize_with = "figures_as_numbers")]
        share_prices: MethodFigures,
        summary: Option<SummaryEntry>,
    },
    Failure {
        success: bool,
        errors: Vec<String>,
        suggestions: Vec<String>,
    },
}

fn figures_as_numbers<S: Serializer>(
    figures: &MethodFigures,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(figures.iter().map(|(key, value)| (key, value.to_f64())))
}

impl ValuationResult {
    pub fn to_report(&self) -> ValuationReport {
        let mut multiples = BTreeMap::new();
        let mut enterprise_values = BTreeMap::new();
        let mut equity_values = BTreeMap::new();
        let mut share_prices = BTreeMap::new();

        for v in self.computed() {
            multiples.insert(
                v.method.multiple_key(),
                MultipleEntry {
                    median_multiple: v.multiple.median_multiple,
                    range: v.multiple.range.clone(),
                },
            );
            if let Some(ev) = v.enterprise_value {
                enterprise_values.insert(v.method.result_key(), ev);
            }
            equity_values.insert(v.method.result_key(), v.equity_value);
            share_prices.insert(v.method.result_key(), v.share_price);
        }

        let s = &self.summary;
        let summary = match (
            s.average_share_price,
            s.median_share_price,
            s.min_share_price,
            s.max_share_price,
            s.net_debt,
        ) {
            (Some(average), Some(median), Some(min), Some(max), Some(net_debt)) => {
                Some(SummaryEntry {
                    average_share_price: average,
                    median_share_price: median,
                    min_share_price: min,
                    max_share_price: max,
                    valuation_range: s.valuation_range.clone(),
                    net_debt,
                    shares_outstanding: s.shares_outstanding,
                })
            }
            _ => None,
        };

        ValuationReport::Success {
            success: true,
            multiples,
            enterprise_values,
            equity_values,
            share_prices,
            summary,
        }
    }
}

impl ValidationFailure {
    pub fn to_report(&self) -> ValuationReport {
        ValuationReport::Failure {
            success: false,
            errors: self.errors(),
            suggestions: self.suggestions(),
        }
    }
}

impl ValuationOutcome {
    pub fn to_report(&self) -> ValuationReport {
        match self {
            ValuationOutcome::Computed(r) => r.to_report(),
            ValuationOutcome::Failed(f) => f.to_report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitTag;
    use crate::valuation::engine::compute_valuation;
    use crate::valuation::inputs::{
        BalanceSheetInputs, FinancialStatementInputs, PeerMultiples, PeerRow,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn balance_sheet() -> BalanceSheetInputs {
        BalanceSheetInputs {
            total_debt: Some(dec!(300)),
            debt_unit: UnitTag::Millions,
            cash: Some(dec!(50)),
            cash_unit: UnitTag::Millions,
            shares_outstanding: Some(dec!(10)),
            shares_unit: UnitTag::Thousands,
        }
    }

    fn peers() -> PeerMultiples {
        PeerMultiples::from_rows(vec![
            PeerRow::new(dec!(2.5), dec!(12), dec!(18)),
            PeerRow::new(dec!(3.0), dec!(15), dec!(22)),
            PeerRow::new(dec!(2.8), dec!(13.5), dec!(20)),
        ])
    }

    #[test]
    fn test_success_report_keys() {
        let pl = FinancialStatementInputs::uniform(
            dec!(1000),
            dec!(200),
            dec!(100),
            UnitTag::Millions,
        );
        let outcome = compute_valuation(&pl, &balance_sheet(), &peers());
        let json = serde_json::to_value(outcome.to_report()).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["multiples"]["ev_revenue"]["range"], "2.5x - 3.0x");
        assert!(json["enterprise_values"].get("from_pe").is_none());
        assert!(json["equity_values"].get("from_pe").is_some());
        assert_eq!(json["share_prices"].as_object().unwrap().len(), 3);
        assert_eq!(json["summary"]["valuation_range"], "200,000 - 255,000");
    }

    #[test]
    fn test_report_figures_are_json_numbers() {
        let pl = FinancialStatementInputs::uniform(
            dec!(1000),
            dec!(200),
            dec!(100),
            UnitTag::Millions,
        );
        let outcome = compute_valuation(&pl, &balance_sheet(), &peers());
        let json = serde_json::to_value(outcome.to_report()).unwrap();

        assert!(json["share_prices"]["from_revenue"].is_number());
        assert_eq!(json["share_prices"]["from_revenue"].as_f64(), Some(255000.0));
        assert_eq!(json["enterprise_values"]["from_ebitda"].as_f64(), Some(2700000000.0));
        assert_eq!(json["equity_values"]["from_pe"].as_f64(), Some(2000000000.0));
        assert_eq!(json["multiples"]["ev_revenue"]["median_multiple"].as_f64(), Some(2.8));
        assert_eq!(json["summary"]["median_share_price"].as_f64(), Some(245000.0));
        assert_eq!(json["summary"]["net_debt"].as_f64(), Some(250000000.0));
        assert_eq!(json["summary"]["shares_outstanding"].as_f64(), Some(10000.0));
        assert!(json["summary"]["average_share_price"].is_number());
        // Formatted strings stay strings.
        assert!(json["multiples"]["ev_revenue"]["range"].is_string());
    }

    #[test]
    fn test_skipped_method_absent_from_maps() {
        let pl = FinancialStatementInputs::uniform(
            dec!(1000),
            Decimal::ZERO,
            dec!(-10),
            UnitTag::Millions,
        );
        let outcome = compute_valuation(&pl, &balance_sheet(), &peers());
        let json = serde_json::to_value(outcome.to_report()).unwrap();

        assert_eq!(json["multiples"].as_object().unwrap().len(), 1);
        assert!(json["share_prices"].get("from_ebitda").is_none());
        assert!(json["share_prices"].get("from_pe").is_none());
        assert_eq!(json["summary"]["min_share_price"], json["summary"]["max_share_price"]);
    }

    #[test]
    fn test_failure_report_has_only_errors() {
        let pl = FinancialStatementInputs::uniform(
            dec!(1000),
            dec!(200),
            dec!(100),
            UnitTag::Millions,
        );
        let outcome = compute_valuation(&pl, &balance_sheet(), &PeerMultiples::default());
        let json = serde_json::to_value(outcome.to_report()).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 3);
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
        assert_eq!(json["suggestions"].as_array().unwrap().len(), 1);
    }
}
