use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::stats::SampleStatistics;
use crate::types::{Money, Shares};

/// Whether any method produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    Priced,
    NoMethodsComputed,
}

/// Reconciliation of the per-method share prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub status: SummaryStatus,
    pub methods_computed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_share_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_share_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_share_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_share_price: Option<Money>,
    /// "200,000 - 255,000", or "n/a" when nothing was priced
    pub valuation_range: String,
    /// `None` only when `total_debt - cash` leaves the `Decimal` range
    pub net_debt: Option<Money>,
    pub shares_outstanding: Shares,
}

impl ValuationSummary {
    pub fn has_prices(&self) -> bool {
        self.status == SummaryStatus::Priced
    }
}

/// Combine zero to three per-method prices.
///
/// Never fails: with no prices the summary carries `NoMethodsComputed` and
/// no statistics.
pub fn aggregate(
    share_prices: &[Money],
    total_debt: Money,
    cash: Money,
    shares_outstanding: Shares,
) -> ValuationSummary {
    let net_debt = total_debt.checked_sub(cash);

    match SampleStatistics::from_values(share_prices) {
        Some(stats) => ValuationSummary {
            status: SummaryStatus::Priced,
            methods_computed: stats.count,
            average_share_price: stats.mean,
            median_share_price: Some(stats.median),
            min_share_price: Some(stats.low),
            max_share_price: Some(stats.high),
            valuation_range: format!(
                "{} - {}",
                format_grouped(stats.low),
                format_grouped(stats.high)
            ),
            net_debt,
            shares_outstanding,
        },
        None => ValuationSummary {
            status: SummaryStatus::NoMethodsComputed,
            methods_computed: 0,
            average_share_price: None,
            median_share_price: None,
            min_share_price: None,
            max_share_price: None,
            valuation_range: "n/a".into(),
            net_debt,
            shares_outstanding,
        },
    }
}

/// Round to whole units (half to even) and group thousands with commas.
pub fn format_grouped(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}
