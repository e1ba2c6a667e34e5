use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::inputs::{NormalizedFinancials, PeerColumn, PeerMultiples};
use crate::stats::SampleStatistics;
use crate::types::{Money, Multiple};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The three market-multiple methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    EvRevenue,
    EvEbitda,
    PriceEarnings,
}

impl MethodKind {
    pub const ALL: [MethodKind; 3] = [
        MethodKind::EvRevenue,
        MethodKind::EvEbitda,
        MethodKind::PriceEarnings,
    ];

    pub fn peer_column(self) -> PeerColumn {
        match self {
            MethodKind::EvRevenue => PeerColumn::EvRevenue,
            MethodKind::EvEbitda => PeerColumn::EvEbitda,
            MethodKind::PriceEarnings => PeerColumn::PeRatio,
        }
    }

    /// Name of the company figure the multiple is applied to.
    pub fn driver_name(self) -> &'static str {
        match self {
            MethodKind::EvRevenue => "revenue",
            MethodKind::EvEbitda => "ebitda",
            MethodKind::PriceEarnings => "net_income",
        }
    }

    fn driver(self, financials: &NormalizedFinancials) -> Money {
        match self {
            MethodKind::EvRevenue => financials.revenue(),
            MethodKind::EvEbitda => financials.ebitda(),
            MethodKind::PriceEarnings => financials.net_income(),
        }
    }

    /// EV multiples value the whole firm and need the net-debt bridge to
    /// reach equity; P/E values equity directly.
    pub fn uses_enterprise_value(self) -> bool {
        !matches!(self, MethodKind::PriceEarnings)
    }

    /// Key under `multiples` in the flat report.
    pub fn multiple_key(self) -> &'static str {
        self.peer_column().as_str()
    }

    /// Key under `enterprise_values`, `equity_values` and `share_prices` in
    /// the flat report.
    pub fn result_key(self) -> &'static str {
        match self {
            MethodKind::EvRevenue => "from_revenue",
            MethodKind::EvEbitda => "from_ebitda",
            MethodKind::PriceEarnings => "from_pe",
        }
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodKind::EvRevenue => write!(f, "EV/Revenue"),
            MethodKind::EvEbitda => write!(f, "EV/EBITDA"),
            MethodKind::PriceEarnings => write!(f, "P/E"),
        }
    }
}

/// The peer multiple applied and the spread it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleUsed {
    pub median_multiple: Multiple,
    pub low: Multiple,
    pub high: Multiple,
    /// Peers with a value in this column
    pub peer_count: usize,
    /// e.g. "2.5x - 3.0x"
    pub range: String,
}

/// Valuation produced by one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodValuation {
    pub method: MethodKind,
    /// Normalized driver figure the multiple was applied to
    pub driver_value: Money,
    pub multiple: MultipleUsed,
    /// Absent for P/E
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_value: Option<Money>,
    pub equity_value: Money,
    pub share_price: Money,
}

/// Why a method produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The method's peer column has no values
    NoPeerValues,
    /// The driver figure is zero or negative
    NonPositiveDriver { driver: String, value: Money },
    /// An intermediate value left the `Decimal` range
    ArithmeticOverflow { quantity: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoPeerValues => write!(f, "no peer values"),
            SkipReason::NonPositiveDriver { driver, value } => {
                write!(f, "{driver} is not positive ({value})")
            }
            SkipReason::ArithmeticOverflow { quantity } => {
                write!(f, "{quantity} is outside the decimal range")
            }
        }
    }
}

/// One method's slot in the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum MethodOutcome {
    Computed(MethodValuation),
    Skipped(SkipReason),
}

impl MethodOutcome {
    pub fn computed(&self) -> Option<&MethodValuation> {
        match self {
            MethodOutcome::Computed(v) => Some(v),
            MethodOutcome::Skipped(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.computed().is_some()
    }

    pub fn share_price(&self) -> Option<Money> {
        self.computed().map(|v| v.share_price)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Value the company with one peer multiple.
///
/// EV methods: `EV = driver × median`, `equity = EV − (debt − cash)`.
/// P/E: `equity = net_income × median`. Price is equity over shares. A step
/// that leaves the `Decimal` range skips the method rather than failing.
pub fn evaluate(
    method: MethodKind,
    financials: &NormalizedFinancials,
    peers: &PeerMultiples,
) -> MethodOutcome {
    let values = peers.values(method.peer_column());
    let stats = match SampleStatistics::from_values(&values) {
        Some(s) => s,
        None => return skip(method, SkipReason::NoPeerValues),
    };

    let driver = method.driver(financials);
    if driver <= Decimal::ZERO {
        return skip(
            method,
            SkipReason::NonPositiveDriver {
                driver: method.driver_name().into(),
                value: driver,
            },
        );
    }

    let (enterprise_value, equity_value) = if method.uses_enterprise_value() {
        let ev = match driver.checked_mul(stats.median) {
            Some(ev) => ev,
            None => return overflow(method, "enterprise_value"),
        };
        match ev.checked_sub(financials.net_debt()) {
            Some(equity) => (Some(ev), equity),
            None => return overflow(method, "equity_value"),
        }
    } else {
        match driver.checked_mul(stats.median) {
            Some(equity) => (None, equity),
            None => return overflow(method, "equity_value"),
        }
    };

    // shares_outstanding is strictly positive once validated
    let share_price = match equity_value.checked_div(financials.shares_outstanding()) {
        Some(p) => p,
        None => return overflow(method, "share_price"),
    };

    MethodOutcome::Computed(MethodValuation {
        method,
        driver_value: driver,
        multiple: MultipleUsed {
            median_multiple: stats.median,
            low: stats.low,
            high: stats.high,
            peer_count: stats.count,
            range: format_range(stats.low, stats.high),
        },
        enterprise_value,
        equity_value,
        share_price,
    })
}

/// "2.5x - 3.0x", each bound rounded half to even at one decimal.
fn format_range(low: Multiple, high: Multiple) -> String {
    let tenths = |m: Multiple| m.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven);
    format!("{:.1}x - {:.1}x", tenths(low), tenths(high))
}

fn overflow(method: MethodKind, quantity: &str) -> MethodOutcome {
    skip(
        method,
        SkipReason::ArithmeticOverflow {
            quantity: quantity.into(),
        },
    )
}

fn skip(method: MethodKind, reason: SkipReason) -> MethodOutcome {
    tracing::debug!(method = %method, reason = %reason, "valuation method skipped");
    MethodOutcome::Skipped(reason)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
