use serde::Serialize;
use std::time::Instant;

use super::inputs::{
    BalanceSheetInputs, FinancialStatementInputs, NormalizedFinancials, PeerMultiples,
    ValuationInput,
};
use super::methods::{evaluate, MethodKind, MethodOutcome, MethodValuation};
use super::summary::{aggregate, ValuationSummary};
use super::validation::{validate, ValidationFailure, ValidationOutcome};
use crate::types::{with_metadata, ComputationOutput, Money};

/// Peers below this count in a priced column draw a warning.
const THIN_SAMPLE: usize = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Successful valuation: one slot per method plus the reconciled summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    pub revenue_multiple: MethodOutcome,
    pub ebitda_multiple: MethodOutcome,
    pub earnings_multiple: MethodOutcome,
    pub summary: ValuationSummary,
}

impl ValuationResult {
    pub fn outcome(&self, method: MethodKind) -> &MethodOutcome {
        match method {
            MethodKind::EvRevenue => &self.revenue_multiple,
            MethodKind::EvEbitda => &self.ebitda_multiple,
            MethodKind::PriceEarnings => &self.earnings_multiple,
        }
    }

    /// Computed methods in fixed order (revenue, EBITDA, earnings).
    pub fn computed(&self) -> impl Iterator<Item = &MethodValuation> {
        MethodKind::ALL
            .into_iter()
            .filter_map(move |m| self.outcome(m).computed())
    }

    pub fn share_price(&self, method: MethodKind) -> Option<Money> {
        self.outcome(method).share_price()
    }

    pub fn equity_value(&self, method: MethodKind) -> Option<Money> {
        self.outcome(method).computed().map(|v| v.equity_value)
    }

    pub fn enterprise_value(&self, method: MethodKind) -> Option<Money> {
        self.outcome(method)
            .computed()
            .and_then(|v| v.enterprise_value)
    }
}

/// Terminal outcome of one valuation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ValuationOutcome {
    Computed(ValuationResult),
    Failed(ValidationFailure),
}

impl ValuationOutcome {
    pub fn is_computed(&self) -> bool {
        matches!(self, ValuationOutcome::Computed(_))
    }

    pub fn result(&self) -> Option<&ValuationResult> {
        match self {
            ValuationOutcome::Computed(r) => Some(r),
            ValuationOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValuationOutcome::Computed(_) => None,
            ValuationOutcome::Failed(f) => Some(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate, normalize, run the three methods and aggregate.
pub fn compute_valuation(
    statement: &FinancialStatementInputs,
    balance_sheet: &BalanceSheetInputs,
    peers: &PeerMultiples,
) -> ValuationOutcome {
    match validate(statement, balance_sheet, peers) {
        ValidationOutcome::Valid(financials) => {
            ValuationOutcome::Computed(value_normalized(&financials, peers))
        }
        ValidationOutcome::Invalid(failure) => {
            tracing::debug!(issues = failure.len(), "valuation inputs rejected");
            ValuationOutcome::Failed(failure)
        }
    }
}

/// Run the methods on already-normalized figures.
pub fn value_normalized(financials: &NormalizedFinancials, peers: &PeerMultiples) -> ValuationResult {
    let revenue_multiple = evaluate(MethodKind::EvRevenue, financials, peers);
    let ebitda_multiple = evaluate(MethodKind::EvEbitda, financials, peers);
    let earnings_multiple = evaluate(MethodKind::PriceEarnings, financials, peers);

    let prices: Vec<Money> = [&revenue_multiple, &ebitda_multiple, &earnings_multiple]
        .into_iter()
        .filter_map(MethodOutcome::share_price)
        .collect();

    let summary = aggregate(
        &prices,
        financials.total_debt(),
        financials.cash(),
        financials.shares_outstanding(),
    );

    tracing::info!(
        methods_computed = summary.methods_computed,
        median_share_price = ?summary.median_share_price,
        "valuation complete"
    );

    ValuationResult {
        revenue_multiple,
        ebitda_multiple,
        earnings_multiple,
        summary,
    }
}

/// Value a full input document and wrap the outcome in the standard envelope.
pub fn run_valuation(input: &ValuationInput) -> ComputationOutput<ValuationOutcome> {
    let start = Instant::now();
    let outcome = compute_valuation(&input.statement, &input.balance_sheet, &input.peers);
    let warnings = collect_warnings(&outcome);
    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Comparable Multiples Valuation (EV/Revenue, EV/EBITDA, P/E; median peer multiple)",
        input,
        warnings,
        elapsed,
        outcome,
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn collect_warnings(outcome: &ValuationOutcome) -> Vec<String> {
    let mut warnings = Vec::new();
    let result = match outcome {
        ValuationOutcome::Computed(r) => r,
        ValuationOutcome::Failed(_) => return warnings,
    };

    for method in MethodKind::ALL {
        match result.outcome(method) {
            MethodOutcome::Skipped(reason) => {
                warnings.push(format!("{method} not computed: {reason}"));
            }
            MethodOutcome::Computed(v) if v.multiple.peer_count < THIN_SAMPLE => {
                warnings.push(format!(
                    "{method} median drawn from only {} peer(s); consider adding more for statistical significance",
                    v.multiple.peer_count
                ));
            }
            MethodOutcome::Computed(_) => {}
        }
    }

    if !result.summary.has_prices() {
        warnings.push("No valuation method could be computed".into());
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
