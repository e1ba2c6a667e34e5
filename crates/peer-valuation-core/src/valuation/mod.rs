pub mod engine;
pub mod inputs;
pub mod methods;
pub mod report;
pub mod summary;
pub mod validation;

pub use engine::{compute_valuation, run_valuation, ValuationOutcome, ValuationResult};
pub use inputs::{
    BalanceSheetInputs, FinancialStatementInputs, NormalizedFinancials, PeerColumn,
    PeerMultiples, PeerRow, ValuationInput,
};
pub use methods::{MethodKind, MethodOutcome, MethodValuation, SkipReason};
pub use summary::{aggregate, SummaryStatus, ValuationSummary};
pub use validation::{validate, ValidationErrorKind, ValidationFailure, ValidationOutcome};
