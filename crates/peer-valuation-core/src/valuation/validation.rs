use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::inputs::{
    BalanceSheetInputs, BaseFigures, FinancialStatementInputs, NormalizedFinancials, PeerColumn,
    PeerMultiples,
};
use crate::units::{normalize, UnitTag};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Business-rule violation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// A required figure is absent
    MissingField,
    /// A figure violates a positivity constraint or leaves the decimal
    /// range once scaled to base units
    InvalidValue,
    /// Net income exceeds EBITDA
    Consistency,
    /// The peer table is empty or lacks a required column
    MissingPeerData,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrorKind::MissingField => write!(f, "MissingFieldError"),
            ValidationErrorKind::InvalidValue => write!(f, "InvalidValueError"),
            ValidationErrorKind::Consistency => write!(f, "ConsistencyError"),
            ValidationErrorKind::MissingPeerData => write!(f, "MissingPeerDataError"),
        }
    }
}

/// One failed check with its remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ValidationErrorKind,
    /// Input field (or peer column) the check concerns
    pub field: String,
    pub message: String,
    pub suggestion: String,
}

/// Every check that failed, in check order.
///
/// Serializes as parallel `errors` / `suggestions` lists plus the typed
/// `issues`; entry *i* of both lists comes from issue *i*.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailure {
    issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    fn push(
        &mut self,
        kind: ValidationErrorKind,
        field: &str,
        message: String,
        suggestion: String,
    ) {
        self.issues.push(ValidationIssue {
            kind,
            field: field.to_string(),
            message,
            suggestion,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.suggestion.clone()).collect()
    }

    pub fn has(&self, kind: ValidationErrorKind, field: &str) -> bool {
        self.issues.iter().any(|i| i.kind == kind && i.field == field)
    }

    pub fn count_of(&self, kind: ValidationErrorKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

impl Serialize for ValidationFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationFailure", 3)?;
        s.serialize_field("errors", &self.errors())?;
        s.serialize_field("suggestions", &self.suggestions())?;
        s.serialize_field("issues", &self.issues)?;
        s.end()
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.kind, i.message))
            .collect();
        write!(f, "{}", lines.join("; "))
    }
}

/// Result of validating one set of inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(NormalizedFinancials),
    Invalid(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    /// `(ok, errors, suggestions)` view of the outcome.
    pub fn as_tuple(&self) -> (bool, Vec<String>, Vec<String>) {
        match self {
            ValidationOutcome::Valid(_) => (true, Vec::new(), Vec::new()),
            ValidationOutcome::Invalid(failure) => {
                (false, failure.errors(), failure.suggestions())
            }
        }
    }

    pub fn into_result(self) -> Result<NormalizedFinancials, ValidationFailure> {
        match self {
            ValidationOutcome::Valid(n) => Ok(n),
            ValidationOutcome::Invalid(f) => Err(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Check the raw inputs and, if every check passes, normalize them.
///
/// All checks run; nothing short-circuits. Presence, sign and consistency
/// checks read the figures as reported; the range check scales them to base
/// units.
pub fn validate(
    statement: &FinancialStatementInputs,
    balance_sheet: &BalanceSheetInputs,
    peers: &PeerMultiples,
) -> ValidationOutcome {
    let mut failure = ValidationFailure::default();

    // --- Presence ---
    let revenue = require(&mut failure, "Income statement", "revenue", statement.revenue);
    let ebitda = require(&mut failure, "Income statement", "ebitda", statement.ebitda);
    let net_income = require(
        &mut failure,
        "Income statement",
        "net_income",
        statement.net_income,
    );
    let total_debt = require(
        &mut failure,
        "Balance sheet",
        "total_debt",
        balance_sheet.total_debt,
    );
    let cash = require(&mut failure, "Balance sheet", "cash", balance_sheet.cash);
    let shares_outstanding = require(
        &mut failure,
        "Balance sheet",
        "shares_outstanding",
        balance_sheet.shares_outstanding,
    );

    // --- Positivity ---
    if let Some(r) = revenue {
        if r <= Decimal::ZERO {
            failure.push(
                ValidationErrorKind::InvalidValue,
                "revenue",
                format!("revenue must be greater than zero (got {r})"),
                "Enter revenue as a positive value".into(),
            );
        }
    }
    if let Some(s) = shares_outstanding {
        if s <= Decimal::ZERO {
            failure.push(
                ValidationErrorKind::InvalidValue,
                "shares_outstanding",
                format!("shares_outstanding must be greater than zero (got {s})"),
                "Enter shares_outstanding as a positive value".into(),
            );
        }
    }

    // --- Range in base units ---
    let figures = (
        scale(&mut failure, "revenue", revenue, statement.revenue_unit),
        scale(&mut failure, "ebitda", ebitda, statement.ebitda_unit),
        scale(&mut failure, "net_income", net_income, statement.net_income_unit),
        scale(&mut failure, "total_debt", total_debt, balance_sheet.debt_unit),
        scale(&mut failure, "cash", cash, balance_sheet.cash_unit),
        scale(
            &mut failure,
            "shares_outstanding",
            shares_outstanding,
            balance_sheet.shares_unit,
        ),
    );
    let normalized = match figures {
        (
            Some(revenue),
            Some(ebitda),
            Some(net_income),
            Some(total_debt),
            Some(cash),
            Some(shares_outstanding),
        ) => {
            let normalized = NormalizedFinancials::from_base(BaseFigures {
                revenue,
                ebitda,
                net_income,
                total_debt,
                cash,
                shares_outstanding,
            });
            if normalized.is_none() {
                failure.push(
                    ValidationErrorKind::InvalidValue,
                    "net_debt",
                    format!(
                        "net debt (total_debt {total_debt} - cash {cash}) is outside the representable range"
                    ),
                    "Check the values and units of total_debt and cash".into(),
                );
            }
            normalized
        }
        _ => None,
    };

    // --- Consistency ---
    if let (Some(e), Some(ni)) = (ebitda, net_income) {
        if ni > e {
            failure.push(
                ValidationErrorKind::Consistency,
                "net_income",
                format!("net_income ({ni}) exceeds ebitda ({e})"),
                "Check that ebitda is at least net_income; ebitda adds back interest, \
                 taxes, depreciation and amortization"
                    .into(),
            );
        }
    }

    // --- Peer data ---
    if peers.is_empty() {
        failure.push(
            ValidationErrorKind::MissingPeerData,
            "peers",
            "Peer multiple table is empty".into(),
            "Provide multiples for at least one comparable company".into(),
        );
    } else {
        for column in PeerColumn::REQUIRED {
            if !peers.has_column(column) {
                failure.push(
                    ValidationErrorKind::MissingPeerData,
                    column.as_str(),
                    format!("Peer multiple table has no {column} column"),
                    format!("Add a {column} column to the peer table"),
                );
            }
        }
    }

    match normalized {
        Some(normalized) if failure.is_empty() => ValidationOutcome::Valid(normalized),
        _ => ValidationOutcome::Invalid(failure),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn require(
    failure: &mut ValidationFailure,
    record: &str,
    field: &str,
    value: Option<Decimal>,
) -> Option<Decimal> {
    if value.is_none() {
        failure.push(
            ValidationErrorKind::MissingField,
            field,
            format!("{record} is missing {field}"),
            format!("Enter a value for {field}"),
        );
    }
    value
}

/// Scale a present figure to base units, recording an issue when it does not fit.
fn scale(
    failure: &mut ValidationFailure,
    field: &str,
    value: Option<Decimal>,
    unit: UnitTag,
) -> Option<Decimal> {
    let value = value?;
    let scaled = normalize(value, unit);
    if scaled.is_none() {
        failure.push(
            ValidationErrorKind::InvalidValue,
            field,
            format!("{field} ({value} in {unit}) is outside the representable range in base units"),
            format!("Check that {field} is reported in {unit}, or enter it in a smaller unit"),
        );
    }
    scaled
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
