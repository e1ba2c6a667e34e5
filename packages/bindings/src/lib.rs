use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use peer_valuation_core::units::{normalize, UnitTag};
use peer_valuation_core::valuation::{self, ValuationInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Full valuation. Rejected inputs are returned in the result, not thrown.
#[napi]
pub fn value_company(input_json: String) -> NapiResult<String> {
    let input = ValuationInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = valuation::run_valuation(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Valuation in the flat `multiples` / `share_prices` / `summary` layout.
#[napi]
pub fn value_company_flat(input_json: String) -> NapiResult<String> {
    let input = ValuationInput::from_json(&input_json).map_err(to_napi_error)?;
    let outcome = valuation::compute_valuation(&input.statement, &input.balance_sheet, &input.peers);
    serde_json::to_string(&outcome.to_report()).map_err(to_napi_error)
}

#[derive(Serialize)]
struct ValidationReply {
    ok: bool,
    errors: Vec<String>,
    suggestions: Vec<String>,
}

#[napi]
pub fn validate_inputs(input_json: String) -> NapiResult<String> {
    let input = ValuationInput::from_json(&input_json).map_err(to_napi_error)?;
    let (ok, errors, suggestions) =
        valuation::validate(&input.statement, &input.balance_sheet, &input.peers).as_tuple();
    serde_json::to_string(&ValidationReply {
        ok,
        errors,
        suggestions,
    })
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NormalizeRequest {
    value: rust_decimal::Decimal,
    #[serde(default)]
    unit: UnitTag,
}

#[napi]
pub fn normalize_amount(input_json: String) -> NapiResult<String> {
    let req: NormalizeRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let normalized = normalize(req.value, req.unit).ok_or_else(|| {
        to_napi_error(format!(
            "{} in {} is outside the representable range in base units",
            req.value, req.unit
        ))
    })?;
    serde_json::to_string(&normalized).map_err(to_napi_error)
}
