use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use personal_finance_core::term::{normalize_term_parts, term_parts_to_months, TermPart};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: personal_finance_core::schedule::loan::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = personal_finance_core::schedule::engine::generate_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_prepayment_impact(input_json: String) -> NapiResult<String> {
    let input: personal_finance_core::schedule::loan::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = personal_finance_core::schedule::impact::analyze_prepayment_impact(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct PaymentRequest {
    principal: Decimal,
    annual_rate: Decimal,
    #[serde(default)]
    term_years: TermPart,
    #[serde(default)]
    term_months: TermPart,
}

#[napi]
pub fn solve_payment(input_json: String) -> NapiResult<String> {
    let request: PaymentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let months = term_parts_to_months(request.term_years, request.term_months);
    let payment =
        personal_finance_core::schedule::engine::solve_payment(request.principal, request.annual_rate, months)
            .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "payment": payment,
        "total_months": months,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Savings
// ---------------------------------------------------------------------------

#[napi]
pub fn project_savings(input_json: String) -> NapiResult<String> {
    let input: personal_finance_core::savings::projection::SavingsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = personal_finance_core::savings::projection::project_savings(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TermRequest {
    #[serde(default)]
    years: TermPart,
    #[serde(default)]
    months: TermPart,
}

#[napi]
pub fn normalize_term(input_json: String) -> NapiResult<String> {
    let request: TermRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let parts = normalize_term_parts(request.years, request.months);
    serde_json::to_string(&serde_json::json!({
        "years": parts.years,
        "months": parts.months,
        "total_months": parts.total_months(),
    }))
    .map_err(to_napi_error)
}
