//! "What if" comparison of a schedule with and without its lump sums.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::engine::{build_schedule, contractual_payment, summarize_schedule};
use super::loan::{ScheduleInput, ScheduleSummary};
use crate::term::{months_to_term_parts, TermParts};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentImpact {
    /// Same loan and rate adjustments, no lump sums.
    pub baseline: ScheduleSummary,
    /// The schedule as requested.
    pub accelerated: ScheduleSummary,
    pub interest_saved: Money,
    pub payments_saved: u32,
    pub time_saved: TermParts,
}

/// Compare the requested schedule against the same loan without lump sums.
pub fn analyze_prepayment_impact(
    input: &ScheduleInput,
) -> FinanceResult<ComputationOutput<PrepaymentImpact>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.lump_sums.is_empty() {
        warnings.push("No lump sums supplied; baseline and accelerated schedules match".into());
    }

    let payment = contractual_payment(&input.loan)?;

    let baseline_entries = build_schedule(
        &input.loan,
        &input.rate_adjustments,
        &[],
        &input.config,
    )?;
    let accelerated_entries = build_schedule(
        &input.loan,
        &input.rate_adjustments,
        &input.lump_sums,
        &input.config,
    )?;

    let baseline = summarize_schedule(&baseline_entries, payment)?;
    let accelerated = summarize_schedule(&accelerated_entries, payment)?;

    let interest_saved = (baseline.total_interest - accelerated.total_interest).max(Decimal::ZERO);
    let payments_saved = baseline
        .number_of_payments
        .saturating_sub(accelerated.number_of_payments);

    let output = PrepaymentImpact {
        interest_saved,
        payments_saved,
        time_saved: months_to_term_parts(payments_saved),
        baseline,
        accelerated,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment impact (schedule with vs. without lump sums)",
        &serde_json::json!({
            "principal": input.loan.principal.to_string(),
            "contractual_payment": payment.to_string(),
            "lump_sums": input.lump_sums.len(),
            "rate_adjustments": input.rate_adjustments.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
