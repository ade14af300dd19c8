//! Period-by-period amortization of a loan under rate adjustments and
//! lump-sum prepayments.
//!
//! The engine is a pure function of its inputs: each period re-derives the
//! applicable rate and lump sum from an [`EventBook`], so two invocations
//! with the same snapshot produce identical schedules.

use rust_decimal::{Decimal, RoundingStrategy};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::events::EventBook;
use super::loan::{
    validate_config, validate_loan, validate_lump_sums, LoanDefinition, LumpSumPayment,
    RateAdjustment, ScheduleConfig, ScheduleEntry, ScheduleInput, ScheduleOutput,
    ScheduleSummary,
};
use crate::calendar::PaymentCalendar;
use crate::error::FinanceError;
use crate::term::months_to_term_parts;
use crate::time_value;
use crate::types::{
    checked_sum, with_metadata, ComputationOutput, Money, Rate, RoundingMode, MINOR_UNIT_DP,
};
use crate::FinanceResult;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the amortization schedule with summary and metadata envelope.
pub fn generate_schedule(
    input: &ScheduleInput,
) -> FinanceResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();

    let entries = build_schedule(
        &input.loan,
        &input.rate_adjustments,
        &input.lump_sums,
        &input.config,
    )?;
    let payment = contractual_payment(&input.loan)?;
    let summary = summarize_schedule(&entries, payment)?;
    let warnings = schedule_warnings(input, &summary)?;

    info!(
        payments = summary.number_of_payments,
        total_interest = %summary.total_interest,
        payoff_date = %summary.payoff_date,
        "schedule computed"
    );

    let output = ScheduleOutput { entries, summary };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly amortization with cumulative rate adjustments and principal-only lump sums",
        &serde_json::json!({
            "principal": input.loan.principal.to_string(),
            "annual_rate": input.loan.annual_rate.to_string(),
            "contractual_payment": payment.to_string(),
            "payment_solved": input.loan.payment_amount.is_none(),
            "rate_adjustments": input.rate_adjustments.len(),
            "lump_sums": input.lump_sums.len(),
            "rounding": input.config.rounding,
            "max_periods": input.config.max_periods,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Compute the bare schedule, terminating at payoff.
///
/// Fails with `InvalidInput` before any period is computed when the inputs
/// are malformed, and with `InvalidSchedule` when the balance is not paid
/// off within `config.max_periods` periods. No partial schedule is returned.
pub fn build_schedule(
    loan: &LoanDefinition,
    adjustments: &[RateAdjustment],
    lump_sums: &[LumpSumPayment],
    config: &ScheduleConfig,
) -> FinanceResult<Vec<ScheduleEntry>> {
    validate_loan(loan)?;
    validate_lump_sums(lump_sums)?;
    validate_config(config)?;

    let events = EventBook::new(adjustments, lump_sums)?;
    events.validate_rates(loan.annual_rate)?;

    let payment = contractual_payment(loan)?;
    let calendar = PaymentCalendar::new(loan.start_date, loan.preferred_payment_day)?;
    let periods_per_year = Decimal::from(loan.payment_frequency.periods_per_year());
    let rounding = config.rounding;

    let mut balance = rounding.round_money(loan.principal);
    let mut adjustments_in_force = 0usize;
    let mut entries: Vec<ScheduleEntry> = Vec::new();

    for period in 1..=config.max_periods {
        let payment_date = calendar.date_of(period)?;

        // Rate as of the period date; recomputed every period.
        let effective = events.effective_count(payment_date);
        let applicable_rate = events.applicable_rate(loan.annual_rate, payment_date)?;
        let is_rate_change = effective > adjustments_in_force;
        adjustments_in_force = effective;
        if is_rate_change {
            debug!(period, %payment_date, %applicable_rate, "rate adjustment in force");
        }

        // Interest on the pre-lump-sum balance.
        let interest = period_interest(balance, applicable_rate, periods_per_year, rounding)
            .ok_or_else(|| runaway_balance(period))?;

        // Final-period clamp.
        let payoff_amount = balance
            .checked_add(interest)
            .ok_or_else(|| runaway_balance(period))?;
        let scheduled_payment = payment.min(payoff_amount);

        // Lump sums go to principal only; excess beyond payoff is not absorbed.
        let lump_sum = events.lump_sum_for(payment_date);
        let absorbable = lump_sum.min(payoff_amount - scheduled_payment);
        let applied = scheduled_payment + absorbable;
        let mut principal_portion = (applied - interest).min(balance);

        // Balance update and payoff detection.
        balance = balance
            .checked_sub(principal_portion)
            .ok_or_else(|| runaway_balance(period))?;
        let is_payoff = balance <= config.payoff_epsilon;
        if is_payoff {
            principal_portion += balance;
            balance = Decimal::ZERO;
        }

        let actual_payment = interest + principal_portion;
        let lump_sum_amount = (actual_payment - scheduled_payment).max(Decimal::ZERO);

        entries.push(ScheduleEntry {
            period,
            payment_date,
            scheduled_payment,
            actual_payment,
            principal_portion,
            interest_portion: interest,
            lump_sum_amount,
            remaining_balance: balance,
            applicable_rate,
            is_lump_sum: !lump_sum.is_zero(),
            is_rate_change,
            is_payoff,
        });

        if is_payoff {
            debug!(period, %payment_date, "loan paid off");
            return Ok(entries);
        }
    }

    Err(FinanceError::InvalidSchedule {
        periods: config.max_periods,
        reason: format!(
            "balance of {balance} remains after {} periods; payment {payment} does not \
             amortize the loan",
            config.max_periods
        ),
    })
}

/// Level monthly payment that retires `principal` in `months` payments.
///
/// Rounded up to the cent so the loan never outlives its term.
pub fn solve_payment(principal: Money, annual_rate: Rate, months: u32) -> FinanceResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(FinanceError::invalid_input(
            "principal",
            "Principal must be positive",
        ));
    }
    if annual_rate < Decimal::ZERO {
        return Err(FinanceError::invalid_input(
            "annual_rate",
            "Annual rate cannot be negative",
        ));
    }
    if months == 0 {
        return Err(FinanceError::invalid_input(
            "amortization_months",
            "Amortization period must be at least one month",
        ));
    }
    let periodic_rate = annual_rate / Decimal::from(12);
    let payment = -time_value::pmt(periodic_rate, months, principal, Decimal::ZERO).map_err(
        |e| match e {
            FinanceError::InvalidInput { field, reason } if field == "nper" => {
                FinanceError::InvalidInput {
                    field: "amortization_months".into(),
                    reason,
                }
            }
            other => other,
        },
    )?;
    Ok(payment.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::ToPositiveInfinity))
}

/// Totals over a computed schedule.
pub fn summarize_schedule(
    entries: &[ScheduleEntry],
    contractual_payment: Money,
) -> FinanceResult<ScheduleSummary> {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return Err(FinanceError::invalid_input(
            "entries",
            "Cannot summarize an empty schedule",
        ));
    };

    let total = |amount: fn(&ScheduleEntry) -> Money| {
        checked_sum(entries.iter().map(amount)).ok_or_else(|| FinanceError::InvalidSchedule {
            periods: last.period,
            reason: "schedule totals exceed the representable range".into(),
        })
    };
    let total_paid = total(|e| e.actual_payment)?;
    let total_interest = total(|e| e.interest_portion)?;
    let total_principal = total(|e| e.principal_portion)?;
    let total_lump_sums = total(|e| e.lump_sum_amount)?;

    Ok(ScheduleSummary {
        number_of_payments: last.period,
        first_payment_date: first.payment_date,
        payoff_date: last.payment_date,
        contractual_payment,
        total_paid,
        total_interest,
        total_principal,
        total_lump_sums,
        final_rate: last.applicable_rate,
        term: months_to_term_parts(last.period),
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// The loan's contractual payment, solving it from the term when absent.
pub(crate) fn contractual_payment(loan: &LoanDefinition) -> FinanceResult<Money> {
    let payment = match loan.payment_amount {
        Some(amount) => amount,
        None => solve_payment(
            loan.principal,
            loan.annual_rate,
            loan.amortization_months.unwrap_or(0),
        )?,
    };
    if payment <= Decimal::ZERO {
        return Err(FinanceError::invalid_input(
            "payment_amount",
            "Payment amount must be positive",
        ));
    }
    Ok(payment)
}

fn period_interest(
    balance: Money,
    annual_rate: Rate,
    periods_per_year: Decimal,
    rounding: RoundingMode,
) -> Option<Money> {
    let accrued = balance.checked_mul(annual_rate)?.checked_div(periods_per_year)?;
    Some(rounding.round_money(accrued))
}

fn runaway_balance(period: u32) -> FinanceError {
    FinanceError::InvalidSchedule {
        periods: period,
        reason: "balance grew beyond representable range (negative amortization)".into(),
    }
}

fn schedule_warnings(
    input: &ScheduleInput,
    summary: &ScheduleSummary,
) -> FinanceResult<Vec<String>> {
    let mut warnings = Vec::new();

    let events = EventBook::new(&input.rate_adjustments, &input.lump_sums)?;
    for (year, month) in events.unreached_lump_sums(summary.first_payment_date, summary.payoff_date) {
        warn!(year, month, "lump sum falls outside the payment schedule");
        warnings.push(format!(
            "Lump sum targeting {year}-{month:02} falls outside the schedule \
             ({} to {}) and was not applied",
            summary.first_payment_date, summary.payoff_date
        ));
    }

    let late_adjustments = input
        .rate_adjustments
        .iter()
        .filter(|a| a.effective_date > summary.payoff_date)
        .count();
    if late_adjustments > 0 {
        warnings.push(format!(
            "{late_adjustments} rate adjustment(s) take effect after payoff on {}",
            summary.payoff_date
        ));
    }

    if let Some(months) = input.loan.amortization_months {
        if summary.number_of_payments > months {
            warnings.push(format!(
                "Schedule runs {} payments, beyond the contractual {} months",
                summary.number_of_payments, months
            ));
        }
    }

    Ok(warnings)
}
