//! Input and output contracts of the schedule engine.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;
use crate::term::TermParts;
use crate::types::{
    Money, PaymentFrequency, Rate, RoundingMode, DEFAULT_MAX_PERIODS, MINOR_UNIT_DP,
};
use crate::FinanceResult;

/// Half of the minor currency unit.
pub const DEFAULT_PAYOFF_EPSILON: Money = dec!(0.005);

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A loan as stored by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDefinition {
    pub principal: Money,
    /// Nominal annual rate (0.045 = 4.5%).
    pub annual_rate: Rate,
    /// Contractual periodic payment. Solved from `amortization_months` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<Money>,
    /// Contractual amortization period in months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amortization_months: Option<u32>,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    pub start_date: NaiveDate,
    /// Day of month payments fall on (1..=31), clamped in short months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_payment_day: Option<u32>,
}

/// A change to the nominal annual rate, effective from `effective_date` on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateAdjustment {
    pub effective_date: NaiveDate,
    /// Signed delta added to the rate in force (0.0025 = +25bp).
    pub rate_delta: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An extra, principal-only payment planned for (or made in) a given month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumPayment {
    /// Planned amount.
    pub amount: Money,
    /// Planned year.
    pub year: i32,
    /// Planned month (1..=12).
    pub month: u32,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_paid_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_amount: Option<Money>,
}

impl LumpSumPayment {
    /// Actual date and amount of a paid lump sum when both were recorded.
    fn actuals(&self) -> Option<(NaiveDate, Money)> {
        if !self.is_paid {
            return None;
        }
        self.actual_paid_date.zip(self.actual_amount)
    }

    /// The amount that reaches the loan.
    pub fn effective_amount(&self) -> Money {
        self.actuals().map(|(_, amount)| amount).unwrap_or(self.amount)
    }

    /// The `(year, month)` whose payment period receives this lump sum.
    pub fn effective_month(&self) -> (i32, u32) {
        self.actuals()
            .map(|(date, _)| (date.year(), date.month()))
            .unwrap_or((self.year, self.month))
    }
}

/// Engine knobs. Every field has a default so inputs may omit the block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Periods computed before a non-amortizing loan is rejected.
    pub max_periods: u32,
    /// A post-payment balance at or below this counts as paid off.
    pub payoff_epsilon: Money,
    pub rounding: RoundingMode,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            max_periods: DEFAULT_MAX_PERIODS,
            payoff_epsilon: DEFAULT_PAYOFF_EPSILON,
            rounding: RoundingMode::default(),
        }
    }
}

/// Everything needed to compute one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub loan: LoanDefinition,
    #[serde(default)]
    pub rate_adjustments: Vec<RateAdjustment>,
    #[serde(default)]
    pub lump_sums: Vec<LumpSumPayment>,
    #[serde(default)]
    pub config: ScheduleConfig,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One payment period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based period index.
    pub period: u32,
    pub payment_date: NaiveDate,
    /// Contractual payment, reduced in the final period to the payoff amount.
    pub scheduled_payment: Money,
    /// Scheduled payment plus any lump sum absorbed by the loan.
    pub actual_payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Part of `actual_payment` that came from a lump sum.
    pub lump_sum_amount: Money,
    pub remaining_balance: Money,
    /// Nominal annual rate used for this period's interest.
    pub applicable_rate: Rate,
    pub is_lump_sum: bool,
    pub is_rate_change: bool,
    pub is_payoff: bool,
}

/// Totals over a computed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub number_of_payments: u32,
    pub first_payment_date: NaiveDate,
    pub payoff_date: NaiveDate,
    pub contractual_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_lump_sums: Money,
    pub final_rate: Rate,
    /// Time to payoff as years + months.
    pub term: TermParts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub entries: Vec<ScheduleEntry>,
    pub summary: ScheduleSummary,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn validate_loan(loan: &LoanDefinition) -> FinanceResult<()> {
    if loan.principal <= Decimal::ZERO {
        return Err(FinanceError::invalid_input(
            "principal",
            "Principal must be positive",
        ));
    }
    if loan.annual_rate < Decimal::ZERO {
        return Err(FinanceError::invalid_input(
            "annual_rate",
            "Annual rate cannot be negative",
        ));
    }
    match (loan.payment_amount, loan.amortization_months) {
        (Some(payment), _) if payment <= Decimal::ZERO => Err(FinanceError::invalid_input(
            "payment_amount",
            "Payment amount must be positive",
        )),
        (Some(payment), _) if payment.round_dp(MINOR_UNIT_DP) != payment => {
            Err(FinanceError::invalid_input(
                "payment_amount",
                format!("Payment amount {payment} has more than {MINOR_UNIT_DP} decimal places"),
            ))
        }
        (None, None) | (None, Some(0)) => Err(FinanceError::invalid_input(
            "payment_amount",
            "Either a positive payment amount or amortization_months > 0 is required",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn validate_lump_sums(lump_sums: &[LumpSumPayment]) -> FinanceResult<()> {
    for (i, lump) in lump_sums.iter().enumerate() {
        if lump.amount <= Decimal::ZERO {
            return Err(FinanceError::invalid_input(
                "lump_sums",
                format!("Lump sum #{} amount must be positive", i + 1),
            ));
        }
        if !(1..=12).contains(&lump.month) {
            return Err(FinanceError::invalid_input(
                "lump_sums",
                format!("Lump sum #{} month must be 1..=12, got {}", i + 1, lump.month),
            ));
        }
        if matches!(lump.actual_amount, Some(actual) if actual <= Decimal::ZERO) {
            return Err(FinanceError::invalid_input(
                "lump_sums",
                format!("Lump sum #{} actual amount must be positive", i + 1),
            ));
        }
    }
    Ok(())
}

pub(crate) fn validate_config(config: &ScheduleConfig) -> FinanceResult<()> {
    if config.max_periods == 0 {
        return Err(FinanceError::invalid_input(
            "max_periods",
            "At least one period must be allowed",
        ));
    }
    if config.payoff_epsilon < Decimal::ZERO {
        return Err(FinanceError::invalid_input(
            "payoff_epsilon",
            "Payoff epsilon cannot be negative",
        ));
    }
    Ok(())
}
