//! Month-by-month projection of a savings account under regular
//! contributions, with optional yearly contribution room (TFSA-style) and
//! government matching grants (RESP-style).

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::calendar::add_months;
use crate::error::FinanceError;
use crate::term::{months_to_term_parts, term_parts_to_months, TermPart, TermParts};
use crate::types::{
    checked_sum, with_metadata, ComputationOutput, Money, Rate, RoundingMode,
    DEFAULT_MAX_PERIODS,
};
use crate::FinanceResult;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How interest is credited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    /// Interest on contributed capital only.
    Simple,
    #[default]
    Monthly,
    /// Accrued monthly, credited every twelfth month and at the end.
    Annually,
}

/// Government matching on contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantMatch {
    /// Grant per unit contributed (0.20 = 20%).
    pub match_rate: Rate,
    /// Contributions per calendar year that attract the grant.
    pub annual_eligible_cap: Money,
    /// Maximum total grant over the life of the plan.
    pub lifetime_cap: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsInput {
    pub initial_balance: Money,
    pub monthly_contribution: Money,
    pub annual_rate: Rate,
    #[serde(default)]
    pub compounding: Compounding,
    #[serde(default)]
    pub term_years: TermPart,
    #[serde(default)]
    pub term_months: TermPart,
    pub start_date: NaiveDate,
    /// Cap on contributions per calendar year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_contribution_limit: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant: Option<GrantMatch>,
    #[serde(default)]
    pub rounding: RoundingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPeriod {
    pub period: u32,
    pub date: NaiveDate,
    pub contribution: Money,
    /// Part of the planned contribution turned away by the yearly limit.
    pub refused_contribution: Money,
    pub grant: Money,
    /// Interest credited this month.
    pub interest: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub months: u32,
    pub term: TermParts,
    pub total_contributions: Money,
    pub total_grants: Money,
    pub total_interest: Money,
    pub refused_contributions: Money,
    pub final_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOutput {
    pub periods: Vec<SavingsPeriod>,
    pub summary: SavingsSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a savings balance month by month.
pub fn project_savings(input: &SavingsInput) -> FinanceResult<ComputationOutput<SavingsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let months = validate_savings_input(input)?;
    let rounding = input.rounding;
    let monthly_rate = input.annual_rate / Decimal::from(MONTHS_PER_YEAR);

    let mut balance = input.initial_balance;
    let mut simple_base = input.initial_balance;
    let mut pending_interest = Decimal::ZERO;
    let mut total_grants = Decimal::ZERO;
    let mut year_contributed = Decimal::ZERO;
    let mut year_eligible_used = Decimal::ZERO;
    let mut current_year: Option<i32> = None;

    let mut periods: Vec<SavingsPeriod> = Vec::with_capacity(months as usize);

    for period in 1..=months {
        let date = add_months(input.start_date, period - 1, input.start_date.day())?;
        if current_year != Some(date.year()) {
            current_year = Some(date.year());
            year_contributed = Decimal::ZERO;
            year_eligible_used = Decimal::ZERO;
        }

        let out_of_range = || balance_out_of_range(period);
        let accrue = |base: Money| {
            base.checked_mul(monthly_rate)
                .map(|accrued| rounding.round_money(accrued))
                .ok_or_else(out_of_range)
        };

        // Interest on the opening balance.
        let interest = match input.compounding {
            Compounding::Simple => accrue(simple_base)?,
            Compounding::Monthly => accrue(balance)?,
            Compounding::Annually => {
                pending_interest = pending_interest
                    .checked_add(accrue(balance)?)
                    .ok_or_else(out_of_range)?;
                if period % MONTHS_PER_YEAR == 0 || period == months {
                    std::mem::take(&mut pending_interest)
                } else {
                    Decimal::ZERO
                }
            }
        };
        balance = balance.checked_add(interest).ok_or_else(out_of_range)?;

        // End-of-month contribution, limited by remaining yearly room.
        let contribution = match input.annual_contribution_limit {
            Some(limit) => {
                let room = (limit - year_contributed).max(Decimal::ZERO);
                input.monthly_contribution.min(room)
            }
            None => input.monthly_contribution,
        };
        let refused_contribution = input.monthly_contribution - contribution;
        year_contributed = year_contributed
            .checked_add(contribution)
            .ok_or_else(out_of_range)?;

        let grant = match &input.grant {
            Some(g) => {
                let eligible_room = (g.annual_eligible_cap - year_eligible_used).max(Decimal::ZERO);
                let eligible = contribution.min(eligible_room);
                year_eligible_used += eligible;
                let lifetime_room = (g.lifetime_cap - total_grants).max(Decimal::ZERO);
                let matched = eligible.checked_mul(g.match_rate).ok_or_else(out_of_range)?;
                rounding.round_money(matched).min(lifetime_room)
            }
            None => Decimal::ZERO,
        };
        total_grants += grant;

        let deposit = contribution.checked_add(grant).ok_or_else(out_of_range)?;
        balance = balance.checked_add(deposit).ok_or_else(out_of_range)?;
        simple_base = simple_base.checked_add(deposit).ok_or_else(out_of_range)?;

        periods.push(SavingsPeriod {
            period,
            date,
            contribution,
            refused_contribution,
            grant,
            interest,
            balance,
        });
    }

    let total = |amount: fn(&SavingsPeriod) -> Money| {
        checked_sum(periods.iter().map(amount)).ok_or_else(|| balance_out_of_range(months))
    };
    let total_contributions = total(|p| p.contribution)?;
    let total_interest = total(|p| p.interest)?;
    let refused_contributions = total(|p| p.refused_contribution)?;

    if refused_contributions > Decimal::ZERO {
        warnings.push(format!(
            "{refused_contributions} of planned contributions exceed the yearly limit and were not deposited"
        ));
    }
    if let Some(g) = &input.grant {
        if total_grants >= g.lifetime_cap {
            warnings.push(format!("Lifetime grant cap of {} reached", g.lifetime_cap));
        }
    }

    debug!(months, %balance, %total_interest, "savings projected");

    let summary = SavingsSummary {
        months,
        term: months_to_term_parts(months),
        total_contributions,
        total_grants,
        total_interest,
        refused_contributions,
        final_balance: balance,
    };

    let output = SavingsOutput { periods, summary };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Savings projection (end-of-month contributions, cent-rounded interest)",
        &serde_json::json!({
            "initial_balance": input.initial_balance.to_string(),
            "monthly_contribution": input.monthly_contribution.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "compounding": input.compounding,
            "months": months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn balance_out_of_range(period: u32) -> FinanceError {
    FinanceError::invalid_input(
        "initial_balance",
        format!("Projected amounts leave the representable range in month {period}"),
    )
}

/// Validate the input and return the projection length in months.
fn validate_savings_input(input: &SavingsInput) -> FinanceResult<u32> {
    let non_negative = [
        ("initial_balance", input.initial_balance),
        ("monthly_contribution", input.monthly_contribution),
        ("annual_rate", input.annual_rate),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(FinanceError::invalid_input(field, "Value cannot be negative"));
        }
    }
    if matches!(input.annual_contribution_limit, Some(limit) if limit < Decimal::ZERO) {
        return Err(FinanceError::invalid_input(
            "annual_contribution_limit",
            "Contribution limit cannot be negative",
        ));
    }
    if let Some(g) = &input.grant {
        if g.match_rate < Decimal::ZERO
            || g.annual_eligible_cap < Decimal::ZERO
            || g.lifetime_cap < Decimal::ZERO
        {
            return Err(FinanceError::invalid_input(
                "grant",
                "Grant parameters cannot be negative",
            ));
        }
    }

    let months = term_parts_to_months(input.term_years, input.term_months);
    if months == 0 {
        return Err(FinanceError::invalid_input(
            "term",
            "Projection term must be at least one month",
        ));
    }
    if months > DEFAULT_MAX_PERIODS {
        return Err(FinanceError::invalid_input(
            "term",
            format!("Projection term cannot exceed {DEFAULT_MAX_PERIODS} months"),
        ));
    }
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deposit(compounding: Compounding, months: u32) -> SavingsInput {
        SavingsInput {
            initial_balance: dec!(1000),
            monthly_contribution: Decimal::ZERO,
            annual_rate: dec!(0.12),
            compounding,
            term_years: TermPart::ZERO,
            term_months: TermPart::from(months),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            annual_contribution_limit: None,
            grant: None,
            rounding: RoundingMode::HalfEven,
        }
    }

    #[test]
    fn test_monthly_compounding_one_year() {
        let out = project_savings(&deposit(Compounding::Monthly, 12)).unwrap();
        assert_eq!(out.result.summary.final_balance, dec!(1126.84));
        assert_eq!(out.result.periods.len(), 12);
    }

    #[test]
    fn test_simple_interest_two_years() {
        let out = project_savings(&deposit(Compounding::Simple, 24)).unwrap();
        assert_eq!(out.result.summary.final_balance, dec!(1240));
        assert_eq!(out.result.summary.total_interest, dec!(240));
    }

    #[test]
    fn test_annual_compounding_credits_yearly() {
        let out = project_savings(&deposit(Compounding::Annually, 24)).unwrap();
        let periods = &out.result.periods;
        assert_eq!(periods[10].interest, Decimal::ZERO);
        assert_eq!(periods[11].interest, dec!(120));
        assert_eq!(periods[11].balance, dec!(1120));
        assert_eq!(out.result.summary.final_balance, dec!(1254.40));
    }

    #[test]
    fn test_annual_compounding_credits_partial_final_year() {
        let out = project_savings(&deposit(Compounding::Annually, 18)).unwrap();
        let last = out.result.periods.last().unwrap();
        // Six months of 11.20 on 1120.00
        assert_eq!(last.interest, dec!(67.20));
        assert_eq!(out.result.summary.final_balance, dec!(1187.20));
    }

    #[test]
    fn test_end_of_month_contributions() {
        let input = SavingsInput {
            initial_balance: Decimal::ZERO,
            monthly_contribution: dec!(100),
            annual_rate: dec!(0.06),
            ..deposit(Compounding::Monthly, 12)
        };
        let out = project_savings(&input).unwrap();
        assert_eq!(out.result.summary.final_balance, dec!(1233.56));
        assert_eq!(out.result.summary.total_contributions, dec!(1200));
    }

    #[test]
    fn test_yearly_contribution_limit() {
        let input = SavingsInput {
            initial_balance: Decimal::ZERO,
            monthly_contribution: dec!(1000),
            annual_rate: Decimal::ZERO,
            annual_contribution_limit: Some(dec!(7000)),
            ..deposit(Compounding::Monthly, 24)
        };
        let out = project_savings(&input).unwrap();
        let s = &out.result.summary;
        assert_eq!(s.total_contributions, dec!(14000));
        assert_eq!(s.refused_contributions, dec!(10000));
        assert_eq!(out.result.periods[7].contribution, Decimal::ZERO);
        // Room resets in January.
        assert_eq!(out.result.periods[12].contribution, dec!(1000));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_grant_annual_and_lifetime_caps() {
        let input = SavingsInput {
            initial_balance: Decimal::ZERO,
            monthly_contribution: dec!(250),
            annual_rate: Decimal::ZERO,
            grant: Some(GrantMatch {
                match_rate: dec!(0.20),
                annual_eligible_cap: dec!(2500),
                lifetime_cap: dec!(7200),
            }),
            ..deposit(Compounding::Monthly, 12)
        };
        let out = project_savings(&input).unwrap();
        let grants: Vec<Money> = out.result.periods.iter().map(|p| p.grant).collect();
        assert!(grants[..10].iter().all(|g| *g == dec!(50)));
        assert!(grants[10..].iter().all(|g| g.is_zero()));
        assert_eq!(out.result.summary.total_grants, dec!(500));

        let capped = SavingsInput {
            grant: Some(GrantMatch {
                match_rate: dec!(0.20),
                annual_eligible_cap: dec!(2500),
                lifetime_cap: dec!(120),
            }),
            ..input
        };
        let out = project_savings(&capped).unwrap();
        let grants: Vec<Money> = out.result.periods.iter().map(|p| p.grant).collect();
        assert_eq!(&grants[..4], &[dec!(50), dec!(50), dec!(20), Decimal::ZERO]);
        assert_eq!(out.result.summary.total_grants, dec!(120));
    }

    #[test]
    fn test_term_parts_are_lenient_but_term_required() {
        let json = r#"{"initial_balance": "100", "monthly_contribution": "0",
            "annual_rate": "0.05", "term_years": "1", "term_months": "junk",
            "start_date": "2024-01-01"}"#;
        let input: SavingsInput = serde_json::from_str(json).unwrap();
        let out = project_savings(&input).unwrap();
        assert_eq!(out.result.summary.months, 12);

        let empty = SavingsInput {
            term_years: TermPart::ZERO,
            term_months: TermPart::ZERO,
            ..input
        };
        assert!(project_savings(&empty).is_err());
    }

    #[test]
    fn test_negative_contribution_rejected() {
        let input = SavingsInput {
            monthly_contribution: dec!(-1),
            ..deposit(Compounding::Monthly, 12)
        };
        assert!(project_savings(&input).is_err());
    }

    #[test]
    fn test_overflowing_balance_is_input_error() {
        let mut input = deposit(Compounding::Monthly, 24);
        input.initial_balance = Decimal::MAX;
        let err = project_savings(&input).unwrap_err();
        assert!(err.is_input_error(), "got {err:?}");

        let mut contributions = deposit(Compounding::Simple, 24);
        contributions.monthly_contribution = Decimal::MAX;
        contributions.annual_rate = Decimal::ZERO;
        assert!(project_savings(&contributions).unwrap_err().is_input_error());
    }

    #[test]
    fn test_refused_contributions_total_does_not_overflow() {
        let mut input = deposit(Compounding::Monthly, 24);
        input.monthly_contribution = Decimal::MAX;
        input.annual_contribution_limit = Some(Decimal::ZERO);
        let err = project_savings(&input).unwrap_err();
        assert!(err.is_input_error(), "got {err:?}");
    }
}
