//! Lookup of rate adjustments and lump sums by payment date.
//!
//! Events are never replayed into running state. The stepper asks, for each
//! period, which adjustments are in force and whether a lump sum targets
//! that month, so recomputing with a different event set needs no history.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::loan::{LumpSumPayment, RateAdjustment};
use crate::error::FinanceError;
use crate::types::{Money, Rate};
use crate::FinanceResult;

/// Immutable, pre-sorted view over a loan's adjustments and lump sums.
#[derive(Debug, Clone)]
pub struct EventBook<'a> {
    /// Non-decreasing effective date; ties keep insertion order.
    adjustments: Vec<&'a RateAdjustment>,
    /// Effective lump sum totals keyed by `(year, month)`.
    lump_sums: BTreeMap<(i32, u32), Money>,
}

impl<'a> EventBook<'a> {
    /// Fails when lump sums sharing a month total more than a decimal holds.
    pub fn new(
        adjustments: &'a [RateAdjustment],
        lump_sums: &[LumpSumPayment],
    ) -> FinanceResult<Self> {
        let mut sorted: Vec<&RateAdjustment> = adjustments.iter().collect();
        sorted.sort_by_key(|a| a.effective_date);

        let mut by_month: BTreeMap<(i32, u32), Money> = BTreeMap::new();
        for lump in lump_sums {
            let (year, month) = lump.effective_month();
            let total = by_month.entry((year, month)).or_insert(Decimal::ZERO);
            *total = total.checked_add(lump.effective_amount()).ok_or_else(|| {
                FinanceError::invalid_input(
                    "lump_sums",
                    format!("Lump sums for {year}-{month:02} exceed the representable range"),
                )
            })?;
        }

        Ok(EventBook {
            adjustments: sorted,
            lump_sums: by_month,
        })
    }

    /// Reject adjustment sets that drive the rate below zero on any date.
    ///
    /// Only the rate after all adjustments sharing a date is observable, so
    /// a negative intermediate inside a same-day group is accepted.
    pub fn validate_rates(&self, base_rate: Rate) -> FinanceResult<()> {
        let mut rate = base_rate;
        for (i, adjustment) in self.adjustments.iter().enumerate() {
            rate = rate
                .checked_add(adjustment.rate_delta)
                .ok_or_else(|| rate_overflow(adjustment.effective_date))?;
            let closes_group = self
                .adjustments
                .get(i + 1)
                .map_or(true, |next| next.effective_date != adjustment.effective_date);
            if closes_group && rate < Decimal::ZERO {
                return Err(FinanceError::InvalidInput {
                    field: "rate_adjustments".into(),
                    reason: format!(
                        "Applicable rate would be {rate} from {}",
                        adjustment.effective_date
                    ),
                });
            }
        }
        Ok(())
    }

    /// Number of adjustments effective on or before `date`.
    pub fn effective_count(&self, date: NaiveDate) -> usize {
        self.adjustments
            .partition_point(|a| a.effective_date <= date)
    }

    /// Base rate plus every delta effective on or before `date`.
    pub fn applicable_rate(&self, base_rate: Rate, date: NaiveDate) -> FinanceResult<Rate> {
        let count = self.effective_count(date);
        self.adjustments[..count]
            .iter()
            .try_fold(base_rate, |rate, a| rate.checked_add(a.rate_delta))
            .ok_or_else(|| rate_overflow(date))
    }

    /// Total lump sum targeting the month of `date`.
    pub fn lump_sum_for(&self, date: NaiveDate) -> Money {
        self.lump_sums
            .get(&(date.year(), date.month()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Months holding lump sums that no period in `first..=last` receives.
    pub fn unreached_lump_sums(&self, first: NaiveDate, last: NaiveDate) -> Vec<(i32, u32)> {
        let first = (first.year(), first.month());
        let last = (last.year(), last.month());
        self.lump_sums
            .keys()
            .filter(|key| **key < first || **key > last)
            .copied()
            .collect()
    }
}

fn rate_overflow(date: NaiveDate) -> FinanceError {
    FinanceError::invalid_input(
        "rate_adjustments",
        format!("Cumulative rate as of {date} exceeds the representable range"),
    )
}
