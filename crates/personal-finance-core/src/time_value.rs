use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::FinanceError;
use crate::types::{Money, Rate};
use crate::FinanceResult;

/// Payment (PMT) for a loan of `present_value` over `nper` periods.
///
/// Sign convention follows the spreadsheet function: a positive present value
/// (money received) yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> FinanceResult<Money> {
    if nper == 0 {
        return Err(FinanceError::invalid_input(
            "nper",
            "Number of periods must be > 0",
        ));
    }

    let out_of_range = || {
        FinanceError::invalid_input("present_value", "Loan amount is outside the representable range")
    };

    if rate.is_zero() {
        let total = present_value.checked_add(future_value).ok_or_else(out_of_range)?;
        return Ok(-total / Decimal::from(nper));
    }

    let factor = Decimal::ONE
        .checked_add(rate)
        .and_then(|one_plus_r| one_plus_r.checked_powu(u64::from(nper)))
        .ok_or_else(|| {
            FinanceError::invalid_input(
                "nper",
                format!("Growth factor over {nper} periods exceeds the representable range"),
            )
        })?;
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(FinanceError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let grown = present_value
        .checked_mul(factor)
        .and_then(|fv| fv.checked_add(future_value))
        .ok_or_else(out_of_range)?;
    grown.checked_div(annuity_factor).map(|p| -p).ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pmt_thirty_year_mortgage() {
        let payment = pmt(dec!(0.05) / dec!(12), 360, dec!(200000), Decimal::ZERO).unwrap();
        // 200k at 5% over 30 years ≈ 1073.64 per month
        assert!((payment + dec!(1073.64)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate_is_straight_line() {
        let payment = pmt(Decimal::ZERO, 10, dec!(1000), Decimal::ZERO).unwrap();
        assert_eq!(payment, dec!(-100));
    }

    #[test]
    fn test_pmt_rejects_zero_periods() {
        assert!(pmt(dec!(0.01), 0, dec!(1000), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_pmt_growth_overflow_is_input_error() {
        let err = pmt(dec!(0.5), 1_000_000, dec!(1000), Decimal::ZERO).unwrap_err();
        assert!(err.is_input_error());
        assert!(matches!(err, FinanceError::InvalidInput { ref field, .. } if field == "nper"));
    }

    #[test]
    fn test_pmt_huge_present_value_is_input_error() {
        let err = pmt(dec!(0.01), 360, Decimal::MAX, Decimal::ZERO).unwrap_err();
        assert!(err.is_input_error());
    }
}
