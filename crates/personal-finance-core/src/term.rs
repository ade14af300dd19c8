//! Conversion between "years + months" term representations and a single
//! month count.
//!
//! Term components usually come straight from half-filled form fields, so
//! nothing in this module fails: any component that is not a finite,
//! non-negative number counts as zero.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single, leniently parsed term component (a year or month count).
///
/// Fractional values truncate toward zero; missing, negative, NaN, infinite
/// and non-numeric values become zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermPart(u32);

impl TermPart {
    pub const ZERO: TermPart = TermPart(0);

    pub fn value(self) -> u32 {
        self.0
    }

    fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value < 0.0 {
            return TermPart::ZERO;
        }
        let truncated = value.trunc();
        if truncated >= f64::from(u32::MAX) {
            TermPart(u32::MAX)
        } else {
            TermPart(truncated as u32)
        }
    }
}

impl From<u32> for TermPart {
    fn from(value: u32) -> Self {
        TermPart(value)
    }
}

impl From<i32> for TermPart {
    fn from(value: i32) -> Self {
        TermPart(u32::try_from(value).unwrap_or(0))
    }
}

impl From<i64> for TermPart {
    fn from(value: i64) -> Self {
        if value < 0 {
            TermPart::ZERO
        } else {
            TermPart(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl From<u64> for TermPart {
    fn from(value: u64) -> Self {
        TermPart(u32::try_from(value).unwrap_or(u32::MAX))
    }
}

impl From<f64> for TermPart {
    fn from(value: f64) -> Self {
        TermPart::from_f64(value)
    }
}

impl From<&str> for TermPart {
    fn from(value: &str) -> Self {
        value
            .trim()
            .parse::<f64>()
            .map(TermPart::from_f64)
            .unwrap_or_default()
    }
}

impl From<String> for TermPart {
    fn from(value: String) -> Self {
        TermPart::from(value.as_str())
    }
}

impl From<&Value> for TermPart {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    TermPart::from(u)
                } else if let Some(i) = n.as_i64() {
                    TermPart::from(i)
                } else {
                    n.as_f64().map(TermPart::from_f64).unwrap_or_default()
                }
            }
            Value::String(s) => TermPart::from(s.as_str()),
            _ => TermPart::ZERO,
        }
    }
}

impl<T: Into<TermPart>> From<Option<T>> for TermPart {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl Serialize for TermPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for TermPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(TermPart::from(&raw))
    }
}

/// A term split into whole years and remaining months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermParts {
    pub years: u32,
    pub months: u32,
}

impl TermParts {
    pub fn total_months(&self) -> u32 {
        self.years
            .saturating_mul(MONTHS_PER_YEAR)
            .saturating_add(self.months)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Total months of a `years + months` term.
pub fn term_parts_to_months(years: impl Into<TermPart>, months: impl Into<TermPart>) -> u32 {
    let years = years.into().value();
    let months = months.into().value();
    years.saturating_mul(MONTHS_PER_YEAR).saturating_add(months)
}

/// Split a month count into whole years and remaining months.
pub fn months_to_term_parts(total_months: impl Into<TermPart>) -> TermParts {
    let total = total_months.into().value();
    TermParts {
        years: total / MONTHS_PER_YEAR,
        months: total % MONTHS_PER_YEAR,
    }
}

/// Fold a month component of 12 or more into additional years.
pub fn normalize_term_parts(years: impl Into<TermPart>, months: impl Into<TermPart>) -> TermParts {
    let years = years.into().value();
    let months = months.into().value();
    TermParts {
        years: years.saturating_add(months / MONTHS_PER_YEAR),
        months: months % MONTHS_PER_YEAR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_term_parts_to_months_basic() {
        assert_eq!(term_parts_to_months(25, 6), 306);
    }

    #[test]
    fn test_term_parts_to_months_missing_components() {
        assert_eq!(term_parts_to_months(None::<u32>, None::<u32>), 0);
        assert_eq!(term_parts_to_months(Some(2), None::<u32>), 24);
    }

    #[test]
    fn test_term_parts_to_months_garbage_is_zero() {
        assert_eq!(term_parts_to_months("not-a-number", -3), 0);
        assert_eq!(term_parts_to_months(f64::NAN, f64::INFINITY), 0);
        assert_eq!(term_parts_to_months(-1.5, "7"), 7);
    }

    #[test]
    fn test_fractional_components_truncate() {
        assert_eq!(term_parts_to_months(2.9, 3.7), 27);
        assert_eq!(term_parts_to_months(" 5 ", "0.5"), 60);
    }

    #[test]
    fn test_months_to_term_parts() {
        assert_eq!(
            months_to_term_parts(306),
            TermParts {
                years: 25,
                months: 6
            }
        );
        assert_eq!(months_to_term_parts(None::<u32>), TermParts::default());
        assert_eq!(months_to_term_parts(-12), TermParts::default());
        assert_eq!(&months_to_term_parts(&Value::Null), &TermParts::default());
    }

    #[test]
    fn test_normalize_term_parts_folds_months() {
        assert_eq!(
            normalize_term_parts(24, 18),
            TermParts {
                years: 25,
                months: 6
            }
        );
        assert_eq!(
            normalize_term_parts(0, 11),
            TermParts {
                years: 0,
                months: 11
            }
        );
    }

    #[test]
    fn test_json_values_convert() {
        assert_eq!(TermPart::from(&json!(4)).value(), 4);
        assert_eq!(TermPart::from(&json!("4")).value(), 4);
        assert_eq!(TermPart::from(&json!(-4)).value(), 0);
        assert_eq!(TermPart::from(&json!(true)).value(), 0);
        assert_eq!(TermPart::from(&json!({"years": 1})).value(), 0);
    }

    #[test]
    fn test_term_part_deserializes_leniently() {
        #[derive(Deserialize)]
        struct Form {
            years: TermPart,
            #[serde(default)]
            months: TermPart,
        }
        let form: Form = serde_json::from_str(r#"{"years": "abc"}"#).unwrap();
        assert_eq!(form.years, TermPart::ZERO);
        assert_eq!(form.months, TermPart::ZERO);
    }

    #[test]
    fn test_huge_terms_saturate() {
        assert_eq!(term_parts_to_months(u32::MAX, 5), u32::MAX);
        assert_eq!(term_parts_to_months(1e20, 0), u32::MAX);
    }
}
