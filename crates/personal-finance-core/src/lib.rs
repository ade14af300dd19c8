//! Personal-finance calculators: loan amortization schedules under rate
//! adjustments and lump-sum prepayments, and savings projections.

pub mod calendar;
pub mod error;
pub mod term;
pub mod time_value;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "savings")]
pub mod savings;

pub use error::FinanceError;
pub use types::*;

/// Standard result type for all personal-finance operations
pub type FinanceResult<T> = Result<T, FinanceError>;
