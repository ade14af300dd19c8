pub mod savings;
pub mod schedule;
pub mod term;
