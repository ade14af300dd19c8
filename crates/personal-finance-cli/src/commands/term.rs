use clap::Args;
use serde_json::Value;

use personal_finance_core::term::{months_to_term_parts, normalize_term_parts};

/// Arguments for term normalization. Unparseable values count as zero.
#[derive(Args)]
pub struct TermArgs {
    /// Years part of the term
    #[arg(long)]
    pub years: Option<String>,

    /// Months part of the term (12 or more folds into years)
    #[arg(long)]
    pub months: Option<String>,

    /// Split a total month count instead
    #[arg(long, conflicts_with_all = ["years", "months"])]
    pub total_months: Option<String>,
}

pub fn run_term(args: TermArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let parts = match args.total_months.as_deref() {
        Some(total) => months_to_term_parts(total),
        None => normalize_term_parts(args.years.as_deref(), args.months.as_deref()),
    };
    Ok(serde_json::json!({
        "result": {
            "years": parts.years,
            "months": parts.months,
            "total_months": parts.total_months(),
        }
    }))
}
