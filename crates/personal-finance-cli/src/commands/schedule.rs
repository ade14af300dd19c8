use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use personal_finance_core::calendar::parse_iso_date;
use personal_finance_core::schedule::engine::{self, solve_payment};
use personal_finance_core::schedule::impact;
use personal_finance_core::schedule::loan::{LoanDefinition, ScheduleConfig, ScheduleInput};
use personal_finance_core::term::{months_to_term_parts, term_parts_to_months};
use personal_finance_core::{PaymentFrequency, RoundingMode};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoundingArg {
    HalfEven,
    HalfUp,
}

impl From<RoundingArg> for RoundingMode {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::HalfEven => RoundingMode::HalfEven,
            RoundingArg::HalfUp => RoundingMode::HalfUp,
        }
    }
}

/// Arguments for amortization schedules
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file with loan, rate_adjustments, lump_sums, config
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate (e.g. 0.05 for 5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Contractual monthly payment (solved from the term when omitted)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Amortization term, years part
    #[arg(long)]
    pub term_years: Option<String>,

    /// Amortization term, months part
    #[arg(long)]
    pub term_months: Option<String>,

    /// Loan start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Preferred day of month for payments (1-31)
    #[arg(long)]
    pub payment_day: Option<u32>,

    /// Engine configuration file (YAML or JSON)
    #[arg(long)]
    pub config: Option<String>,

    /// Override the safety cap on computed periods
    #[arg(long)]
    pub max_periods: Option<u32>,

    /// Override the interest rounding convention
    #[arg(long, value_enum)]
    pub rounding: Option<RoundingArg>,
}

/// Arguments for solving the level payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Nominal annual rate (e.g. 0.05 for 5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Amortization term, years part
    #[arg(long)]
    pub term_years: Option<String>,

    /// Amortization term, months part
    #[arg(long)]
    pub term_months: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_schedule_input(&args)?;
    let result = engine::generate_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_prepayment_impact(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input = resolve_schedule_input(&args)?;
    let result = impact::analyze_prepayment_impact(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let months = term_parts_to_months(args.term_years.as_deref(), args.term_months.as_deref());
    let payment = solve_payment(args.principal, args.rate, months)?;
    Ok(serde_json::json!({
        "result": {
            "payment": payment.to_string(),
            "total_months": months,
            "term": months_to_term_parts(months),
        }
    }))
}

/// Input file, then stdin, then individual flags; config file and
/// overrides are layered on top.
fn resolve_schedule_input(args: &ScheduleArgs) -> Result<ScheduleInput, Box<dyn std::error::Error>> {
    let mut schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(from_stdin) = input::stdin::read_stdin()? {
        from_stdin
    } else {
        ScheduleInput {
            loan: loan_from_flags(args)?,
            rate_adjustments: Vec::new(),
            lump_sums: Vec::new(),
            config: ScheduleConfig::default(),
        }
    };

    if let Some(ref path) = args.config {
        schedule_input.config = input::file::read_yaml_or_json(path)?;
        debug!(path = %path, "loaded schedule config");
    }
    if let Some(max_periods) = args.max_periods {
        schedule_input.config.max_periods = max_periods;
    }
    if let Some(rounding) = args.rounding {
        schedule_input.config.rounding = rounding.into();
    }

    Ok(schedule_input)
}

fn loan_from_flags(args: &ScheduleArgs) -> Result<LoanDefinition, Box<dyn std::error::Error>> {
    let principal = args
        .principal
        .ok_or("--principal is required (or provide --input)")?;
    let annual_rate = args
        .rate
        .ok_or("--rate is required (or provide --input)")?;
    let start_date = args
        .start_date
        .as_deref()
        .ok_or("--start-date is required (or provide --input)")?;
    let months = term_parts_to_months(args.term_years.as_deref(), args.term_months.as_deref());

    Ok(LoanDefinition {
        principal,
        annual_rate,
        payment_amount: args.payment,
        amortization_months: (months > 0).then_some(months),
        payment_frequency: PaymentFrequency::Monthly,
        start_date: parse_iso_date("start_date", start_date)?,
        preferred_payment_day: args.payment_day,
    })
}
