use clap::Args;
use serde_json::Value;

use personal_finance_core::savings::projection::{self, SavingsInput};

use crate::input;

/// Arguments for savings projections
#[derive(Args)]
pub struct SavingsArgs {
    /// Path to JSON input file with the savings plan
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_savings(args: SavingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let savings_input: SavingsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(from_stdin) = input::stdin::read_stdin()? {
        from_stdin
    } else {
        return Err("--input <file.json> or stdin required for savings projection".into());
    };
    let result = projection::project_savings(&savings_input)?;
    Ok(serde_json::to_value(result)?)
}
