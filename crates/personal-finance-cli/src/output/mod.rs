pub mod csv_out;
pub mod minimal;
pub mod table;

use serde_json::Value;
use std::io::{self, Write};

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Row arrays (schedule entries, savings periods) inside a result object.
pub(crate) const ROW_KEYS: [&str; 2] = ["entries", "periods"];

/// The first row array found in a result object, if any.
pub(crate) fn row_array(result: &serde_json::Map<String, Value>) -> Option<&Vec<Value>> {
    ROW_KEYS
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array))
}

fn print_json(value: &Value) {
    let mut out = io::stdout().lock();
    let written = serde_json::to_writer_pretty(&mut out, value)
        .map_err(io::Error::from)
        .and_then(|_| writeln!(out));
    if let Err(e) = written {
        eprintln!("JSON output error: {}", e);
    }
}
