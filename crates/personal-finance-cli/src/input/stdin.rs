use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialize piped JSON from stdin.
///
/// `None` when stdin is a terminal or carries nothing but whitespace, so
/// commands can fall back to their flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&buffer)
        .map(Some)
        .map_err(|e| format!("Failed to parse stdin: {}", e).into())
}
