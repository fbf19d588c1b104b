use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Parameters piped on stdin, as JSON or YAML. `None` when stdin is a
/// terminal or the pipe is empty.
pub fn read_piped<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    log::debug!("parsing {} bytes of piped parameters", trimmed.len());
    let params = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).map_err(|e| format!("Invalid JSON on stdin: {e}"))?
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| format!("Invalid YAML on stdin: {e}"))?
    };
    Ok(Some(params))
}
