//! Command layer behind the CLI: argument validation, then a form submit
//! or a single gateway call. Errors come back as display strings.

pub mod appointment;
pub mod lead;

use std::str::FromStr;

use crate::models::ModelError;

/// Parse a status argument case-insensitively (`confirmed` → `CONFIRMED`).
fn parse_status<T>(raw: &str) -> Result<T, String>
where
    T: FromStr<Err = ModelError>,
{
    raw.trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|e: ModelError| e.to_string())
}

/// Names of required inputs that are blank, in form order.
fn missing_fields<'a>(required: &[(&'a str, &str)]) -> Vec<&'a str> {
    required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

fn require_all(required: &[(&str, &str)]) -> Result<(), String> {
    let missing = missing_fields(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Required field(s) missing: {}", missing.join(", ")))
    }
}
