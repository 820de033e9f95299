use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate};

/// Placeholder shown wherever a value is missing or not computable.
pub const NOT_AVAILABLE: &str = "N/A";

/// Parse the date formats the API is known to send: plain `2024-01-31`
/// dates and full RFC 3339 timestamps (the calendar date is kept).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.date_naive());
    }

    bail!("Unknown date format: {}", s)
}

/// Format a date for display, e.g. "05 Mar 2024"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Format an optional value with a fixed number of decimals, or "N/A"
pub fn format_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format an optional value followed by its unit, or "N/A"
pub fn format_with_unit(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*} {}", decimals, v, unit),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format large distances with thousands separators (e.g. 123456 -> "123,456")
pub fn format_distance(km: f64) -> String {
    if !km.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let rounded = km.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
