//! User input validation
//!
//! Turns free text into typed values before anything reaches the calendar.
//! Formats follow the interactive prompts: `dd mm yyyy`, `mm yyyy`, `yyyy`.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};

use crate::phase::generator::Horizon;
use crate::phase::Phase;

const DATE_FORMAT: &str = "%d %m %Y";

/// Whether `input` is whitespace-separated ASCII digit fields of exactly
/// the given widths.
fn has_digit_fields(input: &str, widths: &[usize]) -> bool {
    let fields: Vec<&str> = input.split_whitespace().collect();
    fields.len() == widths.len()
        && fields
            .iter()
            .zip(widths)
            .all(|(field, &width)| field.len() == width && field.bytes().all(|b| b.is_ascii_digit()))
}

/// Parse a `dd mm yyyy` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if !has_digit_fields(trimmed, &[2, 2, 4]) {
        bail!("Invalid date format '{trimmed}'. Please use dd mm yyyy.");
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .with_context(|| format!("Invalid date format '{trimmed}'. Please use dd mm yyyy."))
}

/// Parse a `mm yyyy` month and year.
pub fn parse_month_year(input: &str) -> Result<(u32, i32)> {
    let trimmed = input.trim();
    if !has_digit_fields(trimmed, &[2, 4]) {
        bail!("Invalid date format '{trimmed}'. Please use mm yyyy.");
    }
    let first = NaiveDate::parse_from_str(&format!("01 {trimmed}"), DATE_FORMAT)
        .with_context(|| format!("Invalid date format '{trimmed}'. Please use mm yyyy."))?;
    Ok((first.month(), first.year()))
}

/// Parse a four-digit `yyyy` year.
pub fn parse_year(input: &str) -> Result<i32> {
    let trimmed = input.trim();
    if !has_digit_fields(trimmed, &[4]) {
        bail!("Invalid year format '{trimmed}'. Please use yyyy.");
    }
    Ok(trimmed.parse()?)
}

/// Parse one of the four phase names.
pub fn parse_phase(input: &str) -> Result<Phase> {
    input.parse()
}

/// Parse a whole number of years or days. Empty input returns `default`.
pub fn parse_count<T>(input: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse()
        .with_context(|| format!("Invalid number '{trimmed}'"))
}

/// Parse a number of years to generate. Empty input returns `default`;
/// horizons beyond the supported length are rejected.
pub fn parse_years(input: &str, default: i32) -> Result<i32> {
    let years = parse_count(input, default)?;
    Horizon::Years(years).check()?;
    Ok(years)
}

/// Parse a horizon: a bare number is years, a `d` suffix means days
/// (`2`, `400d`). Empty input returns `default`.
pub fn parse_horizon(input: &str, default: Horizon) -> Result<Horizon> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    if let Some(days) = trimmed.strip_suffix(['d', 'D']) {
        let days = days
            .trim()
            .parse()
            .with_context(|| format!("Invalid horizon '{trimmed}'. Please use <years> or <days>d."))?;
        return Horizon::Days(days).check();
    }
    let years = trimmed
        .parse()
        .with_context(|| format!("Invalid horizon '{trimmed}'. Please use <years> or <days>d."))?;
    Horizon::Years(years).check()
}

/// Format a date the way it is entered.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
