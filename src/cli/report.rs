//! Query answers
//!
//! Runs one query against a [`Session`] and packages the result as text or
//! JSON together with the record for the query log.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::display;
use crate::input::format_date;
use crate::log::{QueryKind, QueryRecord};
use crate::phase::generator::{horizon_end, Interval};
use crate::phase::Phase;
use crate::session::Session;

/// How answers are rendered on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Colored human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Rendered answer plus its log record
#[derive(Debug, Clone)]
pub struct Answer {
    /// Text or JSON body for stdout
    pub body: String,
    /// Record for the query log
    pub record: QueryRecord,
}

#[derive(Serialize)]
struct PhaseShare {
    phase: Phase,
    percentage: f64,
}

#[derive(Serialize)]
struct DayShare {
    date: NaiveDate,
    percentage: f64,
}

#[derive(Serialize)]
struct ProbabilityReport {
    date: NaiveDate,
    probabilities: Vec<PhaseShare>,
}

#[derive(Serialize)]
struct PhaseDaysReport {
    phase: Phase,
    month: u32,
    year: i32,
    best: Option<DayShare>,
    days: Vec<DayShare>,
}

#[derive(Serialize)]
struct MonthBest {
    month: u32,
    name: &'static str,
    date: NaiveDate,
}

#[derive(Serialize)]
struct BestDaysReport {
    phase: Phase,
    year: i32,
    months: Vec<MonthBest>,
}

#[derive(Serialize)]
struct ListingReport<'a> {
    until: Option<NaiveDate>,
    intervals: &'a [Interval],
}

/// Round to two decimals for output.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

/// Phase probabilities on `date`.
pub fn probability(session: &Session, date: NaiveDate, format: OutputFormat) -> Result<Answer> {
    let dist = session.probability(date);
    let body = match format {
        OutputFormat::Text => display::render_probabilities(date, &dist),
        OutputFormat::Json => to_json(&ProbabilityReport {
            date,
            probabilities: dist
                .iter()
                .map(|(&phase, &pct)| PhaseShare {
                    phase,
                    percentage: round2(pct),
                })
                .collect(),
        })?,
    };
    let record = QueryRecord::now(
        QueryKind::Probability,
        format_date(date),
        session.horizon(),
        dist.len(),
    );
    Ok(Answer { body, record })
}

/// Best day of one month for `phase`, with every matching day in JSON.
pub fn phase_days(
    session: &Session,
    month: u32,
    year: i32,
    phase: Phase,
    format: OutputFormat,
) -> Result<Answer> {
    let days = session.phase_days(month, year, phase);
    let best = session.best_day_in_month(month, year, phase);
    let body = match format {
        OutputFormat::Text => display::render_best_day(phase, month, year, best),
        OutputFormat::Json => to_json(&PhaseDaysReport {
            phase,
            month,
            year,
            best: best.map(|(date, pct)| DayShare {
                date,
                percentage: round2(pct),
            }),
            days: days
                .iter()
                .map(|(&date, &pct)| DayShare {
                    date,
                    percentage: round2(pct),
                })
                .collect(),
        })?,
    };
    let record = QueryRecord::now(
        QueryKind::PhaseDays,
        format!("{month:02} {year} {phase}"),
        session.horizon(),
        days.len(),
    );
    Ok(Answer { body, record })
}

/// Best day per month of `year` for `phase`.
pub fn best_days(session: &Session, year: i32, phase: Phase, format: OutputFormat) -> Result<Answer> {
    let best = session.best_days(year, phase);
    let body = match format {
        OutputFormat::Text => display::render_best_days(phase, year, &best),
        OutputFormat::Json => to_json(&BestDaysReport {
            phase,
            year,
            months: best
                .iter()
                .map(|(&month, &date)| MonthBest {
                    month,
                    name: display::month_name(month),
                    date,
                })
                .collect(),
        })?,
    };
    let record = QueryRecord::now(
        QueryKind::BestDays,
        format!("{year} {phase}"),
        session.horizon(),
        best.len(),
    );
    Ok(Answer { body, record })
}

/// Intervals starting within `years` of the anchor.
pub fn listing(session: &Session, years: i32, format: OutputFormat) -> Result<Answer> {
    let intervals = session.list_years(years);
    let body = match format {
        OutputFormat::Text => display::render_intervals(&intervals),
        OutputFormat::Json => to_json(&ListingReport {
            until: horizon_end(session.config().anchor, years),
            intervals: &intervals,
        })?,
    };
    let record = QueryRecord::now(
        QueryKind::Listing,
        years.to_string(),
        session.horizon(),
        intervals.len(),
    );
    Ok(Answer { body, record })
}
