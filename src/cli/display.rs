//! Terminal rendering for query results
//!
//! Renders answers as human-readable, colored text. Callers decide where it
//! goes: answers to stdout, menus and status to stderr.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use colored::{ColoredString, Colorize};

use crate::input::format_date;
use crate::phase::generator::Interval;
use crate::phase::query::PhaseDistribution;
use crate::phase::Phase;
use crate::session::Session;

/// English month name for 1..=12, `"Unknown"` otherwise.
#[must_use]
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map_or("Unknown", |m| m.name())
}

fn paint(phase: Phase) -> ColoredString {
    let name = phase.name();
    match phase {
        Phase::Menstruatie => name.red(),
        Phase::Piek => name.yellow(),
        Phase::Ovulatie => name.green(),
        Phase::Luteaal => name.blue(),
    }
}

/// The interactive menu.
#[must_use]
pub fn render_menu() -> String {
    let mut out = format!("\n{}\n", "Choose an option:".bold().cyan());
    for line in [
        "1. Phase probability for a specific date",
        "2. Phase days for a specific month",
        "3. Best start days for a phase in each month of a given year",
        "4. Show calculated cycles for a specific number of years",
        "5. Change the calculation horizon",
        "q. Quit",
    ] {
        let _ = writeln!(out, "  {line}");
    }
    out
}

/// One-line summary of the active cycle set.
#[must_use]
pub fn render_session_header(session: &Session) -> String {
    let cycles = session.cycles();
    format!(
        "{} {} track(s), {} interval(s), horizon {} from {}",
        "Cycle set:".dimmed(),
        cycles.len(),
        cycles.interval_count(),
        session.horizon(),
        format_date(session.config().anchor)
    )
}

/// Phase probabilities on a date.
#[must_use]
pub fn render_probabilities(date: NaiveDate, dist: &PhaseDistribution) -> String {
    if dist.is_empty() {
        return format!(
            "{} No phase covers {} within the calculated horizon",
            "⚠".yellow().bold(),
            format_date(date)
        );
    }

    let mut out = format!("Probabilities for {}:", format_date(date));
    for (phase, pct) in dist {
        let _ = write!(out, "\n{}: {}", paint(*phase), format!("{pct:.2}%").bold());
    }
    out
}

/// Best day of one month for a phase.
#[must_use]
pub fn render_best_day(phase: Phase, month: u32, year: i32, best: Option<(NaiveDate, f64)>) -> String {
    match best {
        Some((day, pct)) => format!(
            "The best day for phase {} in {} {year} is {} with a probability of {}",
            paint(phase),
            month_name(month),
            format_date(day).bold(),
            format!("{pct:.2}%").bold()
        ),
        None => format!(
            "No days found for phase {} in {} {year}",
            paint(phase),
            month_name(month)
        ),
    }
}

/// Best day per month of a year for a phase, in month order.
#[must_use]
pub fn render_best_days(phase: Phase, year: i32, best: &BTreeMap<u32, NaiveDate>) -> String {
    let mut out = format!("Best start days for phase {} in {year}:", paint(phase));
    if best.is_empty() {
        let _ = write!(out, "\n  {}", "none within the calculated horizon".dimmed());
    }
    for (month, day) in best {
        let _ = write!(out, "\n{}: {}", month_name(*month), format_date(*day));
    }
    out
}

/// Interval listing, one line per interval.
#[must_use]
pub fn render_intervals<'a>(intervals: impl IntoIterator<Item = &'a Interval>) -> String {
    let mut out = String::from("Calculated cycles:");
    for iv in intervals {
        let _ = write!(
            out,
            "\nPhase: {}, Start: {}, End: {}",
            paint(iv.phase),
            format_date(iv.start),
            format_date(iv.end)
        );
    }
    out
}
