//! cyclecal - Cycle phase calendar
//!
//! Generates recurring phase intervals from a fixed anchor date and answers
//! questions against them: which phase covers a date, which days of a month
//! belong to a phase, and the most probable day per month.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod input;
pub mod log;
pub mod phase;
pub mod session;

#[cfg(test)]
pub mod testutil;

// Re-export commonly used types
pub use cli::{Answer, OutputFormat};
pub use log::{QueryKind, QueryLogger, QueryRecord};
pub use phase::combination::{enumerate, Combination};
pub use phase::config::{CalendarConfig, PhaseDurations};
pub use phase::generator::{generate_repeated, generate_rotating, CycleSet, Horizon, Interval, Track};
pub use phase::query::{
    best_day_in_month, best_day_per_month, month_day_query, point_query, probability_query,
    range_listing, PhaseHit,
};
pub use phase::Phase;
pub use session::Session;
