//! Shared test utilities
//!
//! Common helpers used across test modules. Only compiled in test builds.

use chrono::NaiveDate;

use crate::phase::combination::Combination;
use crate::phase::generator::CycleSet;

/// Calendar date shorthand. Panics on an invalid date.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// The default anchor, 2024-03-22.
#[must_use]
pub fn anchor() -> NaiveDate {
    date(2024, 3, 22)
}

/// Menstruatie 5, Piek 6, Ovulatie 7, Luteaal 11: a 29-day cycle.
#[must_use]
pub fn scenario_combination() -> Combination {
    Combination::new([5, 6, 7, 11]).unwrap()
}

/// One-year cycle set holding the single scenario track.
#[must_use]
pub fn scenario_set() -> CycleSet {
    CycleSet::from_combinations(anchor(), &[scenario_combination()], 1)
}
