//! Cycle generator
//!
//! Lays phase intervals end to end from an anchor date. Two duration
//! policies are supported:
//!
//! - **Repeated**: one [`Combination`] repeated until a horizon in years.
//! - **Rotating**: per-phase duration lists consumed round by round until a
//!   horizon in days.
//!
//! Both produce contiguous [`Track`]s: each interval starts the day after the
//! previous one ends.

use anyhow::{bail, Result};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::phase::combination::{enumerate, Combination};
use crate::phase::config::CalendarConfig;
use crate::phase::Phase;

/// One phase occurrence with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Phase covering the interval
    pub phase: Phase,
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

impl Interval {
    /// Interval of `duration` days beginning on `start`.
    ///
    /// Returns `None` for a zero duration or when the end date overflows
    /// the calendar.
    #[must_use]
    pub fn new(phase: Phase, start: NaiveDate, duration: u32) -> Option<Self> {
        let last_offset = duration.checked_sub(1)?;
        let end = start.checked_add_days(Days::new(u64::from(last_offset)))?;
        Some(Self { phase, start, end })
    }

    /// Whether `date` lies within `[start, end]`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both ends included.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// First day after this interval.
    #[must_use]
    pub fn next_start(&self) -> Option<NaiveDate> {
        self.end.succ_opt()
    }
}

/// Contiguous sequence of intervals for one duration schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    intervals: Vec<Interval>,
}

impl Track {
    /// Intervals in generation order.
    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the track has no intervals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Phase covering `date`, if the track reaches it.
    ///
    /// Intervals are sorted and non-overlapping, so this is a binary search.
    #[must_use]
    pub fn phase_at(&self, date: NaiveDate) -> Option<Phase> {
        let idx = self.intervals.partition_point(|iv| iv.end < date);
        self.intervals
            .get(idx)
            .filter(|iv| iv.contains(date))
            .map(|iv| iv.phase)
    }

    fn push(&mut self, interval: Interval) {
        debug_assert!(self
            .intervals
            .last()
            .is_none_or(|prev| prev.next_start() == Some(interval.start)));
        self.intervals.push(interval);
    }
}

impl From<Vec<Interval>> for Track {
    fn from(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }
}

/// How far ahead to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    /// Calendar years from the anchor; one repeated track per combination
    Years(i32),
    /// Absolute day count; one rotating track
    Days(i64),
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Years(n) => write!(f, "{n} year(s)"),
            Self::Days(n) => write!(f, "{n} day(s)"),
        }
    }
}

/// Longest accepted horizon in years
pub const MAX_HORIZON_YEARS: i32 = 100;

/// Longest accepted horizon in days
pub const MAX_HORIZON_DAYS: i64 = 36_600;

impl Horizon {
    /// Reject horizons longer than [`MAX_HORIZON_YEARS`] or
    /// [`MAX_HORIZON_DAYS`]. Non-positive horizons pass and generate nothing.
    pub fn check(self) -> Result<Self> {
        match self {
            Self::Years(n) if n > MAX_HORIZON_YEARS => {
                bail!("Horizon of {n} years is too long: at most {MAX_HORIZON_YEARS} years")
            }
            Self::Days(n) if n > MAX_HORIZON_DAYS => {
                bail!("Horizon of {n} days is too long: at most {MAX_HORIZON_DAYS} days")
            }
            _ => Ok(self),
        }
    }
}

/// `anchor + years` calendar years, or `None` when `years` is not positive.
///
/// February 29 anchors clamp to February 28 in non-leap target years.
#[must_use]
pub fn horizon_end(anchor: NaiveDate, years: i32) -> Option<NaiveDate> {
    let years = u32::try_from(years).ok().filter(|&y| y > 0)?;
    anchor.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// Repeat `combination` back to back from `anchor` for `horizon_years`.
///
/// Whole cycles are emitted while the running date is before the horizon,
/// so the final cycle may extend past it. A non-positive horizon yields an
/// empty track.
#[must_use]
pub fn generate_repeated(anchor: NaiveDate, combination: &Combination, horizon_years: i32) -> Track {
    let mut track = Track::default();
    let Some(end) = horizon_end(anchor, horizon_years) else {
        return track;
    };

    let mut current = anchor;
    while current < end {
        for (phase, duration) in combination.iter() {
            let Some(interval) = Interval::new(phase, current, duration) else {
                return track;
            };
            track.push(interval);
            let Some(next) = interval.next_start() else {
                return track;
            };
            current = next;
        }
    }
    track
}

/// Rotate through per-phase duration lists from `anchor` until at least
/// `total_days` have been consumed.
///
/// In round `r` each phase uses element `r % len` of its own list. The
/// interval crossing the boundary is kept whole. Phases with an empty list
/// are skipped, and zero entries are ignored.
#[must_use]
pub fn generate_rotating(anchor: NaiveDate, schedule: &[(Phase, Vec<u32>)], total_days: i64) -> Track {
    let mut track = Track::default();
    let makes_progress = schedule
        .iter()
        .any(|(_, list)| list.iter().any(|&d| d > 0));
    if total_days <= 0 || !makes_progress {
        return track;
    }

    let mut consumed: i64 = 0;
    let mut current = anchor;
    for round in 0_usize.. {
        for (phase, list) in schedule {
            if list.is_empty() {
                continue;
            }
            let duration = list[round % list.len()];
            if duration == 0 {
                continue;
            }
            if consumed >= total_days {
                return track;
            }
            let Some(interval) = Interval::new(*phase, current, duration) else {
                return track;
            };
            track.push(interval);
            consumed += i64::from(duration);
            let Some(next) = interval.next_start() else {
                return track;
            };
            current = next;
        }
    }
    track
}

/// Every track under consideration for a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSet {
    tracks: Vec<Track>,
}

impl CycleSet {
    /// One repeated track per combination.
    #[must_use]
    pub fn from_combinations(anchor: NaiveDate, combinations: &[Combination], horizon_years: i32) -> Self {
        let tracks = combinations
            .iter()
            .map(|c| generate_repeated(anchor, c, horizon_years))
            .filter(|t| !t.is_empty())
            .collect();
        Self { tracks }
    }

    /// Build the cycle set for a configuration and horizon.
    ///
    /// Years enumerate every combination of the configured durations;
    /// days build a single rotating track from the configured lists.
    #[must_use]
    pub fn build(config: &CalendarConfig, horizon: Horizon) -> Self {
        match horizon {
            Horizon::Years(years) => {
                let combinations = enumerate(&config.durations);
                Self::from_combinations(config.anchor, &combinations, years)
            }
            Horizon::Days(days) => {
                let track = generate_rotating(config.anchor, &config.durations.schedule(), days);
                Self::from_tracks(vec![track])
            }
        }
    }

    /// Wrap pre-built tracks. Empty tracks are dropped.
    #[must_use]
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks: tracks.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    /// Tracks in generation order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether there are no tracks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total interval count across all tracks.
    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }
}
