//! Phase query engine
//!
//! Answers point, probability, month-day, best-day and range questions
//! against a [`CycleSet`]. All queries are read-only; "no match" is an empty
//! result or `None`, never an error.

use std::collections::BTreeMap;
use std::ops::Add;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::phase::generator::{CycleSet, Interval, Track};
use crate::phase::Phase;

/// Phase percentages keyed in definition order
pub type PhaseDistribution = BTreeMap<Phase, f64>;

/// Per-day percentages keyed in ascending date order
pub type DayDistribution = BTreeMap<NaiveDate, f64>;

/// A track that covers the queried date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseHit {
    /// Index of the track within the cycle set
    pub track: usize,
    /// Phase covering the date on that track
    pub phase: Phase,
}

/// Per-phase containment counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts([u64; 4]);

impl PhaseCounts {
    /// Count for one phase.
    #[must_use]
    pub const fn get(&self, phase: Phase) -> u64 {
        self.0[phase.index()]
    }

    /// Sum over all phases.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    fn record(&mut self, phase: Phase) {
        self.0[phase.index()] += 1;
    }

    /// Normalise to percentages of the total. Phases with no count are
    /// omitted; a zero total gives an empty distribution.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_distribution(&self) -> PhaseDistribution {
        let total = self.total();
        if total == 0 {
            return PhaseDistribution::new();
        }
        Phase::ALL
            .iter()
            .filter(|&&p| self.get(p) > 0)
            .map(|&p| (p, self.get(p) as f64 / total as f64 * 100.0))
            .collect()
    }
}

impl Add for PhaseCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut out = self;
        for (slot, extra) in out.0.iter_mut().zip(rhs.0) {
            *slot += extra;
        }
        out
    }
}

/// Per-track hits for `date`, in track order. Tracks that do not reach the
/// date are omitted.
#[must_use]
pub fn point_query(cycles: &CycleSet, date: NaiveDate) -> Vec<PhaseHit> {
    cycles
        .tracks()
        .iter()
        .enumerate()
        .filter_map(|(track, t)| t.phase_at(date).map(|phase| PhaseHit { track, phase }))
        .collect()
}

/// Split `tracks` into `shards` contiguous slices of near-equal size.
///
/// Slice `i` holds `len / n` tracks, plus one when `i < len % n`. Surplus
/// slices are empty. A shard count of zero is treated as one.
#[must_use]
pub fn partition(tracks: &[Track], shards: usize) -> Vec<&[Track]> {
    let shards = shards.max(1);
    let base = tracks.len() / shards;
    let extra = tracks.len() % shards;

    let mut slices = Vec::with_capacity(shards);
    let mut rest = tracks;
    for i in 0..shards {
        let size = base + usize::from(i < extra);
        let (head, tail) = rest.split_at(size);
        slices.push(head);
        rest = tail;
    }
    slices
}

/// Count, per phase, the intervals in `tracks` that contain `date`.
#[must_use]
pub fn count_shard(tracks: &[Track], date: NaiveDate) -> PhaseCounts {
    let mut counts = PhaseCounts::default();
    for interval in tracks.iter().flat_map(Track::intervals) {
        if interval.contains(date) {
            counts.record(interval.phase);
        }
    }
    counts
}

/// Phase probabilities for `date` across every track.
///
/// Tracks are partitioned into `shards` slices that are counted in parallel;
/// the slice counts are summed in slice order and normalised once, so the
/// result does not depend on the shard count.
#[must_use]
pub fn probability_query(cycles: &CycleSet, date: NaiveDate, shards: usize) -> PhaseDistribution {
    let slices = partition(cycles.tracks(), shards);
    let partials: Vec<PhaseCounts> = slices
        .par_iter()
        .map(|slice| count_shard(slice, date))
        .collect();

    partials
        .into_iter()
        .fold(PhaseCounts::default(), |acc, counts| acc + counts)
        .to_distribution()
}

/// First and last day of a month, or `None` for an invalid month.
#[must_use]
pub fn month_bounds(month: u32, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Percentage of tracks in which `phase` covers each day of the month.
///
/// The denominator is the number of tracks (one per combination), not the
/// number of individual cycles. Days without a match are
/// omitted; an invalid month or an empty cycle set gives an empty result.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn month_day_query(cycles: &CycleSet, month: u32, year: i32, phase: Phase) -> DayDistribution {
    let Some((first, last)) = month_bounds(month, year) else {
        return DayDistribution::new();
    };
    if cycles.is_empty() {
        return DayDistribution::new();
    }

    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let matching = cycles
        .tracks()
        .iter()
        .flat_map(Track::intervals)
        .filter(|iv| iv.phase == phase);
    for interval in matching {
        let lo = interval.start.max(first);
        let hi = interval.end.min(last);
        for day in lo.iter_days().take_while(|d| *d <= hi) {
            *counts.entry(day).or_insert(0) += 1;
        }
    }

    let tracks = cycles.len() as f64;
    counts
        .into_iter()
        .map(|(day, count)| (day, count as f64 / tracks * 100.0))
        .collect()
}

/// Day of the month where `phase` is most likely, with its percentage.
///
/// Only a strictly higher percentage replaces the current best, so ties go
/// to the earliest date.
#[must_use]
pub fn best_day_in_month(
    cycles: &CycleSet,
    month: u32,
    year: i32,
    phase: Phase,
) -> Option<(NaiveDate, f64)> {
    month_day_query(cycles, month, year, phase)
        .into_iter()
        .fold(None, |best, (day, pct)| match best {
            Some((_, top)) if pct <= top => best,
            _ => Some((day, pct)),
        })
}

/// Best day for `phase` in each month of `year`, keyed by month number
/// (1..=12). Months without a match are omitted.
#[must_use]
pub fn best_day_per_month(cycles: &CycleSet, year: i32, phase: Phase) -> BTreeMap<u32, NaiveDate> {
    (1..=12)
        .filter_map(|month| {
            best_day_in_month(cycles, month, year, phase).map(|(day, _)| (month, day))
        })
        .collect()
}

/// Every interval starting before `until`, track by track in generation
/// order. Overlapping tracks are not deduplicated. Each call rescans.
pub fn range_listing(cycles: &CycleSet, until: NaiveDate) -> impl Iterator<Item = &Interval> + '_ {
    cycles
        .tracks()
        .iter()
        .flat_map(Track::intervals)
        .filter(move |iv| iv.start < until)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::combination::{enumerate, Combination};
    use crate::phase::config::{CalendarConfig, PhaseDurations};
    use crate::phase::generator::Horizon;
    use crate::testutil::{anchor, date, scenario_set};

    fn default_set() -> CycleSet {
        CycleSet::build(&CalendarConfig::default(), Horizon::Years(1))
    }

    fn assert_sums_to_100(dist: &PhaseDistribution) {
        let sum: f64 = dist.values().sum();
        assert!((sum - 100.0).abs() < 1e-9, "percentages sum to {sum}");
    }

    #[test]
    fn test_point_query_scenario() {
        let hits = point_query(&scenario_set(), date(2024, 3, 24));
        assert_eq!(
            hits,
            vec![PhaseHit {
                track: 0,
                phase: Phase::Menstruatie
            }]
        );
    }

    #[test]
    fn test_point_query_before_anchor_is_empty() {
        assert!(point_query(&scenario_set(), date(2024, 3, 21)).is_empty());
    }

    #[test]
    fn test_point_query_one_hit_per_track() {
        let set = default_set();
        let hits = point_query(&set, date(2024, 6, 1));
        assert_eq!(hits.len(), set.len());
        let indices: Vec<usize> = hits.iter().map(|h| h.track).collect();
        assert_eq!(indices, (0..set.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_balanced() {
        let set = default_set();
        let sizes: Vec<usize> = partition(set.tracks(), 4).iter().map(|s| s.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2, 2]);
    }

    #[test]
    fn test_partition_more_shards_than_tracks() {
        let set = scenario_set();
        let slices = partition(set.tracks(), 5);
        assert_eq!(slices.len(), 5);
        assert_eq!(slices.iter().map(|s| s.len()).sum::<usize>(), 1);
        assert_eq!(slices.iter().filter(|s| s.is_empty()).count(), 4);
    }

    #[test]
    fn test_partition_zero_shards_is_one() {
        let set = default_set();
        let slices = partition(set.tracks(), 0);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].len(), set.len());
    }

    #[test]
    fn test_count_shard_empty_slice() {
        let counts = count_shard(&[], anchor());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_probability_single_track() {
        let dist = probability_query(&scenario_set(), date(2024, 3, 24), 1);
        assert_eq!(dist.len(), 1);
        assert!((dist[&Phase::Menstruatie] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_probability_sums_to_100() {
        let set = default_set();
        for day in [date(2024, 3, 26), date(2024, 4, 1), date(2024, 9, 15)] {
            let dist = probability_query(&set, day, 10);
            assert!(!dist.is_empty());
            assert_sums_to_100(&dist);
        }
    }

    #[test]
    fn test_probability_mixed_phases() {
        // On 2024-03-26 Menstruatie 4 has ended in 3 of 9 tracks
        let dist = probability_query(&default_set(), date(2024, 3, 26), 3);
        let expected_piek = 3.0 / 9.0 * 100.0;
        assert!((dist[&Phase::Piek] - expected_piek).abs() < 1e-9);
        assert!((dist[&Phase::Menstruatie] - (100.0 - expected_piek)).abs() < 1e-9);
    }

    #[test]
    fn test_probability_shard_invariance() {
        let set = default_set();
        let day = date(2024, 7, 3);
        let reference = probability_query(&set, day, 1);
        for shards in [2, 3, set.len(), set.len() + 7] {
            assert_eq!(probability_query(&set, day, shards), reference, "shards={shards}");
        }
    }

    #[test]
    fn test_probability_outside_horizon_is_empty() {
        let dist = probability_query(&default_set(), date(2030, 1, 1), 10);
        assert!(dist.is_empty());
    }

    #[test]
    fn test_probability_empty_cycle_set() {
        let durations = PhaseDurations::new(&[5], &[6], &[7], &[]);
        assert!(enumerate(&durations).is_empty());
        let set = CycleSet::from_combinations(anchor(), &enumerate(&durations), 1);
        assert!(set.is_empty());
        assert!(probability_query(&set, anchor(), 10).is_empty());
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2, 2024), Some((date(2024, 2, 1), date(2024, 2, 29))));
        assert_eq!(month_bounds(12, 2024), Some((date(2024, 12, 1), date(2024, 12, 31))));
        assert_eq!(month_bounds(13, 2024), None);
        assert_eq!(month_bounds(0, 2024), None);
    }

    #[test]
    fn test_month_day_query_single_track() {
        let days = month_day_query(&scenario_set(), 4, 2024, Phase::Ovulatie);
        // First cycle: 2 to 8 April. Second cycle Ovulatie starts 1 May.
        let expected: Vec<NaiveDate> = (2..=8).map(|d| date(2024, 4, d)).collect();
        assert_eq!(days.keys().copied().collect::<Vec<_>>(), expected);
        assert!(days.values().all(|&p| (p - 100.0).abs() < 1e-9));
    }

    #[test]
    fn test_month_day_query_clips_to_month() {
        let days = month_day_query(&scenario_set(), 3, 2024, Phase::Piek);
        // Piek runs 27 March to 1 April
        assert_eq!(days.len(), 5);
        assert_eq!(days.keys().next(), Some(&date(2024, 3, 27)));
        assert_eq!(days.keys().next_back(), Some(&date(2024, 3, 31)));
    }

    #[test]
    fn test_month_day_query_uses_track_count() {
        let set = default_set();
        let days = month_day_query(&set, 3, 2024, Phase::Piek);
        // Piek starts on 26 March only when Menstruatie lasts 4 days: 3 of 9 tracks
        let first = days[&date(2024, 3, 26)];
        assert!((first - 3.0 / 9.0 * 100.0).abs() < 1e-9);
        assert!(days.values().all(|&p| p > 0.0 && p <= 100.0));
    }

    #[test]
    fn test_month_day_query_degenerate() {
        assert!(month_day_query(&scenario_set(), 13, 2024, Phase::Piek).is_empty());
        assert!(month_day_query(&CycleSet::default(), 4, 2024, Phase::Piek).is_empty());
        assert!(month_day_query(&scenario_set(), 4, 2031, Phase::Piek).is_empty());
    }

    #[test]
    fn test_best_day_in_month_prefers_highest() {
        let set = default_set();
        let (day, pct) = best_day_in_month(&set, 3, 2024, Phase::Piek).unwrap();
        // From 28 March every track is in Piek
        assert_eq!(day, date(2024, 3, 28));
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_day_in_month_ties_go_to_earliest() {
        let (day, _) = best_day_in_month(&scenario_set(), 4, 2024, Phase::Ovulatie).unwrap();
        assert_eq!(day, date(2024, 4, 2));
    }

    #[test]
    fn test_best_day_in_month_none() {
        assert!(best_day_in_month(&scenario_set(), 1, 2024, Phase::Piek).is_none());
    }

    #[test]
    fn test_best_day_per_month() {
        let best = best_day_per_month(&scenario_set(), 2024, Phase::Menstruatie);
        // Horizon starts in March, so January and February are absent
        assert!(!best.contains_key(&1));
        assert!(!best.contains_key(&2));
        assert_eq!(best[&3], date(2024, 3, 22));
        assert_eq!(best[&4], date(2024, 4, 20));
        assert_eq!(best.len(), 10);
    }

    #[test]
    fn test_range_listing_filters_by_start() {
        let set = scenario_set();
        let listed: Vec<&Interval> = range_listing(&set, date(2024, 4, 2)).collect();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].phase, Phase::Menstruatie);
        assert_eq!(listed[1].phase, Phase::Piek);
    }

    #[test]
    fn test_range_listing_is_restartable() {
        let set = default_set();
        let until = date(2024, 6, 1);
        let first: Vec<Interval> = range_listing(&set, until).copied().collect();
        let second: Vec<Interval> = range_listing(&set, until).copied().collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|iv| iv.start < until));
    }

    #[test]
    fn test_range_listing_keeps_duplicates_across_tracks() {
        let combo = Combination::new([5, 6, 7, 11]).unwrap();
        let set = CycleSet::from_combinations(anchor(), &[combo, combo], 1);
        let listed = range_listing(&set, date(2024, 3, 23)).count();
        assert_eq!(listed, 2);
    }

    #[test]
    fn test_counts_add() {
        let mut a = PhaseCounts::default();
        a.record(Phase::Piek);
        let mut b = PhaseCounts::default();
        b.record(Phase::Piek);
        b.record(Phase::Luteaal);
        let sum = a + b;
        assert_eq!(sum.get(Phase::Piek), 2);
        assert_eq!(sum.get(Phase::Luteaal), 1);
        assert_eq!(sum.total(), 3);
    }
}
