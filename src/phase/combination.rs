//! Combination enumerator
//!
//! Expands per-phase candidate durations into every concrete cycle shape.

use serde::{Deserialize, Serialize};

use crate::phase::config::PhaseDurations;
use crate::phase::Phase;

/// One duration per phase, in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    durations: [u32; 4],
}

impl Combination {
    /// Build a combination from durations in definition order.
    ///
    /// Returns `None` if any duration is zero.
    #[must_use]
    pub fn new(durations: [u32; 4]) -> Option<Self> {
        durations
            .iter()
            .all(|&d| d > 0)
            .then_some(Self { durations })
    }

    /// Duration assigned to a phase.
    #[must_use]
    pub const fn duration(&self, phase: Phase) -> u32 {
        self.durations[phase.index()]
    }

    /// Length of one full cycle in days.
    #[must_use]
    pub fn cycle_length(&self) -> u32 {
        self.durations.iter().sum()
    }

    /// `(phase, duration)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (Phase, u32)> + '_ {
        Phase::ALL.iter().map(|&p| (p, self.duration(p)))
    }
}

/// Cartesian product of candidate sets, first set varying slowest.
///
/// Any empty set yields no tuples. No sets yields one empty tuple.
#[must_use]
pub fn cartesian_product(sets: &[Vec<u32>]) -> Vec<Vec<u32>> {
    sets.iter().fold(vec![Vec::new()], |acc, set| {
        acc.iter()
            .flat_map(|prefix| {
                set.iter().map(move |&value| {
                    let mut next = prefix.clone();
                    next.push(value);
                    next
                })
            })
            .collect()
    })
}

/// Enumerate every combination of phase durations.
///
/// Phases are taken in definition order and each candidate set in ascending
/// order, so the output is reproducible. A phase without candidates yields
/// an empty result.
#[must_use]
pub fn enumerate(durations: &PhaseDurations) -> Vec<Combination> {
    let sets: Vec<Vec<u32>> = Phase::ALL
        .iter()
        .map(|&phase| durations.candidates(phase))
        .collect();

    cartesian_product(&sets)
        .into_iter()
        .filter_map(|tuple| <[u32; 4]>::try_from(tuple).ok())
        .filter_map(Combination::new)
        .collect()
}
