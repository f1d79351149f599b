//! Query session
//!
//! Holds the configuration and the cycle set computed for the current
//! horizon. Changing the horizon recomputes the cycle set from scratch.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::phase::config::CalendarConfig;
use crate::phase::generator::{horizon_end, CycleSet, Horizon, Interval};
use crate::phase::query::{self, DayDistribution, PhaseDistribution};
use crate::phase::Phase;

/// Configuration plus the cycle set for one horizon
#[derive(Debug, Clone)]
pub struct Session {
    config: CalendarConfig,
    horizon: Horizon,
    cycles: CycleSet,
}

impl Session {
    /// Build the cycle set for `horizon`.
    #[must_use]
    pub fn new(config: CalendarConfig, horizon: Horizon) -> Self {
        let cycles = CycleSet::build(&config, horizon);
        Self {
            config,
            horizon,
            cycles,
        }
    }

    /// Session using the configured default horizon in years.
    #[must_use]
    pub fn with_default_horizon(config: CalendarConfig) -> Self {
        let horizon = Horizon::Years(config.horizon_years);
        Self::new(config, horizon)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Active horizon.
    #[must_use]
    pub const fn horizon(&self) -> Horizon {
        self.horizon
    }

    /// Cycle set for the active horizon.
    #[must_use]
    pub const fn cycles(&self) -> &CycleSet {
        &self.cycles
    }

    /// Switch horizon. Returns `true` if the cycle set was recomputed.
    pub fn set_horizon(&mut self, horizon: Horizon) -> bool {
        if horizon == self.horizon {
            return false;
        }
        self.cycles = CycleSet::build(&self.config, horizon);
        self.horizon = horizon;
        true
    }

    /// Phase probabilities on `date`, using the configured shard count.
    #[must_use]
    pub fn probability(&self, date: NaiveDate) -> PhaseDistribution {
        query::probability_query(&self.cycles, date, self.config.shards)
    }

    /// Days of a month covered by `phase`, with percentages.
    #[must_use]
    pub fn phase_days(&self, month: u32, year: i32, phase: Phase) -> DayDistribution {
        query::month_day_query(&self.cycles, month, year, phase)
    }

    /// Most likely day of a month for `phase`.
    #[must_use]
    pub fn best_day_in_month(&self, month: u32, year: i32, phase: Phase) -> Option<(NaiveDate, f64)> {
        query::best_day_in_month(&self.cycles, month, year, phase)
    }

    /// Most likely day per month of `year` for `phase`.
    #[must_use]
    pub fn best_days(&self, year: i32, phase: Phase) -> BTreeMap<u32, NaiveDate> {
        query::best_day_per_month(&self.cycles, year, phase)
    }

    /// Intervals starting before `anchor + years`. Empty for a
    /// non-positive `years`.
    #[must_use]
    pub fn list_years(&self, years: i32) -> Vec<Interval> {
        horizon_end(self.config.anchor, years).map_or_else(Vec::new, |until| {
            query::range_listing(&self.cycles, until).copied().collect()
        })
    }
}
