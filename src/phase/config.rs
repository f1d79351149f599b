//! Calendar configuration parser
//!
//! Parses `cyclecal.toml` into the anchor date, phase duration candidates
//! and query tuning. Every field falls back to the built-in defaults.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::phase::generator::MAX_HORIZON_YEARS;
use crate::phase::Phase;

/// Candidate durations (days) for each phase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PhaseDurations {
    /// Candidates for [`Phase::Menstruatie`]
    #[serde(rename = "Menstruatie", default)]
    pub menstruatie: Vec<u32>,
    /// Candidates for [`Phase::Piek`]
    #[serde(rename = "Piek", default)]
    pub piek: Vec<u32>,
    /// Candidates for [`Phase::Ovulatie`]
    #[serde(rename = "Ovulatie", default)]
    pub ovulatie: Vec<u32>,
    /// Candidates for [`Phase::Luteaal`]
    #[serde(rename = "Luteaal", default)]
    pub luteaal: Vec<u32>,
}

impl PhaseDurations {
    /// Build from one candidate list per phase, in definition order.
    #[must_use]
    pub fn new(menstruatie: &[u32], piek: &[u32], ovulatie: &[u32], luteaal: &[u32]) -> Self {
        Self {
            menstruatie: menstruatie.to_vec(),
            piek: piek.to_vec(),
            ovulatie: ovulatie.to_vec(),
            luteaal: luteaal.to_vec(),
        }
    }

    /// Candidate list for a phase, as configured.
    #[must_use]
    pub fn get(&self, phase: Phase) -> &[u32] {
        match phase {
            Phase::Menstruatie => &self.menstruatie,
            Phase::Piek => &self.piek,
            Phase::Ovulatie => &self.ovulatie,
            Phase::Luteaal => &self.luteaal,
        }
    }

    /// Candidate set for a phase: ascending, deduplicated, zeros dropped.
    #[must_use]
    pub fn candidates(&self, phase: Phase) -> Vec<u32> {
        let mut set: Vec<u32> = self.get(phase).iter().copied().filter(|&d| d > 0).collect();
        set.sort_unstable();
        set.dedup();
        set
    }

    /// Per-phase duration lists in definition order, for rotating generation.
    ///
    /// Lists keep their configured order; only zeros are dropped.
    #[must_use]
    pub fn schedule(&self) -> Vec<(Phase, Vec<u32>)> {
        Phase::ALL
            .iter()
            .map(|&phase| {
                let list = self.get(phase).iter().copied().filter(|&d| d > 0).collect();
                (phase, list)
            })
            .collect()
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::new(&[4, 5, 6], &[4, 5, 6], &[7], &[11])
    }
}

/// Top-level calendar configuration parsed from cyclecal.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Date from which every track starts
    #[serde(default = "default_anchor")]
    pub anchor: NaiveDate,
    /// Default horizon in years for a session (default: 1)
    #[serde(default = "default_horizon_years")]
    pub horizon_years: i32,
    /// Worker count for probability queries (default: 10)
    #[serde(default = "default_shards")]
    pub shards: usize,
    /// Candidate durations per phase
    #[serde(default)]
    pub durations: PhaseDurations,
}

fn default_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 22).unwrap_or_default()
}

const fn default_horizon_years() -> i32 {
    1
}

const fn default_shards() -> usize {
    10
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            horizon_years: default_horizon_years(),
            shards: default_shards(),
            durations: PhaseDurations::default(),
        }
    }
}

impl CalendarConfig {
    /// Parse a cyclecal.toml file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse cyclecal.toml content from a string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse cyclecal.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        for phase in Phase::ALL {
            if self.durations.get(phase).contains(&0) {
                bail!("Invalid duration for phase '{phase}': durations must be at least 1 day");
            }
        }

        if self.shards == 0 {
            bail!("Invalid shard count 0: at least one worker is required");
        }

        if self.horizon_years < 0 {
            bail!(
                "Invalid horizon_years {}: horizon cannot be negative",
                self.horizon_years
            );
        }

        if self.horizon_years > MAX_HORIZON_YEARS {
            bail!(
                "Invalid horizon_years {}: at most {MAX_HORIZON_YEARS} years are supported",
                self.horizon_years
            );
        }

        Ok(())
    }
}
