//! Cycle phase calendar
//!
//! This module handles phase configuration, combination enumeration,
//! cycle generation and the query engine.

pub mod combination;
pub mod config;
pub mod generator;
pub mod query;

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One of the four named segments of a recurring cycle.
///
/// Variant order is the definition order used everywhere: enumeration,
/// generation and result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Menstrual phase
    Menstruatie,
    /// Follicular peak
    Piek,
    /// Ovulation
    Ovulatie,
    /// Luteal phase
    Luteaal,
}

impl Phase {
    /// All phases in definition order.
    pub const ALL: [Self; 4] = [Self::Menstruatie, Self::Piek, Self::Ovulatie, Self::Luteaal];

    /// Display name, identical to the accepted input spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Menstruatie => "Menstruatie",
            Self::Piek => "Piek",
            Self::Ovulatie => "Ovulatie",
            Self::Luteaal => "Luteaal",
        }
    }

    /// Position in definition order (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Menstruatie => 0,
            Self::Piek => 1,
            Self::Ovulatie => 2,
            Self::Luteaal => 3,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = anyhow::Error;

    /// Parse a phase name. Matching ignores ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match Self::ALL
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
        {
            Some(phase) => Ok(*phase),
            None => bail!(
                "Unknown phase '{trimmed}'. Expected one of: {}",
                Self::ALL.map(Self::name).join(", ")
            ),
        }
    }
}
