//! JSONL (JSON Lines) query log
//!
//! Provides append-only logging of answered queries to `<log_dir>/queries.jsonl`

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use crate::phase::generator::Horizon;

/// Which question was asked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Phase probabilities on a date
    Probability,
    /// Best day of one month for a phase
    PhaseDays,
    /// Best day per month of a year for a phase
    BestDays,
    /// Raw interval listing
    Listing,
}

/// One answered query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRecord {
    /// When the query was answered
    pub timestamp: DateTime<Utc>,
    /// Kind of query
    pub query: QueryKind,
    /// The validated argument, as entered (e.g. `24 03 2024`)
    pub argument: String,
    /// Horizon of the cycle set the query ran against
    pub horizon: Horizon,
    /// Number of result entries (phases, days, months or intervals)
    pub results: usize,
}

impl QueryRecord {
    /// Record stamped with the current time.
    #[must_use]
    pub fn now(query: QueryKind, argument: impl Into<String>, horizon: Horizon, results: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            query,
            argument: argument.into(),
            horizon,
            results,
        }
    }
}

/// JSONL logger for answered queries
///
/// Each line is a JSON object representing a single query.
pub struct QueryLogger {
    log_path: PathBuf,
}

impl QueryLogger {
    /// Create a new query logger
    ///
    /// # Errors
    /// Returns an error if the log directory cannot be created
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Result<Self> {
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        Ok(Self {
            log_path: log_dir.join("queries.jsonl"),
        })
    }

    /// Append a record to the log
    pub fn append(&self, record: &QueryRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open log file: {}", self.log_path.display()))?;

        let json = serde_json::to_string(record).context("Failed to serialize query record to JSON")?;
        writeln!(file, "{json}").context("Failed to write to log file")?;

        Ok(())
    }

    /// Read all records from the log, oldest first
    pub fn read_all(&self) -> Result<Vec<QueryRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.log_path)
            .with_context(|| format!("Failed to read log file: {}", self.log_path.display()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_num, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse line {} as JSON", line_num + 1))
            })
            .collect()
    }

    /// Get the path to the log file
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
