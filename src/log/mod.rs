//! Logging and observability
//!
//! This module provides the opt-in JSONL query log.

pub mod jsonl;

pub use jsonl::{QueryKind, QueryLogger, QueryRecord};
