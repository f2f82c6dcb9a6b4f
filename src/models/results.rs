// src/models/results.rs

//! Finalized, per-fiscal-year discovery results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum YearOutcome {
    /// Search succeeded; URLs in discovery order, unique. May be empty.
    Found { urls: Vec<String> },
    /// Search failed for this year.
    Failed { reason: String },
}

impl YearOutcome {
    pub fn urls(&self) -> &[String] {
        match self {
            YearOutcome::Found { urls } => urls,
            YearOutcome::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, YearOutcome::Failed { .. })
    }
}

/// Result entry for a single fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEntry {
    pub fiscal_year: String,
    #[serde(flatten)]
    pub outcome: YearOutcome,
    /// Documents that were search hits themselves
    #[serde(default)]
    pub direct_count: usize,
    /// Query text used, when the search got that far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Mapping from fiscal-year label to its discovered document URLs.
///
/// Entries keep the configured fiscal-year order. Years that never
/// finished (for example after cancellation) are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub entries: Vec<YearEntry>,
    /// The run was interrupted before every year finished
    #[serde(default)]
    pub cancelled: bool,
}

impl ResultSet {
    /// Outcome for a fiscal year, if it finished.
    pub fn get(&self, fiscal_year: &str) -> Option<&YearOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.fiscal_year == fiscal_year)
            .map(|entry| &entry.outcome)
    }

    /// URLs for a fiscal year; `None` if the year failed or never finished.
    pub fn urls(&self, fiscal_year: &str) -> Option<&[String]> {
        match self.get(fiscal_year)? {
            YearOutcome::Found { urls } => Some(urls),
            YearOutcome::Failed { .. } => None,
        }
    }

    pub fn fiscal_years(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.fiscal_year.as_str())
    }

    pub fn total_documents(&self) -> usize {
        self.entries.iter().map(|e| e.outcome.urls().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// At least one fiscal year produced documents.
    pub fn has_documents(&self) -> bool {
        self.entries.iter().any(|e| !e.outcome.urls().is_empty())
    }

    /// Every reported fiscal year failed its search.
    pub fn all_failed(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.outcome.is_failed())
    }
}

/// Per-fiscal-year progress through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearPhase {
    Idle,
    Searching,
    Scanning,
    Aggregated,
    Failed,
}

impl fmt::Display for YearPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            YearPhase::Idle => "idle",
            YearPhase::Searching => "searching",
            YearPhase::Scanning => "scanning",
            YearPhase::Aggregated => "aggregated",
            YearPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Whole-run progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Complete,
}
