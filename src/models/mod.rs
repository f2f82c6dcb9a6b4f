// src/models/mod.rs

//! Domain models for the discovery pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod query;
mod results;

// Re-export all public types
pub use config::{
    Config, DiscoveryConfig, LoggingConfig, OutputConfig, OutputFormat, RetryConfig,
    ScannerConfig, SearchConfig, fiscal_years_for,
};
pub use query::{CandidateLink, FiscalYearQuery, LinkOrigin, SearchResult};
pub use results::{ResultSet, RunState, YearEntry, YearOutcome, YearPhase};
