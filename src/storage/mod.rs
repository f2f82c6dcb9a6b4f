//! Storage abstractions for result persistence.
//!
//! The text format groups URLs under a heading per fiscal year:
//!
//! ```text
//! FY 2024:
//! https://defense.gov/FY24_Budget.pdf
//! https://example.com/docs/FY24_detail.pdf
//!
//! FY 2025:
//! # no results found
//! ```

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{OutputFormat, ResultSet, YearOutcome};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Where the results landed
    pub location: PathBuf,
    /// Number of document URLs written
    pub document_count: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for result storage backends.
#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Persist a finalized result set.
    async fn write_results(&self, results: &ResultSet) -> Result<WriteMetadata>;
}

/// Serialize a result set in the requested format.
pub fn encode(results: &ResultSet, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(results)?),
        OutputFormat::Text => Ok(render_text(results).into_bytes()),
    }
}

/// One URL per line, grouped under a `FY <label>:` heading per year.
pub fn render_text(results: &ResultSet) -> String {
    let mut out = String::new();
    for (index, entry) in results.entries.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&format!("FY {}:\n", entry.fiscal_year));
        match &entry.outcome {
            YearOutcome::Found { urls } if urls.is_empty() => {
                out.push_str("# no results found\n");
            }
            YearOutcome::Found { urls } => {
                for url in urls {
                    out.push_str(url);
                    out.push('\n');
                }
            }
            YearOutcome::Failed { reason } => {
                out.push_str(&format!("# search failed: {reason}\n"));
            }
        }
    }
    out
}
