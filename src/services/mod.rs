//! Service layer for the discovery pipeline.
//!
//! This module contains the business logic for:
//! - Query construction (`QueryBuilder`)
//! - Web search (`SearchClient`, `DuckDuckGoClient`)
//! - Direct link detection (`LinkClassifier`)
//! - Fallback page scanning (`PageScanner`, `HttpPageScanner`)
//! - Deduplication (`deduplicate`)
//! - Result collection (`ResultAggregator`)

mod aggregate;
mod classify;
mod dedup;
mod query;
mod scanner;
mod search;

pub use aggregate::ResultAggregator;
pub use classify::LinkClassifier;
pub use dedup::deduplicate;
pub use query::QueryBuilder;
pub use scanner::{HttpPageScanner, PageScanner, extract_document_links};
pub use search::{DuckDuckGoClient, SearchClient, parse_results};
