//! Pipeline entry points for discovery runs.
//!
//! - `DiscoveryPipeline`: search, scan, and aggregate per fiscal year
//! - `RetryPolicy`: bounded backoff for rate-limited searches

pub mod discover;
pub mod retry;

pub use discover::{DiscoveryPipeline, YearReport};
pub use retry::RetryPolicy;
