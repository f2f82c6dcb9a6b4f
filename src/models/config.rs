//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fiscal years and query construction
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Search backend settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Rate-limit retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Fallback page scanning settings
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Result presentation and persistence
    #[serde(default)]
    pub output: OutputConfig,

    /// Diagnostic logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.discovery.fiscal_years.is_empty() {
            return Err(AppError::validation("discovery.fiscal_years is empty"));
        }
        if self
            .discovery
            .fiscal_years
            .iter()
            .any(|year| year.trim().is_empty())
        {
            return Err(AppError::validation(
                "discovery.fiscal_years contains an empty label",
            ));
        }
        if !self.discovery.query_template.contains("{year}") {
            return Err(AppError::validation(
                "discovery.query_template must contain {year}",
            ));
        }
        if self.discovery.document_suffix.trim_start_matches('.').is_empty() {
            return Err(AppError::validation("discovery.document_suffix is empty"));
        }
        if self.discovery.max_concurrent_years == 0 {
            return Err(AppError::validation(
                "discovery.max_concurrent_years must be > 0",
            ));
        }
        if self.search.user_agent.trim().is_empty() {
            return Err(AppError::validation("search.user_agent is empty"));
        }
        if self.search.max_results == 0 {
            return Err(AppError::validation("search.max_results must be > 0"));
        }
        if self.search.timeout_secs == 0 {
            return Err(AppError::validation("search.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.search.endpoint)
            .map_err(|e| AppError::validation(format!("search.endpoint is invalid: {e}")))?;
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.scanner.timeout_secs == 0 {
            return Err(AppError::validation("scanner.timeout_secs must be > 0"));
        }
        if self.scanner.max_concurrent == 0 {
            return Err(AppError::validation("scanner.max_concurrent must be > 0"));
        }
        Ok(())
    }
}

/// Which fiscal years to search and how to phrase the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Fiscal-year labels, processed and reported in this order
    #[serde(default = "defaults::fiscal_years")]
    pub fiscal_years: Vec<String>,

    /// Query text used verbatim for every year instead of the template
    #[serde(default)]
    pub query_override: Option<String>,

    /// Query template; `{year}` and `{filetype}` are substituted
    #[serde(default = "defaults::query_template")]
    pub query_template: String,

    /// File-extension suffix that marks a direct document link
    #[serde(default = "defaults::document_suffix")]
    pub document_suffix: String,

    /// Maximum fiscal years processed at once
    #[serde(default = "defaults::max_concurrent_years")]
    pub max_concurrent_years: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fiscal_years: defaults::fiscal_years(),
            query_override: None,
            query_template: defaults::query_template(),
            document_suffix: defaults::document_suffix(),
            max_concurrent_years: defaults::max_concurrent_years(),
        }
    }
}

/// Search backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// DuckDuckGo HTML endpoint (overridable for tests and mirrors)
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Maximum results taken per query
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "defaults::search_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            max_results: defaults::max_results(),
            timeout_secs: defaults::search_timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Bounded exponential backoff for rate-limited searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles afterwards
    #[serde(default = "defaults::base_delay")]
    pub base_delay_ms: u64,

    /// Upper bound for a single backoff delay
    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            base_delay_ms: defaults::base_delay(),
            max_delay_ms: defaults::max_delay(),
        }
    }
}

/// Fallback page scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Time budget for one candidate page, in seconds
    #[serde(default = "defaults::scan_timeout")]
    pub timeout_secs: u64,

    /// Maximum candidate pages scanned at once within a fiscal year
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Delay after each completed scan in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Cap on document links taken from a single page
    #[serde(default)]
    pub max_links_per_page: Option<usize>,
}

impl ScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::scan_timeout(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: 0,
            max_links_per_page: None,
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result presentation and persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Results file written after a run
    #[serde(default = "defaults::output_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,

    /// Show queries and link origins in the console report
    #[serde(default)]
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

/// Diagnostic logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// The US federal fiscal year containing `date` and the one before it.
///
/// Federal fiscal years start on October 1, so FY2025 runs from
/// 2024-10-01 through 2025-09-30.
pub fn fiscal_years_for(date: NaiveDate) -> Vec<String> {
    let current = if date.month() >= 10 {
        date.year() + 1
    } else {
        date.year()
    };
    vec![(current - 1).to_string(), current.to_string()]
}

mod defaults {
    use std::path::PathBuf;

    pub fn fiscal_years() -> Vec<String> {
        super::fiscal_years_for(chrono::Local::now().date_naive())
    }
    pub fn query_template() -> String {
        "DoD budget FY {year} spending filetype:{filetype}".into()
    }
    pub fn document_suffix() -> String {
        ".pdf".into()
    }
    pub fn max_concurrent_years() -> usize {
        2
    }

    // Search defaults
    pub fn endpoint() -> String {
        "https://html.duckduckgo.com/html/".into()
    }
    pub fn max_results() -> usize {
        10
    }
    pub fn search_timeout() -> u64 {
        20
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".into()
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn base_delay() -> u64 {
        1000
    }
    pub fn max_delay() -> u64 {
        8000
    }

    // Scanner defaults
    pub fn scan_timeout() -> u64 {
        15
    }
    pub fn max_concurrent() -> usize {
        4
    }

    pub fn output_path() -> PathBuf {
        PathBuf::from("dod_spending_pdfs.txt")
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
