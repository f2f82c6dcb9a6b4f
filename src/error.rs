// src/error.rs

//! Unified error handling for the discovery pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built or a request failed outside of search/scan
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Bad input to query construction or configuration loading
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration value out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// Search backend unreachable, failed, or retries exhausted
    #[error("Search unavailable for '{query}': {reason}")]
    SearchUnavailable { query: String, reason: String },

    /// Search backend throttled or blocked the request
    #[error("Rate limited{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    RateLimited {
        status: Option<u16>,
        message: String,
    },

    /// Candidate page could not be fetched
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Candidate page could not be parsed
    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    /// The run was interrupted before producing any result
    #[error("Run cancelled before any fiscal year completed")]
    Cancelled,
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a search-unavailable error for a query.
    pub fn search_unavailable(query: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::SearchUnavailable {
            query: query.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a rate-limit error.
    pub fn rate_limited(status: Option<u16>, message: impl fmt::Display) -> Self {
        Self::RateLimited {
            status,
            message: message.to_string(),
        }
    }

    /// Create a page fetch error.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a page parse error.
    pub fn parse(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Whether the failure only affects a single candidate page.
    pub fn is_scan_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limit_is_retryable() {
        assert!(AppError::rate_limited(Some(429), "slow down").is_retryable());
        assert!(!AppError::search_unavailable("q", "down").is_retryable());
        assert!(!AppError::fetch("https://a.example", "timeout").is_retryable());
    }

    #[test]
    fn rate_limited_display_includes_status() {
        let err = AppError::rate_limited(Some(429), "too many requests");
        assert_eq!(err.to_string(), "Rate limited (HTTP 429): too many requests");

        let err = AppError::rate_limited(None, "challenge page");
        assert_eq!(err.to_string(), "Rate limited: challenge page");
    }

    #[test]
    fn scan_failures_are_classified() {
        assert!(AppError::fetch("u", "404").is_scan_failure());
        assert!(AppError::parse("u", "binary body").is_scan_failure());
        assert!(!AppError::configuration("empty label").is_scan_failure());
    }
}
