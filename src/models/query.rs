// src/models/query.rs

//! Values passed between pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete search query for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYearQuery {
    fiscal_year: String,
    text: String,
}

impl FiscalYearQuery {
    pub(crate) fn new(fiscal_year: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            fiscal_year: fiscal_year.into(),
            text: text.into(),
        }
    }

    pub fn fiscal_year(&self) -> &str {
        &self.fiscal_year
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for FiscalYearQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY {}: {}", self.fiscal_year, self.text)
    }
}

/// One hit returned by a search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Fiscal year of the query that produced this hit
    pub fiscal_year: String,

    /// Query text sent to the engine
    pub query: String,

    /// Target URL of the hit
    pub url: String,

    /// 1-based position in engine order
    pub rank: usize,
}

impl SearchResult {
    pub fn new(query: &FiscalYearQuery, url: impl Into<String>, rank: usize) -> Self {
        Self {
            fiscal_year: query.fiscal_year().to_string(),
            query: query.text().to_string(),
            url: url.into(),
            rank,
        }
    }
}

/// How a document link was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOrigin {
    /// The search hit itself pointed at a document
    Direct,
    /// Extracted from a scanned candidate page
    Scanned,
}

impl fmt::Display for LinkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOrigin::Direct => write!(f, "direct"),
            LinkOrigin::Scanned => write!(f, "scanned"),
        }
    }
}

/// A document link attributed to a fiscal year.
///
/// The fiscal year is always copied from the originating [`SearchResult`],
/// and neither it nor the origin can change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    url: String,
    origin: LinkOrigin,
    fiscal_year: String,
}

impl CandidateLink {
    /// A search hit that is itself a document.
    pub fn direct(result: &SearchResult) -> Self {
        Self {
            url: result.url.clone(),
            origin: LinkOrigin::Direct,
            fiscal_year: result.fiscal_year.clone(),
        }
    }

    /// A document link found on the page behind `source`.
    pub fn scanned(url: impl Into<String>, source: &SearchResult) -> Self {
        Self {
            url: url.into(),
            origin: LinkOrigin::Scanned,
            fiscal_year: source.fiscal_year.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn origin(&self) -> LinkOrigin {
        self.origin
    }

    pub fn fiscal_year(&self) -> &str {
        &self.fiscal_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_inherits_fiscal_year_from_result() {
        let query = FiscalYearQuery::new("2024", "DoD budget FY 2024 filetype:pdf");
        let result = SearchResult::new(&query, "https://example.com/page1", 2);

        let direct = CandidateLink::direct(&result);
        assert_eq!(direct.fiscal_year(), "2024");
        assert_eq!(direct.origin(), LinkOrigin::Direct);

        let scanned = CandidateLink::scanned("https://example.com/a.pdf", &result);
        assert_eq!(scanned.fiscal_year(), "2024");
        assert_eq!(scanned.origin(), LinkOrigin::Scanned);
        assert_eq!(scanned.url(), "https://example.com/a.pdf");
    }

    #[test]
    fn query_display() {
        let query = FiscalYearQuery::new("2025", "budget");
        assert_eq!(query.to_string(), "FY 2025: budget");
    }
}
