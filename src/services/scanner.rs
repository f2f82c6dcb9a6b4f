// src/services/scanner.rs

//! Fallback scanning of candidate pages for embedded document links.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ScannerConfig, SearchConfig};
use crate::services::LinkClassifier;
use crate::utils::{http, is_non_navigable, resolve_url};

/// Elements whose target may be an embedded document.
const LINK_SELECTOR: &str = "a[href], link[href]";

/// Fetches one candidate page and returns the document links it embeds.
///
/// Returned URLs are absolute, unique, and in document order. Scanning
/// never follows the page's other links.
#[async_trait]
pub trait PageScanner: Send + Sync {
    async fn scan(&self, url: &str) -> Result<Vec<String>>;
}

/// Page scanner backed by reqwest and scraper.
pub struct HttpPageScanner {
    client: Client,
    classifier: LinkClassifier,
    max_links: Option<usize>,
}

impl HttpPageScanner {
    pub fn new(client: Client, classifier: LinkClassifier) -> Self {
        Self {
            client,
            classifier,
            max_links: None,
        }
    }

    /// Keep at most `max_links` document links per page.
    pub fn with_max_links(mut self, max_links: Option<usize>) -> Self {
        self.max_links = max_links;
        self
    }

    pub fn from_config(
        search: &SearchConfig,
        scanner: &ScannerConfig,
        classifier: LinkClassifier,
    ) -> Result<Self> {
        let client = http::create_async_client(&search.user_agent, scanner.timeout())?;
        Ok(Self::new(client, classifier).with_max_links(scanner.max_links_per_page))
    }
}

#[async_trait]
impl PageScanner for HttpPageScanner {
    async fn scan(&self, url: &str) -> Result<Vec<String>> {
        let base = Url::parse(url).map_err(|e| AppError::parse(url, e))?;
        let html = http::fetch_html(&self.client, url).await?;

        let mut links = extract_document_links(&html, &base, &self.classifier)?;
        if let Some(max) = self.max_links {
            links.truncate(max);
        }

        log::debug!("Scanned {}: {} document links", url, links.len());
        Ok(links)
    }
}

/// Extract unique, absolute document links from markup in document order.
pub fn extract_document_links(
    html: &str,
    base: &Url,
    classifier: &LinkClassifier,
) -> Result<Vec<String>> {
    let selector = Selector::parse(LINK_SELECTOR)
        .map_err(|e| AppError::selector(LINK_SELECTOR, format!("{e:?}")))?;
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if is_non_navigable(href) {
            continue;
        }
        let Some(absolute) = resolve_url(base, href) else {
            continue;
        };
        if !absolute.starts_with("http://") && !absolute.starts_with("https://") {
            continue;
        }
        if classifier.is_document(&absolute) && seen.insert(absolute.clone()) {
            links.push(absolute);
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html>
<head><link rel="alternate" href="/feeds/summary.pdf"></head>
<body>
  <a href="docs/FY24_detail.pdf">Detail</a>
  <a href="/docs/FY24_detail.pdf">Same detail, absolute path</a>
  <a href="https://other.gov/FY24_RDTE.PDF">RDT&amp;E</a>
  <a href="other.html">Not a document</a>
  <a href="#top">Top</a>
  <a href="mailto:budget@example.com?subject=x.pdf">Mail</a>
  <a href="ftp://files.example.com/old.pdf">FTP</a>
  <a>No href</a>
</body>
</html>"##;

    #[test]
    fn extracts_resolved_unique_links_in_order() {
        let base = Url::parse("https://example.com/index.html").unwrap();
        let links = extract_document_links(PAGE, &base, &LinkClassifier::default()).unwrap();
        assert_eq!(
            links,
            vec![
                "https://example.com/feeds/summary.pdf",
                "https://example.com/docs/FY24_detail.pdf",
                "https://other.gov/FY24_RDTE.PDF",
            ]
        );
    }

    #[test]
    fn page_without_documents_yields_nothing() {
        let base = Url::parse("https://example.com/").unwrap();
        let links = extract_document_links(
            "<html><body><a href='/about'>About</a></body></html>",
            &base,
            &LinkClassifier::default(),
        )
        .unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn malformed_markup_still_parses() {
        let base = Url::parse("https://example.com/a/").unwrap();
        let links = extract_document_links(
            "<div><a href=x.pdf>one</a><span><a href='y.pdf'>two</a></div></span></table><p",
            &base,
            &LinkClassifier::default(),
        )
        .unwrap();
        assert_eq!(
            links,
            vec!["https://example.com/a/x.pdf", "https://example.com/a/y.pdf"]
        );
    }
}
