// src/services/search.rs

//! Web search backends.
//!
//! [`DuckDuckGoClient`] scrapes the HTML-only DuckDuckGo endpoint, which
//! needs no API key or JavaScript.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FiscalYearQuery, SearchConfig, SearchResult};
use crate::utils::http;

/// Marker present on DuckDuckGo's bot-challenge page.
const CHALLENGE_MARKERS: &[&str] = &["anomaly-modal", "bots use DuckDuckGo too"];

/// Executes a query and returns hits in engine rank order.
///
/// An empty vector is a valid outcome. Calling `search` again re-runs the
/// query from the start.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(
        &self,
        query: &FiscalYearQuery,
        max_results: usize,
    ) -> Result<Vec<SearchResult>>;
}

/// DuckDuckGo HTML search client.
pub struct DuckDuckGoClient {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Build a client with its own HTTP connection pool.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let client = http::create_async_client(&config.user_agent, config.timeout())?;
        Ok(Self::new(client, config.endpoint.clone()))
    }

    /// Extract the target URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps hits like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed
            .host_str()
            .is_some_and(|host| host.ends_with("duckduckgo.com"))
            && parsed.path().starts_with("/l/")
        {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoClient {
    async fn search(
        &self,
        query: &FiscalYearQuery,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        log::debug!("Searching DuckDuckGo: {}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query.text())])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| AppError::search_unavailable(query.text(), e))?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN
        ) {
            return Err(AppError::rate_limited(
                Some(status.as_u16()),
                "search engine refused the request",
            ));
        }
        if !status.is_success() {
            return Err(AppError::search_unavailable(
                query.text(),
                format!("HTTP {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::search_unavailable(query.text(), e))?;

        let results = parse_results(&body, query, max_results)?;
        if results.is_empty() && CHALLENGE_MARKERS.iter().any(|m| body.contains(m)) {
            return Err(AppError::rate_limited(
                Some(status.as_u16()),
                "bot challenge page returned",
            ));
        }

        log::debug!("FY {}: {} search results", query.fiscal_year(), results.len());
        Ok(results)
    }
}

/// Parse a DuckDuckGo HTML results page.
///
/// Ads are skipped; ranks are assigned 1.. in page order after truncation.
pub fn parse_results(
    html: &str,
    query: &FiscalYearQuery,
    max_results: usize,
) -> Result<Vec<SearchResult>> {
    let document = Html::parse_document(html);

    let result_sel = parse_selector(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )?;
    let link_sel = parse_selector("a.result__a")?;

    let mut results: Vec<SearchResult> = Vec::new();

    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(href) = element
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        let Some(url) = DuckDuckGoClient::extract_url(href) else {
            continue;
        };

        // A result block can carry both classes and match twice.
        if results.iter().any(|r| r.url == url) {
            continue;
        }

        let rank = results.len() + 1;
        results.push(SearchResult::new(query, url, rank));
    }

    Ok(results)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::QueryBuilder;

    const MOCK_DDG_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="result results_links results_links_deep result--ad">
    <a class="result__a" href="https://ads.example.com/buy">Sponsored</a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fdefense.gov%2FFY24_Budget.pdf&amp;rut=abc123">
        FY 2024 Budget
    </a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://example.com/page1">Budget overview</a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fcomptroller.defense.gov%2FBudget-Materials%2F&amp;rut=def456">
        Budget Materials
    </a>
</div>
</body>
</html>"#;

    fn query() -> FiscalYearQuery {
        QueryBuilder::default().build("2024", None).unwrap()
    }

    #[test]
    fn extract_url_from_ddg_redirect() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(
            DuckDuckGoClient::extract_url(href),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn extract_url_direct_link() {
        assert_eq!(
            DuckDuckGoClient::extract_url("https://example.com/direct"),
            Some("https://example.com/direct".to_string())
        );
        assert_eq!(DuckDuckGoClient::extract_url("not-a-url"), None);
    }

    #[test]
    fn parse_skips_ads_and_ranks_in_order() {
        let results = parse_results(MOCK_DDG_HTML, &query(), 10).unwrap();
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://defense.gov/FY24_Budget.pdf",
                "https://example.com/page1",
                "https://comptroller.defense.gov/Budget-Materials/",
            ]
        );
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[2].rank, 3);
        assert!(results.iter().all(|r| r.fiscal_year == "2024"));
        assert!(results[0].query.contains("filetype:pdf"));
    }

    #[test]
    fn parse_truncates_to_max() {
        let results = parse_results(MOCK_DDG_HTML, &query(), 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn parse_empty_page_is_ok() {
        let results = parse_results("<html><body>No results.</body></html>", &query(), 10).unwrap();
        assert!(results.is_empty());
    }
}
