// src/pipeline/discover.rs

//! Per-fiscal-year discovery pipeline.
//!
//! Query → search (with retry) → classify → scan non-direct candidates →
//! deduplicate → aggregate. Fiscal years run concurrently and fail
//! independently; a single driver loop owns the aggregator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::{CandidateLink, Config, ResultSet, SearchResult, YearPhase};
use crate::services::{
    DuckDuckGoClient, HttpPageScanner, LinkClassifier, PageScanner, QueryBuilder,
    ResultAggregator, SearchClient, deduplicate,
};

use super::retry::RetryPolicy;

/// Output of one fiscal year's pipeline.
#[derive(Debug)]
pub struct YearReport {
    pub fiscal_year: String,
    pub query: String,
    pub links: Vec<CandidateLink>,
}

/// Drives the discovery components for a set of fiscal years.
pub struct DiscoveryPipeline {
    search: Arc<dyn SearchClient>,
    scanner: Arc<dyn PageScanner>,
    queries: QueryBuilder,
    classifier: LinkClassifier,
    retry: RetryPolicy,
    query_override: Option<String>,
    max_results: usize,
    scan_timeout: Duration,
    scan_concurrency: usize,
    scan_delay: Duration,
    year_concurrency: usize,
}

impl DiscoveryPipeline {
    /// Build a pipeline around the given search and scan backends.
    pub fn new(
        config: &Config,
        search: Arc<dyn SearchClient>,
        scanner: Arc<dyn PageScanner>,
    ) -> Self {
        Self {
            search,
            scanner,
            queries: QueryBuilder::from_config(&config.discovery),
            classifier: LinkClassifier::new(&config.discovery.document_suffix),
            retry: RetryPolicy::from_config(&config.retry),
            query_override: config.discovery.query_override.clone(),
            max_results: config.search.max_results,
            scan_timeout: config.scanner.timeout(),
            scan_concurrency: config.scanner.max_concurrent.max(1),
            scan_delay: Duration::from_millis(config.scanner.request_delay_ms),
            year_concurrency: config.discovery.max_concurrent_years.max(1),
        }
    }

    /// Build a pipeline with the DuckDuckGo client and HTTP page scanner.
    pub fn from_config(config: &Config) -> Result<Self> {
        let classifier = LinkClassifier::new(&config.discovery.document_suffix);
        let search = DuckDuckGoClient::from_config(&config.search)?;
        let scanner = HttpPageScanner::from_config(&config.search, &config.scanner, classifier)?;
        Ok(Self::new(config, Arc::new(search), Arc::new(scanner)))
    }

    /// Replace the retry policy (tests use [`RetryPolicy::immediate`]).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run every fiscal year to completion.
    pub async fn run(&self, fiscal_years: &[String]) -> ResultSet {
        self.run_until(fiscal_years, futures::future::pending::<()>())
            .await
    }

    /// Run fiscal years until done or until `shutdown` resolves.
    ///
    /// On shutdown, in-flight searches and scans are dropped and years that
    /// had not been aggregated are left out of the result set.
    pub async fn run_until<F>(&self, fiscal_years: &[String], shutdown: F) -> ResultSet
    where
        F: Future<Output = ()>,
    {
        // Links carry the trimmed label, so slots must use it too.
        let labels: Vec<String> = fiscal_years
            .iter()
            .map(|year| year.trim().to_string())
            .collect();

        let mut aggregator = ResultAggregator::new(labels.iter().cloned());
        aggregator.begin();

        let mut years = stream::iter(labels)
            .map(|year| async move {
                let result = self.run_year(&year).await;
                (year, result)
            })
            .buffer_unordered(self.year_concurrency);

        tokio::pin!(shutdown);
        let mut cancelled = false;

        loop {
            tokio::select! {
                biased;

                next = years.next() => {
                    let Some((year, result)) = next else { break };
                    match result {
                        Ok(report) => {
                            log::info!("FY {}: {} documents", year, report.links.len());
                            aggregator.set_query(&year, report.query);
                            aggregator.append(&year, report.links);
                            log::debug!("FY {}: {}", year, YearPhase::Aggregated);
                        }
                        Err(error) => {
                            log::error!("FY {}: {}", year, error);
                            aggregator.record_failure(&year, &error);
                            log::debug!("FY {}: {}", year, YearPhase::Failed);
                        }
                    }
                }
                _ = &mut shutdown => {
                    cancelled = !aggregator.is_settled();
                    break;
                }
            }
        }

        if cancelled {
            log::warn!("Run cancelled; unfinished fiscal years are omitted");
        }

        aggregator.finalize(cancelled)
    }

    /// Run the pipeline for one fiscal year.
    ///
    /// Fails only with a configuration error (bad label) or when the search
    /// itself is unavailable. Scan failures never fail the year.
    pub async fn run_year(&self, fiscal_year: &str) -> Result<YearReport> {
        log::debug!("FY {}: {}", fiscal_year, YearPhase::Idle);
        let query = self
            .queries
            .build(fiscal_year, self.query_override.as_deref())?;

        log::debug!("FY {}: {} \"{}\"", fiscal_year, YearPhase::Searching, query.text());
        let results = self
            .retry
            .run(query.text(), || self.search.search(&query, self.max_results))
            .await
            .map_err(|error| match error {
                AppError::SearchUnavailable { .. } => error,
                other => AppError::search_unavailable(query.text(), other),
            })?;

        let (direct, candidates): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition(|result| self.classifier.is_document(&result.url));

        log::debug!(
            "FY {}: {} ({} direct, {} candidates)",
            fiscal_year,
            YearPhase::Scanning,
            direct.len(),
            candidates.len()
        );

        let mut links: Vec<CandidateLink> = direct.iter().map(CandidateLink::direct).collect();

        let last_start = Mutex::new(None);
        let mut scans = stream::iter(candidates)
            .map(|candidate| {
                let last_start = &last_start;
                async move {
                    self.pace(last_start).await;
                    self.scan_candidate(&candidate).await
                }
            })
            .buffered(self.scan_concurrency);

        while let Some(found) = scans.next().await {
            links.extend(found);
        }

        Ok(YearReport {
            fiscal_year: query.fiscal_year().to_string(),
            query: query.text().to_string(),
            links: deduplicate(links),
        })
    }

    /// Wait until `scan_delay` has passed since the previous scan started.
    async fn pace(&self, last_start: &Mutex<Option<Instant>>) {
        if self.scan_delay.is_zero() {
            return;
        }
        let mut last = last_start.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.scan_delay).await;
        }
        *last = Some(Instant::now());
    }

    /// Scan one candidate page; any failure yields no links.
    async fn scan_candidate(&self, candidate: &SearchResult) -> Vec<CandidateLink> {
        let scanned = tokio::time::timeout(self.scan_timeout, self.scanner.scan(&candidate.url))
            .await
            .unwrap_or_else(|_| {
                Err(AppError::fetch(
                    &candidate.url,
                    format!("scan exceeded {}s budget", self.scan_timeout.as_secs()),
                ))
            });

        match scanned {
            Ok(urls) => urls
                .into_iter()
                .filter(|url| self.classifier.is_document(url))
                .map(|url| CandidateLink::scanned(url, candidate))
                .collect(),
            Err(error) => {
                if error.is_scan_failure() {
                    log::warn!("Skipping candidate #{} {}: {}", candidate.rank, candidate.url, error);
                } else {
                    log::error!("Scanner error on {}: {}", candidate.url, error);
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::FiscalYearQuery;

    struct FixedSearch(HashMap<String, Vec<&'static str>>);

    #[async_trait]
    impl SearchClient for FixedSearch {
        async fn search(
            &self,
            query: &FiscalYearQuery,
            max_results: usize,
        ) -> Result<Vec<SearchResult>> {
            let urls = self.0.get(query.fiscal_year()).cloned().unwrap_or_default();
            Ok(urls
                .into_iter()
                .take(max_results)
                .enumerate()
                .map(|(i, url)| SearchResult::new(query, url, i + 1))
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingScanner {
        pages: HashMap<&'static str, Vec<&'static str>>,
        visited: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageScanner for RecordingScanner {
        async fn scan(&self, url: &str) -> Result<Vec<String>> {
            self.visited.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(links) => Ok(links.iter().map(|s| s.to_string()).collect()),
                None => Err(AppError::fetch(url, "HTTP 404 Not Found")),
            }
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.discovery.fiscal_years = vec!["2024".into()];
        config
    }

    #[tokio::test]
    async fn direct_hits_are_never_scanned() {
        let search = FixedSearch(HashMap::from([(
            "2024".to_string(),
            vec!["https://defense.gov/FY24_Budget.pdf", "https://example.com/page1"],
        )]));
        let scanner = Arc::new(RecordingScanner {
            pages: HashMap::from([(
                "https://example.com/page1",
                vec!["https://example.com/docs/FY24_detail.pdf", "https://example.com/about"],
            )]),
            ..Default::default()
        });

        let pipeline = DiscoveryPipeline::new(&config(), Arc::new(search), scanner.clone());
        let report = pipeline.run_year("2024").await.unwrap();

        assert_eq!(
            scanner.visited.lock().unwrap().as_slice(),
            &["https://example.com/page1".to_string()]
        );
        let urls: Vec<_> = report.links.iter().map(|l| l.url()).collect();
        assert_eq!(
            urls,
            vec![
                "https://defense.gov/FY24_Budget.pdf",
                "https://example.com/docs/FY24_detail.pdf",
            ]
        );
    }

    #[tokio::test]
    async fn failing_candidate_yields_no_links() {
        let search = FixedSearch(HashMap::from([(
            "2024".to_string(),
            vec!["https://gone.example/", "https://defense.gov/a.pdf"],
        )]));
        let pipeline = DiscoveryPipeline::new(
            &config(),
            Arc::new(search),
            Arc::new(RecordingScanner::default()),
        );

        let report = pipeline.run_year("2024").await.unwrap();
        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links[0].url(), "https://defense.gov/a.pdf");
    }

    #[tokio::test]
    async fn empty_label_fails_before_search() {
        let pipeline = DiscoveryPipeline::new(
            &config(),
            Arc::new(FixedSearch(HashMap::new())),
            Arc::new(RecordingScanner::default()),
        );
        assert!(matches!(
            pipeline.run_year(" ").await,
            Err(AppError::Configuration(_))
        ));
    }
}
