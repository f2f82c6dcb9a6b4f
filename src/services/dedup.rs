// src/services/dedup.rs

//! First-seen deduplication of candidate links.

use std::collections::HashSet;

use crate::models::CandidateLink;

/// Keep the first occurrence of each URL, preserving order.
///
/// URLs are compared as exact, case-sensitive strings.
pub fn deduplicate(links: impl IntoIterator<Item = CandidateLink>) -> Vec<CandidateLink> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for link in links {
        if seen.insert(link.url().to_string()) {
            deduped.push(link);
        }
    }
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkOrigin, SearchResult};
    use crate::services::QueryBuilder;

    fn result(url: &str, rank: usize) -> SearchResult {
        let query = QueryBuilder::default().build("2024", None).unwrap();
        SearchResult::new(&query, url, rank)
    }

    #[test]
    fn keeps_first_of_repeated_url() {
        let page = result("https://example.com/page", 2);
        let stream = vec![
            CandidateLink::direct(&result("https://a.example/x.pdf", 1)),
            CandidateLink::direct(&result("https://a.example/y.pdf", 3)),
            CandidateLink::scanned("https://a.example/x.pdf", &page),
            CandidateLink::scanned("https://a.example/z.pdf", &page),
            CandidateLink::scanned("https://a.example/x.pdf", &page),
        ];

        let deduped = deduplicate(stream);
        let urls: Vec<_> = deduped.iter().map(|l| l.url()).collect();
        assert_eq!(
            urls,
            vec![
                "https://a.example/x.pdf",
                "https://a.example/y.pdf",
                "https://a.example/z.pdf",
            ]
        );
        assert_eq!(deduped[0].origin(), LinkOrigin::Direct);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let page = result("https://example.com/page", 1);
        let deduped = deduplicate(vec![
            CandidateLink::scanned("https://a.example/X.pdf", &page),
            CandidateLink::scanned("https://a.example/x.pdf", &page),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn empty_stream() {
        assert!(deduplicate(Vec::new()).is_empty());
    }
}
