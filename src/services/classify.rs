// src/services/classify.rs

//! Direct document link detection.

use url::Url;

/// Decides whether a URL points straight at a document.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    suffix: String,
}

impl LinkClassifier {
    /// `suffix` may be given with or without its leading dot.
    pub fn new(suffix: &str) -> Self {
        let suffix = suffix.trim().trim_start_matches('.').to_ascii_lowercase();
        Self {
            suffix: format!(".{suffix}"),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Case-insensitive suffix match on the URL path.
    ///
    /// Query strings and fragments are ignored, so `report.pdf?download=1`
    /// is still a direct link.
    pub fn is_document(&self, url: &str) -> bool {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        path.to_ascii_lowercase().ends_with(&self.suffix)
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new(".pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_suffix_case_insensitively() {
        let classifier = LinkClassifier::default();
        assert!(classifier.is_document("https://defense.gov/FY24_Budget.pdf"));
        assert!(classifier.is_document("https://defense.gov/FY24_BUDGET.PDF"));
        assert!(!classifier.is_document("https://example.com/page1"));
        assert!(!classifier.is_document("https://example.com/pdf"));
    }

    #[test]
    fn ignores_query_and_fragment() {
        let classifier = LinkClassifier::default();
        assert!(classifier.is_document("https://a.example/r.pdf?download=1"));
        assert!(classifier.is_document("https://a.example/r.pdf#page=4"));
        assert!(!classifier.is_document("https://a.example/view?file=r.pdf"));
    }

    #[test]
    fn relative_strings_are_inspected_raw() {
        let classifier = LinkClassifier::default();
        assert!(classifier.is_document("docs/FY24_detail.pdf"));
        assert!(classifier.is_document("/docs/FY24_detail.PDF?x=1"));
        assert!(!classifier.is_document("docs/index.html"));
    }

    #[test]
    fn suffix_is_normalized() {
        assert_eq!(LinkClassifier::new("pdf").suffix(), ".pdf");
        assert_eq!(LinkClassifier::new(".XLSX").suffix(), ".xlsx");
        assert!(LinkClassifier::new("xlsx").is_document("https://a.example/t.xlsx"));
    }
}
