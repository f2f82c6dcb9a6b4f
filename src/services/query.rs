// src/services/query.rs

//! Search query construction.

use crate::error::{AppError, Result};
use crate::models::{DiscoveryConfig, FiscalYearQuery};

/// Builds the search query for a fiscal year.
///
/// Supported template placeholders:
/// - `{year}`: the fiscal-year label
/// - `{filetype}`: the document extension without its leading dot
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    template: String,
    filetype: String,
}

impl QueryBuilder {
    pub fn new(template: impl Into<String>, document_suffix: &str) -> Self {
        Self {
            template: template.into(),
            filetype: document_suffix.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(config.query_template.clone(), &config.document_suffix)
    }

    /// Build the query for `fiscal_year`.
    ///
    /// A non-blank `override_text` is used verbatim; otherwise the template
    /// is expanded. Fails only when the label is empty.
    pub fn build(&self, fiscal_year: &str, override_text: Option<&str>) -> Result<FiscalYearQuery> {
        let fiscal_year = fiscal_year.trim();
        if fiscal_year.is_empty() {
            return Err(AppError::configuration("fiscal-year label is empty"));
        }

        let text = match override_text.filter(|text| !text.trim().is_empty()) {
            Some(text) => text.to_string(),
            None => self
                .template
                .replace("{year}", fiscal_year)
                .replace("{filetype}", &self.filetype),
        };

        Ok(FiscalYearQuery::new(fiscal_year, text))
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_contains_label_and_filetype() {
        let builder = QueryBuilder::default();
        for year in ["2024", "2025", "FY99", "1999-2000"] {
            let query = builder.build(year, None).unwrap();
            assert!(query.text().contains(year), "{}", query.text());
            assert!(query.text().contains("filetype:pdf"), "{}", query.text());
            assert_eq!(query.fiscal_year(), year);
        }
    }

    #[test]
    fn default_template_text() {
        let query = QueryBuilder::default().build("2024", None).unwrap();
        assert_eq!(query.text(), "DoD budget FY 2024 spending filetype:pdf");
    }

    #[test]
    fn override_is_verbatim() {
        let builder = QueryBuilder::default();
        let query = builder
            .build("2024", Some("DoD Budget FY2024 filetype:pdf"))
            .unwrap();
        assert_eq!(query.text(), "DoD Budget FY2024 filetype:pdf");

        let query = builder
            .build("custom", Some("  Navy shipbuilding  justification book "))
            .unwrap();
        assert_eq!(query.text(), "  Navy shipbuilding  justification book ");
    }

    #[test]
    fn blank_override_falls_back_to_template() {
        let query = QueryBuilder::default().build("2025", Some("   ")).unwrap();
        assert_eq!(query.text(), "DoD budget FY 2025 spending filetype:pdf");
    }

    #[test]
    fn empty_label_is_configuration_error() {
        let builder = QueryBuilder::default();
        assert!(matches!(
            builder.build("", None),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            builder.build("  ", Some("anything")),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn custom_suffix_feeds_filetype() {
        let builder = QueryBuilder::new("budget {year} filetype:{filetype}", ".XLSX");
        let query = builder.build("2024", None).unwrap();
        assert_eq!(query.text(), "budget 2024 filetype:xlsx");
    }
}
