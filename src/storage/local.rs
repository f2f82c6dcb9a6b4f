//! Local filesystem storage implementation.
//!
//! Writes the results file atomically: the payload goes to a sibling
//! temp file which is then renamed over the target.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{OutputFormat, ResultSet};
use crate::storage::{ResultStorage, WriteMetadata, encode};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    format: OutputFormat,
}

impl LocalStorage {
    /// Create a LocalStorage that writes to `path`.
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read the stored file, returning None if it doesn't exist.
    pub async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl ResultStorage for LocalStorage {
    async fn write_results(&self, results: &ResultSet) -> Result<WriteMetadata> {
        let bytes = encode(results, self.format)?;
        self.write_bytes(&bytes).await?;

        let metadata = WriteMetadata {
            location: self.path.clone(),
            document_count: results.total_documents(),
            timestamp: Utc::now(),
        };
        log::info!(
            "Wrote {} document links to {}",
            metadata.document_count,
            metadata.location.display()
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{YearEntry, YearOutcome};
    use tempfile::TempDir;

    fn results() -> ResultSet {
        ResultSet {
            entries: vec![YearEntry {
                fiscal_year: "2024".into(),
                outcome: YearOutcome::Found {
                    urls: vec!["https://defense.gov/FY24_Budget.pdf".into()],
                },
                direct_count: 1,
                query: Some("DoD budget FY 2024 spending filetype:pdf".into()),
            }],
            cancelled: false,
        }
    }

    #[tokio::test]
    async fn test_write_text_results() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("out/pdfs.txt"), OutputFormat::Text);

        let meta = storage.write_results(&results()).await.unwrap();
        assert_eq!(meta.document_count, 1);

        let data = storage.read_bytes().await.unwrap().unwrap();
        assert_eq!(
            String::from_utf8(data).unwrap(),
            "FY 2024:\nhttps://defense.gov/FY24_Budget.pdf\n"
        );
        assert!(!tmp.path().join("out/pdfs.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_json_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("pdfs.json"), OutputFormat::Json);

        storage.write_results(&results()).await.unwrap();
        let data = storage.read_bytes().await.unwrap().unwrap();
        let loaded: ResultSet = serde_json::from_slice(&data).unwrap();
        assert_eq!(loaded, results());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nope.txt"), OutputFormat::Text);
        assert!(storage.read_bytes().await.unwrap().is_none());
    }
}
