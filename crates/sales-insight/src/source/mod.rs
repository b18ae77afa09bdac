//! Where the CSV text comes from.
//!
//! Loading happens before the pipeline starts; any failure here is a hard
//! error and no partial result is produced.

use crate::error::{PipelineError, Result, ResultExt};
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Timeout for remote CSV downloads in seconds.
#[cfg(feature = "fetch")]
const FETCH_TIMEOUT_SECS: u64 = 30;

/// A CSV source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A file on the local filesystem.
    File(PathBuf),
    /// An `http(s)` URL, fetched with a blocking GET.
    Url(String),
    /// CSV text already in memory.
    Inline(String),
}

impl DataSource {
    /// Read the full CSV text.
    pub fn load(&self) -> Result<String> {
        match self {
            Self::File(path) => {
                info!("Loading CSV from {}", path.display());
                std::fs::read_to_string(path)
                    .context(format!("Failed to read '{}'", path.display()))
            }
            Self::Url(url) => fetch(url),
            Self::Inline(text) => Ok(text.clone()),
        }
    }

    /// Short description for reports, e.g. the file name or URL.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
            Self::Inline(_) => "inline".to_string(),
        }
    }

    /// Stem used to name output files.
    pub fn file_stem(&self) -> String {
        let stem = match self {
            Self::File(path) => path.file_stem().and_then(|s| s.to_str()),
            Self::Url(url) => url
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .and_then(|segment| segment.split(['?', '#']).next())
                .map(|segment| segment.rsplit_once('.').map_or(segment, |(s, _)| s)),
            Self::Inline(_) => None,
        };
        stem.filter(|s| !s.is_empty()).unwrap_or("sales").to_string()
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(feature = "fetch")]
fn fetch(url: &str) -> Result<String> {
    use reqwest::blocking::Client;
    use std::time::Duration;

    info!("Fetching CSV from {}", url);
    let client = Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()?;

    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text()?)
}

#[cfg(not(feature = "fetch"))]
fn fetch(url: &str) -> Result<String> {
    Err(PipelineError::InvalidConfig(format!(
        "cannot load '{url}': built without the \"fetch\" feature"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_inline_source_returns_text() {
        let source = DataSource::Inline("a,b\n1,2".into());
        assert_eq!(source.load().unwrap(), "a,b\n1,2");
        assert_eq!(source.describe(), "inline");
        assert_eq!(source.file_stem(), "sales");
    }

    #[test]
    fn test_missing_file_is_source_failure() {
        let source = DataSource::File(Path::new("does/not/exist.csv").to_path_buf());
        let err = source.load().unwrap_err();

        assert!(err.is_source_failure());
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("exist.csv"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            DataSource::File("data/penjualan.csv".into()).file_stem(),
            "penjualan"
        );
        assert_eq!(
            DataSource::Url("https://example.com/exports/sales_2024.csv?dl=1".into()).file_stem(),
            "sales_2024"
        );
        assert_eq!(DataSource::Url("https://example.com/".into()).file_stem(), "example");
    }

    #[cfg(not(feature = "fetch"))]
    #[test]
    fn test_url_without_fetch_feature() {
        let err = DataSource::Url("https://example.com/a.csv".into()).load().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
