//! Custom error types for the sales analysis pipeline.
//!
//! Row-level defects never surface here: they become [`Issue`](crate::types::Issue)s
//! or [`SkippedRecord`](crate::types::SkippedRecord)s. This module only covers
//! failures that stop a run before any result is produced.
//!
//! Errors are serializable so a host UI can receive them as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the sales pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The CSV text contained no header line.
    #[error("Input contains no header line")]
    EmptyInput,

    /// The header is missing one or more required schema columns.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Every row was rejected during cleaning.
    #[error("No valid transactions remain after cleaning ({raw_records} records read)")]
    NoValidTransactions { raw_records: usize },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Remote source answered with a non-success status.
    #[error("Fetching '{url}' failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Report generation or export failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error wrapper.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error (only with the "fetch" feature).
    #[cfg(feature = "fetch")]
    #[error("HTTP request error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::NoValidTransactions { .. } => "NO_VALID_TRANSACTIONS",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::HttpStatus { .. } => "HTTP_STATUS",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Csv(_) => "CSV_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "fetch")]
            Self::Fetch(_) => "FETCH_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the failure happened while obtaining the CSV text,
    /// i.e. before the pipeline itself started.
    pub fn is_source_failure(&self) -> bool {
        match self {
            Self::Io(_) | Self::HttpStatus { .. } => true,
            #[cfg(feature = "fetch")]
            Self::Fetch(_) => true,
            Self::WithContext { source, .. } => source.is_source_failure(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}
