//! Sales Insight Library
//!
//! Cleaning, data-quality inspection and aggregation for sales transaction
//! CSV exports.
//!
//! # Overview
//!
//! A run takes raw CSV text through four stages:
//!
//! - **Parsing**: header-resolved rows with 1-based line numbers, see [`parser`]
//! - **Inspection**: per-row defect reports that never alter data, see [`quality`]
//! - **Cleaning**: date normalization, amount coercion and row rejection, see [`cleaner`]
//! - **Aggregation**: top products, revenue by region and month, a
//!   product-by-month matrix and summary statistics, see [`aggregator`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_insight::{DataSource, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .top_n(5)
//!     .product_month_window(6)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run_source(&DataSource::File("penjualan.csv".into()))?;
//!
//! for product in &result.top_products {
//!     println!("{}: {}", product.name, product.total);
//! }
//! println!("Data quality: {:.1}%", result.stats.data_quality_rate);
//! ```
//!
//! # Reports
//!
//! [`reporting::ReportGenerator`] turns an [`AnalysisResult`] into a
//! serializable [`reporting::DashboardReport`], and exports the views as CSV
//! tables through `polars`.

pub mod aggregator;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod quality;
pub mod reporting;
pub mod source;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregator::{Aggregator, MONTH_LABELS, Views, month_label};
pub use cleaner::{CleanOutcome, DataCleaner, RowOutcome};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use parser::{CsvParser, HeaderLayout, RawRows};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use quality::DataQualityInspector;
pub use reporting::{DashboardReport, DataQualityReport, ReportGenerator, format_rupiah};
pub use source::DataSource;
pub use types::{
    AnalysisResult, Issue, MONTH_KEY, MonthlyTotal, NamedTotal, Problem, ProductMonthValue,
    ProductMonthlyRow, RawRow, RegionTotal, SalesColumn, SkipReason, SkippedRecord, SummaryStats,
    TopProduct, Transaction,
};
