//! Configuration types for the sales analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of entries in the top-products view.
pub const DEFAULT_TOP_N: usize = 5;

/// Default number of months (starting at January) in the product-by-month view.
pub const DEFAULT_PRODUCT_MONTH_WINDOW: u32 = 6;

/// Year assigned to dates written as `DD-MM-YYYY`.
pub const DEFAULT_YEAR: i32 = 2024;

/// Absolute tolerance for the `quantity × price_per_unit = total_price` check.
pub const DEFAULT_AMOUNT_TOLERANCE: f64 = 1.0;

/// Default number of issues listed in the data-quality report.
pub const DEFAULT_ISSUE_DISPLAY_LIMIT: usize = 20;

/// Configuration for the sales pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use sales_insight::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .top_n(3)
///     .product_month_window(12)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of products kept in the top-products view.
    /// Default: 5
    pub top_n: usize,

    /// Number of calendar months (from January) covered by the
    /// product-by-month view. Transactions outside the window still
    /// count towards every other view.
    /// Default: 6
    pub product_month_window: u32,

    /// Year used when rewriting `DD-MM-YYYY` dates.
    /// Default: 2024
    pub default_year: i32,

    /// Absolute tolerance (currency units) for the arithmetic cross-check.
    /// Default: 1.0
    pub amount_tolerance: f64,

    /// Maximum number of issues itemized in the data-quality report.
    /// Default: 20
    pub issue_display_limit: usize,

    /// Output directory for reports and exported tables.
    /// Default: "./outputs"
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            product_month_window: DEFAULT_PRODUCT_MONTH_WINDOW,
            default_year: DEFAULT_YEAR,
            amount_tolerance: DEFAULT_AMOUNT_TOLERANCE,
            issue_display_limit: DEFAULT_ISSUE_DISPLAY_LIMIT,
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidTopN(self.top_n));
        }

        if !(1..=12).contains(&self.product_month_window) {
            return Err(ConfigValidationError::InvalidMonthWindow(
                self.product_month_window,
            ));
        }

        if !(1..=9999).contains(&self.default_year) {
            return Err(ConfigValidationError::InvalidYear(self.default_year));
        }

        if !self.amount_tolerance.is_finite() || self.amount_tolerance < 0.0 {
            return Err(ConfigValidationError::InvalidTolerance(
                self.amount_tolerance,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid top-N size: {0} (must be at least 1)")]
    InvalidTopN(usize),

    #[error("Invalid product month window: {0} (must be between 1 and 12)")]
    InvalidMonthWindow(u32),

    #[error("Invalid default year: {0} (must be between 1 and 9999)")]
    InvalidYear(i32),

    #[error("Invalid amount tolerance: {0} (must be a finite, non-negative number)")]
    InvalidTolerance(f64),
}

impl From<ConfigValidationError> for crate::error::PipelineError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::PipelineError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    top_n: Option<usize>,
    product_month_window: Option<u32>,
    default_year: Option<i32>,
    amount_tolerance: Option<f64>,
    issue_display_limit: Option<usize>,
    output_dir: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    /// Set how many products the top-products view keeps.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the number of months covered by the product-by-month view.
    ///
    /// # Arguments
    /// * `months` - Value between 1 and 12 (6 = January through June)
    pub fn product_month_window(mut self, months: u32) -> Self {
        self.product_month_window = Some(months);
        self
    }

    /// Set the year assigned to `DD-MM-YYYY` dates.
    pub fn default_year(mut self, year: i32) -> Self {
        self.default_year = Some(year);
        self
    }

    /// Set the tolerance for the arithmetic cross-check.
    pub fn amount_tolerance(mut self, tolerance: f64) -> Self {
        self.amount_tolerance = Some(tolerance);
        self
    }

    /// Set the number of issues itemized in the data-quality report.
    pub fn issue_display_limit(mut self, limit: usize) -> Self {
        self.issue_display_limit = Some(limit);
        self
    }

    /// Set the output directory for reports and exported tables.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
            product_month_window: self
                .product_month_window
                .unwrap_or(DEFAULT_PRODUCT_MONTH_WINDOW),
            default_year: self.default_year.unwrap_or(DEFAULT_YEAR),
            amount_tolerance: self.amount_tolerance.unwrap_or(DEFAULT_AMOUNT_TOLERANCE),
            issue_display_limit: self
                .issue_display_limit
                .unwrap_or(DEFAULT_ISSUE_DISPLAY_LIMIT),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("./outputs")),
        };

        config.validate()?;
        Ok(config)
    }
}
