//! Report generation module.
//!
//! Turns an [`AnalysisResult`](crate::types::AnalysisResult) into a
//! [`DashboardReport`] suitable for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - CSV table export (`--export-tables` CLI flag)
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_insight::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_dashboard_report("penjualan.csv", &config, &result);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! generator.write_report_to_file(&report, "penjualan")?;
//! ```

mod format;
mod generator;

pub use format::format_rupiah;
pub use generator::{
    DashboardReport, DataQualityReport, RECOMMENDATIONS, RegionShare, ReportGenerator,
};
