//! Data quality inspection module.
//!
//! This module scans raw rows for defects (empty critical fields, day-first
//! dates, amounts that do not add up) without modifying them.

mod inspector;

pub use inspector::DataQualityInspector;
