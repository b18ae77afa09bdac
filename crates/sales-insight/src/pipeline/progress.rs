//! Progress reporting for the sales pipeline.
//!
//! A run moves through a fixed sequence of stages. Each stage reports when it
//! starts and, where row counts are known, when it finishes.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_insight::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&text)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the CSV text from its source
    Loading,
    /// Splitting the text into raw rows
    Parsing,
    /// Checking raw rows for defects
    Inspecting,
    /// Normalizing rows into transactions
    Cleaning,
    /// Computing views and summary statistics
    Aggregating,
    Complete,
    Failed,
}

impl PipelineStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Source",
            Self::Parsing => "Parsing CSV",
            Self::Inspecting => "Inspecting Quality",
            Self::Cleaning => "Cleaning Rows",
            Self::Aggregating => "Aggregating Sales",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run taken by this stage (0.0 - 1.0).
    ///
    /// Weights of the working stages sum to 1.0; terminal stages weigh 0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.20,
            Self::Parsing => 0.20,
            Self::Inspecting => 0.15,
            Self::Cleaning => 0.20,
            Self::Aggregating => 0.25,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Parsing => 0.20,
            Self::Inspecting => 0.40,
            Self::Cleaning => 0.55,
            Self::Aggregating => 0.75,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    /// Rows handled so far in this stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Progress update carrying row counts.
    pub fn with_items(
        stage: PipelineStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            1.0
        };
        Self {
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }
}

/// Receiver of pipeline progress.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved to a
/// worker thread while the host keeps listening.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage boundary. Must not block.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WORKING_STAGES: [PipelineStage; 5] = [
        PipelineStage::Loading,
        PipelineStage::Parsing,
        PipelineStage::Inspecting,
        PipelineStage::Cleaning,
        PipelineStage::Aggregating,
    ];

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(PipelineStage::Cleaning, 0.5, "Cleaning...");
        assert_eq!(update.stage, PipelineStage::Cleaning);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.65).abs() < 1e-6);
        assert_eq!(update.message, "Cleaning...");
    }

    #[test]
    fn test_progress_update_with_items() {
        let update = ProgressUpdate::with_items(PipelineStage::Parsing, 90, 180, "Parsed rows");
        assert_eq!(update.stage_progress, 0.5);
        assert_eq!(update.items_processed, Some(90));
        assert_eq!(update.items_total, Some(180));

        let empty = ProgressUpdate::with_items(PipelineStage::Parsing, 0, 0, "No rows");
        assert_eq!(empty.stage_progress, 1.0);
    }

    #[test]
    fn test_progress_update_terminal() {
        let done = ProgressUpdate::complete("Done!");
        assert_eq!(done.stage, PipelineStage::Complete);
        assert_eq!(done.progress, 1.0);

        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, PipelineStage::Failed);
        assert_eq!(failed.progress, 0.0);
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(PipelineStage::Parsing, 0.0, "Test"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stage_weights_sum() {
        let total_weight: f32 = WORKING_STAGES.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0f32;
        for stage in WORKING_STAGES {
            assert!((stage.base_progress() - expected).abs() < 1e-6, "{stage:?}");
            expected += stage.weight();
        }
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&PipelineStage::Aggregating).unwrap();
        assert_eq!(json, "\"aggregating\"");

        let update = ProgressUpdate::new(PipelineStage::Loading, 0.0, "Loading");
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"stage\":\"loading\""));
        assert!(!json.contains("items_total"));
    }
}
