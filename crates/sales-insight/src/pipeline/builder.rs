//! The sales pipeline and its builder.

use crate::aggregator::Aggregator;
use crate::cleaner::DataCleaner;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::parser::CsvParser;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::quality::DataQualityInspector;
use crate::source::DataSource;
use crate::types::{AnalysisResult, RawRow};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Parse → inspect → clean → aggregate, as one synchronous unit of work.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sales_insight::{DataSource, Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().top_n(3).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run_source(&DataSource::File("penjualan.csv".into()))?;
///
/// println!("Total sales: {}", result.stats.total_sales);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    inspector: DataQualityInspector,
    cleaner: DataCleaner,
    aggregator: Aggregator,
}

// Pipeline may be moved to a worker thread by a host application
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load `source` and run the pipeline over its text.
    ///
    /// # Errors
    ///
    /// Source failures (missing file, network error, non-success status) are
    /// returned before any parsing happens.
    pub fn run_source(&self, source: &DataSource) -> Result<AnalysisResult> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}...", source),
        ));

        let text = match source.load() {
            Ok(text) => text,
            Err(e) => return Err(self.fail(e)),
        };

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} bytes", text.len()),
        ));

        self.run(&text)
    }

    /// Run the pipeline over CSV text.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::EmptyInput`] when there is no header line
    /// - [`PipelineError::MissingColumns`] when the header lacks schema columns
    /// - [`PipelineError::NoValidTransactions`] when every row is skipped
    pub fn run(&self, text: &str) -> Result<AnalysisResult> {
        match self.run_internal(text) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Analyzed {} transactions",
                    result.stats.total_transactions
                )));
                Ok(result)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&self, e: PipelineError) -> PipelineError {
        error!("Pipeline error: {}", e);
        self.report_progress(ProgressUpdate::failed(e.to_string()));
        e
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, text: &str) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        info!("Starting sales pipeline...");

        // Step 1: Parse
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Parsing,
            0.0,
            "Parsing CSV...",
        ));
        let rows: Vec<RawRow> = CsvParser::parse(text)?.collect();
        info!("Step 1: Parsed {} rows", rows.len());
        self.report_progress(ProgressUpdate::with_items(
            PipelineStage::Parsing,
            rows.len(),
            rows.len(),
            format!("Parsed {} rows", rows.len()),
        ));

        // Step 2: Inspect
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Inspecting,
            0.0,
            "Inspecting data quality...",
        ));
        let issues = self.inspector.inspect(&rows);
        info!("Step 2: Found {} rows with issues", issues.len());
        self.report_progress(ProgressUpdate::with_items(
            PipelineStage::Inspecting,
            rows.len(),
            rows.len(),
            format!("{} rows with issues", issues.len()),
        ));

        // Step 3: Clean
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Cleaning rows...",
        ));
        let cleaned = self.cleaner.clean(&rows);
        info!(
            "Step 3: Kept {} transactions, skipped {}",
            cleaned.transactions.len(),
            cleaned.skipped.len()
        );
        self.report_progress(ProgressUpdate::with_items(
            PipelineStage::Cleaning,
            cleaned.transactions.len(),
            rows.len(),
            format!("Kept {} of {} rows", cleaned.transactions.len(), rows.len()),
        ));

        if cleaned.transactions.is_empty() {
            return Err(PipelineError::NoValidTransactions {
                raw_records: rows.len(),
            });
        }

        // Step 4: Aggregate
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Aggregating,
            0.0,
            "Aggregating sales...",
        ));
        let views = self.aggregator.aggregate(&cleaned.transactions);
        let stats = self.aggregator.summary_stats(
            rows.len(),
            &issues,
            &cleaned.transactions,
            &cleaned.skipped,
        );
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Aggregating,
            1.0,
            "Aggregation complete",
        ));

        info!(
            "Pipeline completed in {}ms: total sales {}, quality rate {:.1}%",
            start_time.elapsed().as_millis(),
            stats.total_sales,
            stats.data_quality_rate
        );

        Ok(AnalysisResult {
            transactions: cleaned.transactions,
            issues,
            skipped: cleaned.skipped,
            top_products: views.top_products,
            sales_by_region: views.sales_by_region,
            sales_by_month: views.sales_by_month,
            product_sales_by_month: views.product_sales_by_month,
            stats,
        })
    }
}

/// Builder for creating a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let pipeline = Pipeline::builder()
    ///     .on_progress(|update| {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     })
    ///     .build()?;
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            inspector: DataQualityInspector::new(config.amount_tolerance),
            cleaner: DataCleaner::new(config.default_year),
            aggregator: Aggregator::new(config.top_n, config.product_month_window),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CSV: &str = "transaction_id,product_id,product_name,region_id,region_name,date,quantity,price_per_unit,total_price\n\
        T1,P001,Blender,R01,Jakarta,2024-01-05,2,100,200\n\
        T2,P002,Rice Cooker,R02,Bandung,15-02-2024,1,300,300\n\
        T3,P001,Blender,R01,Jakarta,2024-03-01,,100,\n";

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &PipelineConfig::default());
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            top_n: 0,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_run_produces_result() {
        let pipeline = Pipeline::builder().build().unwrap();
        let result = pipeline.run(CSV).unwrap();

        assert_eq!(result.stats.total_raw_records, 3);
        assert_eq!(result.stats.total_transactions, 2);
        assert_eq!(result.stats.total_skipped, 1);
        assert_eq!(result.stats.total_issues, 2);
        assert_eq!(result.stats.total_sales, 500);
        assert_eq!(result.top_products[0].name, "Rice Cooker");
    }

    #[test]
    fn test_run_reports_every_stage() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();
        pipeline.run_source(&DataSource::Inline(CSV.into())).unwrap();

        let mut seen = stages.lock().unwrap().clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                PipelineStage::Loading,
                PipelineStage::Parsing,
                PipelineStage::Inspecting,
                PipelineStage::Cleaning,
                PipelineStage::Aggregating,
                PipelineStage::Complete,
            ]
        );
    }

    #[test]
    fn test_all_rows_skipped_is_error() {
        let failures = Arc::new(AtomicUsize::new(0));
        let failures_clone = failures.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |update| {
                if update.stage == PipelineStage::Failed {
                    failures_clone.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let text = "transaction_id,product_id,product_name,region_id,region_name,date,quantity,price_per_unit,total_price\n\
                    T1,P001,Blender,R01,Jakarta,2024-01-05,,100,\n";
        let err = pipeline.run(text).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::NoValidTransactions { raw_records: 1 }
        ));
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_is_repeatable() {
        let pipeline = Pipeline::builder().build().unwrap();
        let first = pipeline.run(CSV).unwrap();
        let second = pipeline.run(CSV).unwrap();
        assert_eq!(first.stats, second.stats);
        assert_eq!(first.sales_by_month, second.sales_by_month);
    }
}
