use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::types::{
    AnalysisResult, Issue, MONTH_KEY, MonthlyTotal, ProductMonthlyRow, RegionTotal,
    SkippedRecord, SummaryStats, TopProduct,
};
use crate::utils::percentage;
use chrono::Local;
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Data-fixing advice shown alongside every quality report.
pub const RECOMMENDATIONS: [&str; 5] = [
    "Standardize the date format to YYYY-MM-DD for every entry",
    "Make sure quantity and total_price are always filled in",
    "Validate quantity × price = total in the input system",
    "Run data cleaning regularly to keep data quality up",
    "Write clear data-entry procedures to prevent future errors",
];

// ============================================================================
// Report Types
// ============================================================================

/// Data-quality section of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DataQualityReport {
    pub total_raw_records: usize,
    pub total_transactions: usize,
    pub total_issues: usize,
    pub total_skipped: usize,
    /// Cleaned / raw × 100, one decimal.
    pub data_quality_rate: f64,
    /// The first `issue_display_limit` issues.
    pub issues: Vec<Issue>,
    /// Issues not itemized above ("... and N more").
    pub remaining_issue_count: usize,
    /// Every skipped row.
    pub skipped: Vec<SkippedRecord>,
    pub recommendations: Vec<String>,
}

impl DataQualityReport {
    pub fn from_result(result: &AnalysisResult, issue_display_limit: usize) -> Self {
        let shown = result.issues.len().min(issue_display_limit);
        Self {
            total_raw_records: result.stats.total_raw_records,
            total_transactions: result.stats.total_transactions,
            total_issues: result.stats.total_issues,
            total_skipped: result.stats.total_skipped,
            data_quality_rate: result.stats.data_quality_rate,
            issues: result.issues[..shown].to_vec(),
            remaining_issue_count: result.issues.len() - shown,
            skipped: result.skipped.clone(),
            recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// A region's revenue with its share of total sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionShare {
    pub name: String,
    pub total: i64,
    /// Percent of total sales, one decimal.
    pub share: f64,
}

/// Everything the dashboard renders, in one serializable document.
///
/// Used for `--json` output, `--emit-report` files and library callers.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: String,
    /// File path or URL of the CSV source
    pub source: String,
    pub config: PipelineConfig,
    pub stats: SummaryStats,
    pub top_products: Vec<TopProduct>,
    pub sales_by_region: Vec<RegionTotal>,
    pub region_shares: Vec<RegionShare>,
    pub sales_by_month: Vec<MonthlyTotal>,
    pub product_sales_by_month: Vec<ProductMonthlyRow>,
    pub data_quality: DataQualityReport,
}

// ============================================================================
// Generator
// ============================================================================

/// Builds reports and writes them to the output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Assemble the dashboard report for one run.
    pub fn build_dashboard_report(
        source: &str,
        config: &PipelineConfig,
        result: &AnalysisResult,
    ) -> DashboardReport {
        let total_sales = result.stats.total_sales as f64;
        let region_shares = result
            .sales_by_region
            .iter()
            .map(|region| RegionShare {
                name: region.name.clone(),
                total: region.total,
                share: percentage(region.total as f64, total_sales),
            })
            .collect();

        DashboardReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: source.to_string(),
            config: config.clone(),
            stats: result.stats.clone(),
            top_products: result.top_products.clone(),
            sales_by_region: result.sales_by_region.clone(),
            region_shares,
            sales_by_month: result.sales_by_month.clone(),
            product_sales_by_month: result.product_sales_by_month.clone(),
            data_quality: DataQualityReport::from_result(result, config.issue_display_limit),
        }
    }

    /// Write a report to `<stem>_report.json` in the output directory.
    pub fn write_report_to_file(&self, report: &DashboardReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory '{}'",
            self.output_dir.display()
        ))?;

        let report_path = self.output_dir.join(format!("{}_report.json", stem));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Export every view, the issue list and the skip list as CSV tables.
    ///
    /// Files are named `<stem>_<table>.csv`; returns the written paths.
    pub fn export_tables(&self, result: &AnalysisResult, stem: &str) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory '{}'",
            self.output_dir.display()
        ))?;

        let tables = [
            ("top_products", named_totals_frame(&result.top_products)?),
            ("sales_by_region", named_totals_frame(&result.sales_by_region)?),
            ("sales_by_month", monthly_frame(&result.sales_by_month)?),
            (
                "product_sales_by_month",
                product_monthly_frame(&result.product_sales_by_month)?,
            ),
            ("issues", issues_frame(&result.issues)?),
            ("skipped", skipped_frame(&result.skipped)?),
        ];

        let mut written = Vec::with_capacity(tables.len());
        for (name, mut df) in tables {
            let path = self.output_dir.join(format!("{}_{}.csv", stem, name));
            let mut file = File::create(&path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(&mut df)
                .context(format!("Failed to write '{}'", path.display()))?;
            debug!("Exported {} ({} rows)", path.display(), df.height());
            written.push(path);
        }

        info!(
            "Exported {} tables to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}

// ============================================================================
// DataFrame conversion
// ============================================================================

fn named_totals_frame(totals: &[TopProduct]) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = totals.iter().map(|t| t.name.as_str()).collect();
    let values: Vec<i64> = totals.iter().map(|t| t.total).collect();
    DataFrame::new(vec![
        Column::new("name".into(), names),
        Column::new("total".into(), values),
    ])
}

fn monthly_frame(months: &[MonthlyTotal]) -> PolarsResult<DataFrame> {
    let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    let totals: Vec<i64> = months.iter().map(|m| m.total).collect();
    DataFrame::new(vec![
        Column::new(MONTH_KEY.into(), labels),
        Column::new("total".into(), totals),
    ])
}

/// One row per month, one column per product, headed like the JSON keys.
fn product_monthly_frame(rows: &[ProductMonthlyRow]) -> PolarsResult<DataFrame> {
    let labels: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
    let mut columns = vec![Column::new(MONTH_KEY.into(), labels)];

    if let Some(first) = rows.first() {
        for (key, value) in first.product_keys().iter().zip(&first.products) {
            let totals: Vec<i64> = rows
                .iter()
                .map(|row| row.total_for(&value.product).unwrap_or(0))
                .collect();
            columns.push(Column::new(key.as_str().into(), totals));
        }
    }

    DataFrame::new(columns)
}

fn issues_frame(issues: &[Issue]) -> PolarsResult<DataFrame> {
    let lines: Vec<u64> = issues.iter().map(|i| i.line_number as u64).collect();
    let ids: Vec<&str> = issues.iter().map(|i| i.transaction_id.as_str()).collect();
    let products: Vec<&str> = issues.iter().map(|i| i.product.as_str()).collect();
    let regions: Vec<&str> = issues.iter().map(|i| i.region.as_str()).collect();
    let problems: Vec<String> = issues
        .iter()
        .map(|i| {
            i.problems
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .collect();

    DataFrame::new(vec![
        Column::new("line_number".into(), lines),
        Column::new("transaction_id".into(), ids),
        Column::new("product".into(), products),
        Column::new("region".into(), regions),
        Column::new("problems".into(), problems),
    ])
}

fn skipped_frame(skipped: &[SkippedRecord]) -> PolarsResult<DataFrame> {
    let lines: Vec<u64> = skipped.iter().map(|s| s.line_number as u64).collect();
    let ids: Vec<&str> = skipped.iter().map(|s| s.transaction_id.as_str()).collect();
    let reasons: Vec<String> = skipped.iter().map(|s| s.reason.to_string()).collect();

    DataFrame::new(vec![
        Column::new("line_number".into(), lines),
        Column::new("transaction_id".into(), ids),
        Column::new("reason".into(), reasons),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use tempfile::tempdir;

    const CSV: &str = "transaction_id,product_id,product_name,region_id,region_name,date,quantity,price_per_unit,total_price\n\
        T1,P001,Blender,R01,Jakarta,2024-01-05,2,100,200\n\
        T2,P002,Rice Cooker,R02,Bandung,15-02-2024,1,300,300\n\
        T3,P001,Blender,R01,Jakarta,2024-03-01,,100,\n\
        T4,P003,Kettle,R01,Jakarta,2024-03-09,1,500,500\n";

    fn analyze() -> AnalysisResult {
        Pipeline::builder().build().unwrap().run(CSV).unwrap()
    }

    #[test]
    fn test_region_shares() {
        let result = analyze();
        let report =
            ReportGenerator::build_dashboard_report("inline", &PipelineConfig::default(), &result);

        assert_eq!(
            report.region_shares,
            vec![
                RegionShare { name: "Jakarta".into(), total: 700, share: 70.0 },
                RegionShare { name: "Bandung".into(), total: 300, share: 30.0 },
            ]
        );
    }

    #[test]
    fn test_quality_report_caps_issue_list() {
        let result = analyze();
        assert_eq!(result.issues.len(), 2);

        let capped = DataQualityReport::from_result(&result, 1);
        assert_eq!(capped.issues.len(), 1);
        assert_eq!(capped.remaining_issue_count, 1);
        assert_eq!(capped.skipped.len(), 1);
        assert_eq!(capped.recommendations.len(), RECOMMENDATIONS.len());

        let full = DataQualityReport::from_result(&result, 20);
        assert_eq!(full.issues.len(), 2);
        assert_eq!(full.remaining_issue_count, 0);
    }

    #[test]
    fn test_report_json_shape() {
        let result = analyze();
        let report =
            ReportGenerator::build_dashboard_report("inline", &PipelineConfig::default(), &result);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["source"], "inline");
        assert_eq!(json["stats"]["total_sales"], 1000);
        assert_eq!(json["product_sales_by_month"][0]["month"], "Jan");
        assert_eq!(json["product_sales_by_month"][0]["Blender"], 200);
        assert_eq!(json["data_quality"]["skipped"][0]["transaction_id"], "T3");
    }

    #[test]
    fn test_write_report_and_export_tables() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("outputs");
        let generator = ReportGenerator::new(dir.clone());
        let result = analyze();
        let report =
            ReportGenerator::build_dashboard_report("inline", &PipelineConfig::default(), &result);

        let report_path = generator.write_report_to_file(&report, "sales").unwrap();
        assert_eq!(report_path, dir.join("sales_report.json"));
        assert!(report_path.exists());

        let written = generator.export_tables(&result, "sales").unwrap();
        assert_eq!(written.len(), 6);

        let months = fs::read_to_string(dir.join("sales_product_sales_by_month.csv")).unwrap();
        let mut lines = months.lines();
        assert_eq!(lines.next(), Some("month,Blender,Rice Cooker,Kettle"));
        assert_eq!(lines.next(), Some("Jan,200,0,0"));

        let skipped = fs::read_to_string(dir.join("sales_skipped.csv")).unwrap();
        assert!(skipped.contains("T3"));
    }

    #[test]
    fn test_export_product_named_month() {
        let csv = "transaction_id,product_id,product_name,region_id,region_name,date,quantity,price_per_unit,total_price\n\
            T1,P001,Blender,R01,Jakarta,2024-02-05,1,50,50\n\
            T2,P009,month,R01,Jakarta,2024-01-05,1,100,100\n";
        let result = Pipeline::builder().build().unwrap().run(csv).unwrap();

        let tmp = tempdir().unwrap();
        let generator = ReportGenerator::new(tmp.path().to_path_buf());
        generator.export_tables(&result, "odd").unwrap();

        let months = fs::read_to_string(tmp.path().join("odd_product_sales_by_month.csv")).unwrap();
        let mut lines = months.lines();
        assert_eq!(lines.next(), Some("month,Blender,month_2"));
        assert_eq!(lines.next(), Some("Jan,0,100"));

        let report =
            ReportGenerator::build_dashboard_report("inline", &PipelineConfig::default(), &result);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["product_sales_by_month"][0]["month"], "Jan");
        assert_eq!(json["product_sales_by_month"][0]["month_2"], 100);
    }
}
