//! CLI entry point for the sales insight pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use sales_insight::{
    DashboardReport, DataSource, Pipeline, PipelineConfig, ReportGenerator, format_rupiah,
};
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

/// Environment variable naming a remote CSV used when no source flag is given.
const SOURCE_URL_ENV: &str = "SALES_CSV_URL";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Sales transaction cleaning and dashboard pipeline",
    long_about = "Cleans a sales transaction CSV, reports data-quality problems and \
                  prints dashboard views (top products, regions, monthly trend).\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  SALES_CSV_URL    Remote CSV used when neither --input nor --url is given\n\n\
                  EXAMPLES:\n  \
                  # Analyze a local export\n  \
                  sales-insight -i penjualan.csv\n\n  \
                  # Show the itemized data-quality report\n  \
                  sales-insight -i penjualan.csv --quality\n\n  \
                  # Full JSON for other tools\n  \
                  sales-insight -i penjualan.csv --json | jq .stats\n\n  \
                  # Write report and CSV tables to results/\n  \
                  sales-insight -i penjualan.csv -o results/ -r --export-tables"
)]
struct Args {
    /// Path to the sales CSV file
    #[arg(short, long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// URL of the sales CSV file
    #[arg(long)]
    url: Option<String>,

    /// Output directory for reports and exported tables
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Number of products in the top-products view
    #[arg(long, default_value = "5")]
    top_n: usize,

    /// Months (from January) covered by the product-by-month view
    #[arg(long, default_value = "6")]
    month_window: u32,

    /// Year assigned to DD-MM-YYYY dates
    #[arg(long, default_value = "2024")]
    default_year: i32,

    /// Tolerance for the quantity × price = total check
    #[arg(long, default_value = "1.0")]
    tolerance: f64,

    /// Number of issues listed in the data-quality section
    #[arg(long, default_value = "20")]
    issue_limit: usize,

    /// Print the itemized data-quality report
    #[arg(long)]
    quality: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the dashboard report.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Export every view, the issues and the skipped rows as CSV tables
    #[arg(long)]
    export_tables: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    let source = resolve_source(&args)?;

    let config = PipelineConfig::builder()
        .output_dir(&args.output)
        .top_n(args.top_n)
        .product_month_window(args.month_window)
        .default_year(args.default_year)
        .amount_tolerance(args.tolerance)
        .issue_display_limit(args.issue_limit)
        .build()?;

    let mut builder = Pipeline::builder().config(config.clone());
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let result = match pipeline.run_source(&source) {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    let report = ReportGenerator::build_dashboard_report(&source.describe(), &config, &result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let generator = ReportGenerator::new(config.output_dir.clone());
    let stem = source.file_stem();

    if args.emit_report {
        let report_path = generator.write_report_to_file(&report, &stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.export_tables {
        let written = generator.export_tables(&result, &stem)?;
        info!(
            "Wrote {} tables to {}",
            written.len(),
            generator.output_dir().display()
        );
    }

    print_dashboard(&report);
    if args.quality {
        print_quality_report(&report);
    }

    Ok(())
}

/// Pick the CSV source: `--input`, then `--url`, then `SALES_CSV_URL`.
fn resolve_source(args: &Args) -> Result<DataSource> {
    if let Some(ref path) = args.input {
        if !path.exists() {
            return Err(anyhow!("Input file not found: {}", path.display()));
        }
        return Ok(DataSource::File(path.clone()));
    }

    if let Some(ref url) = args.url {
        return Ok(DataSource::Url(url.clone()));
    }

    match env::var(SOURCE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => {
            info!("Using {} from environment", SOURCE_URL_ENV);
            Ok(DataSource::Url(url.trim().to_string()))
        }
        _ => Err(anyhow!(
            "No data source: pass --input <path>, --url <url> or set {}",
            SOURCE_URL_ENV
        )),
    }
}

/// Print the dashboard views.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_dashboard(report: &DashboardReport) {
    let stats = &report.stats;

    println!();
    println!("{}", "=".repeat(80));
    println!("SALES DASHBOARD");
    println!("{}", "=".repeat(80));
    println!("Source: {}", report.source);
    println!();

    println!(
        "  Total Sales:          Rp {}",
        format_rupiah(stats.total_sales as f64, 1)
    );
    println!(
        "  Valid Transactions:   {} of {} records",
        stats.total_transactions, stats.total_raw_records
    );
    println!(
        "  Average Transaction:  Rp {}",
        format_rupiah(stats.avg_transaction as f64, 1)
    );
    println!(
        "  Data Quality:         {:.1}% ({} issues, {} skipped)",
        stats.data_quality_rate, stats.total_issues, stats.total_skipped
    );
    println!();

    println!("TOP {} PRODUCTS", report.top_products.len());
    println!("{}", "-".repeat(40));
    for (rank, product) in report.top_products.iter().enumerate() {
        println!(
            "  {}. {:<24} Rp {}",
            rank + 1,
            truncate_str(&product.name, 24),
            format_rupiah(product.total as f64, 1)
        );
    }
    println!();

    println!("SALES BY REGION");
    println!("{}", "-".repeat(40));
    println!("  {:<20} {:>16} {:>8}", "Region", "Total", "Share");
    for region in &report.region_shares {
        println!(
            "  {:<20} {:>16} {:>7.1}%",
            truncate_str(&region.name, 20),
            format_rupiah(region.total as f64, 1),
            region.share
        );
    }
    println!();

    println!("MONTHLY TREND");
    println!("{}", "-".repeat(40));
    for month in &report.sales_by_month {
        println!("  {:<5} Rp {}", month.month, format_rupiah(month.total as f64, 1));
    }
    println!();

    if let Some(first) = report.product_sales_by_month.first() {
        println!("PRODUCT SALES BY MONTH (Juta)");
        println!("{}", "-".repeat(40));
        let mut header = format!("  {:<5}", "Month");
        for value in &first.products {
            header.push_str(&format!(" {:>14}", truncate_str(&value.product, 14)));
        }
        println!("{}", header);
        for row in &report.product_sales_by_month {
            let mut line = format!("  {:<5}", row.month);
            for value in &row.products {
                line.push_str(&format!(" {:>14.1}", value.total as f64 / 1_000_000.0));
            }
            println!("{}", line);
        }
        println!();
    }

    println!("{}", "=".repeat(80));
}

/// Print the itemized data-quality report.
fn print_quality_report(report: &DashboardReport) {
    let quality = &report.data_quality;

    println!();
    println!("DATA QUALITY REPORT");
    println!("{}", "-".repeat(40));
    println!("  Total records:       {}", quality.total_raw_records);
    println!("  Rows with issues:    {}", quality.total_issues);
    println!("  Skipped rows:        {}", quality.total_skipped);
    println!("  Quality rate:        {:.1}%", quality.data_quality_rate);
    println!();

    if !quality.issues.is_empty() {
        println!(
            "  {:<6} {:<10} {:<16} {:<12} Problems",
            "Line", "ID", "Product", "Region"
        );
        for issue in &quality.issues {
            let problems: Vec<String> = issue.problems.iter().map(|p| p.to_string()).collect();
            println!(
                "  #{:<5} {:<10} {:<16} {:<12} {}",
                issue.line_number,
                truncate_str(&issue.transaction_id, 10),
                truncate_str(&issue.product, 16),
                truncate_str(&issue.region, 12),
                problems.join("; ")
            );
        }
        if quality.remaining_issue_count > 0 {
            println!("  ... and {} more", quality.remaining_issue_count);
        }
        println!();
    }

    if !quality.skipped.is_empty() {
        println!("SKIPPED ROWS ({})", quality.skipped.len());
        println!("{}", "-".repeat(40));
        for record in &quality.skipped {
            println!("  {} - {}", record.transaction_id, record.reason);
        }
        println!();
    }

    println!("RECOMMENDATIONS");
    println!("{}", "-".repeat(40));
    for recommendation in &quality.recommendations {
        println!("  - {}", recommendation);
    }
    println!();
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
