//! Aggregate views over cleaned transactions.
//!
//! Every view is a pure fold over `&[Transaction]`. Group totals are summed
//! in `f64` and rounded once at the end; groups keep the order in which they
//! first appear so that ties sort deterministically. Undated transactions
//! count everywhere except the two monthly views.

use crate::config::{DEFAULT_PRODUCT_MONTH_WINDOW, DEFAULT_TOP_N};
use crate::types::{
    Issue, MonthlyTotal, NamedTotal, ProductMonthValue, ProductMonthlyRow, RegionTotal,
    SkippedRecord, SummaryStats, TopProduct, Transaction,
};
use crate::utils::{percentage, round_currency};
use std::collections::HashMap;
use tracing::debug;

/// Short month labels, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Label for a 1-based month number, `None` outside 1..=12.
pub fn month_label(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_LABELS.get(idx as usize))
        .copied()
}

/// Computes the dashboard views.
#[derive(Debug, Clone)]
pub struct Aggregator {
    top_n: usize,
    month_window: u32,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N, DEFAULT_PRODUCT_MONTH_WINDOW)
    }
}

impl Aggregator {
    /// `month_window` is clamped to 12.
    pub fn new(top_n: usize, month_window: u32) -> Self {
        Self {
            top_n,
            month_window: month_window.min(12),
        }
    }

    /// The `top_n` best-selling products, highest revenue first.
    pub fn top_products(&self, transactions: &[Transaction]) -> Vec<TopProduct> {
        let mut products = ranked(group_totals(transactions, |tx| &tx.product_name));
        products.truncate(self.top_n);
        products
    }

    /// Revenue of every region, highest first.
    pub fn sales_by_region(&self, transactions: &[Transaction]) -> Vec<RegionTotal> {
        ranked(group_totals(transactions, |tx| &tx.region_name))
    }

    /// Revenue per calendar month, January first. Months without
    /// transactions are omitted.
    pub fn sales_by_month(&self, transactions: &[Transaction]) -> Vec<MonthlyTotal> {
        let sums = transactions.iter().fold([None::<f64>; 12], |mut acc, tx| {
            if let Some(idx) = month_index(tx) {
                *acc[idx].get_or_insert(0.0) += tx.total_price;
            }
            acc
        });

        (1..=12u32)
            .zip(sums)
            .filter_map(|(month, sum)| {
                let sum = sum?;
                Some(MonthlyTotal {
                    month: month_label(month)?.to_string(),
                    month_number: month,
                    total: round_currency(sum),
                })
            })
            .collect()
    }

    /// Product-by-month matrix for months `1..=month_window`.
    ///
    /// Every product that appears anywhere in `transactions` gets a column,
    /// with 0 for months in which it did not sell. Sales after the window
    /// are not shown here.
    pub fn product_sales_by_month(&self, transactions: &[Transaction]) -> Vec<ProductMonthlyRow> {
        let mut products: Vec<&str> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut sums: Vec<[f64; 12]> = Vec::new();

        for tx in transactions {
            let slot = *index.entry(tx.product_name.as_str()).or_insert_with(|| {
                products.push(tx.product_name.as_str());
                sums.push([0.0; 12]);
                products.len() - 1
            });
            if let Some(idx) = month_index(tx) {
                sums[slot][idx] += tx.total_price;
            }
        }

        (1..=self.month_window)
            .filter_map(|month| {
                let label = month_label(month)?;
                let column = (month - 1) as usize;
                Some(ProductMonthlyRow {
                    month: label.to_string(),
                    month_number: month,
                    products: products
                        .iter()
                        .zip(&sums)
                        .map(|(product, monthly)| ProductMonthValue {
                            product: (*product).to_string(),
                            total: round_currency(monthly[column]),
                        })
                        .collect(),
                })
            })
            .collect()
    }

    /// Headline statistics for a run.
    pub fn summary_stats(
        &self,
        raw_records: usize,
        issues: &[Issue],
        transactions: &[Transaction],
        skipped: &[SkippedRecord],
    ) -> SummaryStats {
        let total: f64 = transactions.iter().map(|tx| tx.total_price).sum();
        let avg_transaction = if transactions.is_empty() {
            0
        } else {
            round_currency(total / transactions.len() as f64)
        };

        SummaryStats {
            total_sales: round_currency(total),
            total_transactions: transactions.len(),
            avg_transaction,
            total_raw_records: raw_records,
            total_issues: issues.len(),
            total_skipped: skipped.len(),
            data_quality_rate: percentage(transactions.len() as f64, raw_records as f64),
        }
    }

    /// All four views at once.
    pub fn aggregate(&self, transactions: &[Transaction]) -> Views {
        let views = Views {
            top_products: self.top_products(transactions),
            sales_by_region: self.sales_by_region(transactions),
            sales_by_month: self.sales_by_month(transactions),
            product_sales_by_month: self.product_sales_by_month(transactions),
        };
        debug!(
            "Aggregated {} transactions into {} products, {} regions, {} months",
            transactions.len(),
            views.top_products.len(),
            views.sales_by_region.len(),
            views.sales_by_month.len()
        );
        views
    }
}

/// The four aggregate views of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Views {
    pub top_products: Vec<TopProduct>,
    pub sales_by_region: Vec<RegionTotal>,
    pub sales_by_month: Vec<MonthlyTotal>,
    pub product_sales_by_month: Vec<ProductMonthlyRow>,
}

fn month_index(tx: &Transaction) -> Option<usize> {
    tx.month().map(|month| (month - 1) as usize)
}

/// Sum `total_price` per key, in first-appearance order.
fn group_totals<'a, F>(transactions: &'a [Transaction], key: F) -> Vec<(&'a str, f64)>
where
    F: Fn(&'a Transaction) -> &'a String,
{
    let (groups, _) = transactions.iter().fold(
        (Vec::<(&str, f64)>::new(), HashMap::<&str, usize>::new()),
        |(mut groups, mut index), tx| {
            let name = key(tx).as_str();
            match index.get(name).copied() {
                Some(slot) => groups[slot].1 += tx.total_price,
                None => {
                    index.insert(name, groups.len());
                    groups.push((name, tx.total_price));
                }
            }
            (groups, index)
        },
    );
    groups
}

/// Round every group and sort descending; the sort is stable.
fn ranked(groups: Vec<(&str, f64)>) -> Vec<NamedTotal> {
    let mut totals: Vec<NamedTotal> = groups
        .into_iter()
        .map(|(name, sum)| NamedTotal {
            name: name.to_string(),
            total: round_currency(sum),
        })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}
