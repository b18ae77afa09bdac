//! Data cleaning module for raw sales rows.
//!
//! This module provides functionality for:
//! - Normalizing day-first dates to `YYYY-MM-DD`
//! - Coercing amount fields to numbers
//! - Rejecting rows whose quantity or total price is zero or missing
//!
//! Every input row ends up either as a [`Transaction`] or as a
//! [`SkippedRecord`], never both and never neither. A date that does not
//! parse does not reject the row; the transaction is kept undated.

mod dates;

use crate::config::DEFAULT_YEAR;
use crate::types::{RawRow, SkipReason, SkippedRecord, Transaction};
use crate::utils::coerce_amount;
use serde::Serialize;
use tracing::{debug, info};

/// Result of cleaning a batch of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanOutcome {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRecord>,
}

impl CleanOutcome {
    /// Number of rows that went in.
    pub fn total_rows(&self) -> usize {
        self.transactions.len() + self.skipped.len()
    }
}

/// Outcome for a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Clean(Transaction),
    Skipped(SkippedRecord),
}

/// Turns raw rows into validated transactions.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    default_year: i32,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_YEAR)
    }
}

impl DataCleaner {
    /// `default_year` is assigned to dates written as `DD-MM-YYYY`.
    pub fn new(default_year: i32) -> Self {
        Self { default_year }
    }

    /// Clean every row, preserving input order in both outputs.
    pub fn clean(&self, rows: &[RawRow]) -> CleanOutcome {
        let outcome = rows
            .iter()
            .map(|row| self.clean_row(row))
            .fold(CleanOutcome::default(), |mut acc, outcome| {
                match outcome {
                    RowOutcome::Clean(tx) => acc.transactions.push(tx),
                    RowOutcome::Skipped(record) => acc.skipped.push(record),
                }
                acc
            });

        info!(
            "Cleaned {} rows: {} transactions, {} skipped",
            rows.len(),
            outcome.transactions.len(),
            outcome.skipped.len()
        );
        outcome
    }

    /// Clean a single row.
    pub fn clean_row(&self, row: &RawRow) -> RowOutcome {
        let quantity = coerce_amount(&row.quantity);
        let unit_price = coerce_amount(&row.price_per_unit);
        let total_price = coerce_amount(&row.total_price);

        if quantity == 0.0 || total_price == 0.0 {
            return self.skip(row, SkipReason::IncompleteData);
        }

        let date = dates::parse_sale_date(&row.date, self.default_year);
        if date.is_none() {
            debug!(
                "Line {} ({}): unreadable date \"{}\", kept without month",
                row.line_number, row.transaction_id, row.date
            );
        }

        RowOutcome::Clean(Transaction {
            transaction_id: row.transaction_id.clone(),
            product_id: row.product_id.clone(),
            product_name: row.product_name.clone(),
            region_id: row.region_id.clone(),
            region_name: row.region_name.clone(),
            date,
            quantity,
            unit_price,
            total_price,
        })
    }

    fn skip(&self, row: &RawRow, reason: SkipReason) -> RowOutcome {
        debug!(
            "Skipping line {} ({}): {}",
            row.line_number, row.transaction_id, reason
        );
        RowOutcome::Skipped(SkippedRecord {
            line_number: row.line_number,
            transaction_id: row.transaction_id.clone(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn row(id: &str, date: &str, quantity: &str, price: &str, total: &str) -> RawRow {
        RawRow {
            line_number: 2,
            transaction_id: id.into(),
            product_id: "P004".into(),
            product_name: "Air Purifier".into(),
            region_id: "R03".into(),
            region_name: "Surabaya".into(),
            date: date.into(),
            quantity: quantity.into(),
            price_per_unit: price.into(),
            total_price: total.into(),
        }
    }

    #[test]
    fn test_clean_row_builds_transaction() {
        let cleaner = DataCleaner::default();
        let outcome = cleaner.clean_row(&row("T2584", "27-01-2024", "3.0", "363032", "1089096.0"));

        assert_eq!(
            outcome,
            RowOutcome::Clean(Transaction {
                transaction_id: "T2584".into(),
                product_id: "P004".into(),
                product_name: "Air Purifier".into(),
                region_id: "R03".into(),
                region_name: "Surabaya".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 27),
                quantity: 3.0,
                unit_price: 363_032.0,
                total_price: 1_089_096.0,
            })
        );
    }

    #[test]
    fn test_empty_quantity_is_skipped() {
        let cleaner = DataCleaner::default();
        let outcome = cleaner.clean_row(&row("T1", "2024-05-09", "", "233326", "1000"));

        assert_eq!(
            outcome,
            RowOutcome::Skipped(SkippedRecord {
                line_number: 2,
                transaction_id: "T1".into(),
                reason: SkipReason::IncompleteData,
            })
        );
    }

    #[test]
    fn test_unparsable_total_treated_as_empty() {
        let cleaner = DataCleaner::default();
        let outcome = cleaner.clean_row(&row("T1", "2024-05-09", "2", "10", "twenty"));
        assert!(matches!(
            outcome,
            RowOutcome::Skipped(SkippedRecord { reason: SkipReason::IncompleteData, .. })
        ));
    }

    #[test]
    fn test_negative_amount_is_kept() {
        let cleaner = DataCleaner::default();
        match cleaner.clean_row(&row("T1", "2024-05-09", "-2", "10", "-20")) {
            RowOutcome::Clean(tx) => {
                assert_eq!(tx.quantity, -2.0);
                assert_eq!(tx.total_price, -20.0);
            }
            other => panic!("expected clean transaction, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_date_kept_undated() {
        let cleaner = DataCleaner::default();
        for date in ["", "not-a-date", "2024-02-30"] {
            match cleaner.clean_row(&row("T2", date, "2", "100", "200")) {
                RowOutcome::Clean(tx) => {
                    assert_eq!(tx.date, None);
                    assert_eq!(tx.month(), None);
                    assert_eq!(tx.total_price, 200.0);
                }
                other => panic!("expected clean transaction for {date:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_price_does_not_reject() {
        let cleaner = DataCleaner::default();
        let outcome = cleaner.clean_row(&row("T1", "2024-05-09", "2", "", "20"));
        match outcome {
            RowOutcome::Clean(tx) => assert_eq!(tx.unit_price, 0.0),
            other => panic!("expected clean transaction, got {other:?}"),
        }
    }

    #[test]
    fn test_clean_conserves_rows_and_order() {
        let cleaner = DataCleaner::new(2024);
        let rows = vec![
            row("A", "2024-01-01", "1", "10", "10"),
            row("B", "2024-01-02", "", "10", "10"),
            row("C", "03-01-2024", "1", "10", "10"),
            row("D", "2024-01-04", "1", "10", ""),
            row("E", "2024-01-05", "1", "10", "10"),
        ];

        let outcome = cleaner.clean(&rows);
        assert_eq!(outcome.total_rows(), rows.len());

        let kept: Vec<&str> = outcome
            .transactions
            .iter()
            .map(|t| t.transaction_id.as_str())
            .collect();
        let skipped: Vec<&str> = outcome
            .skipped
            .iter()
            .map(|s| s.transaction_id.as_str())
            .collect();
        assert_eq!(kept, vec!["A", "C", "E"]);
        assert_eq!(skipped, vec!["B", "D"]);
        assert_eq!(cleaner.clean(&rows), outcome);
    }
}
