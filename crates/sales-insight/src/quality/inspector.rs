use crate::config::DEFAULT_AMOUNT_TOLERANCE;
use crate::types::{Issue, Problem, RawRow};
use crate::utils::{coerce_amount, is_day_first_date};
use tracing::debug;

/// Read-only row checker producing [`Issue`]s.
#[derive(Debug, Clone)]
pub struct DataQualityInspector {
    amount_tolerance: f64,
}

impl Default for DataQualityInspector {
    fn default() -> Self {
        Self::new(DEFAULT_AMOUNT_TOLERANCE)
    }
}

impl DataQualityInspector {
    pub fn new(amount_tolerance: f64) -> Self {
        Self { amount_tolerance }
    }

    /// Inspect every row, returning one issue per defective row in input order.
    pub fn inspect(&self, rows: &[RawRow]) -> Vec<Issue> {
        let issues: Vec<Issue> = rows.iter().filter_map(|row| self.inspect_row(row)).collect();
        debug!(
            "Inspected {} rows, {} with problems",
            rows.len(),
            issues.len()
        );
        issues
    }

    /// Inspect a single row. `None` means the row is clean.
    pub fn inspect_row(&self, row: &RawRow) -> Option<Issue> {
        let mut problems = Vec::new();

        if row.quantity.is_empty() {
            problems.push(Problem::QuantityEmpty);
        }

        if row.total_price.is_empty() {
            problems.push(Problem::TotalPriceEmpty);
        }

        if is_day_first_date(&row.date) {
            problems.push(Problem::DayFirstDate(row.date.clone()));
        }

        if let Some(mismatch) = self.check_amounts(row) {
            problems.push(mismatch);
        }

        if problems.is_empty() {
            return None;
        }

        Some(Issue {
            line_number: row.line_number,
            transaction_id: row.transaction_id.clone(),
            product: row.product_name.clone(),
            region: row.region_name.clone(),
            problems,
        })
    }

    /// Cross-check `quantity × price_per_unit` against `total_price`.
    ///
    /// Only applies when all three amounts are positive.
    fn check_amounts(&self, row: &RawRow) -> Option<Problem> {
        let quantity = coerce_amount(&row.quantity);
        let unit_price = coerce_amount(&row.price_per_unit);
        let total = coerce_amount(&row.total_price);

        if quantity <= 0.0 || unit_price <= 0.0 || total <= 0.0 {
            return None;
        }

        let expected = quantity * unit_price;
        if (expected - total).abs() > self.amount_tolerance {
            Some(Problem::AmountMismatch {
                quantity: row.quantity.clone(),
                price_per_unit: row.price_per_unit.clone(),
                total_price: row.total_price.clone(),
            })
        } else {
            None
        }
    }
}
