use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Input schema
// ============================================================================

/// Columns of the fixed sales CSV schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SalesColumn {
    TransactionId,
    ProductId,
    ProductName,
    RegionId,
    RegionName,
    Date,
    Quantity,
    PricePerUnit,
    TotalPrice,
}

impl SalesColumn {
    /// Number of schema columns.
    pub const COUNT: usize = 9;

    /// All schema columns, in canonical header order.
    pub const ALL: [SalesColumn; Self::COUNT] = [
        SalesColumn::TransactionId,
        SalesColumn::ProductId,
        SalesColumn::ProductName,
        SalesColumn::RegionId,
        SalesColumn::RegionName,
        SalesColumn::Date,
        SalesColumn::Quantity,
        SalesColumn::PricePerUnit,
        SalesColumn::TotalPrice,
    ];

    /// Header name as it appears in the CSV.
    pub fn header(&self) -> &'static str {
        match self {
            Self::TransactionId => "transaction_id",
            Self::ProductId => "product_id",
            Self::ProductName => "product_name",
            Self::RegionId => "region_id",
            Self::RegionName => "region_name",
            Self::Date => "date",
            Self::Quantity => "quantity",
            Self::PricePerUnit => "price_per_unit",
            Self::TotalPrice => "total_price",
        }
    }
}

/// One CSV data line, every field still as raw (trimmed) text.
///
/// Absent trailing values are empty strings. Nothing here has been
/// validated; see [`Transaction`] for the cleaned form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRow {
    /// 1-based line number (the header is line 1).
    pub line_number: usize,
    pub transaction_id: String,
    pub product_id: String,
    pub product_name: String,
    pub region_id: String,
    pub region_name: String,
    pub date: String,
    pub quantity: String,
    pub price_per_unit: String,
    pub total_price: String,
}

impl RawRow {
    /// Raw value of a schema column.
    pub fn field(&self, column: SalesColumn) -> &str {
        match column {
            SalesColumn::TransactionId => &self.transaction_id,
            SalesColumn::ProductId => &self.product_id,
            SalesColumn::ProductName => &self.product_name,
            SalesColumn::RegionId => &self.region_id,
            SalesColumn::RegionName => &self.region_name,
            SalesColumn::Date => &self.date,
            SalesColumn::Quantity => &self.quantity,
            SalesColumn::PricePerUnit => &self.price_per_unit,
            SalesColumn::TotalPrice => &self.total_price,
        }
    }

    pub(crate) fn field_mut(&mut self, column: SalesColumn) -> &mut String {
        match column {
            SalesColumn::TransactionId => &mut self.transaction_id,
            SalesColumn::ProductId => &mut self.product_id,
            SalesColumn::ProductName => &mut self.product_name,
            SalesColumn::RegionId => &mut self.region_id,
            SalesColumn::RegionName => &mut self.region_name,
            SalesColumn::Date => &mut self.date,
            SalesColumn::Quantity => &mut self.quantity,
            SalesColumn::PricePerUnit => &mut self.price_per_unit,
            SalesColumn::TotalPrice => &mut self.total_price,
        }
    }
}

// ============================================================================
// Data quality diagnostics
// ============================================================================

/// A single defect found in a raw row.
#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    QuantityEmpty,
    TotalPriceEmpty,
    /// Date written day-first (`DD-MM-YYYY`); holds the literal value.
    DayFirstDate(String),
    /// `quantity × price_per_unit` disagrees with `total_price`.
    AmountMismatch {
        quantity: String,
        price_per_unit: String,
        total_price: String,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuantityEmpty => write!(f, "quantity empty"),
            Self::TotalPriceEmpty => write!(f, "total_price empty"),
            Self::DayFirstDate(date) => write!(f, "DD-MM-YYYY date format: \"{}\"", date),
            Self::AmountMismatch {
                quantity,
                price_per_unit,
                total_price,
            } => write!(
                f,
                "possible calculation error ({} × {} ≠ {})",
                quantity, price_per_unit, total_price
            ),
        }
    }
}

impl Serialize for Problem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// All problems found in one raw row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub line_number: usize,
    pub transaction_id: String,
    pub product: String,
    pub region: String,
    /// In detection order: quantity, total_price, date, arithmetic.
    pub problems: Vec<Problem>,
}

// ============================================================================
// Cleaned records
// ============================================================================

/// A cleaned sales transaction.
///
/// `quantity` and `total_price` are never zero. `date` is `None` when the
/// normalized text is not a calendar date; such transactions count towards
/// every total except the monthly views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub product_id: String,
    pub product_name: String,
    pub region_id: String,
    pub region_name: String,
    pub date: Option<NaiveDate>,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

impl Transaction {
    /// Calendar month, 1 through 12.
    pub fn month(&self) -> Option<u32> {
        self.date.map(|date| date.month())
    }
}

/// Why a raw row was left out of the transaction set.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Quantity or total price is zero after coercion (empty or unparsable).
    IncompleteData,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteData => {
                write!(f, "incomplete data (quantity or total_price empty)")
            }
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub line_number: usize,
    pub transaction_id: String,
    pub reason: SkipReason,
}

// ============================================================================
// Aggregate views
// ============================================================================

/// A group name with its rounded revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedTotal {
    pub name: String,
    pub total: i64,
}

pub type TopProduct = NamedTotal;
pub type RegionTotal = NamedTotal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    /// Short month label, e.g. "Mei".
    pub month: String,
    #[serde(skip)]
    pub month_number: u32,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductMonthValue {
    pub product: String,
    pub total: i64,
}

/// Key of the month label in a flat product-by-month row.
pub const MONTH_KEY: &str = "month";

/// One month of the product-by-month matrix.
///
/// Serializes flat, as `{"month": "Jan", "<product>": <total>, ...}`,
/// which is the row shape chart widgets consume. Product keys come from
/// [`ProductMonthlyRow::product_keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductMonthlyRow {
    pub month: String,
    pub month_number: u32,
    pub products: Vec<ProductMonthValue>,
}

impl ProductMonthlyRow {
    /// Rounded revenue of `product` in this month, if it is a column.
    pub fn total_for(&self, product: &str) -> Option<i64> {
        self.products
            .iter()
            .find(|value| value.product == product)
            .map(|value| value.total)
    }

    /// Column keys for `products`, in order.
    ///
    /// Product names are free text, so a name equal to [`MONTH_KEY`] or to
    /// an earlier key gets a numeric suffix (`month_2`, `month_3`, ...).
    pub fn product_keys(&self) -> Vec<String> {
        let mut taken: HashSet<String> = HashSet::from([MONTH_KEY.to_string()]);
        self.products
            .iter()
            .map(|value| {
                let mut key = value.product.clone();
                let mut suffix = 2;
                while taken.contains(&key) {
                    key = format!("{}_{}", value.product, suffix);
                    suffix += 1;
                }
                taken.insert(key.clone());
                key
            })
            .collect()
    }
}

impl Serialize for ProductMonthlyRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.products.len() + 1))?;
        map.serialize_entry(MONTH_KEY, &self.month)?;
        for (key, value) in self.product_keys().iter().zip(&self.products) {
            map.serialize_entry(key, &value.total)?;
        }
        map.end()
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Rounded sum of all cleaned totals.
    pub total_sales: i64,
    pub total_transactions: usize,
    /// Rounded mean transaction value (0 when there are no transactions).
    pub avg_transaction: i64,
    pub total_raw_records: usize,
    pub total_issues: usize,
    pub total_skipped: usize,
    /// Cleaned / raw × 100, one decimal place.
    pub data_quality_rate: f64,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub transactions: Vec<Transaction>,
    pub issues: Vec<Issue>,
    pub skipped: Vec<SkippedRecord>,
    pub top_products: Vec<TopProduct>,
    pub sales_by_region: Vec<RegionTotal>,
    pub sales_by_month: Vec<MonthlyTotal>,
    pub product_sales_by_month: Vec<ProductMonthlyRow>,
    pub stats: SummaryStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_descriptions() {
        assert_eq!(Problem::QuantityEmpty.to_string(), "quantity empty");
        assert_eq!(Problem::TotalPriceEmpty.to_string(), "total_price empty");
        assert_eq!(
            Problem::DayFirstDate("27-01-2024".into()).to_string(),
            "DD-MM-YYYY date format: \"27-01-2024\""
        );
        let mismatch = Problem::AmountMismatch {
            quantity: "2".into(),
            price_per_unit: "100".into(),
            total_price: "500".into(),
        };
        assert_eq!(mismatch.to_string(), "possible calculation error (2 × 100 ≠ 500)");
    }

    #[test]
    fn test_issue_serializes_problems_as_text() {
        let issue = Issue {
            line_number: 3,
            transaction_id: "T4257".into(),
            product: "Blender".into(),
            region: "Makassar".into(),
            problems: vec![Problem::QuantityEmpty],
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["problems"][0], "quantity empty");
        assert_eq!(json["line_number"], 3);
    }

    #[test]
    fn test_product_monthly_row_serializes_flat() {
        let row = ProductMonthlyRow {
            month: "Jan".into(),
            month_number: 1,
            products: vec![
                ProductMonthValue { product: "Blender".into(), total: 10 },
                ProductMonthValue { product: "Rice Cooker".into(), total: 0 },
            ],
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["month"], "Jan");
        assert_eq!(json["Blender"], 10);
        assert_eq!(json["Rice Cooker"], 0);
        assert_eq!(row.total_for("Blender"), Some(10));
        assert_eq!(row.total_for("Kettle"), None);
    }

    #[test]
    fn test_product_named_month_keeps_label() {
        let row = ProductMonthlyRow {
            month: "Jan".into(),
            month_number: 1,
            products: vec![
                ProductMonthValue { product: "Blender".into(), total: 0 },
                ProductMonthValue { product: "month".into(), total: 100 },
                ProductMonthValue { product: "month_2".into(), total: 7 },
            ],
        };

        assert_eq!(row.product_keys(), vec!["Blender", "month_2", "month_2_2"]);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["month"], "Jan");
        assert_eq!(json["month_2"], 100);
        assert_eq!(json["month_2_2"], 7);
        assert_eq!(json.as_object().map(|o| o.len()), Some(4));
    }

    #[test]
    fn test_raw_row_field_access() {
        let mut row = RawRow::default();
        *row.field_mut(SalesColumn::Quantity) = "3.0".into();
        assert_eq!(row.field(SalesColumn::Quantity), "3.0");
        assert_eq!(row.quantity, "3.0");
        assert_eq!(row.field(SalesColumn::Date), "");
    }

    #[test]
    fn test_skip_reason_text() {
        assert_eq!(
            SkipReason::IncompleteData.to_string(),
            "incomplete data (quantity or total_price empty)"
        );
    }
}
