//! CSV parsing for the fixed sales schema.
//!
//! The format is deliberately simple: comma separated, no quoting, one
//! record per line, header first. Blank lines are ignored and do not
//! count towards line numbers.
//!
//! ```rust,ignore
//! use sales_insight::parser::CsvParser;
//!
//! let rows: Vec<_> = CsvParser::parse(&text)?.collect();
//! assert_eq!(rows[0].line_number, 2);
//! ```

use crate::error::{PipelineError, Result};
use crate::types::{RawRow, SalesColumn};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use tracing::{debug, warn};

/// Position of every schema column within the header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    positions: [usize; SalesColumn::COUNT],
    width: usize,
}

impl HeaderLayout {
    /// Resolve schema columns against a header record.
    ///
    /// Column order is free and unknown columns are ignored. When a name
    /// appears more than once the last occurrence wins. Fails with
    /// [`PipelineError::MissingColumns`] if any schema column is absent.
    pub fn from_record(header: &StringRecord) -> Result<Self> {
        let mut positions = [0usize; SalesColumn::COUNT];
        let mut missing = Vec::new();

        for (slot, column) in positions.iter_mut().zip(SalesColumn::ALL) {
            match header.iter().enumerate().filter(|(_, h)| *h == column.header()).map(|(i, _)| i).last() {
                Some(idx) => *slot = idx,
                None => missing.push(column.header().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(PipelineError::MissingColumns(missing));
        }

        Ok(Self {
            positions,
            width: header.len(),
        })
    }

    /// Number of columns in the header.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Zip one data record against the header.
    ///
    /// Missing trailing values become empty strings, extra values are dropped.
    pub fn read_record(&self, record: &StringRecord, line_number: usize) -> RawRow {
        let mut row = RawRow {
            line_number,
            ..RawRow::default()
        };
        for (column, &idx) in SalesColumn::ALL.iter().zip(self.positions.iter()) {
            if let Some(value) = record.get(idx) {
                row.field_mut(*column).push_str(value);
            }
        }
        row
    }
}

/// Parser entry point.
pub struct CsvParser;

impl CsvParser {
    /// Start parsing `text`.
    ///
    /// The header is read and validated eagerly; data records are parsed
    /// lazily as the returned iterator is consumed.
    pub fn parse(text: &str) -> Result<RawRows<'_>> {
        let mut records = ReaderBuilder::new()
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes())
            .into_records();

        let header = next_non_blank(&mut records).ok_or(PipelineError::EmptyInput)??;
        let layout = HeaderLayout::from_record(&header)?;
        debug!("Header resolved with {} columns", layout.width());

        Ok(RawRows {
            records,
            layout,
            line_number: 1,
        })
    }
}

/// Lazy, single-pass sequence of [`RawRow`]s.
///
/// Consumed once per run; parsing again requires the source text.
pub struct RawRows<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    layout: HeaderLayout,
    line_number: usize,
}

impl Iterator for RawRows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        loop {
            let record = next_non_blank(&mut self.records)?;
            self.line_number += 1;
            match record {
                Ok(record) => return Some(self.layout.read_record(&record, self.line_number)),
                Err(e) => warn!("Skipping unreadable line {}: {}", self.line_number, e),
            }
        }
    }
}

/// Whitespace-only lines come through as a single empty field.
fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.get(0).is_none_or(str::is_empty)
}

fn next_non_blank(
    records: &mut StringRecordsIntoIter<&[u8]>,
) -> Option<csv::Result<StringRecord>> {
    records.find(|record| !matches!(record, Ok(r) if is_blank(r)))
}
