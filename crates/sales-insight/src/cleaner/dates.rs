//! Date normalization for mixed `YYYY-MM-DD` / `DD-MM-YYYY` input.

use crate::utils::is_day_first_date;
use chrono::NaiveDate;
use std::borrow::Cow;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Rewrite a day-first date as `<year>-MM-DD`; any other value is returned as is.
///
/// The year written in a day-first date is discarded in favour of
/// `default_year`.
pub(crate) fn normalize_date_string(raw: &str, default_year: i32) -> Cow<'_, str> {
    if !is_day_first_date(raw) {
        return Cow::Borrowed(raw);
    }

    let mut parts = raw.split('-');
    let day = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();
    Cow::Owned(format!("{}-{}-{}", default_year, month, day))
}

/// Normalize and parse a raw date into a calendar date.
pub(crate) fn parse_sale_date(raw: &str, default_year: i32) -> Option<NaiveDate> {
    let normalized = normalize_date_string(raw, default_year);
    NaiveDate::parse_from_str(&normalized, ISO_DATE_FORMAT).ok()
}
