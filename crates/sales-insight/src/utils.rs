//! Shared helpers for the inspector, cleaner and aggregator.
//!
//! The inspector and the cleaner must agree on what counts as a number and
//! what counts as a day-first date, so both go through these functions.

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Parse a decimal number, returning `None` for empty, malformed or
/// non-finite text (`"NaN"`, `"inf"`).
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce raw text to an amount; anything unparsable becomes `0.0`.
#[inline]
pub fn coerce_amount(s: &str) -> f64 {
    parse_numeric_string(s).unwrap_or(0.0)
}

/// Round a currency sum to whole units.
#[inline]
pub fn round_currency(value: f64) -> i64 {
    value.round() as i64
}

/// Round to one decimal place, e.g. for percentages.
#[inline]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage `part / whole × 100` to one decimal, 0.0 when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round_one_decimal(part / whole * 100.0)
    }
}

// =============================================================================
// Date Utilities
// =============================================================================

/// Whether a date looks like `DD-MM-YYYY`: it contains a `-` and its
/// first group is at most two characters wide.
///
/// This is a width heuristic, not date validation.
pub fn is_day_first_date(date: &str) -> bool {
    date.contains('-')
        && date
            .split('-')
            .next()
            .is_some_and(|first| first.chars().count() <= 2)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string(" 3.0 "), Some(3.0));
        assert_eq!(parse_numeric_string("1370361.0"), Some(1_370_361.0));
        assert_eq!(parse_numeric_string("-100"), Some(-100.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
        assert_eq!(parse_numeric_string("inf"), None);
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount("5.0"), 5.0);
        assert_eq!(coerce_amount(""), 0.0);
        assert_eq!(coerce_amount("n/a"), 0.0);
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(1_370_361.4), 1_370_361);
        assert_eq!(round_currency(2.5), 3);
        assert_eq!(round_currency(0.0), 0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1.0, 3.0), 33.3);
        assert_eq!(percentage(2.0, 3.0), 66.7);
        assert_eq!(percentage(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_is_day_first_date() {
        assert!(is_day_first_date("27-01-2024"));
        assert!(is_day_first_date("1-6-2024"));
        assert!(!is_day_first_date("2024-06-22"));
        assert!(!is_day_first_date(""));
        assert!(!is_day_first_date("12"));
    }
}
