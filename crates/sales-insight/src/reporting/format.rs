//! Rupiah amounts in dashboard notation.

/// Format an amount using the Indonesian scale words.
///
/// - `>= 1,000,000` → `"<x> Juta"` with `decimals` places
/// - `>= 1,000` → `"<x> Ribu"`, whole thousands
/// - otherwise the rounded integer
pub fn format_rupiah(value: f64, decimals: usize) -> String {
    if value >= 1_000_000.0 {
        format!("{:.*} Juta", decimals, value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{} Ribu", (value / 1_000.0).round() as i64)
    } else {
        format!("{}", value.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(4_200_000.0, 1), "4.2 Juta");
        assert_eq!(format_rupiah(297_131_263.0, 1), "297.1 Juta");
        assert_eq!(format_rupiah(1_000_000.0, 2), "1.00 Juta");
        assert_eq!(format_rupiah(1_651_840.0, 0), "2 Juta");
        assert_eq!(format_rupiah(999_999.0, 1), "1000 Ribu");
        assert_eq!(format_rupiah(1_234.0, 1), "1 Ribu");
        assert_eq!(format_rupiah(987.0, 1), "987");
        assert_eq!(format_rupiah(0.0, 1), "0");
    }
}
