// Utility helpers for parsing, cleaning and formatting numbers.
//
// Source files come from public data exports, so the loaders hand every
// cell through here and only deal with typed values afterwards.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for blanks, garbage and non-finite values (`NaN`, `inf`).
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer parse that also accepts integral floats such as `"43506.0"`,
/// which spreadsheet round-trips tend to produce for id columns.
pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = parse_f64_safe(Some(s))?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Replace a negative value with zero. The flag tells the caller whether
/// anything was changed so it can be counted.
pub fn clamp_non_negative(v: f64) -> (f64, bool) {
    if v < 0.0 {
        (0.0, true)
    } else {
        (v, false)
    }
}

pub fn clamp_non_negative_i64(v: i64) -> (i64, bool) {
    if v < 0 {
        (0, true)
    } else {
        (v, false)
    }
}

/// Percentage `part / whole * 100`, defined as zero when `whole` is zero.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let p = part / whole * 100.0;
    if p.is_finite() {
        p
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forgiving_floats() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("-0.25")), Some(-0.25));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parses_integral_ids() {
        assert_eq!(parse_i64_safe(Some("43506")), Some(43506));
        assert_eq!(parse_i64_safe(Some("43506.0")), Some(43506));
        assert_eq!(parse_i64_safe(Some("43506.5")), None);
        assert_eq!(parse_i64_safe(Some(" ")), None);
    }

    #[test]
    fn clamps_negatives_only() {
        assert_eq!(clamp_non_negative(-4.0), (0.0, true));
        assert_eq!(clamp_non_negative(3.0), (3.0, false));
        assert_eq!(clamp_non_negative_i64(-1), (0, true));
    }

    #[test]
    fn percent_guards_zero_denominator() {
        assert_eq!(percent(10.0, 0.0), 0.0);
        assert!((percent(25.0, 200.0) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
