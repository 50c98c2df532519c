//! Money in minor currency units (cents).
//!
//! Parsing and solving never touch floating point; decimal text only appears at
//! the display/export boundary.

/// Largest amount a single statement figure may carry: one trillion, in cents.
///
/// Keeps sums over a statement's rows far away from `i64` overflow.
pub const MAX_MINOR_UNITS: i64 = 100_000_000_000_000;

/// Parse a statement amount token like `"12,345.67"` into cents.
///
/// Accepts an optional thousands separator (`,`) and exactly two decimals.
/// Returns `None` for anything else, including amounts above [`MAX_MINOR_UNITS`].
pub fn parse_minor_units(token: &str) -> Option<i64> {
    let token = token.trim();
    let (int_part, frac_part) = token.split_once('.')?;
    if frac_part.len() != 2 || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let groups: Vec<&str> = int_part.split(',').collect();
    let (head, tail) = groups.split_first()?;
    if head.is_empty() || head.len() > 3 && groups.len() > 1 {
        return None;
    }
    if tail.iter().any(|g| g.len() != 3) {
        return None;
    }

    let digits: String = groups.concat();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let units: i64 = digits.parse().ok()?;
    let cents: i64 = frac_part.parse().ok()?;
    units
        .checked_mul(100)?
        .checked_add(cents)
        .filter(|&minor| minor <= MAX_MINOR_UNITS)
}

/// Plain decimal form without separators, e.g. `1234567` -> `"12345.67"`.
pub fn to_decimal_string(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Display form with thousands separators, e.g. `1234567` -> `"12,345.67"`.
pub fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let units = (abs / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{:02}", abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_grouped() {
        assert_eq!(parse_minor_units("0.99"), Some(99));
        assert_eq!(parse_minor_units("150.00"), Some(15000));
        assert_eq!(parse_minor_units("1,234.56"), Some(123456));
        assert_eq!(parse_minor_units("41,830.83"), Some(4183083));
        assert_eq!(parse_minor_units("1,000,000.01"), Some(100000001));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_minor_units("12"), None);
        assert_eq!(parse_minor_units("12.5"), None);
        assert_eq!(parse_minor_units("1,23.00"), None);
        assert_eq!(parse_minor_units("1234,567.00"), None);
        assert_eq!(parse_minor_units("abc.de"), None);
        assert_eq!(parse_minor_units(".50"), None);
    }

    #[test]
    fn test_parse_rejects_amounts_above_cap() {
        assert_eq!(
            parse_minor_units("1,000,000,000,000.00"),
            Some(MAX_MINOR_UNITS)
        );
        assert_eq!(parse_minor_units("1,000,000,000,000.01"), None);
        assert_eq!(parse_minor_units("46,116,860,184,273,879.04"), None);
        assert_eq!(parse_minor_units("99999999999999999999.00"), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_minor_units(0), "0.00");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(123456), "1,234.56");
        assert_eq!(format_minor_units(100000001), "1,000,000.01");
        assert_eq!(format_minor_units(-98765), "-987.65");
        assert_eq!(to_decimal_string(1234567), "12345.67");
        assert_eq!(to_decimal_string(-7), "-0.07");
    }
}
