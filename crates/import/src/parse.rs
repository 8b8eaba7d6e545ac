use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Formats tried in order; day-first variants come before month-first since
/// the supported exports are European.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
];

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a European-style amount: spaces (incl. non-breaking) are thousands
/// padding, a comma is the decimal separator.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_iso() {
        assert_eq!(
            parse_date("2024-01-05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn parse_date_day_first() {
        assert_eq!(
            parse_date("05/01/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_date("05.01.2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn parse_date_invalid() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("12.50"), Decimal::from_str("12.50").ok());
    }

    #[test]
    fn parse_amount_decimal_comma() {
        assert_eq!(parse_amount("-12,50"), Decimal::from_str("-12.50").ok());
    }

    #[test]
    fn parse_amount_space_separated_thousands() {
        assert_eq!(parse_amount("1 234,56"), Decimal::from_str("1234.56").ok());
        assert_eq!(parse_amount("1\u{a0}234,56"), Decimal::from_str("1234.56").ok());
    }

    #[test]
    fn parse_amount_invalid() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }
}
