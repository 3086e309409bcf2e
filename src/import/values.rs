use chrono::{Datelike, NaiveDate};

const SHEET_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d"];

/// Cell values that mean "nobody" in a name column.
const PLACEHOLDERS: &[&str] = &["n/a", "vacant"];

/// Parses a spreadsheet date. Anything unrecognized, including two-digit
/// years, yields `None`.
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    SHEET_DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .find(|date| date.year() >= 1000)
}

pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    PLACEHOLDERS.iter().any(|p| value.eq_ignore_ascii_case(p))
}

/// A digit together with a date separator. Used to reject date values that
/// drifted into a name column.
pub fn looks_like_date(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit()) && value.contains(['/', '-'])
}

pub fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
