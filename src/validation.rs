use chrono::NaiveDate;

use crate::error::{TrackError, TrackResult};

/// Validates that a string is not blank (empty or whitespace-only).
/// Returns the trimmed string on success.
pub fn non_blank(value: &str, field: &str) -> TrackResult<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        Err(TrackError::validation(field, "cannot be blank"))
    } else {
        Ok(trimmed)
    }
}

/// Trims an optional string, returning None if blank.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Requires an optional value to be present.
pub fn required<T>(value: Option<T>, field: &str) -> TrackResult<T> {
    value.ok_or_else(|| TrackError::validation(field, "is required"))
}

/// The four lifecycle dates of a calling, in the order they happen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleDates {
    pub called: Option<NaiveDate>,
    pub sustained: Option<NaiveDate>,
    pub set_apart: Option<NaiveDate>,
    pub released: Option<NaiveDate>,
}

/// Checks the ordering invariants between lifecycle dates. A comparison only
/// applies when both sides are present.
pub fn date_order(dates: &LifecycleDates) -> TrackResult<()> {
    if let (Some(called), Some(sustained)) = (dates.called, dates.sustained) {
        if sustained < called {
            return Err(TrackError::validation(
                "date_sustained",
                "sustained date cannot be before called date",
            ));
        }
    }
    if let (Some(sustained), Some(set_apart)) = (dates.sustained, dates.set_apart) {
        if set_apart < sustained {
            return Err(TrackError::validation(
                "date_set_apart",
                "set apart date cannot be before sustained date",
            ));
        }
    }
    if let (Some(called), Some(released)) = (dates.called, dates.released) {
        if released < called {
            return Err(TrackError::validation(
                "date_released",
                "released date cannot be before called date",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 3, day)
    }

    #[test]
    fn non_blank_trims_whitespace() {
        assert_eq!(non_blank("  Bishop  ", "title").unwrap(), "Bishop");
    }

    #[test]
    fn non_blank_rejects_whitespace_only() {
        assert!(non_blank("   ", "title").is_err());
    }

    #[test]
    fn trim_optional_returns_none_for_blank() {
        assert_eq!(trim_optional(Some("   ")), None);
        assert_eq!(trim_optional(None), None);
    }

    #[test]
    fn required_names_the_field() {
        let err = required::<NaiveDate>(None, "date_released").unwrap_err();
        assert!(err.to_string().contains("date_released"));
    }

    #[test]
    fn date_order_accepts_partial_dates() {
        let dates = LifecycleDates {
            called: None,
            sustained: d(10),
            set_apart: None,
            released: d(1),
        };
        assert!(date_order(&dates).is_ok());
    }

    #[test]
    fn date_order_rejects_set_apart_before_sustained() {
        let dates = LifecycleDates {
            called: d(1),
            sustained: d(5),
            set_apart: d(4),
            released: None,
        };
        let err = date_order(&dates).unwrap_err();
        assert!(err.to_string().starts_with("date_set_apart"));
    }

    #[test]
    fn date_order_allows_same_day() {
        let dates = LifecycleDates {
            called: d(3),
            sustained: d(3),
            set_apart: d(3),
            released: d(3),
        };
        assert!(date_order(&dates).is_ok());
    }
}
