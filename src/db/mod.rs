pub mod schema;
pub mod unit_repo;
pub mod organization_repo;
pub mod position_repo;
pub mod member_repo;
pub mod calling_repo;
pub mod history_repo;
pub mod group_repo;

use chrono::NaiveDate;

const DB_DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn date_to_db(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DB_DATE_FORMAT).to_string())
}

pub(crate) fn date_from_db(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, DB_DATE_FORMAT).ok())
}
