//! Text encodings for typed record fields.
//!
//! Dates are ISO `YYYY-MM-DD`, times ISO `HH:MM:SS` (`HH:MM` is accepted on
//! read), enums use their storage names, and location lists are comma-joined
//! with entries kept verbatim.

use super::{StoreError, StoreResult};
use crate::model::activity::WhenType;
use crate::model::validation::LOCATION_SEPARATOR;
use chrono::{NaiveDate, NaiveTime};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const SHORT_TIME_FORMAT: &str = "%H:%M";

pub(super) fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(super) fn decode_date(value: &str, column: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| StoreError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(super) fn encode_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(super) fn decode_time(value: &str, column: &str) -> StoreResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, SHORT_TIME_FORMAT))
        .map_err(|_| StoreError::InvalidData(format!("invalid time `{value}` in {column}")))
}

pub(super) fn decode_when_type(value: &str, column: &str) -> StoreResult<WhenType> {
    WhenType::parse(value)
        .ok_or_else(|| StoreError::InvalidData(format!("invalid when type `{value}` in {column}")))
}

pub(super) fn encode_locations(locations: &[String]) -> String {
    let separator = LOCATION_SEPARATOR.to_string();
    locations.join(separator.as_str())
}

pub(super) fn decode_locations(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value
        .split(LOCATION_SEPARATOR)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_date, decode_locations, decode_time, encode_locations, encode_time};
    use chrono::NaiveTime;

    #[test]
    fn locations_round_trip_including_empty_list() {
        let locations = vec!["Paris".to_string(), "Lyon".to_string()];
        assert_eq!(decode_locations(&encode_locations(&locations)), locations);
        assert!(decode_locations(&encode_locations(&[])).is_empty());
    }

    #[test]
    fn locations_keep_surrounding_whitespace() {
        let locations = vec![" Paris".to_string(), "Lyon ".to_string()];
        assert_eq!(decode_locations(&encode_locations(&locations)), locations);
    }

    #[test]
    fn time_is_stored_with_whole_seconds() {
        let precise = NaiveTime::from_hms_milli_opt(9, 15, 30, 250).expect("valid time");
        assert_eq!(encode_time(precise), "09:15:30");
    }

    #[test]
    fn time_accepts_short_form() {
        let expected = NaiveTime::from_hms_opt(14, 5, 0).expect("valid time");
        let decoded =
            decode_time("14:05", "activities.specific").expect("short time should decode");
        assert_eq!(decoded, expected);
        assert_eq!(encode_time(expected), "14:05:00");
    }

    #[test]
    fn invalid_date_is_reported_with_column() {
        let err = decode_date("13/10/2025", "days.date").expect_err("decode_date should fail");
        assert!(err.to_string().contains("days.date"));
    }
}
