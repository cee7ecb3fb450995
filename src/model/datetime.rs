//! Date and datetime encodings used on the wire.

use chrono::{NaiveDate, NaiveDateTime};

const WIRE_DATE_FORMAT: &str = "%Y%m%d";
const ISO_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
const ISO_FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Encodes a calendar date as `YYYYMMDD`.
pub fn encode_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

/// Parses an ISO 8601 datetime with optional fractional seconds.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, ISO_SECONDS)
        .or_else(|_| NaiveDateTime::parse_from_str(value, ISO_FRACTIONAL))
}
