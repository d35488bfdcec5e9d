//! Canonical ISO-8601 rendering of order timestamps.
//!
//! Timestamps are always written in UTC with a `Z` suffix and as many
//! fractional digits as needed, so parsing the rendered string gives back
//! the exact same instant.

use chrono::{DateTime, SecondsFormat, Utc};

/// Renders a UTC instant as an RFC 3339 / ISO-8601 string.
pub fn to_iso8601(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an RFC 3339 string with any offset and normalizes it to UTC.
pub fn from_iso8601(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Serde adapter for `#[serde(with = "common::timestamp::iso8601")]`.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_iso8601(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::from_iso8601(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_renders_utc_with_z_suffix() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(to_iso8601(&at), "2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_sub_second_precision_survives_rendering() {
        let at = Utc::now();
        assert_eq!(from_iso8601(&to_iso8601(&at)).unwrap(), at);
    }

    #[test]
    fn test_offsets_are_normalized_to_utc() {
        let parsed = from_iso8601("2024-03-01T14:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(from_iso8601("yesterday").is_err());
    }
}
