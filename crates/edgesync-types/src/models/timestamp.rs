//! Canonical text form for date/time values on the wire and in the store.
//!
//! Values are written as `YYYY-MM-DDTHH:MM:SS` with fractional seconds only when non-zero.
//! Parsing also accepts a space separator, which is what SQL `CURRENT_TIMESTAMP` produces.

use chrono::NaiveDateTime;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const SQL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn format(value: &NaiveDateTime) -> String {
    value.format(ISO_FORMAT).to_string()
}

pub fn parse(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, ISO_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, SQL_FORMAT))
}

/// serde adapter for `Option<NaiveDateTime>` fields.
pub mod option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse(text).map(Some).map_err(serde::de::Error::custom),
        }
    }
}
