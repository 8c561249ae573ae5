//! Version token: the scalar each node uses to advertise how much has changed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing version of a node's mastered tables.
///
/// Tokens only compare as integers. Text tokens are parsed on every path and anything that
/// does not parse is treated as unknown (`None`), never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(i64);

impl VersionToken {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parse a token stored or transmitted as text.
    pub fn parse_text(text: &str) -> Option<Self> {
        text.trim().parse::<i64>().ok().map(Self)
    }

    /// Read a token from a JSON value: integers, whole floats and numeric strings are accepted.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| whole_float(n.as_f64()?)).map(Self),
            serde_json::Value::String(s) => Self::parse_text(s),
            _ => None,
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::as_conversions,
    reason = "value is checked to be whole and within i64 range first"
)]
fn whole_float(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_and_numeric_tokens_compare_as_integers() {
        let from_text = VersionToken::from_json(&json!("10")).expect("numeric string");
        let from_number = VersionToken::from_json(&json!(9)).expect("number");
        assert!(from_text > from_number);
        // lexical comparison would say "10" < "9"
        assert_eq!(VersionToken::parse_text(" 42 "), Some(VersionToken::new(42)));
    }

    #[test]
    fn test_loose_tokens_are_unknown() {
        assert_eq!(VersionToken::from_json(&json!(null)), None);
        assert_eq!(VersionToken::from_json(&json!("")), None);
        assert_eq!(VersionToken::from_json(&json!("v3")), None);
        assert_eq!(VersionToken::from_json(&json!(3.5)), None);
        assert_eq!(VersionToken::from_json(&json!(f64::MAX)), None);
        assert_eq!(VersionToken::from_json(&json!("5.0")), None);
        assert_eq!(VersionToken::from_json(&json!(5.0)), Some(VersionToken::new(5)));
        assert_eq!(VersionToken::from_json(&json!(-2.0)), Some(VersionToken::new(-2)));
        assert_eq!(VersionToken::from_json(&json!(true)), None);
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let encoded = serde_json::to_value(VersionToken::new(7)).expect("serialize");
        assert_eq!(encoded, json!(7));
    }
}
