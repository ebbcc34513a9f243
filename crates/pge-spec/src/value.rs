//! Decoded parameter defaults
//!
//! Notebook defaults arrive as source text. [`decode_default`] turns that text
//! into a [`ParameterValue`] for job configuration, stripping Python quotes
//! from non-JSON strings. [`decode_or_text`] keeps non-JSON text verbatim and
//! feeds the submitter-facing defaults.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// A parameter default after best-effort decoding
///
/// Serializes to the matching JSON value. Map entries keep the order in which
/// they appeared in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// JSON `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer or float, as written
    Number(Number),
    /// Text
    String(String),
    /// Ordered sequence
    List(Vec<ParameterValue>),
    /// Ordered mapping
    Map(IndexMap<String, ParameterValue>),
}

impl ParameterValue {
    /// Strict JSON decode
    ///
    /// # Errors
    /// Returns the parser error when `text` is not a single JSON value
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Value>(text).map(Self::from)
    }

    /// String content, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative integer content
    ///
    /// Numeric strings such as `"600"` and integral floats such as `3600.0`
    /// are accepted as well.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_u64)),
            Self::String(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| s.parse::<f64>().ok().and_then(whole_u64))
            }
            _ => None,
        }
    }

    /// `true` for [`ParameterValue::Null`]
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text form used when a value is placed into a string field
    ///
    /// Strings are returned as is; everything else as compact JSON.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Value> for ParameterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<ParameterValue> for Value {
    fn from(value: ParameterValue) -> Self {
        match value {
            ParameterValue::Null => Value::Null,
            ParameterValue::Bool(b) => Value::Bool(b),
            ParameterValue::Number(n) => Value::Number(n),
            ParameterValue::String(s) => Value::String(s),
            ParameterValue::List(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            ParameterValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<u64> for ParameterValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for ParameterValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for ParameterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Best-effort decode of a default's source text
///
/// 1. JSON, if the whole text is one JSON value.
/// 2. The inner text, if the text is wrapped in a matching `'…'` or `"…"` pair
///    (Python single-quoted literals land here).
/// 3. The raw text, unmodified.
///
/// Never fails. Fallbacks are logged at `warn`.
#[must_use]
pub fn decode_default(text: &str) -> ParameterValue {
    match ParameterValue::decode(text) {
        Ok(value) => value,
        Err(err) => {
            let fallback = strip_quote_pair(text.trim()).unwrap_or(text);
            tracing::warn!(
                default = text,
                error = %err,
                "default is not valid JSON, keeping it as text"
            );
            ParameterValue::String(fallback.to_string())
        }
    }
}

/// Decode a default's source text, keeping the text verbatim when it is not JSON
///
/// Used for hysds-io defaults, so `'abc'` is published as `'abc'`.
#[must_use]
pub fn decode_or_text(text: &str) -> ParameterValue {
    ParameterValue::decode(text).unwrap_or_else(|err| {
        tracing::warn!(default = text, error = %err, "default is not valid JSON, keeping raw text");
        ParameterValue::String(text.to_string())
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn whole_u64(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

fn strip_quote_pair(text: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        text.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_fallback_keeps_quotes() {
        assert_eq!(decode_or_text("'abc'"), ParameterValue::from("'abc'"));
        assert_eq!(decode_or_text("some_token"), ParameterValue::from("some_token"));
        assert_eq!(decode_or_text("[1, 2]"), ParameterValue::from(vec![1u64, 2]));
    }

    #[test]
    fn decodes_json_scalars() {
        assert_eq!(decode_default("3600"), ParameterValue::from(3600u64));
        assert_eq!(decode_default("\"10GB\""), ParameterValue::from("10GB"));
        assert_eq!(decode_default("true"), ParameterValue::Bool(true));
        assert_eq!(decode_default("null"), ParameterValue::Null);
    }

    #[test]
    fn decodes_nested_json_in_order() {
        let value = decode_default(r#"{"z": [1, 2, 3], "a": {"k": "v"}}"#);
        let ParameterValue::Map(map) = value else {
            panic!("expected map");
        };
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(map["z"], ParameterValue::from(vec![1u64, 2, 3]));
    }

    #[test]
    fn single_quoted_literal_loses_its_quotes() {
        assert_eq!(decode_default("'iteration'"), ParameterValue::from("iteration"));
    }

    #[test]
    fn bare_token_is_kept_verbatim() {
        assert_eq!(decode_default("jfksl"), ParameterValue::from("jfksl"));
        assert_eq!(decode_default("None"), ParameterValue::from("None"));
    }

    #[test]
    fn mismatched_quotes_are_not_trimmed() {
        assert_eq!(decode_default("'abc\""), ParameterValue::from("'abc\""));
        assert_eq!(decode_default("x"), ParameterValue::from("x"));
    }

    #[test]
    fn float_survives_round_trip() {
        let value = decode_default("0.25");
        assert_eq!(value.to_string(), "0.25");
        assert_eq!(value.as_u64(), None);
    }

    #[test]
    fn numeric_string_reads_as_integer() {
        assert_eq!(ParameterValue::from("600").as_u64(), Some(600));
        assert_eq!(ParameterValue::from(-1i64).as_u64(), None);
    }

    #[test]
    fn to_text_keeps_strings_plain() {
        assert_eq!(ParameterValue::from("tosca").to_text(), "tosca");
        assert_eq!(ParameterValue::from(vec!["a", "b"]).to_text(), r#"["a","b"]"#);
    }
}
