//! hysds-io parameter types
//!
//! The hysds-io format only understands a fixed set of type tags. Notebook
//! annotations are free-form, so [`map_type`] folds them onto that set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical hysds-io type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    /// Free text
    Text,
    /// Real number
    Number,
    /// ISO date
    Date,
    /// `YYYY-MM-DDTHH:mm:SS.SSS`
    DateTime,
    /// Drop-down of true / false
    Boolean,
    /// E-mail address
    Email,
    /// Text shown in a larger box
    TextArea,
    /// JSON list
    List,
    /// JSON object
    Dict,
}

impl CanonicalType {
    /// All tags, in declaration order
    pub const ALL: [CanonicalType; 9] = [
        Self::Text,
        Self::Number,
        Self::Date,
        Self::DateTime,
        Self::Boolean,
        Self::Email,
        Self::TextArea,
        Self::List,
        Self::Dict,
    ];

    /// Tag as written in hysds-io
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Boolean => "boolean",
            Self::Email => "email",
            Self::TextArea => "textarea",
            Self::List => "list",
            Self::Dict => "dict",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for [`CanonicalType::from_str`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hysds-io type tag: '{0}'")]
pub struct UnknownTypeTag(pub String);

impl FromStr for CanonicalType {
    type Err = UnknownTypeTag;

    /// Strict parse of a canonical tag name (no synonyms)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTypeTag(s.to_string()))
    }
}

/// Map a notebook type token onto a hysds-io tag
///
/// Case-insensitive, whitespace-trimmed. Unknown tokens (including papermill's
/// `"None"` for unannotated parameters) map to [`CanonicalType::Text`].
#[must_use]
pub fn map_type(token: &str) -> CanonicalType {
    match token.trim().to_lowercase().as_str() {
        "str" | "string" | "text" => CanonicalType::Text,
        "float" | "num" | "int" | "integer" => CanonicalType::Number,
        "date" => CanonicalType::Date,
        "date_time" | "datetime" => CanonicalType::DateTime,
        "bool" | "boolean" => CanonicalType::Boolean,
        "email" => CanonicalType::Email,
        "textarea" => CanonicalType::TextArea,
        "list" | "array" | "arr" => CanonicalType::List,
        "dict" | "obj" | "object" => CanonicalType::Dict,
        _ => CanonicalType::Text,
    }
}
