//! Notebook parameter declarations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name prefix marking a parameter as job configuration rather than user input
pub const RESERVED_PREFIX: &str = "hysds_";

/// Parameters in declaration order, keyed by name
pub type ParameterMap = IndexMap<String, ParameterDescriptor>;

/// One parameter declared in a notebook's `parameters` cell
///
/// `default_text` is the literal source text of the default expression, so
/// `"10GB"` keeps its quotes and `[1, 2]` stays unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Variable name
    pub name: String,
    /// Annotation or type comment; `"None"` when the declaration has neither
    pub declared_type: String,
    /// Trailing comment text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Default expression as written
    pub default_text: String,
}

impl ParameterDescriptor {
    /// Create descriptor without help text
    #[inline]
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        default_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            help: None,
            default_text: default_text.into(),
        }
    }

    /// Attach help text; empty text is dropped
    #[inline]
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        let help = help.into();
        self.help = (!help.trim().is_empty()).then_some(help);
        self
    }

    /// Whether this parameter configures the job instead of being user input
    #[inline]
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }

    /// Name with [`RESERVED_PREFIX`] removed, for reserved parameters
    #[inline]
    #[must_use]
    pub fn reserved_key(&self) -> Option<&str> {
        self.name.strip_prefix(RESERVED_PREFIX)
    }
}

/// `true` when `name` carries [`RESERVED_PREFIX`]
#[inline]
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_key_strips_prefix() {
        let p = ParameterDescriptor::new("hysds_time_limit", "int", "3600");
        assert!(p.is_reserved());
        assert_eq!(p.reserved_key(), Some("time_limit"));

        let user = ParameterDescriptor::new("granule", "str", "\"x\"");
        assert!(!user.is_reserved());
        assert_eq!(user.reserved_key(), None);
    }

    #[test]
    fn prefix_must_lead() {
        assert!(!is_reserved("my_hysds_value"));
        assert!(!is_reserved("hysds"));
    }

    #[test]
    fn blank_help_is_dropped() {
        let p = ParameterDescriptor::new("a", "int", "1").with_help("   ");
        assert_eq!(p.help, None);
        let p = ParameterDescriptor::new("a", "int", "1").with_help("count");
        assert_eq!(p.help.as_deref(), Some("count"));
    }
}
