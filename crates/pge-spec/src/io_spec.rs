//! hysds-io document
//!
//! Describes which parameters a job accepts from whoever submits it, and how
//! the submission UI should present them.

use crate::error::{SpecError, SpecResult};
use crate::parameter::ParameterDescriptor;
use crate::types::{map_type, CanonicalType};
use crate::value::{decode_or_text, ParameterValue};
use serde::{Deserialize, Serialize};

/// Component tag; notebook PGEs are always submitted from tosca
pub const COMPONENT: &str = "tosca";

/// How many jobs a submission creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    /// One job regardless of the query
    Individual,
    /// One job per record matched by the query
    Iteration,
}

impl SubmissionType {
    /// Exact, case-sensitive match against the two recognized values
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "individual" => Some(Self::Individual),
            "iteration" => Some(Self::Iteration),
            _ => None,
        }
    }
}

/// Where a hysds-io parameter value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    /// Entered by the job submitter
    Submitter,
}

/// One submitter-facing parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoParam {
    /// Parameter name
    pub name: String,
    /// Always [`ParamSource::Submitter`]
    #[serde(rename = "from")]
    pub source: ParamSource,
    /// UI type
    #[serde(rename = "type")]
    pub kind: CanonicalType,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Pre-filled value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParameterValue>,
}

impl IoParam {
    /// Build from a notebook parameter declaration
    #[must_use]
    pub fn from_descriptor(descriptor: &ParameterDescriptor) -> Self {
        let description = descriptor
            .help
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        let default = (!descriptor.default_text.is_empty())
            .then(|| decode_or_text(&descriptor.default_text));

        Self {
            name: descriptor.name.clone(),
            source: ParamSource::Submitter,
            kind: map_type(&descriptor.declared_type),
            description,
            default,
        }
    }
}

/// The `hysds-io.json` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoSpecDocument {
    /// `null` when the requested type was not recognized
    pub submission_type: Option<SubmissionType>,
    /// Always [`COMPONENT`]
    pub component: String,
    /// User parameters in declaration order
    pub params: Vec<IoParam>,
    /// Human-readable job label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Build the hysds-io document for a notebook's user parameters
///
/// `submission_type` is mandatory; a value other than `individual` or
/// `iteration` is accepted but emitted as `null`. Reserved parameters are
/// skipped if any slip through.
///
/// # Errors
/// Returns [`SpecError::MissingField`] when `submission_type` is absent or empty
pub fn build_io_spec(
    user_params: &[ParameterDescriptor],
    submission_type: Option<&str>,
    label: Option<&str>,
) -> SpecResult<IoSpecDocument> {
    let submission_type = submission_type
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SpecError::missing("submission_type", "hysds-io"))?;

    let recognized = SubmissionType::parse(submission_type);
    if recognized.is_none() {
        tracing::warn!(submission_type, "unrecognized submission type, emitting null");
    }

    let params = user_params
        .iter()
        .filter(|p| !p.is_reserved())
        .map(IoParam::from_descriptor)
        .collect();

    Ok(IoSpecDocument {
        submission_type: recognized,
        component: COMPONENT.to_string(),
        params,
        label: label.filter(|l| !l.is_empty()).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn user_params_in_order() {
        let params = vec![
            ParameterDescriptor::new("a", "int", "100"),
            ParameterDescriptor::new("b", "str", "\"jfksl\""),
        ];
        let doc = build_io_spec(&params, Some("individual"), None).unwrap();

        assert_eq!(
            serde_json::to_value(&doc.params).unwrap(),
            json!([
                {"name": "a", "from": "submitter", "type": "number", "default": 100},
                {"name": "b", "from": "submitter", "type": "text", "default": "jfksl"},
            ])
        );
    }

    #[test]
    fn missing_submission_type_is_an_error() {
        let err = build_io_spec(&[], None, None).unwrap_err();
        assert!(matches!(err, SpecError::MissingField { field: "submission_type", .. }));
        assert!(build_io_spec(&[], Some(""), None).is_err());
    }

    #[test]
    fn unknown_submission_type_becomes_null() {
        let doc = build_io_spec(&[], Some("batch"), None).unwrap();
        assert_eq!(doc.submission_type, None);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["submission_type"], serde_json::Value::Null);
    }

    #[test]
    fn label_only_when_non_empty() {
        let with = build_io_spec(&[], Some("iteration"), Some("My job")).unwrap();
        assert_eq!(with.label.as_deref(), Some("My job"));

        let without = build_io_spec(&[], Some("iteration"), Some("")).unwrap();
        let value = serde_json::to_value(&without).unwrap();
        assert!(value.get("label").is_none());
    }

    #[test]
    fn description_and_default_are_optional() {
        let params = vec![
            ParameterDescriptor::new("plain", "None", ""),
            ParameterDescriptor::new("helped", "bool", "true").with_help("turn it on"),
        ];
        let doc = build_io_spec(&params, Some("individual"), None).unwrap();

        assert_eq!(
            serde_json::to_value(&doc.params).unwrap(),
            json!([
                {"name": "plain", "from": "submitter", "type": "text"},
                {"name": "helped", "from": "submitter", "type": "boolean",
                 "description": "turn it on", "default": true},
            ])
        );
    }

    #[test]
    fn undecodable_default_falls_back_to_text() {
        let params = vec![ParameterDescriptor::new("region", "str", "us_west_2")];
        let doc = build_io_spec(&params, Some("individual"), None).unwrap();
        assert_eq!(doc.params[0].default, Some(ParameterValue::from("us_west_2")));
    }

    #[test]
    fn quoted_non_json_default_is_published_verbatim() {
        let params = vec![ParameterDescriptor::new("s", "str", "'abc'")];
        let doc = build_io_spec(&params, Some("individual"), None).unwrap();
        assert_eq!(doc.params[0].default, Some(ParameterValue::from("'abc'")));
    }

    #[test]
    fn reserved_params_are_filtered() {
        let params = vec![
            ParameterDescriptor::new("hysds_label", "str", "\"x\""),
            ParameterDescriptor::new("a", "int", "1"),
        ];
        let doc = build_io_spec(&params, Some("individual"), None).unwrap();
        assert_eq!(doc.params.len(), 1);
        assert_eq!(doc.params[0].name, "a");
    }

    #[test]
    fn document_key_order() {
        let doc = build_io_spec(&[], Some("individual"), Some("l")).unwrap();
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            text,
            r#"{"submission_type":"individual","component":"tosca","params":[],"label":"l"}"#
        );
    }
}
