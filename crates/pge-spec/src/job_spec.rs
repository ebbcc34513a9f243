//! job-spec document
//!
//! Tells the scheduler how to run a notebook PGE: the command line, resource
//! limits, queue routing and which hysds-io parameters land in `_context.json`.

use crate::error::{SpecError, SpecResult};
use crate::parameter::ParameterDescriptor;
use crate::reserved::SystemSpecSet;
use crate::value::ParameterValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard time limit when the notebook sets none (seconds)
pub const DEFAULT_TIME_LIMIT: u64 = 3600;

/// Soft time limit when the notebook sets none (seconds)
pub const DEFAULT_SOFT_TIME_LIMIT: u64 = 3600;

/// Disk usage when the notebook sets none
pub const DEFAULT_DISK_USAGE: &str = "1GB";

/// Credentials mounted into every worker container
const WORKER_FILES: [(&str, &str); 1] = [("$HOME/.aws", "/home/ops/.aws")];

const DOCUMENT: &str = "job-spec";

/// Where the scheduler places a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamDestination {
    /// Written to `_context.json` in the job's work directory
    Context,
}

/// Parameter forwarding entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParam {
    /// Parameter name, matching the hysds-io entry
    pub name: String,
    /// Always [`ParamDestination::Context`]
    pub destination: ParamDestination,
}

/// The `job-spec.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpecDocument {
    /// Command executed inside the container
    pub command: String,
    /// Hard limit, seconds
    pub time_limit: u64,
    /// Soft limit, seconds
    pub soft_time_limit: u64,
    /// Disk requirement, e.g. `10GB`
    pub disk_usage: String,
    /// Queues the job may run on; never empty
    pub required_queues: Vec<String>,
    /// Host path → container path
    pub imported_worker_files: BTreeMap<String, String>,
    /// User parameters in declaration order
    pub params: Vec<JobParam>,
}

/// Builder for [`JobSpecDocument`]
///
/// Every input except the queue is optional and falls back to a documented
/// default. Inputs are kept as [`ParameterValue`]s so they can come straight
/// from a [`SystemSpecSet`]; JSON `null` counts as absent.
#[derive(Debug, Clone)]
pub struct JobSpecBuilder {
    notebook_ref: String,
    time_limit: Option<ParameterValue>,
    soft_time_limit: Option<ParameterValue>,
    disk_usage: Option<ParameterValue>,
    required_queue: Option<ParameterValue>,
    command: Option<ParameterValue>,
}

impl JobSpecBuilder {
    /// Create builder for the notebook at `notebook_ref`
    ///
    /// `notebook_ref` is the notebook path relative to `$HOME` inside the
    /// container, e.g. `notebook_pges/hello.ipynb`.
    #[inline]
    pub fn new(notebook_ref: impl Into<String>) -> Self {
        Self {
            notebook_ref: notebook_ref.into(),
            time_limit: None,
            soft_time_limit: None,
            disk_usage: None,
            required_queue: None,
            command: None,
        }
    }

    /// Create builder pre-filled from reserved parameters
    #[must_use]
    pub fn from_system_specs(notebook_ref: impl Into<String>, specs: &SystemSpecSet) -> Self {
        let mut builder = Self::new(notebook_ref);
        builder.time_limit = specs.get(SystemSpecSet::TIME_LIMIT).cloned();
        builder.soft_time_limit = specs.get(SystemSpecSet::SOFT_TIME_LIMIT).cloned();
        builder.disk_usage = specs.get(SystemSpecSet::DISK_USAGE).cloned();
        builder.required_queue = specs.get(SystemSpecSet::REQUIRED_QUEUE).cloned();
        builder.command = specs.get(SystemSpecSet::COMMAND).cloned();
        builder
    }

    /// With hard time limit
    #[inline]
    #[must_use]
    pub fn time_limit(mut self, value: impl Into<ParameterValue>) -> Self {
        self.time_limit = Some(value.into());
        self
    }

    /// With soft time limit
    #[inline]
    #[must_use]
    pub fn soft_time_limit(mut self, value: impl Into<ParameterValue>) -> Self {
        self.soft_time_limit = Some(value.into());
        self
    }

    /// With disk usage
    #[inline]
    #[must_use]
    pub fn disk_usage(mut self, value: impl Into<ParameterValue>) -> Self {
        self.disk_usage = Some(value.into());
        self
    }

    /// With queue name or list of queue names
    #[inline]
    #[must_use]
    pub fn required_queue(mut self, value: impl Into<ParameterValue>) -> Self {
        self.required_queue = Some(value.into());
        self
    }

    /// Use `value` as queue only if none was set
    #[must_use]
    pub fn required_queue_or(mut self, value: impl Into<ParameterValue>) -> Self {
        if present(self.required_queue.as_ref()).is_none() {
            self.required_queue = Some(value.into());
        }
        self
    }

    /// With explicit command
    #[inline]
    #[must_use]
    pub fn command(mut self, value: impl Into<ParameterValue>) -> Self {
        self.command = Some(value.into());
        self
    }

    /// Command used when none is given
    #[must_use]
    pub fn default_command(&self) -> String {
        format!("python execute_notebook.py $HOME/{}", self.notebook_ref)
    }

    /// Assemble the document
    ///
    /// # Errors
    /// - [`SpecError::MissingField`] if no queue or notebook reference was supplied
    /// - [`SpecError::InvalidField`] for an empty or non-string queue, or a
    ///   time limit that is not a non-negative integer
    pub fn build(&self, user_params: &[ParameterDescriptor]) -> SpecResult<JobSpecDocument> {
        if self.notebook_ref.trim().is_empty() {
            return Err(SpecError::missing("notebook_ref", DOCUMENT));
        }
        let required_queues = resolve_queues(present(self.required_queue.as_ref()))?;

        let time_limit = seconds(
            "time_limit",
            present(self.time_limit.as_ref()),
            DEFAULT_TIME_LIMIT,
        )?;
        let soft_time_limit = seconds(
            "soft_time_limit",
            present(self.soft_time_limit.as_ref()),
            DEFAULT_SOFT_TIME_LIMIT,
        )?;
        let disk_usage = present(self.disk_usage.as_ref())
            .map_or_else(|| DEFAULT_DISK_USAGE.to_string(), ParameterValue::to_text);
        let command = present(self.command.as_ref())
            .map_or_else(|| self.default_command(), ParameterValue::to_text);

        let params = user_params
            .iter()
            .filter(|p| !p.is_reserved())
            .map(|p| JobParam {
                name: p.name.clone(),
                destination: ParamDestination::Context,
            })
            .collect();

        Ok(JobSpecDocument {
            command,
            time_limit,
            soft_time_limit,
            disk_usage,
            required_queues,
            imported_worker_files: WORKER_FILES
                .iter()
                .map(|(host, container)| ((*host).to_string(), (*container).to_string()))
                .collect(),
            params,
        })
    }
}

/// Build the job-spec for a notebook straight from its reserved parameters
///
/// # Errors
/// See [`JobSpecBuilder::build`]
pub fn build_job_spec(
    notebook_ref: &str,
    specs: &SystemSpecSet,
    user_params: &[ParameterDescriptor],
) -> SpecResult<JobSpecDocument> {
    JobSpecBuilder::from_system_specs(notebook_ref, specs).build(user_params)
}

fn present(value: Option<&ParameterValue>) -> Option<&ParameterValue> {
    value.filter(|v| !v.is_null())
}

fn seconds(field: &'static str, value: Option<&ParameterValue>, default: u64) -> SpecResult<u64> {
    match value {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| SpecError::invalid(field, format!("expected seconds, got {v}"))),
    }
}

fn resolve_queues(value: Option<&ParameterValue>) -> SpecResult<Vec<String>> {
    let queues = match value {
        None => return Err(SpecError::missing("required_queue", DOCUMENT)),
        Some(ParameterValue::String(queue)) => vec![queue.clone()],
        Some(ParameterValue::List(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    SpecError::invalid("required_queue", format!("queue names must be strings, got {item}"))
                })
            })
            .collect::<SpecResult<Vec<_>>>()?,
        Some(other) => {
            return Err(SpecError::invalid(
                "required_queue",
                format!("expected a queue name or list of names, got {other}"),
            ))
        }
    };

    if queues.is_empty() || queues.iter().any(|q| q.trim().is_empty()) {
        return Err(SpecError::invalid("required_queue", "queue names must not be empty"));
    }
    Ok(queues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user(names: &[&str]) -> Vec<ParameterDescriptor> {
        names
            .iter()
            .map(|n| ParameterDescriptor::new(*n, "None", "1"))
            .collect()
    }

    #[test]
    fn reference_job_spec() {
        let specs: SystemSpecSet = [
            ("time_limit", ParameterValue::from(57389u64)),
            ("soft_time_limit", ParameterValue::from(4738u64)),
            ("disk_usage", ParameterValue::from("10GB")),
            ("required_queue", ParameterValue::from("test_queue-worker")),
        ]
        .into_iter()
        .collect();

        let doc = build_job_spec(
            "notebook_pges/test.ipynb",
            &specs,
            &user(&["a", "b", "c", "d", "e", "f", "g"]),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "command": "python execute_notebook.py $HOME/notebook_pges/test.ipynb",
                "time_limit": 57389,
                "soft_time_limit": 4738,
                "disk_usage": "10GB",
                "required_queues": ["test_queue-worker"],
                "imported_worker_files": {"$HOME/.aws": "/home/ops/.aws"},
                "params": [
                    {"name": "a", "destination": "context"},
                    {"name": "b", "destination": "context"},
                    {"name": "c", "destination": "context"},
                    {"name": "d", "destination": "context"},
                    {"name": "e", "destination": "context"},
                    {"name": "f", "destination": "context"},
                    {"name": "g", "destination": "context"},
                ]
            })
        );
    }

    #[test]
    fn bare_queue_becomes_list() {
        let doc = JobSpecBuilder::new("nb.ipynb")
            .required_queue("test_queue-worker")
            .build(&[])
            .unwrap();
        assert_eq!(doc.required_queues, vec!["test_queue-worker".to_string()]);
    }

    #[test]
    fn queue_list_is_kept() {
        let doc = JobSpecBuilder::new("nb.ipynb")
            .required_queue(vec!["q1", "q2"])
            .build(&[])
            .unwrap();
        assert_eq!(doc.required_queues, vec!["q1", "q2"]);
    }

    #[test]
    fn missing_queue_is_configuration_error() {
        let err = JobSpecBuilder::new("nb.ipynb").build(&[]).unwrap_err();
        assert!(matches!(err, SpecError::MissingField { field: "required_queue", .. }));
        assert!(err.is_configuration());

        let null_queue = JobSpecBuilder::new("nb.ipynb")
            .required_queue(ParameterValue::Null)
            .build(&[]);
        assert!(null_queue.is_err());
    }

    #[test]
    fn empty_notebook_ref_is_configuration_error() {
        let err = JobSpecBuilder::new(" ").required_queue("q").build(&[]).unwrap_err();
        assert!(matches!(err, SpecError::MissingField { field: "notebook_ref", .. }));
    }

    #[test]
    fn bad_queues_are_rejected() {
        let empty: Vec<&str> = Vec::new();
        assert!(JobSpecBuilder::new("nb").required_queue(empty).build(&[]).is_err());
        assert!(JobSpecBuilder::new("nb").required_queue("").build(&[]).is_err());
        assert!(JobSpecBuilder::new("nb").required_queue(5u64).build(&[]).is_err());
    }

    #[test]
    fn defaults_apply() {
        let doc = JobSpecBuilder::new("notebook_pges/x.ipynb")
            .required_queue("q")
            .build(&[])
            .unwrap();
        assert_eq!(doc.time_limit, DEFAULT_TIME_LIMIT);
        assert_eq!(doc.soft_time_limit, DEFAULT_SOFT_TIME_LIMIT);
        assert_eq!(doc.disk_usage, DEFAULT_DISK_USAGE);
        assert_eq!(doc.command, "python execute_notebook.py $HOME/notebook_pges/x.ipynb");
    }

    #[test]
    fn explicit_command_wins() {
        let doc = JobSpecBuilder::new("nb.ipynb")
            .required_queue("q")
            .command("/usr/bin/run.sh")
            .build(&[])
            .unwrap();
        assert_eq!(doc.command, "/usr/bin/run.sh");
    }

    #[test]
    fn integral_float_time_limit_is_accepted() {
        let doc = JobSpecBuilder::new("nb")
            .required_queue("q")
            .time_limit(ParameterValue::decode("3600.0").unwrap())
            .soft_time_limit("1800.0")
            .build(&[])
            .unwrap();
        assert_eq!(doc.time_limit, 3600);
        assert_eq!(doc.soft_time_limit, 1800);

        let err = JobSpecBuilder::new("nb")
            .required_queue("q")
            .time_limit(ParameterValue::decode("3600.5").unwrap())
            .build(&[])
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidField { field: "time_limit", .. }));
    }

    #[test]
    fn time_limits_accept_numeric_text() {
        let doc = JobSpecBuilder::new("nb")
            .required_queue("q")
            .time_limit("600")
            .build(&[])
            .unwrap();
        assert_eq!(doc.time_limit, 600);

        let err = JobSpecBuilder::new("nb")
            .required_queue("q")
            .soft_time_limit("soon")
            .build(&[])
            .unwrap_err();
        assert!(matches!(err, SpecError::InvalidField { field: "soft_time_limit", .. }));
    }

    #[test]
    fn required_queue_or_keeps_existing() {
        let doc = JobSpecBuilder::new("nb")
            .required_queue("mine")
            .required_queue_or("fallback")
            .build(&[])
            .unwrap();
        assert_eq!(doc.required_queues, vec!["mine"]);

        let doc = JobSpecBuilder::new("nb")
            .required_queue_or("fallback")
            .build(&[])
            .unwrap();
        assert_eq!(doc.required_queues, vec!["fallback"]);
    }

    #[test]
    fn reserved_params_never_forwarded() {
        let params = vec![
            ParameterDescriptor::new("hysds_time_limit", "int", "10"),
            ParameterDescriptor::new("x", "int", "1"),
        ];
        let doc = JobSpecBuilder::new("nb").required_queue("q").build(&params).unwrap();
        let names: Vec<_> = doc.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x"]);
    }
}
