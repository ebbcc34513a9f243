//! Execution wrapper
//!
//! Runs a notebook inside a job: values from the job's `_context.json` are
//! injected for the notebook's declared user parameters, cell output is
//! captured to `_alt_info.txt` / `_alt_stderr.txt`, and a failed run leaves
//! `_alt_error.txt` and `_alt_traceback.txt` behind for the job's triage.

use crate::error::{CoreError, CoreResult};
use pge_notebook::{inspect_notebook, is_notebook, ExecutionParameters, ExecutionRequest, NotebookEngine};
use pge_spec::{ParameterMap, ParameterValue};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Job context read by default
pub const CONTEXT_FILE: &str = "_context.json";

/// Captured cell stdout
pub const INFO_FILE: &str = "_alt_info.txt";

/// Captured cell stderr
pub const STDERR_FILE: &str = "_alt_stderr.txt";

/// Short failure message
pub const ERROR_FILE: &str = "_alt_error.txt";

/// Full failure chain
pub const TRACEBACK_FILE: &str = "_alt_traceback.txt";

/// File locations for a notebook run
///
/// Relative paths resolve against `work_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Job working directory
    pub work_dir: PathBuf,
    /// Job context
    pub context_file: PathBuf,
    /// Cell stdout capture
    pub info_file: PathBuf,
    /// Cell stderr capture
    pub stderr_file: PathBuf,
    /// Failure message
    pub error_file: PathBuf,
    /// Failure trace
    pub traceback_file: PathBuf,
}

impl ExecutionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With working directory
    #[inline]
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// With context file
    #[inline]
    #[must_use]
    pub fn with_context_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.context_file = path.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.work_dir.join(path)
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            context_file: PathBuf::from(CONTEXT_FILE),
            info_file: PathBuf::from(INFO_FILE),
            stderr_file: PathBuf::from(STDERR_FILE),
            error_file: PathBuf::from(ERROR_FILE),
            traceback_file: PathBuf::from(TRACEBACK_FILE),
        }
    }
}

/// Read a job context file
///
/// # Errors
/// - [`CoreError::Io`] if the file cannot be read
/// - [`CoreError::Context`] if it is not JSON
/// - [`CoreError::Config`] if it is JSON but not an object
pub fn read_context(path: &Path) -> CoreResult<Map<String, Value>> {
    let text = std::fs::read_to_string(path).map_err(|e| CoreError::io_error(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| CoreError::Context {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::config(format!(
            "{} must hold a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Context values to inject, in the notebook's declaration order
///
/// Only declared user parameters with a non-null context value are kept.
#[must_use]
pub fn build_notebook_params(declared: &ParameterMap, context: &Map<String, Value>) -> ExecutionParameters {
    declared
        .values()
        .filter(|p| !p.is_reserved())
        .filter_map(|p| {
            context
                .get(&p.name)
                .filter(|v| !v.is_null())
                .map(|v| (p.name.clone(), ParameterValue::from(v.clone())))
        })
        .collect()
}

/// Execute `notebook` with `engine`
///
/// Returns the path of the executed output notebook.
///
/// # Errors
/// - [`CoreError::Config`] if `notebook` is not a `.ipynb` path
/// - any context, inspection or engine error; diagnostics files are written
///   before it is returned
pub async fn execute_notebook(
    engine: &dyn NotebookEngine,
    notebook: &Path,
    config: &ExecutionConfig,
) -> CoreResult<PathBuf> {
    if !is_notebook(notebook) {
        return Err(CoreError::config(format!("{} is not a .ipynb file", notebook.display())));
    }

    match run(engine, notebook, config).await {
        Ok(output) => {
            tracing::info!(output = %output.display(), "notebook executed");
            Ok(output)
        }
        Err(e) => {
            tracing::error!(notebook = %notebook.display(), engine = engine.name(), error = %e, "execution failed");
            write_diagnostics(config, &e).await;
            Err(e)
        }
    }
}

async fn run(engine: &dyn NotebookEngine, notebook: &Path, config: &ExecutionConfig) -> CoreResult<PathBuf> {
    let context = read_context(&config.resolve(&config.context_file))?;
    let declared = inspect_notebook(notebook)?;
    let parameters = build_notebook_params(&declared, &context);
    tracing::debug!(parameters = parameters.len(), "context values injected");

    let request = ExecutionRequest::new(notebook)
        .with_parameters(parameters)
        .with_capture_files(config.resolve(&config.info_file), config.resolve(&config.stderr_file));
    engine.execute(&request).await?;
    Ok(request.output)
}

async fn write_diagnostics(config: &ExecutionConfig, error: &CoreError) {
    let files = [
        (config.resolve(&config.error_file), format!("{error}\n")),
        (config.resolve(&config.traceback_file), format!("{}\n", error.trace())),
    ];
    for (path, contents) in files {
        if let Err(e) = tokio::fs::write(&path, contents).await {
            tracing::warn!(path = %path.display(), error = %e, "unable to write diagnostics");
        }
    }
}
