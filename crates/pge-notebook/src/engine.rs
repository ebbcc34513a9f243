//! Notebook execution engine seam
//!
//! Executing a notebook is delegated to an external engine. [`NotebookEngine`]
//! is the boundary; [`PapermillEngine`] drives the `papermill` executable.

use crate::error::EngineError;
use async_trait::async_trait;
use indexmap::IndexMap;
use pge_spec::ParameterValue;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Parameters injected into a notebook run, in injection order
pub type ExecutionParameters = IndexMap<String, ParameterValue>;

/// Output notebook path for `input`: `<stem>-output.ipynb` in the same directory
#[must_use]
pub fn output_notebook_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}-output.ipynb"))
}

/// A single notebook run
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    /// Notebook to execute
    pub input: PathBuf,
    /// Where the executed notebook is written
    pub output: PathBuf,
    /// Values overriding the notebook's declared defaults
    pub parameters: ExecutionParameters,
    /// File receiving cell stdout
    pub stdout_file: Option<PathBuf>,
    /// File receiving cell stderr
    pub stderr_file: Option<PathBuf>,
}

impl ExecutionRequest {
    /// Create request writing to [`output_notebook_path`]
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = output_notebook_path(&input);
        Self {
            input,
            output,
            parameters: ExecutionParameters::new(),
            stdout_file: None,
            stderr_file: None,
        }
    }

    /// With parameters
    #[inline]
    #[must_use]
    pub fn with_parameters(mut self, parameters: ExecutionParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// With stdout / stderr capture files
    #[inline]
    #[must_use]
    pub fn with_capture_files(mut self, stdout: impl Into<PathBuf>, stderr: impl Into<PathBuf>) -> Self {
        self.stdout_file = Some(stdout.into());
        self.stderr_file = Some(stderr.into());
        self
    }
}

/// Executes notebooks
#[async_trait]
pub trait NotebookEngine: Send + Sync {
    /// Engine name for diagnostics
    fn name(&self) -> &str;

    /// Run the notebook described by `request`
    ///
    /// # Errors
    /// Returns error if the engine cannot be started or the notebook fails
    async fn execute(&self, request: &ExecutionRequest) -> Result<(), EngineError>;
}

/// Runs notebooks through the `papermill` command line
#[derive(Debug, Clone)]
pub struct PapermillEngine {
    program: String,
    log_output: bool,
}

impl Default for PapermillEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PapermillEngine {
    /// Engine using `papermill` from `PATH`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("papermill")
    }

    /// Engine using a specific executable
    #[inline]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            log_output: true,
        }
    }

    /// Whether cell output is echoed to the engine log
    #[inline]
    #[must_use]
    pub fn log_output(mut self, enabled: bool) -> Self {
        self.log_output = enabled;
        self
    }

    /// Command-line arguments for `request`
    ///
    /// # Errors
    /// Returns error if the parameters cannot be encoded as YAML
    pub fn args(&self, request: &ExecutionRequest) -> Result<Vec<OsString>, EngineError> {
        let mut args: Vec<OsString> = vec![
            request.input.clone().into_os_string(),
            request.output.clone().into_os_string(),
        ];

        if !request.parameters.is_empty() {
            args.push("--parameters_yaml".into());
            args.push(serde_yaml::to_string(&request.parameters)?.into());
        }
        if self.log_output {
            args.push("--log-output".into());
        }
        if let Some(stdout) = &request.stdout_file {
            args.push("--stdout-file".into());
            args.push(stdout.clone().into_os_string());
        }
        if let Some(stderr) = &request.stderr_file {
            args.push("--stderr-file".into());
            args.push(stderr.clone().into_os_string());
        }
        Ok(args)
    }
}

#[async_trait]
impl NotebookEngine for PapermillEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<(), EngineError> {
        let args = self.args(request)?;
        tracing::info!(
            engine = %self.program,
            input = %request.input.display(),
            output = %request.output.display(),
            parameters = request.parameters.len(),
            "executing notebook"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let message = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("engine exited without output")
            .to_string();
        Err(EngineError::Failed {
            status: output.status.to_string(),
            message,
            stderr,
        })
    }
}
