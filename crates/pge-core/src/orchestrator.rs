//! Spec generation for notebook PGEs
//!
//! For every notebook: inspect parameters, split off the reserved ones, build
//! `hysds-io.json.<stem>` and `job-spec.json.<stem>` and write both to the
//! output directory.

use crate::error::{CoreError, CoreResult};
use crate::scaffold::{DOCKER_DIR, NOTEBOOK_DIR};
use pge_notebook::{inspect_notebook, is_notebook};
use pge_spec::{
    build_io_spec, partition, to_pretty_json, IoSpecDocument, JobSpecBuilder, JobSpecDocument,
    ParameterMap, ParameterValue, SystemSpecSet,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Submission type when a notebook declares none
pub const DEFAULT_SUBMISSION_TYPE: &str = "individual";

/// Queue when a notebook declares none
pub const DEFAULT_QUEUE: &str = "factotum-job_worker-small";

/// File name prefix of the generated hysds-io document
pub const IO_SPEC_PREFIX: &str = "hysds-io.json";

/// File name prefix of the generated job-spec document
pub const JOB_SPEC_PREFIX: &str = "job-spec.json";

/// Where notebooks are read from and documents written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Project root; relative directories below are resolved against it
    pub project_root: PathBuf,
    /// Notebook directory
    pub notebook_dir: PathBuf,
    /// Output directory for generated documents
    pub output_dir: PathBuf,
}

impl OrchestratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With project root
    #[inline]
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// With notebook directory
    #[inline]
    #[must_use]
    pub fn with_notebook_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.notebook_dir = dir.into();
        self
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Resolved notebook directory
    #[must_use]
    pub fn notebook_path(&self) -> PathBuf {
        self.project_root.join(&self.notebook_dir)
    }

    /// Resolved output directory
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.project_root.join(&self.output_dir)
    }

    /// Container-side reference for a notebook file, e.g. `notebook_pges/hello.ipynb`
    #[must_use]
    pub fn notebook_ref(&self, file_name: &str) -> String {
        let dir = self
            .notebook_dir
            .file_name()
            .map_or_else(|| NOTEBOOK_DIR.to_string(), |d| d.to_string_lossy().into_owned());
        format!("{dir}/{file_name}")
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            notebook_dir: PathBuf::from(NOTEBOOK_DIR),
            output_dir: PathBuf::from(DOCKER_DIR),
        }
    }
}

/// Documents written for one notebook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSpecs {
    /// Source notebook
    pub notebook: PathBuf,
    /// `hysds-io.json.<stem>`
    pub io_spec: PathBuf,
    /// `job-spec.json.<stem>`
    pub job_spec: PathBuf,
}

/// Outcome of [`Orchestrator::generate_all`], in file-name order
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Notebooks whose documents were written
    pub generated: Vec<GeneratedSpecs>,
    /// Entries that are not notebooks
    pub skipped: Vec<String>,
    /// Notebook file name and error message per failed notebook
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// Whether every notebook succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn failures into a single [`CoreError::Batch`]
    ///
    /// # Errors
    /// Returns [`CoreError::Batch`] if any notebook failed
    pub fn into_result(self) -> CoreResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CoreError::Batch {
                failures: self.failed,
            })
        }
    }
}

/// Build both documents from a notebook's inspected parameters
///
/// Missing submission type and queue fall back to [`DEFAULT_SUBMISSION_TYPE`]
/// and [`DEFAULT_QUEUE`].
///
/// # Errors
/// Returns error if a reserved parameter holds an unusable value
pub fn build_documents(
    parameters: &ParameterMap,
    notebook_ref: &str,
) -> CoreResult<(IoSpecDocument, JobSpecDocument)> {
    let (system, user) = partition(parameters);

    let submission_type = text(&system, SystemSpecSet::SUBMISSION_TYPE)
        .unwrap_or_else(|| DEFAULT_SUBMISSION_TYPE.to_string());
    let label = text(&system, SystemSpecSet::LABEL);
    let io_spec = build_io_spec(&user, Some(&submission_type), label.as_deref())?;

    let job_spec = JobSpecBuilder::from_system_specs(notebook_ref, &system)
        .required_queue_or(DEFAULT_QUEUE)
        .build(&user)?;

    Ok((io_spec, job_spec))
}

fn text(system: &SystemSpecSet, key: &str) -> Option<String> {
    system
        .get(key)
        .filter(|v| !v.is_null())
        .map(ParameterValue::to_text)
}

/// Generates spec documents for the notebooks of a project
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create orchestrator
    #[inline]
    #[must_use]
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generate and write both documents for the notebook at `path`
    ///
    /// # Errors
    /// - [`CoreError::Config`] if `path` is not an existing `.ipynb` file
    /// - inspection, building or write errors
    pub fn generate_for_notebook(&self, path: &Path) -> CoreResult<GeneratedSpecs> {
        if !path.is_file() {
            return Err(CoreError::config(format!("notebook {} not found", path.display())));
        }
        if !is_notebook(path) {
            return Err(CoreError::config(format!("{} is not a .ipynb file", path.display())));
        }
        let (Some(file_name), Some(stem)) = (path.file_name(), path.file_stem()) else {
            return Err(CoreError::config(format!("{} has no file name", path.display())));
        };
        let file_name = file_name.to_string_lossy();
        let stem = stem.to_string_lossy();

        tracing::info!(notebook = %file_name, "inspecting notebook");
        let parameters = inspect_notebook(path)?;
        let (io_spec, job_spec) = build_documents(&parameters, &self.config.notebook_ref(&file_name))?;
        let io_text = to_pretty_json(&io_spec)?;
        let job_text = to_pretty_json(&job_spec)?;

        let output_dir = self.config.output_path();
        std::fs::create_dir_all(&output_dir).map_err(|e| CoreError::io_error(&output_dir, e))?;
        let io_path = output_dir.join(format!("{IO_SPEC_PREFIX}.{stem}"));
        let job_path = output_dir.join(format!("{JOB_SPEC_PREFIX}.{stem}"));
        std::fs::write(&io_path, io_text).map_err(|e| CoreError::io_error(&io_path, e))?;
        std::fs::write(&job_path, job_text).map_err(|e| CoreError::io_error(&job_path, e))?;

        tracing::debug!(io_spec = %io_path.display(), job_spec = %job_path.display(), "documents written");
        Ok(GeneratedSpecs {
            notebook: path.to_path_buf(),
            io_spec: io_path,
            job_spec: job_path,
        })
    }

    /// Generate documents for every notebook in the notebook directory
    ///
    /// Notebooks are processed in parallel. A failing notebook does not stop
    /// the others; see [`BatchReport::into_result`].
    ///
    /// # Errors
    /// Returns error only if the notebook directory cannot be listed
    pub fn generate_all(&self) -> CoreResult<BatchReport> {
        let dir = self.config.notebook_path();
        let entries = std::fs::read_dir(&dir).map_err(|e| CoreError::io_error(&dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io_error(&dir, e))?;
            paths.push(entry.path());
        }
        paths.sort();

        let mut report = BatchReport::default();
        let mut notebooks = Vec::new();
        for path in paths {
            let name = display_name(&path);
            if path.is_file() && is_notebook(&path) {
                notebooks.push((name, path));
            } else {
                tracing::info!(entry = %name, "not a notebook, skipping");
                report.skipped.push(name);
            }
        }

        let results: Vec<_> = notebooks
            .par_iter()
            .map(|(name, path)| (name, self.generate_for_notebook(path)))
            .collect();

        for (name, result) in results {
            match result {
                Ok(specs) => report.generated.push(specs),
                Err(e) => {
                    tracing::error!(notebook = %name, error = %e, "spec generation failed");
                    report.failed.push((name.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "spec generation finished"
        );
        Ok(report)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
