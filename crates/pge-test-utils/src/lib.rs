//! Testing utilities for the notebook-pge-wrapper workspace
//!
//! Notebook fixtures and scratch project directories.

#![allow(missing_docs)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Parameters cell of the reference notebook used across the test suites
pub const REFERENCE_PARAMETERS: &str = r#"# user parameters
a = 100  # type: int an integer
b = "jfksl"
c: list = [1, 2, 3]
d: dict = {
    "key": "value",
    "n": 2
}
e: bool = true
f: float = 0.5
g = some_token

# job configuration
hysds_time_limit = 57389
hysds_soft_time_limit = 4738
hysds_disk_usage = "10GB"
hysds_submission_type = 'iteration'
hysds_required_queue = "test_queue-worker"
hysds_label = "TEST LABEL FOR HYSDS_IOS"
"#;

#[derive(Debug, Clone, Default)]
pub struct NotebookFixture {
    cells: Vec<Value>,
    language: Option<String>,
}

impl NotebookFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markdown(mut self, source: &str) -> Self {
        self.cells.push(json!({
            "cell_type": "markdown",
            "metadata": {},
            "source": split_lines(source),
        }));
        self
    }

    pub fn code(mut self, source: &str) -> Self {
        self.cells.push(json!({
            "cell_type": "code",
            "execution_count": null,
            "metadata": {},
            "outputs": [],
            "source": split_lines(source),
        }));
        self
    }

    pub fn parameters(mut self, source: &str) -> Self {
        self.cells.push(json!({
            "cell_type": "code",
            "execution_count": null,
            "metadata": {"tags": ["parameters"]},
            "outputs": [],
            "source": split_lines(source),
        }));
        self
    }

    pub fn kernel_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn to_json(&self) -> String {
        let language = self.language.as_deref().unwrap_or("python");
        let notebook = json!({
            "cells": self.cells,
            "metadata": {
                "kernelspec": {
                    "display_name": language,
                    "language": language,
                    "name": language,
                },
            },
            "nbformat": 4,
            "nbformat_minor": 4,
        });
        serde_json::to_string_pretty(&notebook).unwrap()
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.to_json()).unwrap();
        path
    }
}

/// nbformat stores sources as lines that keep their newline
fn split_lines(source: &str) -> Vec<String> {
    source.split_inclusive('\n').map(str::to_string).collect()
}

pub fn reference_notebook() -> NotebookFixture {
    NotebookFixture::new()
        .markdown("# Reference PGE")
        .parameters(REFERENCE_PARAMETERS)
        .code("print(a, b)")
}

/// Scratch project with an empty `notebook_pges/` directory
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("notebook_pges")).unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn notebook_dir(&self) -> PathBuf {
        self.path().join("notebook_pges")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("docker")
    }

    pub fn add_notebook(&self, file_name: &str, fixture: &NotebookFixture) -> PathBuf {
        fixture.write_to(&self.notebook_dir(), file_name)
    }

    pub fn add_file(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.notebook_dir().join(file_name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read_output(&self, file_name: &str) -> String {
        std::fs::read_to_string(self.output_dir().join(file_name)).unwrap()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
