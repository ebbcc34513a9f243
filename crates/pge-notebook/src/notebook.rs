//! nbformat 4 reader
//!
//! Only the parts needed to find and read the `parameters` cell are modelled;
//! everything else in the file is ignored.

use crate::error::{NotebookError, NotebookResult};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// File extension of Jupyter notebooks (without dot)
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Cell tag marking the cell that declares notebook parameters
pub const PARAMETERS_TAG: &str = "parameters";

/// Kernel language assumed when the notebook metadata names none
pub const DEFAULT_LANGUAGE: &str = "python";

/// `true` if `path` has the `.ipynb` extension
#[must_use]
pub fn is_notebook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext == NOTEBOOK_EXTENSION)
}

/// Kind of notebook cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// Executable code
    Code,
    /// Markdown prose
    Markdown,
    /// Raw passthrough
    Raw,
    /// Anything newer nbformat versions introduce
    #[serde(other)]
    Other,
}

/// Cell source: nbformat allows a single string or a list of lines
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    /// Whole source as one string
    Text(String),
    /// Lines, each keeping its own trailing newline
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl CellSource {
    /// Source as a single string
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

/// Cell metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CellMetadata {
    /// Cell tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One notebook cell
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cell {
    /// Cell kind
    pub cell_type: CellType,
    /// Cell metadata
    #[serde(default)]
    pub metadata: CellMetadata,
    /// Cell source
    #[serde(default)]
    pub source: CellSource,
}

impl Cell {
    /// Whether the cell carries `tag`
    #[inline]
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.metadata.tags.iter().any(|t| t == tag)
    }
}

/// A parsed `.ipynb` document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notebook {
    /// Cells in document order
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Notebook-level metadata, kept loosely typed
    #[serde(default)]
    pub metadata: Value,
}

impl Notebook {
    /// Parse notebook JSON
    ///
    /// # Errors
    /// Returns the decode error if `content` is not nbformat JSON
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read and parse a notebook file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not nbformat JSON
    pub fn load(path: &Path) -> NotebookResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NotebookError::io_error(path, e))?;
        Self::from_json(&content).map_err(|e| NotebookError::invalid_format(path, e))
    }

    /// Kernel language, lower-cased
    ///
    /// Taken from `kernelspec.language`, else `language_info.name`, else
    /// [`DEFAULT_LANGUAGE`].
    #[must_use]
    pub fn language(&self) -> String {
        let pointer = |p: &str| self.metadata.pointer(p).and_then(Value::as_str);
        pointer("/kernelspec/language")
            .or_else(|| pointer("/language_info/name"))
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_lowercase()
    }

    /// First code cell tagged `parameters`
    #[must_use]
    pub fn parameters_cell(&self) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|c| c.cell_type == CellType::Code && c.has_tag(PARAMETERS_TAG))
    }
}
