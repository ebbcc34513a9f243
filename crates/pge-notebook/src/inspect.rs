//! Notebook parameter inspection
//!
//! Reads the `parameters` cell and reports every declared parameter with its
//! type, help text and default, in declaration order. Python cells follow the
//! papermill conventions:
//!
//! ```text
//! name: annotation = value  # help
//! name = value  # type: annotation help
//! ```

use crate::error::{NotebookError, NotebookResult};
use crate::notebook::Notebook;
use once_cell::sync::Lazy;
use pge_spec::{ParameterDescriptor, ParameterMap};
use regex::Regex;
use std::path::Path;

/// Declared type reported for parameters without annotation
pub const UNTYPED: &str = "None";

/// Extracts parameter declarations from a parameters cell
pub trait ParameterInspector: Send + Sync {
    /// Kernel languages this inspector handles (lower-case)
    fn languages(&self) -> &[&str];

    /// Parse a parameters cell source
    fn inspect_source(&self, source: &str) -> ParameterMap;

    /// Check if this inspector handles `language`
    fn supports(&self, language: &str) -> bool {
        self.languages().contains(&language)
    }
}

static PYTHON_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<target>\w[\w_]*)\s*(:\s*["']?(?P<annotation>\w[\w_\[\],\s]*)["']?\s*)?=\s*(?P<value>.*?)(\s*#\s*(type:\s*(?P<type_comment>[^\s]*)\s*)?(?P<help>.*))?$"#,
    )
    .expect("assignment pattern is valid")
});

/// Inspector for Python parameters cells
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonInspector;

impl PythonInspector {
    /// Create new inspector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Group cell lines into one string per definition
    ///
    /// Blank and comment-only lines are dropped. A line with a single `=`
    /// starts a new definition; following lines without `=` continue it, so
    /// multi-line lists and dicts collapse onto one line. Comments are only
    /// kept on the last line of a definition.
    fn definitions(source: &str) -> Vec<String> {
        let mut definitions = Vec::new();
        let mut accumulator: Vec<&str> = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let equals = line.matches('=').count();
            if equals > 0 {
                definitions.push(flatten(&accumulator));
                accumulator.clear();
                if equals > 1 {
                    tracing::warn!(line = index + 1, source = line, "unable to parse parameter line");
                    continue;
                }
            }
            accumulator.push(line);
        }
        definitions.push(flatten(&accumulator));

        definitions.retain(|d| !d.is_empty());
        definitions
    }

    fn parse_definition(definition: &str) -> Option<ParameterDescriptor> {
        let caps = PYTHON_ASSIGNMENT.captures(definition)?;
        let name = caps.name("target")?.as_str().trim();

        let declared_type = caps
            .name("annotation")
            .or_else(|| caps.name("type_comment"))
            .map(|m| m.as_str().trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTYPED);
        let default_text = caps.name("value").map_or("", |m| m.as_str().trim());
        let help = caps.name("help").map_or("", |m| m.as_str().trim());

        Some(ParameterDescriptor::new(name, declared_type, default_text).with_help(help))
    }
}

fn flatten(lines: &[&str]) -> String {
    let Some((last, head)) = lines.split_last() else {
        return String::new();
    };
    let mut flat: String = head
        .iter()
        .map(|line| line.find('#').map_or(*line, |pos| &line[..pos]).trim())
        .collect();
    flat.push_str(last.trim());
    flat
}

impl ParameterInspector for PythonInspector {
    fn languages(&self) -> &[&str] {
        &["python"]
    }

    fn inspect_source(&self, source: &str) -> ParameterMap {
        let mut params = ParameterMap::new();
        for definition in Self::definitions(source) {
            match Self::parse_definition(&definition) {
                Some(p) => {
                    params.insert(p.name.clone(), p);
                }
                None => tracing::debug!(definition = %definition, "not a parameter definition"),
            }
        }
        params
    }
}

/// Inspect an already-loaded notebook
///
/// A notebook without a `parameters` cell has no parameters.
///
/// # Errors
/// Returns [`NotebookError::UnsupportedLanguage`] when `inspector` does not
/// handle the notebook's kernel language
pub fn inspect(
    notebook: &Notebook,
    path: &Path,
    inspector: &dyn ParameterInspector,
) -> NotebookResult<ParameterMap> {
    let language = notebook.language();
    if !inspector.supports(&language) {
        return Err(NotebookError::UnsupportedLanguage {
            path: path.to_path_buf(),
            language,
        });
    }

    match notebook.parameters_cell() {
        Some(cell) => Ok(inspector.inspect_source(&cell.source.text())),
        None => {
            tracing::warn!(path = %path.display(), "no cell tagged 'parameters'");
            Ok(ParameterMap::new())
        }
    }
}

/// Load a notebook file and inspect its parameters
///
/// # Errors
/// Returns error if the file is unreadable, not a notebook, or written for a
/// kernel other than Python
pub fn inspect_notebook(path: &Path) -> NotebookResult<ParameterMap> {
    let notebook = Notebook::load(path)?;
    inspect(&notebook, path, &PythonInspector)
}
