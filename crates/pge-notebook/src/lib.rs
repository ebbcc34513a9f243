//! PGE Notebook Layer
//!
//! The boundary between notebook files and the specification builders.
//!
//! # Core Operations
//!
//! - **Read**: decode `.ipynb` files ([`Notebook`])
//! - **Inspect**: list the parameters a notebook declares ([`inspect_notebook`])
//! - **Execute**: hand a notebook and its parameters to an engine ([`NotebookEngine`])
//!
//! # Architecture
//!
//! ```text
//! .ipynb ──► Notebook ──► parameters cell ──► ParameterInspector ──► ParameterMap
//!
//! ExecutionRequest ──► NotebookEngine (papermill) ──► <stem>-output.ipynb
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod inspect;
pub mod notebook;

pub use engine::{
    output_notebook_path, ExecutionParameters, ExecutionRequest, NotebookEngine, PapermillEngine,
};
pub use error::{EngineError, NotebookError, NotebookResult};
pub use inspect::{inspect, inspect_notebook, ParameterInspector, PythonInspector, UNTYPED};
pub use notebook::{is_notebook, Cell, CellType, Notebook, NOTEBOOK_EXTENSION, PARAMETERS_TAG};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
