//! PGE Core
//!
//! Operations behind the `notebook-pge-wrapper` command line.
//!
//! # Core Operations
//!
//! - **Create**: lay out a new project from bundled templates ([`create_project`])
//! - **Dockerfile**: re-render `docker/Dockerfile` from settings ([`render_dockerfile`])
//! - **Specs**: generate `hysds-io.json.<stem>` / `job-spec.json.<stem>` per notebook ([`Orchestrator`])
//! - **Execute**: run a notebook with job context values ([`execute_notebook`])
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      notebook-pge-wrapper                  │
//! ├──────────────┬──────────────┬──────────────┬───────────────┤
//! │   Settings   │   Scaffold   │ Orchestrator │   Execute     │
//! │ settings.yml │  templates   │   (rayon)    │   (tokio)     │
//! ├──────────────┴──────────────┴──────┬───────┴───────────────┤
//! │              pge-notebook          │       pge-spec        │
//! │    inspect / NotebookEngine        │ hysds-io / job-spec   │
//! └────────────────────────────────────┴───────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod execute;
pub mod orchestrator;
pub mod scaffold;
pub mod settings;
pub mod template;

pub use error::{CoreError, CoreResult};
pub use execute::{build_notebook_params, execute_notebook, read_context, ExecutionConfig, CONTEXT_FILE};
pub use orchestrator::{
    build_documents, BatchReport, GeneratedSpecs, Orchestrator, OrchestratorConfig,
    DEFAULT_QUEUE, DEFAULT_SUBMISSION_TYPE,
};
pub use scaffold::{create_project, render_dockerfile, DOCKER_DIR, NOTEBOOK_DIR};
pub use settings::Settings;
pub use template::render;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
