//! `notebook-pge-wrapper`: package Jupyter notebooks as HySDS jobs.
//!
//! Usage:
//!   notebook-pge-wrapper create <project> [-s settings.yml]
//!   notebook-pge-wrapper dockerfile [-s settings.yml]
//!   notebook-pge-wrapper specs <notebook.ipynb|all> [--notebook-dir <dir>] [--output-dir <dir>]
//!   notebook-pge-wrapper execute <notebook.ipynb> [--context _context.json]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pge_core::{
    create_project, execute_notebook, render_dockerfile, ExecutionConfig, Orchestrator,
    OrchestratorConfig, Settings, CONTEXT_FILE, DOCKER_DIR, NOTEBOOK_DIR,
};
use pge_notebook::PapermillEngine;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notebook-pge-wrapper", version, about = "Package Jupyter notebooks as HySDS PGEs")]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project directory with Dockerfile, helper notebooks and a sample PGE
    Create {
        /// Project directory to create
        project: String,
        /// settings.yml (default: ~/.config/notebook-pge-wrapper/settings.yml)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
    /// Re-render docker/Dockerfile of the current project from Dockerfile.template
    Dockerfile {
        /// settings.yml (default: ~/.config/notebook-pge-wrapper/settings.yml)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
    /// Generate hysds-io and job-spec documents for a notebook, or "all"
    Specs {
        /// Notebook path, or "all" for every notebook in the notebook directory
        notebook: String,
        /// Directory scanned by "all"
        #[arg(long, default_value = NOTEBOOK_DIR)]
        notebook_dir: PathBuf,
        /// Directory the documents are written to
        #[arg(long, default_value = DOCKER_DIR)]
        output_dir: PathBuf,
    },
    /// Execute a notebook with values from the job context
    Execute {
        /// Notebook to run
        notebook: PathBuf,
        /// Job context file
        #[arg(long, default_value = CONTEXT_FILE)]
        context: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Settings from `-s`, else from the default location (created when missing)
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if explicit.is_none() {
        Settings::init_default().context("initialising default settings")?;
    }
    Ok(Settings::resolve(explicit)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Create { project, settings } => {
            let settings = load_settings(settings.as_deref())?;
            let root = create_project(&project, Path::new("."), &settings)
                .with_context(|| format!("creating project {project}"))?;
            println!("created {}", root.display());
        }
        Commands::Dockerfile { settings } => {
            let settings = load_settings(settings.as_deref())?;
            let target = render_dockerfile(Path::new("."), &settings).context("updating Dockerfile")?;
            println!("updated {}", target.display());
        }
        Commands::Specs {
            notebook,
            notebook_dir,
            output_dir,
        } => {
            let orchestrator = Orchestrator::new(
                OrchestratorConfig::new()
                    .with_notebook_dir(notebook_dir)
                    .with_output_dir(output_dir),
            );
            if notebook == "all" {
                let report = orchestrator.generate_all()?;
                for specs in &report.generated {
                    println!("{}", specs.io_spec.display());
                    println!("{}", specs.job_spec.display());
                }
                report.into_result()?;
            } else {
                let specs = orchestrator
                    .generate_for_notebook(Path::new(&notebook))
                    .with_context(|| format!("generating specs for {notebook}"))?;
                println!("{}", specs.io_spec.display());
                println!("{}", specs.job_spec.display());
            }
        }
        Commands::Execute { notebook, context } => {
            let config = ExecutionConfig::new().with_context_file(context);
            let output = execute_notebook(&PapermillEngine::new(), &notebook, &config)
                .await
                .with_context(|| format!("executing {}", notebook.display()))?;
            println!("{}", output.display());
        }
    }
    Ok(())
}
