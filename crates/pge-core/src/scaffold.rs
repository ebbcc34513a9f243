//! Project scaffolding
//!
//! Lays out a new notebook PGE project from the bundled templates and
//! re-renders its `docker/Dockerfile` when settings change.

use crate::error::{CoreError, CoreResult};
use crate::settings::Settings;
use crate::template::render;
use std::path::{Path, PathBuf};

/// Directory holding the notebooks packaged as PGEs
pub const NOTEBOOK_DIR: &str = "notebook_pges";

/// Directory holding the Dockerfile and generated documents
pub const DOCKER_DIR: &str = "docker";

/// Dockerfile template kept at the project root
pub const DOCKERFILE_TEMPLATE: &str = "Dockerfile.template";

/// Rendered Dockerfile inside [`DOCKER_DIR`]
pub const DOCKERFILE: &str = "Dockerfile";

/// Token replaced by the project name in the helper notebooks
pub const NAME_PLACEHOLDER: &str = "PGE_NAME_PLACEHOLDER";

const README: &str = include_str!("../templates/README.md");
const DOCKERFILE_TEMPLATE_TEXT: &str = include_str!("../templates/Dockerfile.template");
const REQUIREMENTS: &str = include_str!("../templates/requirements.ipynb");
const PGE_CREATE: &str = include_str!("../templates/pge_create.ipynb");
const SUBMIT_JOB: &str = include_str!("../templates/submit_job.ipynb");
const PELE_SETUP: &str = include_str!("../templates/pele_setup.ipynb");
const SAMPLE_PGE: &str = include_str!("../templates/sample_pge.ipynb");

/// Render the Dockerfile template for `project`
///
/// # Errors
/// Returns [`CoreError::Template`] if the template uses an unknown placeholder
pub fn render_dockerfile_text(template: &str, project: &str, settings: &Settings) -> CoreResult<String> {
    render(
        template,
        &[
            ("base_image", settings.base_image.as_str()),
            ("user", settings.user.as_str()),
            ("project", project),
        ],
    )
}

/// Create a project directory `project` under `parent`
///
/// Existing directories are reused and bundled files overwritten. Returns the
/// project root.
///
/// # Errors
/// - [`CoreError::Config`] when `project` is empty
/// - [`CoreError::Io`] when a file cannot be written
pub fn create_project(project: &str, parent: &Path, settings: &Settings) -> CoreResult<PathBuf> {
    let project = project.trim();
    if project.is_empty() {
        return Err(CoreError::config(
            "project must be supplied, e.g. notebook-pge-wrapper create <project>",
        ));
    }

    let root = parent.join(project);
    let name = root
        .file_name()
        .map_or_else(|| project.to_string(), |n| n.to_string_lossy().into_owned());
    let docker_dir = root.join(DOCKER_DIR);
    let notebook_dir = root.join(NOTEBOOK_DIR);
    create_dir(&docker_dir)?;
    create_dir(&notebook_dir)?;

    let dockerfile = render_dockerfile_text(DOCKERFILE_TEMPLATE_TEXT, &name, settings)?;
    write(&docker_dir.join(DOCKERFILE), &dockerfile)?;
    write(&root.join(DOCKERFILE_TEMPLATE), DOCKERFILE_TEMPLATE_TEXT)?;
    write(&docker_dir.join("requirements.ipynb"), REQUIREMENTS)?;
    write(&root.join("pge_create.ipynb"), &PGE_CREATE.replace(NAME_PLACEHOLDER, &name))?;
    write(&root.join("submit_job.ipynb"), &SUBMIT_JOB.replace(NAME_PLACEHOLDER, &name))?;
    write(&root.join("pele_setup.ipynb"), PELE_SETUP)?;
    write(&notebook_dir.join(format!("{name}_sample_pge.ipynb")), SAMPLE_PGE)?;
    write(&root.join("README.md"), README)?;

    tracing::info!(project = %name, root = %root.display(), "project created");
    Ok(root)
}

/// Re-render `docker/Dockerfile` from the project's `Dockerfile.template`
///
/// The project name is the name of `project_root`.
///
/// # Errors
/// Returns error if the template is missing or cannot be rendered
pub fn render_dockerfile(project_root: &Path, settings: &Settings) -> CoreResult<PathBuf> {
    let root = std::fs::canonicalize(project_root).map_err(|e| CoreError::io_error(project_root, e))?;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CoreError::config(format!("{} has no directory name", root.display())))?;

    let template_path = root.join(DOCKERFILE_TEMPLATE);
    let template =
        std::fs::read_to_string(&template_path).map_err(|e| CoreError::io_error(&template_path, e))?;

    let docker_dir = root.join(DOCKER_DIR);
    create_dir(&docker_dir)?;
    let target = docker_dir.join(DOCKERFILE);
    write(&target, &render_dockerfile_text(&template, &name, settings)?)?;

    tracing::info!(path = %target.display(), "Dockerfile updated");
    Ok(target)
}

fn create_dir(path: &Path) -> CoreResult<()> {
    std::fs::create_dir_all(path).map_err(|e| CoreError::io_error(path, e))
}

fn write(path: &Path, contents: &str) -> CoreResult<()> {
    std::fs::write(path, contents).map_err(|e| CoreError::io_error(path, e))
}
