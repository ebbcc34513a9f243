use pge_core::{CoreError, Orchestrator, OrchestratorConfig};
use pge_test_utils::{reference_notebook, NotebookFixture, TestProject};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn orchestrator(project: &TestProject) -> Orchestrator {
    Orchestrator::new(OrchestratorConfig::new().with_project_root(project.path()))
}

fn read_json(project: &TestProject, file_name: &str) -> Value {
    serde_json::from_str(&project.read_output(file_name)).unwrap()
}

#[test]
fn reference_job_spec() {
    let project = TestProject::new();
    let notebook = project.add_notebook("test.ipynb", &reference_notebook());

    let generated = orchestrator(&project).generate_for_notebook(&notebook).unwrap();
    assert_eq!(generated.job_spec, project.output_dir().join("job-spec.json.test"));

    let params: Vec<Value> = ["a", "b", "c", "d", "e", "f", "g"]
        .iter()
        .map(|name| json!({"name": name, "destination": "context"}))
        .collect();
    assert_eq!(
        read_json(&project, "job-spec.json.test"),
        json!({
            "command": "python execute_notebook.py $HOME/notebook_pges/test.ipynb",
            "time_limit": 57389,
            "soft_time_limit": 4738,
            "disk_usage": "10GB",
            "required_queues": ["test_queue-worker"],
            "imported_worker_files": {"$HOME/.aws": "/home/ops/.aws"},
            "params": params,
        })
    );
}

#[test]
fn reference_io_spec() {
    let project = TestProject::new();
    let notebook = project.add_notebook("test.ipynb", &reference_notebook());
    orchestrator(&project).generate_for_notebook(&notebook).unwrap();

    assert_eq!(
        read_json(&project, "hysds-io.json.test"),
        json!({
            "submission_type": "iteration",
            "component": "tosca",
            "params": [
                {"name": "a", "from": "submitter", "type": "number", "description": "an integer", "default": 100},
                {"name": "b", "from": "submitter", "type": "text", "default": "jfksl"},
                {"name": "c", "from": "submitter", "type": "list", "default": [1, 2, 3]},
                {"name": "d", "from": "submitter", "type": "dict", "default": {"key": "value", "n": 2}},
                {"name": "e", "from": "submitter", "type": "boolean", "default": true},
                {"name": "f", "from": "submitter", "type": "number", "default": 0.5},
                {"name": "g", "from": "submitter", "type": "text", "default": "some_token"},
            ],
            "label": "TEST LABEL FOR HYSDS_IOS",
        })
    );
}

#[test]
fn documents_are_pretty_printed_with_trailing_newline() {
    let project = TestProject::new();
    let notebook = project.add_notebook("test.ipynb", &reference_notebook());
    orchestrator(&project).generate_for_notebook(&notebook).unwrap();

    let text = project.read_output("job-spec.json.test");
    assert!(text.starts_with("{\n  \"command\": "));
    assert!(text.ends_with("}\n"));
}

#[test]
fn regeneration_is_byte_identical() {
    let project = TestProject::new();
    let notebook = project.add_notebook("test.ipynb", &reference_notebook());
    let orchestrator = orchestrator(&project);

    orchestrator.generate_for_notebook(&notebook).unwrap();
    let first = (
        project.read_output("hysds-io.json.test"),
        project.read_output("job-spec.json.test"),
    );
    orchestrator.generate_for_notebook(&notebook).unwrap();
    let second = (
        project.read_output("hysds-io.json.test"),
        project.read_output("job-spec.json.test"),
    );
    assert_eq!(first, second);
}

#[test]
fn missing_notebook_is_configuration_error() {
    let project = TestProject::new();
    let err = orchestrator(&project)
        .generate_for_notebook(&project.notebook_dir().join("absent.ipynb"))
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn generate_all_skips_non_notebooks() {
    let project = TestProject::new();
    project.add_notebook("b.ipynb", &NotebookFixture::new().parameters("x = 1"));
    project.add_notebook("a.ipynb", &reference_notebook());
    project.add_file("notes.txt", "not a notebook");

    let report = orchestrator(&project).generate_all().unwrap().into_result().unwrap();

    let generated: Vec<_> = report
        .generated
        .iter()
        .map(|g| g.notebook.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(generated, vec!["a.ipynb", "b.ipynb"]);
    assert_eq!(report.skipped, vec!["notes.txt".to_string()]);
    assert!(project.output_dir().join("job-spec.json.b").is_file());
    assert!(!project.output_dir().join("job-spec.json.notes").exists());
}

#[test]
fn generate_all_continues_past_failures() {
    let project = TestProject::new();
    project.add_file("broken.ipynb", "{ not json");
    project.add_notebook(
        "bad_limit.ipynb",
        &NotebookFixture::new().parameters("hysds_time_limit = \"later\""),
    );
    project.add_notebook("good.ipynb", &reference_notebook());

    let report = orchestrator(&project).generate_all().unwrap();
    assert_eq!(report.generated.len(), 1);
    assert!(project.output_dir().join("hysds-io.json.good").is_file());

    let failed: Vec<_> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(failed, vec!["bad_limit.ipynb", "broken.ipynb"]);

    match report.into_result() {
        Err(CoreError::Batch { failures }) => assert_eq!(failures.len(), 2),
        other => panic!("expected batch error, got {other:?}"),
    }
}

#[test]
fn missing_notebook_directory_is_io_error() {
    let project = TestProject::new();
    let config = OrchestratorConfig::new()
        .with_project_root(project.path())
        .with_notebook_dir("elsewhere");
    let err = Orchestrator::new(config).generate_all().unwrap_err();
    assert!(matches!(err, CoreError::Io { .. }));
}
