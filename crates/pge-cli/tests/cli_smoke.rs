use assert_cmd::Command;
use pge_test_utils::{reference_notebook, TestProject};
use predicates::prelude::*;
use std::path::Path;

fn wrapper() -> Command {
    Command::cargo_bin("notebook-pge-wrapper").unwrap()
}

fn write_settings(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("settings.yml");
    std::fs::write(&path, "base_image: hysds/pge-base:test\nuser: ops\n").unwrap();
    path
}

#[test]
fn help_prints() {
    wrapper().arg("--help").assert().success();
}

#[test]
fn subcommand_help() {
    for command in ["create", "dockerfile", "specs", "execute"] {
        wrapper().args([command, "--help"]).assert().success();
    }
}

#[test]
fn create_then_dockerfile() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path());

    wrapper()
        .current_dir(dir.path())
        .args(["create", "demo", "-s"])
        .arg(&settings)
        .assert()
        .success();
    let root = dir.path().join("demo");
    assert!(root.join("notebook_pges/demo_sample_pge.ipynb").is_file());

    std::fs::write(&settings, "base_image: hysds/pge-base:next\nuser: ops\n").unwrap();
    wrapper()
        .current_dir(&root)
        .args(["dockerfile", "-s"])
        .arg(&settings)
        .assert()
        .success();
    let dockerfile = std::fs::read_to_string(root.join("docker/Dockerfile")).unwrap();
    assert!(dockerfile.contains("FROM hysds/pge-base:next"));
}

#[test]
fn create_with_invalid_settings_fails() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.yml");
    std::fs::write(&settings, "user: ops\n").unwrap();

    wrapper()
        .current_dir(dir.path())
        .args(["create", "demo", "-s"])
        .arg(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings"));
}

#[test]
fn specs_for_single_notebook() {
    let project = TestProject::new();
    project.add_notebook("test.ipynb", &reference_notebook());

    wrapper()
        .current_dir(project.path())
        .args(["specs", "notebook_pges/test.ipynb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("job-spec.json.test"));
    assert!(project.output_dir().join("hysds-io.json.test").is_file());
}

#[test]
fn specs_all_reports_failures() {
    let project = TestProject::new();
    project.add_notebook("good.ipynb", &reference_notebook());
    project.add_file("broken.ipynb", "{ not json");

    wrapper()
        .current_dir(project.path())
        .args(["specs", "all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 notebook(s) failed"));
    assert!(project.output_dir().join("job-spec.json.good").is_file());
}

#[test]
fn specs_for_missing_notebook_fails() {
    let project = TestProject::new();
    wrapper()
        .current_dir(project.path())
        .args(["specs", "notebook_pges/absent.ipynb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn execute_rejects_non_notebook() {
    let dir = tempfile::tempdir().unwrap();
    wrapper()
        .current_dir(dir.path())
        .args(["execute", "script.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a .ipynb file"));
}
