//! End-to-end tests for the blueprint-studio binary against a local snapshot

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const CONNECTION_VARS: [&str; 6] = [
    "BLUEPRINT_CONFIG",
    "BLUEPRINT_SERVICE_URL",
    "BLUEPRINT_API_KEY",
    "BLUEPRINT_ACCESS_TOKEN",
    "BLUEPRINT_OWNER_ID",
    "BLUEPRINT_SNAPSHOT",
];

fn studio() -> Command {
    let mut cmd = Command::cargo_bin("blueprint-studio").unwrap();
    for var in CONNECTION_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

fn studio_at(snapshot: &Path) -> Command {
    let mut cmd = studio();
    cmd.env("BLUEPRINT_SNAPSHOT", snapshot);
    cmd
}

#[test]
fn test_help() {
    studio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_requires_a_backend() {
    studio()
        .args(["projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No data service configured"));
}

#[test]
fn test_hosted_service_requires_api_key() {
    studio()
        .args(["--service-url", "https://db.example.com", "projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_key is required"));
}

#[test]
fn test_empty_snapshot_lists_nothing() {
    let dir = TempDir::new().unwrap();
    studio_at(&dir.path().join("studio.json"))
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects yet"));
}

#[test]
fn test_design_and_export_project() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("studio.json");

    studio_at(&snapshot)
        .args(["projects", "create", "Shop", "--description", "Online store"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"));

    for model in ["Customer", "Order"] {
        studio_at(&snapshot)
            .args(["model", "add", "Shop", model])
            .assert()
            .success();
    }

    studio_at(&snapshot)
        .args([
            "field", "add", "Shop", "Customer", "email", "--type", "email", "--required",
            "--unique",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("at position 0"));

    studio_at(&snapshot)
        .args(["relate", "Shop", "Customer", "Order"])
        .assert()
        .success();

    studio_at(&snapshot)
        .args(["info", "Shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Models (2)"))
        .stdout(predicate::str::contains("email: email"))
        .stdout(predicate::str::contains("Customer --1:M--> Order"));

    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();
    studio_at(&snapshot)
        .args(["export", "Shop", "--output"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Blueprint Export Complete"));

    let text = std::fs::read_to_string(out_dir.join("Shop-blueprint.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["meta"]["project_name"], "Shop");
    assert_eq!(json["meta"]["project_description"], "Online store");
    assert_eq!(json["models"].as_array().unwrap().len(), 2);

    let customer = json["models"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == "Customer")
        .unwrap();
    assert_eq!(customer["fields"][0]["name"], "email");
    assert_eq!(customer["fields"][0]["type"], "email");
    assert_eq!(customer["fields"][0]["required"], true);
    assert_eq!(customer["fields"][0]["unique"], true);
    assert_eq!(customer["actions"]["delete"], true);

    assert_eq!(json["relationships"][0]["from"], "Customer");
    assert_eq!(json["relationships"][0]["to"], "Order");
    assert_eq!(json["relationships"][0]["type"], "1:M");
}

#[test]
fn test_unknown_model_is_an_error() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("studio.json");

    studio_at(&snapshot)
        .args(["projects", "create", "Shop"])
        .assert()
        .success();

    studio_at(&snapshot)
        .args(["field", "add", "Shop", "Ghost", "name", "--type", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model not found"));
}

#[test]
fn test_delete_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("studio.json");

    studio_at(&snapshot)
        .args(["projects", "create", "Scratch"])
        .assert()
        .success();

    studio_at(&snapshot)
        .args(["projects", "delete", "Scratch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    studio_at(&snapshot)
        .args(["projects", "delete", "Scratch", "--yes"])
        .assert()
        .success();

    studio_at(&snapshot)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects yet"));
}
