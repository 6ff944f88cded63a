// ABOUTME: Integration tests for the compose orchestrator backend.
// ABOUTME: Runs a stand-in `docker` script that records its arguments.
#![cfg(unix)]

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use swatch::orchestrator::{
    BuildOptions, Compose, ContainerOrchestrator, OrchestratorErrorKind,
};
use swatch::types::ServiceName;

const PS_OUTPUT: &str = r#"{"Service":"backend-blue","Name":"shop-backend-blue-1","State":"running","Status":"Up 2 minutes"}
{"Service":"router","Name":"shop-router-1","State":"exited","Status":"Exited (0)"}"#;

/// Write an executable stand-in for `docker` into `dir`.
fn fake_docker(dir: &Path, exit_code: i32) -> PathBuf {
    let log = dir.join("calls.log");
    let ps = dir.join("ps.json");
    fs::write(&ps, PS_OUTPUT).unwrap();

    let script = format!(
        r#"#!/bin/sh
echo "$* color=$ACTIVE_COLOR" >> "{log}"
case "$*" in
  *" ps "*) cat "{ps}" ;;
esac
if [ {code} -ne 0 ]; then
  echo "service not found" >&2
fi
exit {code}
"#,
        log = log.display(),
        ps = ps.display(),
        code = exit_code,
    );

    let path = dir.join("docker");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn services(names: &[&str]) -> Vec<ServiceName> {
    names.iter().map(|n| ServiceName::new(n).unwrap()).collect()
}

#[tokio::test]
async fn build_passes_services_and_no_cache() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Compose::new("compose.yml")
        .project("shop")
        .program(fake_docker(dir.path(), 0));

    compose
        .build(
            &services(&["backend-green", "webui-green"]),
            BuildOptions { no_cache: true },
        )
        .await
        .unwrap();

    assert_eq!(
        calls(dir.path()),
        ["compose -f compose.yml -p shop build --no-cache backend-green webui-green color="]
    );
}

#[tokio::test]
async fn lifecycle_verbs_match_compose_cli() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Compose::new("compose.yml").program(fake_docker(dir.path(), 0));
    let router = services(&["router"]);

    compose.stop(&router).await.unwrap();
    compose.remove(&router).await.unwrap();
    compose
        .start(
            &router,
            &HashMap::from([("ACTIVE_COLOR".to_string(), "green".to_string())]),
        )
        .await
        .unwrap();
    compose.start(&[], &HashMap::new()).await.unwrap();

    assert_eq!(
        calls(dir.path()),
        [
            "compose -f compose.yml stop router color=",
            "compose -f compose.yml rm -f router color=",
            "compose -f compose.yml up -d --no-deps router color=green",
            "compose -f compose.yml up -d color=",
        ]
    );
}

#[tokio::test]
async fn list_status_parses_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Compose::new("compose.yml").program(fake_docker(dir.path(), 0));

    let listing = compose.list_status().await.unwrap();

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].service, "backend-blue");
    assert!(listing[0].is_running());
    assert!(!listing[1].is_running());
    assert_eq!(
        calls(dir.path()),
        ["compose -f compose.yml ps --all --format json color="]
    );
}

#[tokio::test]
async fn non_zero_exit_is_command_failure() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Compose::new("compose.yml").program(fake_docker(dir.path(), 3));

    let err = compose.stop(&services(&["webui-blue"])).await.unwrap_err();

    assert_eq!(err.kind(), OrchestratorErrorKind::CommandFailed);
    assert!(err.to_string().contains("service not found"));
}

#[tokio::test]
async fn inherited_output_goes_to_the_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Compose::new("compose.yml")
        .program(fake_docker(dir.path(), 3))
        .inherit_output(true);

    let err = compose.stop(&services(&["webui-blue"])).await.unwrap_err();

    assert_eq!(err.kind(), OrchestratorErrorKind::CommandFailed);
    assert!(!err.to_string().contains("service not found"));
}

#[tokio::test]
async fn status_listing_is_captured_with_inherited_output() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Compose::new("compose.yml")
        .program(fake_docker(dir.path(), 0))
        .inherit_output(true);

    let listing = compose.list_status().await.unwrap();
    assert_eq!(listing.len(), 2);
}

#[tokio::test]
async fn missing_binary_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Compose::new("compose.yml").program(dir.path().join("no-such-docker"));

    let err = compose.list_status().await.unwrap_err();
    assert_eq!(err.kind(), OrchestratorErrorKind::Unavailable);
}
