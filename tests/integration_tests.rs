//! Integration tests for gitlab-archive-dl
//!
//! These tests run the full pipeline, through the library API and through the
//! compiled binary, against a mock GitLab server.
//!
//! Note: These tests are disabled during CI package verification to avoid
//! compilation overhead during cargo publish.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use gitlab_archive_dl::{Error, MirrorConfig, ReportFormat, TransferOptions};
use serde_json::json;
use tempfile::tempdir;
use tokio::process::Command;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount one page of `body` followed by an empty page
async fn mount_list(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

async fn mount_archive(server: &MockServer, project_id: u64, body: &'static [u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/projects/{project_id}/repository/archive.zip")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), "application/zip"))
        .mount(server)
        .await;
}

/// team (1) -> backend (2); team holds alpha, backend holds beta and an empty repo
async fn mock_gitlab() -> MockServer {
    let server = MockServer::start().await;

    mount_list(
        &server,
        "/api/v4/groups",
        json!([
            {"id": 1, "name": "team", "parent_id": null},
            {"id": 2, "name": "backend", "parent_id": 1}
        ]),
    )
    .await;
    mount_list(
        &server,
        "/api/v4/groups/1/subgroups",
        json!([{"id": 2, "name": "backend", "parent_id": 1}]),
    )
    .await;
    mount_list(&server, "/api/v4/groups/2/subgroups", json!([])).await;
    mount_list(
        &server,
        "/api/v4/groups/1/projects",
        json!([{"id": 10, "name": "alpha", "default_branch": "main"}]),
    )
    .await;
    mount_list(
        &server,
        "/api/v4/groups/2/projects",
        json!([
            {"id": 20, "name": "beta service", "default_branch": "develop"},
            {"id": 21, "name": "empty", "default_branch": null}
        ]),
    )
    .await;
    mount_archive(&server, 10, b"alpha-zip").await;
    mount_archive(&server, 20, b"beta-zip").await;

    server
}

fn zip_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|name| name.ends_with(".zip"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[tokio::test]
#[cfg(not(feature = "ci-tests-disabled"))]
async fn test_library_mirrors_nested_groups() {
    let server = mock_gitlab().await;
    let dir = tempdir().unwrap();
    let output_dir = dir.path().join("out");

    let config = MirrorConfig {
        base_url: server.uri(),
        token: "token".to_string(),
        output_dir: output_dir.clone(),
        max_workers: 2,
        report_format: ReportFormat::Json,
        transfer: TransferOptions {
            retry_delay: Duration::from_millis(5),
            ..Default::default()
        },
        ..Default::default()
    };

    let summary = gitlab_archive_dl::mirror(&config).await.unwrap();

    assert!(summary.is_complete(), "failures: {:?}", summary.failures);
    assert_eq!(summary.groups, 2);
    assert_eq!(summary.work_items, 3);
    assert_eq!(summary.successes.len(), 3);
    assert_eq!(summary.retry_rounds, 0);

    let team = zip_files(&output_dir.join("team"));
    assert_eq!(team.len(), 1);
    assert!(team[0].starts_with("alpha_"));

    let backend = zip_files(&output_dir.join("team").join("backend"));
    assert_eq!(backend.len(), 1, "empty repository writes nothing");
    assert!(backend[0].starts_with("beta_service_"));

    let written = gitlab_archive_dl::write_report(
        &summary.successes,
        &summary.failures,
        &config.report_format,
        dir.path(),
    )
    .unwrap()
    .unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
    assert_eq!(report.as_array().unwrap().len(), 3);
}

#[tokio::test]
#[cfg(not(feature = "ci-tests-disabled"))]
async fn test_progress_callback_counts_projects() {
    let server = mock_gitlab().await;
    let dir = tempdir().unwrap();

    let config = MirrorConfig {
        base_url: server.uri(),
        token: "token".to_string(),
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_c = std::sync::Arc::clone(&seen);
    gitlab_archive_dl::mirror_with_progress(&config, move |completed, total| {
        seen_c.lock().unwrap().push((completed, total));
    })
    .await
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_invalid_config_is_rejected_before_requests() {
    let config = MirrorConfig {
        base_url: "gitlab.example.com".to_string(),
        token: "token".to_string(),
        ..Default::default()
    };

    let result = tokio_test::block_on(gitlab_archive_dl::discover(&config));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

/// Run the compiled binary against `server` with extra arguments
async fn run_binary(server: &MockServer, workdir: &Path, args: &[&str]) -> std::process::Output {
    let uri = server.uri();
    let output_dir = workdir.join("out");
    let output_dir = output_dir.to_str().unwrap();
    let report_dir = workdir.to_str().unwrap();

    let mut all_args = vec![
        "--gitlab-url",
        uri.as_str(),
        "--token",
        "token",
        "--output-dir",
        output_dir,
        "--report-dir",
        report_dir,
    ];
    all_args.extend_from_slice(args);

    Command::new(env!("CARGO_BIN_EXE_gitlab-archive-dl"))
        .args(&all_args)
        .env_remove("GITLAB_TOKEN")
        .stdin(Stdio::null())
        .output()
        .await
        .expect("Failed to run binary")
}

#[tokio::test]
#[cfg(not(feature = "ci-tests-disabled"))]
async fn test_binary_writes_archives_and_report() {
    let server = mock_gitlab().await;
    let dir = tempdir().unwrap();

    let output = run_binary(&server, dir.path(), &[]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Archived 3 of 3 projects"), "stdout: {stdout}");
    assert!(stdout.contains("team :: alpha"), "stdout: {stdout}");

    let report = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "status,group,project");
    assert_eq!(lines.len(), 4);
    assert!(lines[1..].iter().all(|line| line.starts_with("SUCCESS,")));
}

#[tokio::test]
#[cfg(not(feature = "ci-tests-disabled"))]
async fn test_binary_reports_remaining_failures() {
    let server = mock_gitlab().await;
    let dir = tempdir().unwrap();

    // a regular file where the "backend" directory should be created
    std::fs::create_dir_all(dir.path().join("out").join("team")).unwrap();
    std::fs::write(dir.path().join("out").join("team").join("backend"), b"blocked").unwrap();

    let output = run_binary(&server, dir.path(), &["--report-format", "csv"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(2), "stdout: {stdout}");
    assert!(stdout.contains("backend :: beta service"), "stdout: {stdout}");

    let report = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
    assert!(report.contains("FAILURE,backend,beta service"));
}

#[tokio::test]
#[cfg(not(feature = "ci-tests-disabled"))]
async fn test_binary_dry_run_downloads_nothing() {
    let server = mock_gitlab().await;
    let dir = tempdir().unwrap();

    let output = run_binary(&server, dir.path(), &["--dry-run"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("team :: alpha (main)"), "stdout: {stdout}");
    assert!(stdout.contains("beta service (develop)"), "stdout: {stdout}");
    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("report.csv").exists());

    let archive_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("archive.zip"))
        .count();
    assert_eq!(archive_requests, 0);
}

#[tokio::test]
#[cfg(not(feature = "ci-tests-disabled"))]
async fn test_binary_requires_token() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let uri = server.uri();

    let output = Command::new(env!("CARGO_BIN_EXE_gitlab-archive-dl"))
        .args(["--gitlab-url", uri.as_str(), "--output-dir"])
        .arg(dir.path().join("out"))
        .env_remove("GITLAB_TOKEN")
        .stdin(Stdio::null())
        .output()
        .await
        .expect("Failed to run binary");

    assert_eq!(output.status.code(), Some(1));
    assert!(server.received_requests().await.unwrap().is_empty());
}
