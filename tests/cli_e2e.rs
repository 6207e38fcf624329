//! End-to-end CLI tests for the dlist binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_JSON: &str = r#"{
    "name": "Test Games",
    "downloads": [
        {"title": "Alpha Quest", "uris": ["https://example.com/alpha.zip"], "fileSize": "1 GB", "rating": 5},
        {"title": "Beta Racer", "uris": ["magnet:?xt=urn:btih:beta"], "fileSize": "2 GB"},
        {"title": "Alpha Strike", "uris": []}
    ]
}"#;

/// A command isolated from the user's config and cache directories.
fn dlist(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dlist").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_CACHE_HOME", home.path().join("cache"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_list(dir: &TempDir, name: &str, json: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, json).unwrap();
    path.display().to_string()
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    dlist(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Browse JSON download lists"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    dlist(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dlist"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    dlist(&home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_list_prints_page_header_and_rows() {
    let home = TempDir::new().unwrap();
    let list = write_list(&home, "games.json", LIST_JSON);

    dlist(&home)
        .args(["list", &list, "--page-size", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Games - page 1/2 (3 entries)"))
        .stdout(predicate::str::contains("Alpha Quest  1 GB  ★★★★★"))
        .stdout(predicate::str::contains("Alpha Strike").not());
}

#[test]
fn test_search_is_case_insensitive() {
    let home = TempDir::new().unwrap();
    let list = write_list(&home, "games.json", LIST_JSON);

    dlist(&home)
        .args(["-q", "search", &list, "ALPHA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha Quest"))
        .stdout(predicate::str::contains("Alpha Strike"))
        .stdout(predicate::str::contains("Beta Racer").not());
}

#[test]
fn test_merge_with_one_input_fails() {
    let home = TempDir::new().unwrap();
    let list = write_list(&home, "games.json", LIST_JSON);
    let out = home.path().join("merged.json");

    dlist(&home)
        .args(["merge", &list, "-o", out.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("at least two lists"));
    assert!(!out.exists());
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config").join("dlist");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "page_size = 0\n").unwrap();
    let list = write_list(&home, "games.json", LIST_JSON);

    dlist(&home)
        .args(["list", &list])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("page_size"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_saves_file_into_output_dir() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/patch.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"patch-bytes".to_vec()))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let out = home.path().join("downloads");
    let url = format!("{}/files/patch.bin?token=1", server.uri());

    let mut cmd = dlist(&home);
    cmd.args(["-q", "download", &url, "-o", out.to_str().unwrap()]);
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    assert.success();
    assert_eq!(std::fs::read(out.join("patch.bin")).unwrap(), b"patch-bytes");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_http_error_exits_with_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let url = format!("{}/missing.bin", server.uri());
    let out = home.path().join("downloads");

    let mut cmd = dlist(&home);
    cmd.args(["download", &url, "-o", out.to_str().unwrap()]);
    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();

    assert.code(1);
}

#[cfg(not(feature = "torrent"))]
#[test]
fn test_get_magnet_without_engine_fails() {
    let home = TempDir::new().unwrap();
    let list = write_list(&home, "games.json", LIST_JSON);
    let out = home.path().join("downloads");

    dlist(&home)
        .args(["get", &list, "Beta Racer", "-o", out.to_str().unwrap()])
        .assert()
        .code(1);
}
