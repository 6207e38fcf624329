//! Integration tests for the download module.
//!
//! These tests run the controller and HTTP worker against mock HTTP servers.

use std::path::Path;

use dlist_core::download::{CHUNK_SIZE, FailureKind};
use dlist_core::{
    DownloadController, DownloadEvent, DownloadTask, HttpWorker, Outcome, Progress, TorrentWorker,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a mock server with a file endpoint.
async fn setup_mock_file(path_str: &str, content: &[u8]) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&mock_server)
        .await;

    mock_server
}

fn controller() -> DownloadController {
    DownloadController::with_workers(HttpWorker::default(), TorrentWorker::unavailable())
}

/// Runs a task to the end and returns every event received.
async fn run_to_end(source: &str, destination: &Path) -> Vec<DownloadEvent> {
    let mut handle = controller()
        .start(DownloadTask::new(source, destination))
        .expect("controller should be idle");
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    events
}

fn final_outcome(events: &[DownloadEvent]) -> &Outcome {
    match events.last() {
        Some(DownloadEvent::Finished(outcome)) => outcome,
        other => panic!("last event should be the outcome, got {other:?}"),
    }
}

fn progress_events(events: &[DownloadEvent]) -> Vec<&Progress> {
    events
        .iter()
        .filter_map(|event| match event {
            DownloadEvent::Progress(progress) => Some(progress),
            DownloadEvent::Finished(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_download_full_flow_preserves_content() {
    let content: Vec<u8> = (0..(CHUNK_SIZE * 3 + 123))
        .map(|i| u8::try_from(i % 251).unwrap())
        .collect();
    let mock_server = setup_mock_file("/game.zip", &content).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let destination = temp_dir.path().join("game.zip");

    let events = run_to_end(&format!("{}/game.zip", mock_server.uri()), &destination).await;

    assert!(final_outcome(&events).is_success(), "{events:?}");
    assert_eq!(std::fs::read(&destination).unwrap(), content);

    let progress = progress_events(&events);
    assert!(progress.len() >= 4, "one event per chunk expected");
    let bytes: Vec<u64> = progress.iter().map(|p| p.bytes_done()).collect();
    assert!(bytes.windows(2).all(|w| w[0] < w[1]), "bytes must grow");
    let last = progress.last().unwrap();
    assert_eq!(last.percent(), 100);
    assert_eq!(last.bytes_done(), content.len() as u64);
    assert_eq!(last.total_bytes(), content.len() as u64);
}

#[tokio::test]
async fn test_download_exactly_one_outcome() {
    let mock_server = setup_mock_file("/small.bin", b"tiny").await;
    let temp_dir = TempDir::new().unwrap();

    let events = run_to_end(
        &format!("{}/small.bin", mock_server.uri()),
        &temp_dir.path().join("small.bin"),
    )
    .await;

    let outcomes = events
        .iter()
        .filter(|event| matches!(event, DownloadEvent::Finished(_)))
        .count();
    assert_eq!(outcomes, 1);
    assert!(matches!(events.last(), Some(DownloadEvent::Finished(_))));
}

#[tokio::test]
async fn test_download_404_fails_without_creating_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("missing.zip");

    let events = run_to_end(&format!("{}/missing.zip", mock_server.uri()), &destination).await;

    let outcome = final_outcome(&events);
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Network));
    assert!(outcome.message().contains("404"), "{}", outcome.message());
    assert!(progress_events(&events).is_empty());
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_download_invalid_url_fails_as_network_error() {
    let temp_dir = TempDir::new().unwrap();

    let events = run_to_end("not a url", &temp_dir.path().join("x")).await;

    assert_eq!(final_outcome(&events).failure_kind(), Some(FailureKind::Network));
}

#[tokio::test]
async fn test_download_to_unwritable_destination_fails_as_io_error() {
    let mock_server = setup_mock_file("/file.bin", b"payload").await;
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("no-such-dir").join("file.bin");

    let events = run_to_end(&format!("{}/file.bin", mock_server.uri()), &destination).await;

    assert_eq!(final_outcome(&events).failure_kind(), Some(FailureKind::Io));
}

#[tokio::test]
async fn test_cancel_before_start_emits_only_cancelled() {
    let mock_server = setup_mock_file("/file.bin", b"payload").await;
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("file.bin");

    let mut handle = controller()
        .start(DownloadTask::new(
            format!("{}/file.bin", mock_server.uri()),
            &destination,
        ))
        .unwrap();
    // Current-thread runtime: the worker has not been polled yet.
    handle.cancel();
    handle.cancel();

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }

    assert_eq!(events, vec![DownloadEvent::Finished(Outcome::Cancelled)]);
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_cancel_mid_stream_keeps_partial_file() {
    let content = vec![7u8; 4 * 1024 * 1024];
    let mock_server = setup_mock_file("/big.iso", &content).await;
    let temp_dir = TempDir::new().unwrap();
    let destination = temp_dir.path().join("big.iso");

    let mut handle = controller()
        .start(DownloadTask::new(
            format!("{}/big.iso", mock_server.uri()),
            &destination,
        ))
        .unwrap();

    let mut outcome = None;
    let mut progress_seen = 0usize;
    while let Some(event) = handle.next_event().await {
        match event {
            DownloadEvent::Progress(_) => {
                progress_seen += 1;
                handle.cancel();
            }
            DownloadEvent::Finished(finished) => outcome = Some(finished),
        }
    }

    assert_eq!(outcome, Some(Outcome::Cancelled));
    assert!(progress_seen >= 1);
    let written = std::fs::metadata(&destination).unwrap().len();
    assert!(written > 0, "partial file should be kept");
    assert!(written < content.len() as u64);
}

#[tokio::test]
async fn test_controller_is_free_after_task_ends() {
    let mock_server = setup_mock_file("/a.bin", b"a").await;
    let temp_dir = TempDir::new().unwrap();
    let controller = controller();

    let first = controller
        .start(DownloadTask::new(
            format!("{}/a.bin", mock_server.uri()),
            temp_dir.path().join("a.bin"),
        ))
        .unwrap();
    assert!(first.wait().await.is_success());
    assert!(!controller.is_busy());

    let second = controller
        .start(DownloadTask::new(
            format!("{}/a.bin", mock_server.uri()),
            temp_dir.path().join("b.bin"),
        ))
        .unwrap();
    assert!(second.wait().await.is_success());
}
