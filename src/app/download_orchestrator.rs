//! Runs one download task to completion with progress and Ctrl-C handling.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use dlist_core::download::filename::{filename_from_url, resolve_unique_path};
use dlist_core::download::{TorrentConfig, TorrentWorker};
use dlist_core::{
    DownloadController, DownloadEvent, DownloadTask, HttpClient, HttpWorker, Outcome, TaskKind,
};
use tracing::{debug, error, info, warn};

use crate::ProcessExit;
use crate::app::catalog_commands::load_list;
use crate::app::context::RunContext;
use crate::app::exit_handler;
use crate::app::progress_manager::ProgressReporter;
use crate::cli::GetArgs;

/// Builds the task for `source`, creating the output directory.
///
/// File downloads are saved as `<output_dir>/<name from URL>`, suffixed if
/// that name is taken. Torrents save into `output_dir` itself.
pub(crate) fn build_task(source: &str, output_dir: &Path) -> Result<DownloadTask> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory '{}'", output_dir.display())
        })?;
        info!(dir = %output_dir.display(), "Created output directory");
    }

    let task = match TaskKind::classify(source) {
        TaskKind::Torrent => DownloadTask::new(source, output_dir),
        TaskKind::File => {
            let destination = resolve_unique_path(output_dir, &filename_from_url(source));
            DownloadTask::new(source, destination)
        }
    };
    Ok(task)
}

fn build_controller(ctx: &RunContext) -> Result<DownloadController> {
    let client = HttpClient::with_timeouts(ctx.connect_timeout_secs, ctx.read_timeout_secs)
        .context("Failed to build HTTP client")?;
    let torrent = TorrentWorker::with_default_backend().with_config(TorrentConfig {
        listen_port: ctx.listen_port,
        ..TorrentConfig::default()
    });
    Ok(DownloadController::with_workers(
        HttpWorker::new(client),
        torrent,
    ))
}

/// Downloads `source` and maps the outcome to an exit code.
pub(crate) async fn run_download(source: &str, ctx: &RunContext) -> Result<ProcessExit> {
    let task = build_task(source, &ctx.output_dir)?;
    let controller = build_controller(ctx)?;
    if task.kind() == TaskKind::Torrent && !controller.torrent_available() {
        warn!("This build has no torrent engine; rebuild with `--features torrent`");
    }

    let label = match task.kind() {
        TaskKind::File => task
            .destination()
            .file_name()
            .map_or_else(|| source.to_string(), |name| name.to_string_lossy().into_owned()),
        TaskKind::Torrent => "torrent".to_string(),
    };
    let destination = task.destination().to_path_buf();
    let kind = task.kind();

    let mut handle = controller.start(task)?;
    let cancel = handle.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling download");
            cancel.cancel();
        }
    });

    let reporter = ProgressReporter::new(ctx.use_progress_bar, &label);
    while let Some(event) = handle.next_event().await {
        match event {
            DownloadEvent::Progress(progress) => reporter.update(&progress),
            DownloadEvent::Finished(outcome) => reporter.finish(&outcome),
        }
    }
    let outcome = handle.wait().await;
    interrupt.abort();

    match &outcome {
        Outcome::Succeeded { message } => {
            info!(path = %destination.display(), "{message}");
            println!("Saved to {}", destination.display());
        }
        Outcome::Cancelled => {
            if kind == TaskKind::File && destination.exists() {
                warn!(path = %destination.display(), "Download cancelled, partial file kept");
            } else {
                warn!("Download cancelled");
            }
        }
        Outcome::Failed { kind, message } => {
            error!(?kind, "Download failed: {message}");
        }
    }
    debug!(?outcome, "download finished");

    Ok(exit_handler::determine_exit_outcome(&outcome))
}

/// Downloads one URI of a list entry.
pub(crate) async fn run_get_command(args: &GetArgs, ctx: &RunContext) -> Result<ProcessExit> {
    let list = load_list(&args.list, ctx).await?;
    let entry = list.find(&args.entry)?;
    let Some(uri) = entry.uris.get(args.uri) else {
        bail!(
            "'{}' has {} URI(s); index {} is out of range",
            entry.display_title(),
            entry.uris.len(),
            args.uri
        );
    };
    info!(title = entry.display_title(), uri = %uri, "Downloading entry");
    run_download(uri, ctx).await
}
