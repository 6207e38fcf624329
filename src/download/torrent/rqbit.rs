//! librqbit-backed torrent engine.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use librqbit::api::TorrentIdOrHash;
use librqbit::{
    AddTorrent, AddTorrentOptions, AddTorrentResponse, ManagedTorrentHandle, Session,
    SessionOptions,
};

use super::{TorrentBackend, TorrentConfig, TorrentId, TorrentSession, TorrentState, TorrentStatus};
use crate::download::error::DownloadError;

/// Opens a fresh librqbit session per task.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqbitBackend;

#[async_trait]
impl TorrentBackend for RqbitBackend {
    fn name(&self) -> &'static str {
        "librqbit"
    }

    async fn open_session(
        &self,
        config: &TorrentConfig,
        save_dir: &Path,
    ) -> Result<Box<dyn TorrentSession>, DownloadError> {
        let options = SessionOptions {
            listen_port_range: Some(config.listen_port_range()?),
            ..Default::default()
        };
        let session = Session::new_with_opts(save_dir.to_path_buf(), options)
            .await
            .map_err(|e| DownloadError::engine(save_dir.display().to_string(), e))?;
        Ok(Box::new(RqbitSession { session }))
    }
}

struct RqbitSession {
    session: Arc<Session>,
}

impl RqbitSession {
    fn handle(&self, id: TorrentId) -> Result<ManagedTorrentHandle, DownloadError> {
        self.session
            .get(TorrentIdOrHash::Id(id))
            .ok_or_else(|| DownloadError::engine(format!("torrent #{id}"), "not managed by session"))
    }
}

#[async_trait]
impl TorrentSession for RqbitSession {
    async fn add(&self, uri: &str, save_dir: &Path) -> Result<TorrentId, DownloadError> {
        let add = if uri.starts_with("magnet:") || uri.contains("://") {
            AddTorrent::from_url(uri)
        } else {
            AddTorrent::from_local_filename(uri).map_err(|e| DownloadError::engine(uri, e))?
        };
        let options = AddTorrentOptions {
            output_folder: Some(save_dir.display().to_string()),
            overwrite: true,
            ..Default::default()
        };
        let response = self
            .session
            .add_torrent(add, Some(options))
            .await
            .map_err(|e| DownloadError::engine(uri, e))?;
        match response {
            AddTorrentResponse::Added(id, _) | AddTorrentResponse::AlreadyManaged(id, _) => Ok(id),
            AddTorrentResponse::ListOnly(_) => {
                Err(DownloadError::engine(uri, "torrent was listed but not added"))
            }
        }
    }

    async fn has_metadata(&self, id: TorrentId) -> Result<bool, DownloadError> {
        Ok(self.handle(id)?.stats().total_bytes > 0)
    }

    async fn total_size(&self, id: TorrentId) -> Result<u64, DownloadError> {
        Ok(self.handle(id)?.stats().total_bytes)
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    async fn status(&self, id: TorrentId) -> Result<TorrentStatus, DownloadError> {
        let stats = self.handle(id)?.stats();
        let (download_rate_bps, upload_rate_bps, peers) =
            stats.live.as_ref().map_or((0, 0, 0), |live| {
                (
                    mib_per_sec_to_bps(live.download_speed.mbps),
                    mib_per_sec_to_bps(live.upload_speed.mbps),
                    u32::try_from(live.snapshot.peer_stats.live).unwrap_or(u32::MAX),
                )
            });
        let progress = if stats.total_bytes > 0 {
            stats.progress_bytes as f64 / stats.total_bytes as f64
        } else {
            0.0
        };
        let state = if stats.finished {
            TorrentState::Finished
        } else if stats.live.is_some() {
            TorrentState::Downloading
        } else {
            TorrentState::CheckingFiles
        };
        Ok(TorrentStatus {
            state,
            progress,
            download_rate_bps,
            upload_rate_bps,
            peers,
            // librqbit does not tell seeds apart from other peers.
            seeds: 0,
            bytes_done: stats.progress_bytes,
            error: stats.error.clone(),
        })
    }

    async fn remove(&self, id: TorrentId) -> Result<(), DownloadError> {
        self.session
            .delete(TorrentIdOrHash::Id(id), false)
            .await
            .map_err(|e| DownloadError::engine(format!("torrent #{id}"), e))
    }

    async fn shutdown(&self) {
        self.session.stop().await;
    }
}

/// librqbit reports speeds in MiB/s.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mib_per_sec_to_bps(mib: f64) -> u64 {
    if mib.is_finite() && mib > 0.0 {
        (mib * 1024.0 * 1024.0) as u64
    } else {
        0
    }
}
