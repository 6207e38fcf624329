//! Settings for one invocation: CLI flags layered over the config file.

use std::path::PathBuf;

use dlist_core::catalog::DEFAULT_PAGE_SIZE;
use dlist_core::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, TORRENT_LISTEN_PORT};

use crate::app::config::{self, FileConfig};
use crate::cli::TransferArgs;

/// Resolved values shared by all commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunContext {
    pub(crate) output_dir: PathBuf,
    pub(crate) cache_dir: PathBuf,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) read_timeout_secs: u64,
    pub(crate) listen_port: u16,
    pub(crate) page_size: usize,
    pub(crate) use_progress_bar: bool,
}

impl RunContext {
    /// CLI value, else config value, else built-in default.
    pub(crate) fn resolve(
        file_config: Option<&FileConfig>,
        transfer: &TransferArgs,
        use_progress_bar: bool,
    ) -> Self {
        let file = file_config.cloned().unwrap_or_default();
        let output_dir = transfer
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let cache_dir = file
            .cache_dir
            .unwrap_or_else(config::resolve_default_cache_dir);
        let connect_secs = transfer
            .connect_timeout
            .or(file.connect_timeout_secs)
            .unwrap_or(CONNECT_TIMEOUT_SECS);
        let read_secs = transfer
            .read_timeout
            .or(file.read_timeout_secs)
            .unwrap_or(READ_TIMEOUT_SECS);
        let listen_port = transfer
            .listen_port
            .or(file.torrent_listen_port)
            .unwrap_or(TORRENT_LISTEN_PORT);
        let page_size = file
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            output_dir,
            cache_dir,
            connect_timeout_secs: connect_secs,
            read_timeout_secs: read_secs,
            listen_port,
            page_size,
            use_progress_bar,
        }
    }
}
