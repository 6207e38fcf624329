//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Browse JSON download lists and fetch their entries.
///
/// A download list is a JSON document with a `name` and a `downloads`
/// array of entries (title, URIs, size, upload date, rating). Entries can be
/// fetched over HTTP or, when built with the `torrent` feature, BitTorrent.
#[derive(Parser, Debug)]
#[command(name = "dlist")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show one page of a list
    List(ListArgs),

    /// Find entries whose title contains a term (case-insensitive)
    Search(SearchArgs),

    /// Create an empty list
    New(NewArgs),

    /// Merge two or more lists, dropping duplicate titles
    Merge(MergeArgs),

    /// Write a copy of a list without ratings
    Export(ExportArgs),

    /// Fetch a list from a URL into the local cache
    Fetch(FetchArgs),

    /// Download one URI of a list entry
    Get(GetArgs),

    /// Download a URL, magnet link or .torrent directly
    Download(DownloadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// List file path or http(s) URL
    pub list: String,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Entries per page (default 400, or `page_size` from the config file)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=100_000))]
    pub page_size: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// List file path or http(s) URL
    pub list: String,

    /// Search term
    pub term: String,
}

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Name of the list
    pub name: String,

    /// Where to write the list
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Lists to merge; the first one provides the name
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Where to write the merged list
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// List file path or http(s) URL
    pub list: String,

    /// Where to write the exported list
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// URL of the list
    pub url: String,

    /// Ignore any cached copy
    #[arg(long)]
    pub refresh: bool,
}

/// Options shared by commands that start a download.
#[derive(Args, Debug, Clone, Default)]
pub struct TransferArgs {
    /// Directory to save into (default: current directory, or `output_dir` from the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP read timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Port the torrent engine listens on
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub listen_port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// List file path or http(s) URL
    pub list: String,

    /// Entry index (as shown by `list`) or exact title
    pub entry: String,

    /// Which of the entry's URIs to download (0-based)
    #[arg(short, long, default_value_t = 0)]
    pub uri: usize,

    #[command(flatten)]
    pub transfer: TransferArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// http(s) URL, magnet link or .torrent path/URL
    pub source: String,

    #[command(flatten)]
    pub transfer: TransferArgs,
}
