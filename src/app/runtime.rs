use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::ProcessExit;
use crate::app::config::{self, FileConfig};
use crate::app::context::RunContext;
use crate::app::{catalog_commands, download_orchestrator, terminal};
use crate::cli::{Cli, Command, TransferArgs};

pub(crate) async fn run_dlist() -> Result<ProcessExit> {
    let cli = Cli::parse();
    let file_config = config::load_default_file_config()?;

    let default_level = terminal::resolve_default_log_level(
        cli.quiet,
        cli.verbose,
        file_config.as_ref().and_then(|cfg| cfg.verbosity),
    );
    terminal::init_tracing(default_level, terminal::is_no_color_requested(&cli));
    debug!(?cli, "CLI arguments parsed");

    let use_progress_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        cli.quiet,
        terminal::is_dumb_terminal(),
    );
    run_command(&cli.command, file_config.as_ref(), use_progress_bar).await
}

/// Dispatches a parsed subcommand.
pub(crate) async fn run_command(
    command: &Command,
    file_config: Option<&FileConfig>,
    use_progress_bar: bool,
) -> Result<ProcessExit> {
    let no_transfer = TransferArgs::default();
    let transfer = match command {
        Command::Get(args) => &args.transfer,
        Command::Download(args) => &args.transfer,
        _ => &no_transfer,
    };
    let ctx = RunContext::resolve(file_config, transfer, use_progress_bar);

    match command {
        Command::List(args) => catalog_commands::run_list_command(args, &ctx).await?,
        Command::Search(args) => catalog_commands::run_search_command(args, &ctx).await?,
        Command::New(args) => catalog_commands::run_new_command(args)?,
        Command::Merge(args) => catalog_commands::run_merge_command(args)?,
        Command::Export(args) => catalog_commands::run_export_command(args, &ctx).await?,
        Command::Fetch(args) => {
            catalog_commands::run_fetch_command(args, &ctx).await?;
        }
        Command::Get(args) => return download_orchestrator::run_get_command(args, &ctx).await,
        Command::Download(args) => {
            return download_orchestrator::run_download(&args.source, &ctx).await;
        }
    }
    Ok(ProcessExit::Success)
}
