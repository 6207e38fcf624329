//! Application runtime composition modules.

pub(crate) mod catalog_commands;
pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod download_orchestrator;
pub(crate) mod exit_handler;
pub(crate) mod progress_manager;
pub(crate) mod runtime;
pub(crate) mod terminal;
