//! Mosaic CLI - declarative tmux workspaces.
//!
//! Mosaic reads a workspace file describing a session, its windows and their
//! panes, and builds it in tmux. Core functionality (config parsing, the
//! workspace builder, tmux commands) is in `mosaic-core`.
//!
//! # Workflow
//!
//! 1. User runs `mosaic load workspace.yaml`
//! 2. The file is parsed and validated before tmux is touched
//! 3. A detached session is created and its first window reused
//! 4. Windows and panes are built in file order, then options and layouts
//! 5. The terminal is attached to (or switched to) the new session

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use mosaic_core::TmuxClient;
use tracing_subscriber::EnvFilter;

/// Entry point for the mosaic CLI.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = match &cli.socket_name {
        Some(name) => TmuxClient::with_socket_name(name),
        None => TmuxClient::new(),
    };

    match cli.command {
        Commands::Load(args) => commands::load::run(&client, args),
        Commands::Check(args) => commands::check::run(args),
        Commands::List => commands::session::do_list_sessions(&client),
        Commands::Kill { name, yes } => commands::session::do_kill_session(&client, &name, yes),
    }
}

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
