use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use mosaic_core::SplitDirection;

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(about = "Build tmux workspaces from YAML or JSON workspace files")]
#[command(version)]
pub struct Cli {
    /// tmux socket name, passed to tmux as -L
    #[arg(
        short = 'L',
        long = "socket-name",
        value_name = "SOCKET",
        env = "MOSAIC_SOCKET_NAME",
        global = true
    )]
    pub socket_name: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a workspace from a file and attach to it
    Load(LoadArgs),

    /// Validate a workspace file and print the resolved config as JSON
    Check(CheckArgs),

    /// List running tmux sessions
    #[command(visible_alias = "ls")]
    List,

    /// Kill a tmux session
    Kill {
        /// Name of the session to kill
        name: String,

        /// Don't ask for confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
}

/// Arguments for `mosaic load`
#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// Workspace file (.yaml, .yml or .json)
    #[arg(value_name = "FILE")]
    pub config: PathBuf,

    /// Session name, overriding (or supplying) session_name from the file
    #[arg(short = 's', long = "session-name", value_name = "NAME")]
    pub session_name: Option<String>,

    /// Build the session without attaching to it
    #[arg(short = 'd', long = "detached")]
    pub detached: bool,

    /// Answer yes to every prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Default split direction: horizontal (h) or vertical (v)
    #[arg(long = "split", value_name = "DIRECTION")]
    pub split: Option<SplitDirection>,
}

/// Arguments for `mosaic check`
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Workspace file (.yaml, .yml or .json)
    #[arg(value_name = "FILE")]
    pub config: PathBuf,

    /// Session name, overriding (or supplying) session_name from the file
    #[arg(short = 's', long = "session-name", value_name = "NAME")]
    pub session_name: Option<String>,
}
