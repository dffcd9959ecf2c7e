//! `mosaic check`: validate a workspace file without touching tmux.

use anyhow::{Context, Result};
use colored::Colorize;
use mosaic_core::load_config;

use crate::cli::CheckArgs;

/// Print the resolved config as JSON, with a one-line summary on stderr
pub fn run(args: CheckArgs) -> Result<()> {
    let config = load_config(&args.config, args.session_name.as_deref())
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    let panes: usize = config.windows.iter().map(|w| w.leaves().len()).sum();
    eprintln!(
        "{} {} {} ({} windows, {} panes)",
        "✔".green(),
        "Valid".dimmed(),
        config.name.blue(),
        config.windows.len(),
        panes
    );
    Ok(())
}
