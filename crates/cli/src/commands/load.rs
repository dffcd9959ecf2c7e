//! `mosaic load`: build a workspace file into a new tmux session.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use mosaic_core::{
    BuildOptions, Error, Multiplexer, TmuxClient, load_config, load_workspace,
    tmux::{attach_session, kill_session},
};

use crate::cli::LoadArgs;

/// Load a workspace file, build it, and attach unless `--detached`.
///
/// An already running session with the same name is never rebuilt; the user
/// is offered to attach to it instead. If the build fails halfway, the
/// partial session is left for the user to kill, attach to, or keep.
pub fn run(client: &TmuxClient, args: LoadArgs) -> Result<()> {
    let config = load_config(&args.config, args.session_name.as_deref())
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let options = BuildOptions {
        reuse_initial_window: true,
        split_direction: args.split,
    };

    match load_workspace(client, &config, &options) {
        Ok((session, report)) => {
            let windows_word = if report.windows.len() == 1 {
                "window"
            } else {
                "windows"
            };
            let panes_word = if report.pane_count() == 1 {
                "pane"
            } else {
                "panes"
            };
            eprintln!(
                "{} {} session {} ({} {}, {} {})",
                "✔".green(),
                "Created".dimmed(),
                session.name.blue(),
                report.windows.len(),
                windows_word,
                report.pane_count(),
                panes_word
            );

            if !args.detached {
                attach_session(client.tmux(), &session.name)?;
            }
            Ok(())
        }
        Err(Error::SessionExists { session }) => {
            eprintln!(
                "{} Session {} is already running",
                "!".yellow(),
                session.blue()
            );
            if args.detached {
                return Ok(());
            }

            let attach = args.yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Attach to it?")
                    .default(true)
                    .interact()?;
            if attach {
                attach_session(client.tmux(), &session)?;
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✘".red(), e);
            handle_partial_session(client, &config.name, args.yes)?;
            Err(e).context("Failed to build workspace")
        }
    }
}

/// Ask what to do with a session left behind by a failed build
fn handle_partial_session(client: &TmuxClient, name: &str, non_interactive: bool) -> Result<()> {
    if !client.has_session(name)? {
        return Ok(());
    }

    if non_interactive {
        eprintln!(
            "{} Partial session {} left running. Remove it with '{}'",
            "!".yellow(),
            name.blue(),
            format!("mosaic kill {}", name).blue()
        );
        return Ok(());
    }

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Session {} was only partly built", name))
        .items(&["Kill it", "Attach to it", "Leave it detached"])
        .default(0)
        .interact()?;

    match choice {
        0 => {
            kill_session(client.tmux(), name)?;
            eprintln!("{} {} {}", "✔".green(), "Killed".dimmed(), name.blue());
        }
        1 => attach_session(client.tmux(), name)?,
        _ => {}
    }
    Ok(())
}
