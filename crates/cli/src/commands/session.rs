//! Session management commands for mosaic.
//!
//! - Listing running sessions
//! - Killing a session

use anyhow::Result;
use colored::Colorize;
use mosaic_core::{
    Multiplexer, TmuxClient, tmux_session_name,
    tmux::{kill_session, list_sessions},
};

// =============================================================================
// Session Listing
// =============================================================================

/// List running tmux sessions.
pub fn do_list_sessions(client: &TmuxClient) -> Result<()> {
    let sessions = list_sessions(client.tmux())?;

    if sessions.is_empty() {
        println!("{}", "No tmux sessions running".dimmed());
        return Ok(());
    }

    use comfy_table::{Table, presets::NOTHING};

    let mut table = Table::new();
    table.load_preset(NOTHING);

    for session in &sessions {
        let attached = if session.attached {
            "(attached)".green().to_string()
        } else {
            String::new()
        };

        let windows_label = if session.windows == 1 {
            "window"
        } else {
            "windows"
        };
        table.add_row(vec![
            session.name.blue().to_string(),
            format!("{} {}", session.windows, windows_label)
                .dimmed()
                .to_string(),
            attached,
        ]);
    }

    println!("{table}");

    Ok(())
}

// =============================================================================
// Session Killing
// =============================================================================

/// Kill a session by name, confirming first unless `skip_confirm`.
pub fn do_kill_session(client: &TmuxClient, name: &str, skip_confirm: bool) -> Result<()> {
    let name = &tmux_session_name(name.to_string());
    if !client.has_session(name)? {
        eprintln!("{} No session named {}", "✘".red(), name.blue());
        std::process::exit(1);
    }

    if !skip_confirm {
        use dialoguer::{Confirm, theme::ColorfulTheme};
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Kill session {}?", name))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    kill_session(client.tmux(), name)?;
    eprintln!("{} {} {}", "✔".green(), "Killed".dimmed(), name.blue());

    Ok(())
}
