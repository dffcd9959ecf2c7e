//! Low-level tmux command wrappers
//!
//! This module provides builder-pattern wrappers for the tmux commands the
//! workspace builder issues. Builders expose `args()` so the argv can be
//! checked without a tmux server.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::{
    error::{Error, Result},
    mux::SplitDirection,
};

/// Handle on a tmux server, optionally on a named socket (`tmux -L`)
#[derive(Debug, Clone, Default)]
pub struct Tmux {
    socket_name: Option<String>,
}

impl Tmux {
    /// Talk to the server listening on a named socket
    pub fn with_socket_name(name: impl Into<String>) -> Self {
        Self {
            socket_name: Some(name.into()),
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket_name {
            cmd.args(["-L", socket]);
        }
        cmd.args(args);
        cmd
    }

    /// Execute a tmux command and return its trimmed stdout
    pub fn run(&self, args: &[String]) -> Result<String> {
        debug!(args = ?args, "tmux");
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(Error::Spawn)?;

        if !output.status.success() {
            return Err(Error::Command {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Execute a tmux command and report only whether it succeeded
    pub fn status(&self, args: &[String]) -> Result<bool> {
        debug!(args = ?args, "tmux");
        Ok(self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(Error::Spawn)?
            .success())
    }

    /// Hand the terminal over to tmux (attach/switch)
    pub fn interactive(&self, args: &[String]) -> Result<()> {
        let status = self.command(args).status().map_err(Error::Spawn)?;
        if !status.success() {
            return Err(Error::Command {
                command: args.join(" "),
                stderr: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Formats
// =============================================================================

/// Format used to read back sessions
pub const SESSION_FORMAT: &str = "#{session_id}\t#{session_name}";
/// Format used to read back windows
pub const WINDOW_FORMAT: &str = "#{window_id}\t#{window_index}\t#{window_name}";
/// Format used to read back panes
pub const PANE_FORMAT: &str = "#{pane_id}\t#{pane_index}";
/// Format used by `mosaic ls`
pub const SESSION_LIST_FORMAT: &str = "#{session_name}\t#{session_windows}\t#{session_attached}";

// =============================================================================
// Session Commands
// =============================================================================

/// Check if we're currently inside a tmux session
pub fn in_tmux() -> bool {
    std::env::var("TMUX").is_ok()
}

/// Information about a running session, as shown by `mosaic ls`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session name
    pub name: String,
    /// Number of windows
    pub windows: u32,
    /// Whether clients are attached
    pub attached: bool,
}

/// Parse `list-sessions` output produced with [`SESSION_LIST_FORMAT`]
pub fn parse_session_list(stdout: &str) -> Vec<SessionInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 3 {
                return None;
            }
            Some(SessionInfo {
                name: parts[0].to_string(),
                windows: parts[1].parse().unwrap_or(0),
                attached: parts[2] != "0",
            })
        })
        .collect()
}

/// List all tmux sessions
pub fn list_sessions(tmux: &Tmux) -> Result<Vec<SessionInfo>> {
    match tmux.run(&strings(&["list-sessions", "-F", SESSION_LIST_FORMAT])) {
        Ok(stdout) => Ok(parse_session_list(&stdout)),
        // No server running means no sessions
        Err(Error::Command { .. }) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Check if a tmux session exists
pub fn has_session(tmux: &Tmux, name: &str) -> Result<bool> {
    // `=` forces an exact match instead of tmux's prefix matching
    tmux.status(&strings(&["has-session", "-t", &format!("={}", name)]))
}

/// Kill a tmux session
pub fn kill_session(tmux: &Tmux, name: &str) -> Result<()> {
    tmux.run(&strings(&["kill-session", "-t", &format!("={}", name)]))
        .map(|_| ())
}

/// Attach to a session, or switch to it when already inside tmux
pub fn attach_session(tmux: &Tmux, name: &str) -> Result<()> {
    let target = format!("={}", name);
    if in_tmux() {
        tmux.interactive(&strings(&["switch-client", "-t", &target]))
    } else {
        tmux.interactive(&strings(&["attach-session", "-t", &target]))
    }
}

/// Builder for creating new tmux sessions
#[derive(Default)]
pub struct NewSession<'a> {
    name: Option<&'a str>,
    detached: bool,
    start_dir: Option<&'a str>,
}

impl<'a> NewSession<'a> {
    /// Create a new session builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session name
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Start the session detached
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    /// Set the starting directory
    pub fn start_directory(mut self, dir: &'a str) -> Self {
        self.start_dir = Some(dir);
        self
    }

    /// Build the argv, printing the new session's id and name
    pub fn args(&self) -> Vec<String> {
        let mut args = strings(&["new-session"]);

        if self.detached {
            args.push("-d".to_string());
        }

        args.extend(strings(&["-P", "-F", SESSION_FORMAT]));

        if let Some(name) = self.name {
            args.push("-s".to_string());
            args.push(name.to_string());
        }

        if let Some(dir) = self.start_dir {
            args.push("-c".to_string());
            args.push(dir.to_string());
        }

        args
    }

    /// Execute the new-session command and return its stdout
    pub fn run(self, tmux: &Tmux) -> Result<String> {
        tmux.run(&self.args())
    }
}

// =============================================================================
// Window Commands
// =============================================================================

/// Builder for creating windows
#[derive(Default)]
pub struct NewWindow<'a> {
    target: Option<&'a str>,
    name: Option<&'a str>,
    start_dir: Option<&'a str>,
    shell_command: Option<&'a str>,
}

impl<'a> NewWindow<'a> {
    /// Create a new window builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target session
    pub fn target(mut self, target: &'a str) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the window name
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Set the starting directory
    pub fn start_directory(mut self, dir: &'a str) -> Self {
        self.start_dir = Some(dir);
        self
    }

    /// Set the command the first pane runs
    pub fn command(mut self, cmd: &'a str) -> Self {
        self.shell_command = Some(cmd);
        self
    }

    /// Build the argv
    pub fn args(&self) -> Vec<String> {
        let mut args = strings(&["new-window", "-d", "-P", "-F", WINDOW_FORMAT]);

        if let Some(target) = self.target {
            // A trailing colon appends after the last window of the session
            args.push("-t".to_string());
            args.push(format!("{}:", target));
        }

        if let Some(name) = self.name {
            args.push("-n".to_string());
            args.push(name.to_string());
        }

        if let Some(dir) = self.start_dir {
            args.push("-c".to_string());
            args.push(dir.to_string());
        }

        // Shell command must come last
        if let Some(cmd) = self.shell_command {
            args.push(cmd.to_string());
        }

        args
    }

    /// Execute the new-window command and return its stdout
    pub fn run(self, tmux: &Tmux) -> Result<String> {
        tmux.run(&self.args())
    }
}

/// Rename a tmux window
pub fn rename_window(tmux: &Tmux, target: &str, new_name: &str) -> Result<()> {
    tmux.run(&strings(&["rename-window", "-t", target, new_name]))
        .map(|_| ())
}

/// Apply a layout to a window
pub fn select_layout(tmux: &Tmux, target: &str, layout: &str) -> Result<()> {
    tmux.run(&strings(&["select-layout", "-t", target, layout]))
        .map(|_| ())
}

/// List windows of a session
pub fn list_windows(tmux: &Tmux, session: &str) -> Result<String> {
    tmux.run(&strings(&["list-windows", "-t", session, "-F", WINDOW_FORMAT]))
}

// =============================================================================
// Pane Commands
// =============================================================================

/// Builder for splitting windows
#[derive(Default)]
pub struct SplitWindow<'a> {
    target: Option<&'a str>,
    direction: Option<SplitDirection>,
    start_dir: Option<&'a str>,
}

impl<'a> SplitWindow<'a> {
    /// Create a new split window builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target pane
    pub fn target(mut self, target: &'a str) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the split direction
    pub fn direction(mut self, direction: SplitDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Set the starting directory
    pub fn start_directory(mut self, dir: &'a str) -> Self {
        self.start_dir = Some(dir);
        self
    }

    /// Build the argv
    pub fn args(&self) -> Vec<String> {
        let mut args = strings(&["split-window", "-d"]);

        if let Some(target) = self.target {
            args.push("-t".to_string());
            args.push(target.to_string());
        }

        match self.direction {
            Some(SplitDirection::Horizontal) => args.push("-h".to_string()),
            Some(SplitDirection::Vertical) => args.push("-v".to_string()),
            None => {}
        }

        if let Some(dir) = self.start_dir {
            args.push("-c".to_string());
            args.push(dir.to_string());
        }

        // Print the new pane instead of nothing
        args.extend(strings(&["-P", "-F", PANE_FORMAT]));

        args
    }

    /// Run the split-window command and return its stdout
    pub fn run(self, tmux: &Tmux) -> Result<String> {
        tmux.run(&self.args())
    }
}

/// List panes of a window
pub fn list_panes(tmux: &Tmux, window: &str) -> Result<String> {
    tmux.run(&strings(&["list-panes", "-t", window, "-F", PANE_FORMAT]))
}

/// Build the argv that types `keys` literally into a pane.
///
/// `--` keeps keys starting with `-` from being read as flags.
pub fn send_keys_args(target: &str, keys: &str) -> Vec<String> {
    strings(&["send-keys", "-t", target, "-l", "--", keys])
}

/// Send keys to a pane, optionally pressing Enter afterwards.
///
/// `-l` makes tmux type the text as-is, so Enter has to be its own call.
pub fn send_keys(tmux: &Tmux, target: &str, keys: &str, enter: bool) -> Result<()> {
    if !keys.is_empty() {
        tmux.run(&send_keys_args(target, keys))?;
    }
    if enter {
        tmux.run(&strings(&["send-keys", "-t", target, "Enter"]))?;
    }
    Ok(())
}

/// Build the argv that replaces a pane's process with `command`
pub fn respawn_pane_args(target: &str, start_dir: Option<&str>, command: &str) -> Vec<String> {
    let mut args = strings(&["respawn-pane", "-k", "-t", target]);
    if let Some(dir) = start_dir {
        args.push("-c".to_string());
        args.push(dir.to_string());
    }
    // Shell command must come last
    args.push(command.to_string());
    args
}

/// Kill whatever runs in a pane and start `command` in its place
pub fn respawn_pane(tmux: &Tmux, target: &str, start_dir: Option<&str>, command: &str) -> Result<()> {
    tmux.run(&respawn_pane_args(target, start_dir, command))
        .map(|_| ())
}

// =============================================================================
// Option Commands
// =============================================================================

/// Builder for setting tmux options
#[derive(Default)]
pub struct SetOption<'a> {
    target: Option<&'a str>,
    window: bool,
    option: Option<&'a str>,
    value: Option<&'a str>,
}

impl<'a> SetOption<'a> {
    /// Create a new set option builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target session/window
    pub fn target(mut self, target: &'a str) -> Self {
        self.target = Some(target);
        self
    }

    /// Set as a window option
    pub fn window(mut self) -> Self {
        self.window = true;
        self
    }

    /// Set the option name
    pub fn option(mut self, opt: &'a str) -> Self {
        self.option = Some(opt);
        self
    }

    /// Set the option value
    pub fn value(mut self, val: &'a str) -> Self {
        self.value = Some(val);
        self
    }

    /// Build the argv
    pub fn args(&self) -> Vec<String> {
        let mut args = strings(&["set-option"]);

        if self.window {
            args.push("-w".to_string());
        }

        if let Some(target) = self.target {
            args.push("-t".to_string());
            args.push(target.to_string());
        }

        if let Some(opt) = self.option {
            args.push(opt.to_string());
        }

        if let Some(val) = self.value {
            args.push(val.to_string());
        }

        args
    }

    /// Execute the set-option command
    pub fn run(self, tmux: &Tmux) -> Result<()> {
        tmux.run(&self.args()).map(|_| ())
    }
}
