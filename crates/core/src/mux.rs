//! Multiplexer facade used by the workspace builder.
//!
//! The builder never talks to tmux directly. It drives a [`Multiplexer`],
//! which [`TmuxClient`](crate::tmux::TmuxClient) implements on top of the
//! `tmux` binary. The handle types here are plain snapshots of what tmux
//! reported when the object was created or listed; the multiplexer owns the
//! real objects.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A running tmux session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session id (`$1`)
    pub id: String,
    /// Session name
    pub name: String,
}

/// A window inside a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Window id (`@3`)
    pub id: String,
    /// Window index within the session
    pub index: u32,
    /// Window name at the time it was read
    pub name: String,
}

/// A pane inside a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    /// Pane id (`%5`)
    pub id: String,
    /// Pane index within its window
    pub index: u32,
}

/// Direction used when splitting a pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// New pane to the right (`split-window -h`)
    #[serde(alias = "h")]
    Horizontal,
    /// New pane below (`split-window -v`)
    #[serde(alias = "v")]
    Vertical,
}

impl std::str::FromStr for SplitDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "horizontal" | "h" => Ok(SplitDirection::Horizontal),
            "vertical" | "v" => Ok(SplitDirection::Vertical),
            _ => Err(format!(
                "unknown split direction: {} (expected horizontal or vertical)",
                s
            )),
        }
    }
}

/// Parameters for creating a window
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowSpec<'a> {
    /// Explicit window name; `None` leaves naming to tmux
    pub name: Option<&'a str>,
    /// Working directory of the initial pane
    pub start_directory: Option<&'a str>,
    /// Command the initial pane runs instead of the default shell
    pub initial_command: Option<&'a str>,
}

/// Parameters for splitting a pane
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitSpec<'a> {
    /// Working directory of the new pane
    pub start_directory: Option<&'a str>,
    /// Split direction; `None` uses tmux's default
    pub direction: Option<SplitDirection>,
}

/// The operations the builder needs from a terminal multiplexer.
///
/// Every call is synchronous and mutates live state that later calls depend
/// on, so implementations must complete the operation before returning.
pub trait Multiplexer {
    /// Check whether a session with this name exists
    fn has_session(&self, name: &str) -> Result<bool>;

    /// Create a detached session
    fn new_session(&self, name: &str, start_directory: Option<&str>) -> Result<Session>;

    /// List the windows of a session, ordered by index
    fn list_windows(&self, session: &Session) -> Result<Vec<Window>>;

    /// List the panes of a window, ordered by index
    fn list_panes(&self, window: &Window) -> Result<Vec<Pane>>;

    /// Create a window at the end of the session
    fn new_window(&self, session: &Session, spec: &WindowSpec<'_>) -> Result<Window>;

    /// Split `target` and return the new pane
    fn split_pane(&self, window: &Window, target: &Pane, spec: &SplitSpec<'_>) -> Result<Pane>;

    /// Replace the process running in a pane with `command`
    fn respawn_pane(&self, pane: &Pane, start_directory: Option<&str>, command: &str)
    -> Result<()>;

    /// Rename a window
    fn rename_window(&self, window: &Window, name: &str) -> Result<()>;

    /// Apply a named layout to a window
    fn select_layout(&self, window: &Window, layout: &str) -> Result<()>;

    /// Set a window option
    fn set_window_option(&self, window: &Window, key: &str, value: &str) -> Result<()>;

    /// Type `keys` literally into a pane, optionally followed by Enter
    fn send_keys(&self, pane: &Pane, keys: &str, enter: bool) -> Result<()>;
}
