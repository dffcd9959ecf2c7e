//! [`Multiplexer`] implementation backed by the tmux binary.

use super::commands::{
    self, NewSession, NewWindow, SetOption, SplitWindow, Tmux, rename_window, select_layout,
};
use crate::{
    error::{Error, Result},
    mux::{Multiplexer, Pane, Session, SplitSpec, Window, WindowSpec},
};

/// Drives a tmux server through its command line
#[derive(Debug, Clone, Default)]
pub struct TmuxClient {
    tmux: Tmux,
}

impl TmuxClient {
    /// Client for the default tmux server
    pub fn new() -> Self {
        Self::default()
    }

    /// Client for the server on a named socket (`tmux -L <name>`)
    pub fn with_socket_name(name: impl Into<String>) -> Self {
        Self {
            tmux: Tmux::with_socket_name(name),
        }
    }

    /// The underlying command runner
    pub fn tmux(&self) -> &Tmux {
        &self.tmux
    }
}

fn unexpected(command: &str, output: &str) -> Error {
    Error::UnexpectedOutput {
        command: command.to_string(),
        output: output.to_string(),
    }
}

/// Parse one line printed with `SESSION_FORMAT`
pub(crate) fn parse_session(command: &str, line: &str) -> Result<Session> {
    let (id, name) = line
        .split_once('\t')
        .ok_or_else(|| unexpected(command, line))?;
    Ok(Session {
        id: id.to_string(),
        name: name.to_string(),
    })
}

/// Parse one line printed with `WINDOW_FORMAT`
pub(crate) fn parse_window(command: &str, line: &str) -> Result<Window> {
    let mut parts = line.splitn(3, '\t');
    let (Some(id), Some(index), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(unexpected(command, line));
    };
    Ok(Window {
        id: id.to_string(),
        index: index.parse().map_err(|_| unexpected(command, line))?,
        name: name.to_string(),
    })
}

/// Parse one line printed with `PANE_FORMAT`
pub(crate) fn parse_pane(command: &str, line: &str) -> Result<Pane> {
    let (id, index) = line
        .split_once('\t')
        .ok_or_else(|| unexpected(command, line))?;
    Ok(Pane {
        id: id.to_string(),
        index: index.parse().map_err(|_| unexpected(command, line))?,
    })
}

fn new_window_command<'a>(session: &'a Session, spec: &WindowSpec<'a>) -> NewWindow<'a> {
    let mut cmd = NewWindow::new().target(&session.id);
    if let Some(name) = spec.name {
        cmd = cmd.name(name);
    }
    if let Some(dir) = spec.start_directory {
        cmd = cmd.start_directory(dir);
    }
    if let Some(initial) = spec.initial_command {
        cmd = cmd.command(initial);
    }
    cmd
}

fn split_command<'a>(target: &'a Pane, spec: &SplitSpec<'a>) -> SplitWindow<'a> {
    let mut cmd = SplitWindow::new().target(&target.id);
    if let Some(direction) = spec.direction {
        cmd = cmd.direction(direction);
    }
    if let Some(dir) = spec.start_directory {
        cmd = cmd.start_directory(dir);
    }
    cmd
}

fn parse_lines<T>(
    command: &str,
    stdout: &str,
    parse: fn(&str, &str) -> Result<T>,
) -> Result<Vec<T>> {
    stdout
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| parse(command, l))
        .collect()
}

impl Multiplexer for TmuxClient {
    fn has_session(&self, name: &str) -> Result<bool> {
        commands::has_session(&self.tmux, name)
    }

    fn new_session(&self, name: &str, start_directory: Option<&str>) -> Result<Session> {
        let mut cmd = NewSession::new().name(name).detached();
        if let Some(dir) = start_directory {
            cmd = cmd.start_directory(dir);
        }
        let stdout = cmd.run(&self.tmux)?;
        parse_session("new-session", &stdout)
    }

    fn list_windows(&self, session: &Session) -> Result<Vec<Window>> {
        let stdout = commands::list_windows(&self.tmux, &session.id)?;
        let mut windows = parse_lines("list-windows", &stdout, parse_window)?;
        windows.sort_by_key(|w| w.index);
        Ok(windows)
    }

    fn list_panes(&self, window: &Window) -> Result<Vec<Pane>> {
        let stdout = commands::list_panes(&self.tmux, &window.id)?;
        let mut panes = parse_lines("list-panes", &stdout, parse_pane)?;
        panes.sort_by_key(|p| p.index);
        Ok(panes)
    }

    fn new_window(&self, session: &Session, spec: &WindowSpec<'_>) -> Result<Window> {
        let stdout = new_window_command(session, spec).run(&self.tmux)?;
        parse_window("new-window", &stdout)
    }

    fn split_pane(&self, _window: &Window, target: &Pane, spec: &SplitSpec<'_>) -> Result<Pane> {
        let stdout = split_command(target, spec).run(&self.tmux)?;
        parse_pane("split-window", &stdout)
    }

    fn respawn_pane(
        &self,
        pane: &Pane,
        start_directory: Option<&str>,
        command: &str,
    ) -> Result<()> {
        commands::respawn_pane(&self.tmux, &pane.id, start_directory, command)
    }

    fn rename_window(&self, window: &Window, name: &str) -> Result<()> {
        rename_window(&self.tmux, &window.id, name)
    }

    fn select_layout(&self, window: &Window, layout: &str) -> Result<()> {
        select_layout(&self.tmux, &window.id, layout)
    }

    fn set_window_option(&self, window: &Window, key: &str, value: &str) -> Result<()> {
        SetOption::new()
            .window()
            .target(&window.id)
            .option(key)
            .value(value)
            .run(&self.tmux)
    }

    fn send_keys(&self, pane: &Pane, keys: &str, enter: bool) -> Result<()> {
        commands::send_keys(&self.tmux, &pane.id, keys, enter)
    }
}
