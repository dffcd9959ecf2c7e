//! In-memory multiplexer used by the unit tests.
//!
//! It keeps just enough tmux state (sessions, windows, pane ordering) to hand
//! out ids and indices the way tmux does, and records every call so tests can
//! assert on ordering.

use std::cell::RefCell;

use crate::{
    error::{Error, Result},
    mux::{Multiplexer, Pane, Session, SplitDirection, SplitSpec, Window, WindowSpec},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    HasSession(String),
    NewSession {
        name: String,
        start_directory: Option<String>,
    },
    ListWindows(String),
    ListPanes(String),
    NewWindow {
        name: Option<String>,
        start_directory: Option<String>,
        initial_command: Option<String>,
    },
    SplitPane {
        window: String,
        target: String,
        start_directory: Option<String>,
        direction: Option<SplitDirection>,
    },
    RespawnPane {
        pane: String,
        start_directory: Option<String>,
        command: String,
    },
    RenameWindow(String, String),
    SelectLayout(String, String),
    SetOption(String, String, String),
    SendKeys(String, String, bool),
}

impl Call {
    /// Calls that change tmux state
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::HasSession(_) | Call::ListWindows(_) | Call::ListPanes(_)
        )
    }
}

#[derive(Debug)]
struct FakeWindow {
    id: String,
    index: u32,
    name: String,
    panes: Vec<String>,
}

#[derive(Debug)]
struct FakeSession {
    id: String,
    name: String,
    windows: Vec<FakeWindow>,
}

#[derive(Debug, Default)]
struct State {
    sessions: Vec<FakeSession>,
    next_session: u32,
    next_window: u32,
    next_pane: u32,
}

impl State {
    fn add_window(&mut self, session: usize, name: &str) -> Window {
        let pane_id = format!("%{}", self.next_pane);
        self.next_pane += 1;
        let id = format!("@{}", self.next_window);
        self.next_window += 1;

        let windows = &mut self.sessions[session].windows;
        let index = windows.iter().map(|w| w.index + 1).max().unwrap_or(0);
        windows.push(FakeWindow {
            id: id.clone(),
            index,
            name: name.to_string(),
            panes: vec![pane_id],
        });
        Window {
            id,
            index,
            name: name.to_string(),
        }
    }

    fn session_index(&self, id: &str) -> Result<usize> {
        self.sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn window_mut(&mut self, id: &str) -> Result<&mut FakeWindow> {
        self.sessions
            .iter_mut()
            .flat_map(|s| s.windows.iter_mut())
            .find(|w| w.id == id)
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(target: &str) -> Error {
    Error::Command {
        command: format!("-t {}", target),
        stderr: format!("can't find {}", target),
    }
}

type FailWhen = Box<dyn Fn(&Call) -> bool>;

/// Recording, state-simulating [`Multiplexer`]
#[derive(Default)]
pub struct FakeMux {
    state: RefCell<State>,
    calls: RefCell<Vec<Call>>,
    fail_when: Option<FailWhen>,
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call matching `predicate` fail (after it is recorded)
    pub fn failing(predicate: impl Fn(&Call) -> bool + 'static) -> Self {
        Self {
            fail_when: Some(Box::new(predicate)),
            ..Self::default()
        }
    }

    /// Create a session with its initial window without recording anything
    pub fn seed_session(&self, name: &str) -> Session {
        let mut state = self.state.borrow_mut();
        let id = format!("${}", state.next_session);
        state.next_session += 1;
        state.sessions.push(FakeSession {
            id: id.clone(),
            name: name.to_string(),
            windows: Vec::new(),
        });
        let last = state.sessions.len() - 1;
        state.add_window(last, "bash");
        Session {
            id,
            name: name.to_string(),
        }
    }

    /// Add a window to a seeded session without recording anything
    pub fn seed_window(&self, session: &Session, name: &str) -> Window {
        let mut state = self.state.borrow_mut();
        let idx = state.session_index(&session.id).unwrap();
        state.add_window(idx, name)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Current window names of a session, by index
    pub fn window_names(&self, session: &Session) -> Vec<String> {
        let state = self.state.borrow();
        let idx = state.session_index(&session.id).unwrap();
        let mut windows: Vec<_> = state.sessions[idx].windows.iter().collect();
        windows.sort_by_key(|w| w.index);
        windows.iter().map(|w| w.name.clone()).collect()
    }

    /// Pane ids of a window in index order
    pub fn pane_ids(&self, window: &Window) -> Vec<String> {
        self.state
            .borrow_mut()
            .window_mut(&window.id)
            .map(|w| w.panes.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: Call) -> Result<()> {
        let fail = self.fail_when.as_ref().is_some_and(|f| f(&call));
        let command = format!("{:?}", call);
        self.calls.borrow_mut().push(call);
        if fail {
            return Err(Error::Command {
                command,
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Multiplexer for FakeMux {
    fn has_session(&self, name: &str) -> Result<bool> {
        self.record(Call::HasSession(name.to_string()))?;
        Ok(self.state.borrow().sessions.iter().any(|s| s.name == name))
    }

    fn new_session(&self, name: &str, start_directory: Option<&str>) -> Result<Session> {
        self.record(Call::NewSession {
            name: name.to_string(),
            start_directory: start_directory.map(String::from),
        })?;
        if self.state.borrow().sessions.iter().any(|s| s.name == name) {
            return Err(Error::Command {
                command: "new-session".to_string(),
                stderr: format!("duplicate session: {}", name),
            });
        }
        Ok(self.seed_session(name))
    }

    fn list_windows(&self, session: &Session) -> Result<Vec<Window>> {
        self.record(Call::ListWindows(session.id.clone()))?;
        let state = self.state.borrow();
        let idx = state.session_index(&session.id)?;
        let mut windows: Vec<Window> = state.sessions[idx]
            .windows
            .iter()
            .map(|w| Window {
                id: w.id.clone(),
                index: w.index,
                name: w.name.clone(),
            })
            .collect();
        windows.sort_by_key(|w| w.index);
        Ok(windows)
    }

    fn list_panes(&self, window: &Window) -> Result<Vec<Pane>> {
        self.record(Call::ListPanes(window.id.clone()))?;
        let mut state = self.state.borrow_mut();
        let w = state.window_mut(&window.id)?;
        Ok(w.panes
            .iter()
            .enumerate()
            .map(|(i, id)| Pane {
                id: id.clone(),
                index: i as u32,
            })
            .collect())
    }

    fn new_window(&self, session: &Session, spec: &WindowSpec<'_>) -> Result<Window> {
        self.record(Call::NewWindow {
            name: spec.name.map(String::from),
            start_directory: spec.start_directory.map(String::from),
            initial_command: spec.initial_command.map(String::from),
        })?;
        let mut state = self.state.borrow_mut();
        let idx = state.session_index(&session.id)?;
        Ok(state.add_window(idx, spec.name.unwrap_or("bash")))
    }

    fn split_pane(&self, window: &Window, target: &Pane, spec: &SplitSpec<'_>) -> Result<Pane> {
        self.record(Call::SplitPane {
            window: window.id.clone(),
            target: target.id.clone(),
            start_directory: spec.start_directory.map(String::from),
            direction: spec.direction,
        })?;
        let mut state = self.state.borrow_mut();
        let id = format!("%{}", state.next_pane);
        state.next_pane += 1;
        let w = state.window_mut(&window.id)?;
        let pos = w
            .panes
            .iter()
            .position(|p| *p == target.id)
            .ok_or_else(|| not_found(&target.id))?;
        w.panes.insert(pos + 1, id.clone());
        Ok(Pane {
            id,
            index: (pos + 1) as u32,
        })
    }

    fn respawn_pane(
        &self,
        pane: &Pane,
        start_directory: Option<&str>,
        command: &str,
    ) -> Result<()> {
        self.record(Call::RespawnPane {
            pane: pane.id.clone(),
            start_directory: start_directory.map(String::from),
            command: command.to_string(),
        })
    }

    fn rename_window(&self, window: &Window, name: &str) -> Result<()> {
        self.record(Call::RenameWindow(window.id.clone(), name.to_string()))?;
        self.state.borrow_mut().window_mut(&window.id)?.name = name.to_string();
        Ok(())
    }

    fn select_layout(&self, window: &Window, layout: &str) -> Result<()> {
        self.record(Call::SelectLayout(window.id.clone(), layout.to_string()))
    }

    fn set_window_option(&self, window: &Window, key: &str, value: &str) -> Result<()> {
        self.record(Call::SetOption(
            window.id.clone(),
            key.to_string(),
            value.to_string(),
        ))
    }

    fn send_keys(&self, pane: &Pane, keys: &str, enter: bool) -> Result<()> {
        self.record(Call::SendKeys(pane.id.clone(), keys.to_string(), enter))
    }
}
