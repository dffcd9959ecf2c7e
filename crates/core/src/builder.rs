//! Workspace building: turning a [`SessionConfig`] into live tmux objects.
//!
//! # Build Order
//!
//! Every step mutates state the next step depends on, so the builder issues
//! one multiplexer call at a time, in this order, for each window:
//!
//! 1. **Window**: reuse the session's initial window for the first config
//!    entry (when allowed), otherwise create a new window. A reused window
//!    with a `window_shell` gets its pane respawned with that command
//! 2. **Panes**: the window's initial pane takes the first leaf; every later
//!    leaf splits the most recently created pane, depth-first through groups
//! 3. **Commands**: each leaf's commands are typed into its pane, one Enter per
//!    command
//! 4. **Options**: window options in declared order, then `automatic-rename`
//! 5. **Layout**: last, because every split changes the geometry
//!
//! A failed call aborts the build and is returned with the window (and pane)
//! it happened in. Nothing already created is rolled back.

use tracing::{debug, info};

use crate::{
    config::{LeafId, LeafPane, PaneConfig, RawSession, SessionConfig, WindowConfig},
    error::{Error, Result},
    mux::{Multiplexer, Pane, Session, SplitDirection, SplitSpec, Window, WindowSpec},
};

const OPT_AUTOMATIC_RENAME: &str = "automatic-rename";

/// Knobs for a build pass
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Use the session's single initial window for the first window config.
    ///
    /// The session must hold exactly one window with one pane, otherwise the
    /// build fails with [`Error::ReuseConflict`] before touching anything.
    pub reuse_initial_window: bool,
    /// Split direction when neither the window nor a pane group sets one.
    /// `None` leaves the choice to tmux.
    pub split_direction: Option<SplitDirection>,
}

/// A window produced by a build, with its panes keyed by leaf id
#[derive(Debug, Clone)]
pub struct BuiltWindow {
    /// Position of the window config this was built from
    pub position: usize,
    /// The live window
    pub window: Window,
    /// Whether this was the session's initial window
    pub reused: bool,
    /// Panes in creation order
    pub panes: Vec<(LeafId, Pane)>,
}

/// Side mapping from config nodes to the live objects built for them
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub windows: Vec<BuiltWindow>,
}

impl BuildReport {
    /// The pane built for a leaf of the window at `position`
    pub fn pane(&self, position: usize, leaf: LeafId) -> Option<&Pane> {
        self.windows
            .iter()
            .find(|w| w.position == position)?
            .panes
            .iter()
            .find(|(id, _)| *id == leaf)
            .map(|(_, pane)| pane)
    }

    /// Total number of panes built
    pub fn pane_count(&self) -> usize {
        self.windows.iter().map(|w| w.panes.len()).sum()
    }

    /// Pair each built window with the config it came from
    pub fn with_config<'a>(
        &'a self,
        config: &'a SessionConfig,
    ) -> impl Iterator<Item = (&'a BuiltWindow, &'a WindowConfig)> {
        self.windows
            .iter()
            .filter_map(|built| Some((built, config.windows.get(built.position)?)))
    }
}

/// Builds a workspace from a validated config
#[derive(Debug, Clone)]
pub struct WorkspaceBuilder {
    config: SessionConfig,
    options: BuildOptions,
}

impl WorkspaceBuilder {
    /// Create a builder for an already-validated config
    pub fn new(config: SessionConfig, options: BuildOptions) -> Self {
        Self { config, options }
    }

    /// Validate a raw config and create a builder.
    ///
    /// Fails with [`Error::MissingSessionName`] (or another configuration
    /// error) without any multiplexer involvement.
    pub fn from_raw(raw: RawSession, options: BuildOptions) -> Result<Self> {
        Ok(Self::new(SessionConfig::from_raw(raw)?, options))
    }

    /// The config being built
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Build every window of the config into `session`
    pub fn build<M: Multiplexer + ?Sized>(&self, mux: &M, session: &Session) -> Result<BuildReport> {
        let mut initial = self.initial_window(mux, session)?;
        let mut report = BuildReport::default();

        for wconf in &self.config.windows {
            let (window, reused) = match initial.take() {
                Some(window) => (self.adopt_window(mux, window, wconf)?, true),
                None => (self.create_window(mux, session, wconf)?, false),
            };

            let panes = self.fill_window(mux, &window, wconf, reused)?;
            self.apply_settings(mux, &window, wconf)?;

            info!(
                session = %session.name,
                window = %window.id,
                index = window.index,
                panes = panes.len(),
                reused,
                "built window"
            );
            report.windows.push(BuiltWindow {
                position: wconf.position,
                window,
                reused,
                panes,
            });
        }

        Ok(report)
    }

    /// Find the window to reuse, if reuse was requested
    fn initial_window<M: Multiplexer + ?Sized>(
        &self,
        mux: &M,
        session: &Session,
    ) -> Result<Option<Window>> {
        if !self.options.reuse_initial_window {
            return Ok(None);
        }

        let windows = mux.list_windows(session)?;
        let panes = match windows.as_slice() {
            [only] => mux.list_panes(only)?.len(),
            _ => 0,
        };
        if windows.len() != 1 || panes != 1 {
            return Err(Error::ReuseConflict {
                session: session.name.clone(),
                windows: windows.len(),
                panes,
            });
        }

        Ok(windows.into_iter().next())
    }

    fn adopt_window<M: Multiplexer + ?Sized>(
        &self,
        mux: &M,
        mut window: Window,
        wconf: &WindowConfig,
    ) -> Result<Window> {
        if let Some(name) = &wconf.name
            && *name != window.name
        {
            mux.rename_window(&window, name)
                .map_err(|e| window_error(wconf, "rename-window", e))?;
            window.name = name.clone();
        }
        debug!(window = %window.id, "reusing initial window");
        Ok(window)
    }

    /// Create the window for `wconf` at the end of the session
    pub fn create_window<M: Multiplexer + ?Sized>(
        &self,
        mux: &M,
        session: &Session,
        wconf: &WindowConfig,
    ) -> Result<Window> {
        let spec = WindowSpec {
            name: wconf.name.as_deref(),
            start_directory: wconf.start_directory.as_deref(),
            initial_command: wconf.window_shell.as_deref(),
        };
        mux.new_window(session, &spec)
            .map_err(|e| window_error(wconf, "new-window", e))
    }

    /// Place the window's leaves onto panes and send their commands
    fn fill_window<M: Multiplexer + ?Sized>(
        &self,
        mux: &M,
        window: &Window,
        wconf: &WindowConfig,
        reused: bool,
    ) -> Result<Vec<(LeafId, Pane)>> {
        let first = mux
            .list_panes(window)
            .map_err(|e| window_error(wconf, "list-panes", e))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                window_error(
                    wconf,
                    "list-panes",
                    Error::UnexpectedOutput {
                        command: format!("list-panes -t {}", window.id),
                        output: String::new(),
                    },
                )
            })?;

        // A reused pane already runs a shell: swap in window_shell, started in
        // the first leaf's directory
        let mut reused = reused;
        if reused && let Some(shell) = &wconf.window_shell {
            let leaves = wconf.leaves();
            let dir = leaves.first().and_then(|l| l.start_directory.as_deref());
            mux.respawn_pane(&first, dir, shell)
                .map_err(|e| window_error(wconf, "respawn-pane", e))?;
            debug!(window = %window.id, pane = %first.id, shell = %shell, "respawned initial pane");
            reused = false;
        }

        let direction = wconf.split.or(self.options.split_direction);
        let mut walk = PaneWalk {
            mux,
            window,
            position: wconf.position,
            initial: Some(first),
            reused,
            previous: None,
            created: Vec::new(),
        };
        walk.walk(&wconf.panes, direction, direction)?;
        Ok(walk.created)
    }

    /// Apply window options, then `automatic-rename`, then the layout
    pub fn apply_settings<M: Multiplexer + ?Sized>(
        &self,
        mux: &M,
        window: &Window,
        wconf: &WindowConfig,
    ) -> Result<()> {
        for (key, value) in &wconf.options {
            mux.set_window_option(window, key, value)
                .map_err(|e| window_error(wconf, "set-option", e))?;
        }

        if let Some(auto) = wconf.automatic_rename {
            let value = if auto { "on" } else { "off" };
            mux.set_window_option(window, OPT_AUTOMATIC_RENAME, value)
                .map_err(|e| window_error(wconf, "set-option", e))?;
        }

        if let Some(layout) = &wconf.layout {
            mux.select_layout(window, layout)
                .map_err(|e| window_error(wconf, "select-layout", e))?;
        }

        Ok(())
    }
}

fn window_error(wconf: &WindowConfig, step: &'static str, source: Error) -> Error {
    Error::Window {
        window: wconf.position,
        name: wconf.display_name(),
        step,
        source: Box::new(source),
    }
}

/// Quote a path for a POSIX shell
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Depth-first placement of a window's leaves onto live panes
struct PaneWalk<'a, M: Multiplexer + ?Sized> {
    mux: &'a M,
    window: &'a Window,
    position: usize,
    /// The pane tmux created with the window, until the first leaf takes it
    initial: Option<Pane>,
    reused: bool,
    previous: Option<Pane>,
    created: Vec<(LeafId, Pane)>,
}

impl<M: Multiplexer + ?Sized> PaneWalk<'_, M> {
    /// Place `panes`. Splits between siblings use `direction`; the split that
    /// creates the first sibling belongs to the enclosing list and uses `lead`.
    fn walk(
        &mut self,
        panes: &[PaneConfig],
        direction: Option<SplitDirection>,
        lead: Option<SplitDirection>,
    ) -> Result<()> {
        for (i, pane) in panes.iter().enumerate() {
            let entry_direction = if i == 0 { lead } else { direction };
            match pane {
                PaneConfig::Leaf(leaf) => self.place(leaf, entry_direction)?,
                PaneConfig::Split(group) => {
                    self.walk(&group.children, group.split.or(direction), entry_direction)?
                }
            }
        }
        Ok(())
    }

    fn place(&mut self, leaf: &LeafPane, direction: Option<SplitDirection>) -> Result<()> {
        let window = self.position;
        let pane_error = |source| Error::Pane {
            window,
            pane: leaf.id.0,
            source: Box::new(source),
        };

        let pane = match (self.initial.take(), &self.previous) {
            (Some(initial), _) => {
                // A reused pane already has a shell in some other directory
                if self.reused
                    && let Some(dir) = &leaf.start_directory
                {
                    self.mux
                        .send_keys(&initial, &format!("cd {}", shell_quote(dir)), true)
                        .map_err(pane_error)?;
                }
                initial
            }
            (None, Some(previous)) => {
                let spec = SplitSpec {
                    start_directory: leaf.start_directory.as_deref(),
                    direction,
                };
                self.mux
                    .split_pane(self.window, previous, &spec)
                    .map_err(pane_error)?
            }
            (None, None) => unreachable!("later leaves always have a previous pane"),
        };

        for cmd in &leaf.shell_command {
            self.mux.send_keys(&pane, cmd, true).map_err(pane_error)?;
        }

        debug!(window = %self.window.id, pane = %pane.id, leaf = leaf.id.0, "placed pane");
        self.previous = Some(pane.clone());
        self.created.push((leaf.id, pane));
        Ok(())
    }
}

/// Create a session for `config` and build it.
///
/// Fails with [`Error::SessionExists`] if a session with the configured name
/// is already running. The new session's initial window is always reused.
pub fn load_workspace<M: Multiplexer + ?Sized>(
    mux: &M,
    config: &SessionConfig,
    options: &BuildOptions,
) -> Result<(Session, BuildReport)> {
    if mux.has_session(&config.name)? {
        return Err(Error::SessionExists {
            session: config.name.clone(),
        });
    }

    let session = mux.new_session(&config.name, config.start_directory.as_deref())?;
    info!(session = %session.name, id = %session.id, "created session");

    let builder = WorkspaceBuilder::new(
        config.clone(),
        BuildOptions {
            reuse_initial_window: true,
            ..options.clone()
        },
    );
    let report = builder.build(mux, &session)?;
    Ok((session, report))
}
