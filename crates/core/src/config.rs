//! Configuration types and parsing for mosaic workspaces
//!
//! A workspace file is deserialized into the loose `Raw*` types, which accept
//! the shorthand forms people actually write (`shell_command: vim`, bare
//! string panes, `~` paths). [`SessionConfig::from_raw`] then validates that
//! tree and propagates defaults top-down once, producing an immutable
//! [`SessionConfig`] the builder can walk without looking anything up.
//!
//! # Example
//!
//! ```yaml
//! session_name: dev
//! start_directory: ~/src/app
//! windows:
//!   - window_name: editor
//!     layout: main-vertical
//!     options:
//!       main-pane-width: 120
//!     panes:
//!       - vim
//!       - split: vertical
//!         panes:
//!           - cargo watch -x check
//!           - shell_command: [cd tests, ls]
//!   - automatic_rename: true
//!     panes:
//!       - htop
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{Error, Result},
    mux::SplitDirection,
};

// =============================================================================
// Raw Configuration
// =============================================================================

/// One command or a list of commands
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Commands {
    /// `shell_command: vim`
    One(String),
    /// `shell_command: [cd src, vim]`
    Many(Vec<String>),
}

impl Commands {
    fn into_vec(self) -> Vec<String> {
        match self {
            Commands::One(cmd) => vec![cmd],
            Commands::Many(cmds) => cmds,
        }
    }
}

/// Scalar window option value as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl OptionValue {
    /// Render the value the way tmux expects it on the command line
    pub fn to_tmux(&self) -> String {
        match self {
            OptionValue::Bool(true) => "on".to_string(),
            OptionValue::Bool(false) => "off".to_string(),
            OptionValue::Int(n) => n.to_string(),
            OptionValue::Float(f) => f.to_string(),
            OptionValue::Str(s) => s.clone(),
        }
    }
}

/// Session as written in the workspace file
#[derive(Debug, Default, Deserialize)]
pub struct RawSession {
    /// Session name; required, but may be supplied after parsing
    #[serde(default)]
    pub session_name: Option<String>,
    /// Default directory for every window and pane
    #[serde(default)]
    pub start_directory: Option<String>,
    /// Commands run in every pane before its own commands
    #[serde(default)]
    pub shell_command_before: Option<Commands>,
    /// Windows in creation order
    #[serde(default)]
    pub windows: Option<Vec<RawWindow>>,
}

/// Window as written in the workspace file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWindow {
    #[serde(default)]
    pub window_name: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub automatic_rename: Option<bool>,
    #[serde(default)]
    pub start_directory: Option<String>,
    #[serde(default)]
    pub shell_command_before: Option<Commands>,
    #[serde(default)]
    pub window_shell: Option<String>,
    #[serde(default)]
    pub split: Option<SplitDirection>,
    #[serde(default)]
    pub options: IndexMap<String, OptionValue>,
    #[serde(default)]
    pub panes: Option<Vec<RawPane>>,
}

/// Pane entry as written in the workspace file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPane {
    /// `- vim`
    Command(String),
    /// `- shell_command: ...` or `- panes: [...]`
    Entry(RawPaneEntry),
    /// `- ` (an idle shell)
    Idle,
}

/// Mapping form of a pane entry
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPaneEntry {
    #[serde(default)]
    pub shell_command: Option<Commands>,
    #[serde(default)]
    pub start_directory: Option<String>,
    #[serde(default)]
    pub shell_command_before: Option<Commands>,
    #[serde(default)]
    pub split: Option<SplitDirection>,
    #[serde(default)]
    pub panes: Option<Vec<RawPane>>,
}

impl RawSession {
    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Convert an already-parsed generic mapping
    pub fn from_value(value: serde_yaml::Value) -> Result<Self> {
        Ok(serde_yaml::from_value(value)?)
    }

    /// Read a workspace file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }
}

// =============================================================================
// Normalized Configuration
// =============================================================================

/// Stable window-local id of a leaf pane, assigned in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LeafId(pub usize);

/// Validated session with all defaults applied
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    /// Session name (never empty)
    pub name: String,
    /// Session start directory
    pub start_directory: Option<String>,
    /// Windows in creation order
    pub windows: Vec<WindowConfig>,
}

/// Validated window
#[derive(Debug, Clone, Serialize)]
pub struct WindowConfig {
    /// Position in the session config (0-based)
    pub position: usize,
    /// Name to give the window; `None` when tmux should name it
    pub name: Option<String>,
    /// Value for the `automatic-rename` window option, if configured
    pub automatic_rename: Option<bool>,
    /// Effective start directory
    pub start_directory: Option<String>,
    /// Layout applied after all panes exist
    pub layout: Option<String>,
    /// Window options, applied in order before the layout
    pub options: IndexMap<String, String>,
    /// Command the first pane runs instead of the default shell
    pub window_shell: Option<String>,
    /// Default split direction for this window's panes
    pub split: Option<SplitDirection>,
    /// Pane tree; never empty
    pub panes: Vec<PaneConfig>,
}

/// A pane entry: a leaf that runs commands, or a group of nested entries
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaneConfig {
    Leaf(LeafPane),
    Split(PaneGroup),
}

/// Pane that runs commands
#[derive(Debug, Clone, Serialize)]
pub struct LeafPane {
    pub id: LeafId,
    /// Commands typed into the pane, in order (`shell_command_before` included)
    pub shell_command: Vec<String>,
    /// Effective start directory
    pub start_directory: Option<String>,
}

/// Pane entry that is split further
#[derive(Debug, Clone, Serialize)]
pub struct PaneGroup {
    /// Direction used for splits among the children
    pub split: Option<SplitDirection>,
    /// Effective start directory handed to the children
    pub start_directory: Option<String>,
    /// Nested entries; never empty
    pub children: Vec<PaneConfig>,
}

impl WindowConfig {
    /// All leaf panes in creation order
    pub fn leaves(&self) -> Vec<&LeafPane> {
        fn walk<'a>(panes: &'a [PaneConfig], out: &mut Vec<&'a LeafPane>) {
            for pane in panes {
                match pane {
                    PaneConfig::Leaf(leaf) => out.push(leaf),
                    PaneConfig::Split(group) => walk(&group.children, out),
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.panes, &mut out);
        out
    }

    /// Name used in messages: the configured name or the position
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.position))
    }
}

/// Values a child inherits from its parents
struct Inherited<'a> {
    start_directory: Option<&'a str>,
    before: &'a [String],
}

/// Build a window's pane tree and hand out leaf ids
struct PaneResolver<'a> {
    base_dir: Option<&'a Path>,
    next_leaf: usize,
}

impl PaneResolver<'_> {
    fn leaf(
        &mut self,
        parent: &Inherited<'_>,
        start_directory: Option<String>,
        commands: Vec<String>,
    ) -> PaneConfig {
        let id = LeafId(self.next_leaf);
        self.next_leaf += 1;
        let mut shell_command = parent.before.to_vec();
        shell_command.extend(commands);
        PaneConfig::Leaf(LeafPane {
            id,
            shell_command,
            start_directory: start_directory.or_else(|| parent.start_directory.map(String::from)),
        })
    }

    fn resolve_list(
        &mut self,
        panes: Vec<RawPane>,
        parent: &Inherited<'_>,
        location: &str,
    ) -> Result<Vec<PaneConfig>> {
        panes
            .into_iter()
            .enumerate()
            .map(|(i, pane)| self.resolve(pane, parent, &format!("{}[{}]", location, i)))
            .collect()
    }

    fn resolve(
        &mut self,
        pane: RawPane,
        parent: &Inherited<'_>,
        location: &str,
    ) -> Result<PaneConfig> {
        let entry = match pane {
            RawPane::Command(cmd) => return Ok(self.leaf(parent, None, vec![cmd])),
            RawPane::Idle => return Ok(self.leaf(parent, None, Vec::new())),
            RawPane::Entry(entry) => entry,
        };

        let start_directory = entry
            .start_directory
            .map(|d| resolve_directory(&d, self.base_dir));
        let mut before = parent.before.to_vec();
        before.extend(entry.shell_command_before.map(Commands::into_vec).unwrap_or_default());

        let Some(children) = entry.panes else {
            let commands = entry.shell_command.map(Commands::into_vec).unwrap_or_default();
            let inherited = Inherited {
                start_directory: parent.start_directory,
                before: &before,
            };
            return Ok(self.leaf(&inherited, start_directory, commands));
        };

        if entry.shell_command.is_some() {
            return Err(Error::invalid(
                location,
                "a pane has either shell_command or nested panes, not both",
            ));
        }
        if children.is_empty() {
            return Err(Error::invalid(location, "nested panes list is empty"));
        }

        let start_directory = start_directory.or_else(|| parent.start_directory.map(String::from));
        let inherited = Inherited {
            start_directory: start_directory.as_deref(),
            before: &before,
        };
        let children = self.resolve_list(children, &inherited, &format!("{}.panes", location))?;

        Ok(PaneConfig::Split(PaneGroup {
            split: entry.split,
            start_directory,
            children,
        }))
    }
}

impl SessionConfig {
    /// Validate a raw session and propagate defaults.
    ///
    /// Relative start directories are kept as written.
    pub fn from_raw(raw: RawSession) -> Result<Self> {
        Self::resolve(raw, None)
    }

    /// Like [`SessionConfig::from_raw`], resolving relative start directories
    /// against `base_dir`
    pub fn from_raw_in(raw: RawSession, base_dir: &Path) -> Result<Self> {
        Self::resolve(raw, Some(base_dir))
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::from_raw(RawSession::from_yaml_str(content)?)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_raw(RawSession::from_json_str(content)?)
    }

    /// Validate an already-parsed generic mapping
    pub fn from_value(value: serde_yaml::Value) -> Result<Self> {
        Self::from_raw(RawSession::from_value(value)?)
    }

    fn resolve(raw: RawSession, base_dir: Option<&Path>) -> Result<Self> {
        let name = raw
            .session_name
            .filter(|n| !n.trim().is_empty())
            .ok_or(Error::MissingSessionName)?;
        let name = tmux_session_name(name);

        let start_directory = raw
            .start_directory
            .map(|d| resolve_directory(&d, base_dir));
        let session_before = raw
            .shell_command_before
            .map(Commands::into_vec)
            .unwrap_or_default();

        let windows = raw
            .windows
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(position, window)| {
                resolve_window(
                    position,
                    window,
                    start_directory.as_deref(),
                    &session_before,
                    base_dir,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SessionConfig {
            name,
            start_directory,
            windows,
        })
    }
}

fn resolve_window(
    position: usize,
    raw: RawWindow,
    session_dir: Option<&str>,
    session_before: &[String],
    base_dir: Option<&Path>,
) -> Result<WindowConfig> {
    let start_directory = raw
        .start_directory
        .map(|d| resolve_directory(&d, base_dir))
        .or_else(|| session_dir.map(String::from));

    let mut before = session_before.to_vec();
    before.extend(raw.shell_command_before.map(Commands::into_vec).unwrap_or_default());

    let name = if raw.automatic_rename == Some(true) {
        if let Some(name) = &raw.window_name {
            warn!(window = position, name = %name, "automatic_rename is set, ignoring window_name");
        }
        None
    } else {
        Some(
            raw.window_name
                .unwrap_or_else(|| format!("window{}", position + 1)),
        )
    };

    // A window always has at least the pane tmux creates with it
    let raw_panes = match raw.panes {
        Some(panes) if !panes.is_empty() => panes,
        _ => vec![RawPane::Idle],
    };

    let inherited = Inherited {
        start_directory: start_directory.as_deref(),
        before: &before,
    };
    let mut resolver = PaneResolver {
        base_dir,
        next_leaf: 0,
    };
    let panes = resolver.resolve_list(
        raw_panes,
        &inherited,
        &format!("windows[{}].panes", position),
    )?;

    Ok(WindowConfig {
        position,
        name,
        automatic_rename: raw.automatic_rename,
        start_directory,
        layout: raw.layout.filter(|l| !l.trim().is_empty()),
        options: raw
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.to_tmux()))
            .collect(),
        window_shell: raw.window_shell,
        split: raw.split,
        panes,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Load and validate a workspace file.
///
/// `session_name` overrides the name in the file (or supplies a missing one).
/// Relative start directories are resolved against the file's directory.
pub fn load_config(path: &Path, session_name: Option<&str>) -> Result<SessionConfig> {
    let mut raw = RawSession::from_path(path)?;
    if let Some(name) = session_name {
        raw.session_name = Some(name.to_string());
    }
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(base) => SessionConfig::from_raw_in(raw, base),
        None => SessionConfig::from_raw(raw),
    }
}

/// The name tmux will actually give a session called `name`.
///
/// `.` and `:` separate target components, so tmux stores them as `_`.
pub fn tmux_session_name(name: String) -> String {
    if !name.contains(['.', ':']) {
        return name;
    }
    let fixed = name.replace(['.', ':'], "_");
    warn!(name = %name, session = %fixed, "tmux does not allow '.' or ':' in session names");
    fixed
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &str) -> String {
    if path == "~" {
        return dirs::home_dir()
            .map(|home| home.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
    }
    path.strip_prefix("~/")
        .and_then(|stripped| dirs::home_dir().map(|home| home.join(stripped)))
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn resolve_directory(path: &str, base_dir: Option<&Path>) -> String {
    let expanded = expand_path(path);
    match base_dir {
        Some(base) if Path::new(&expanded).is_relative() => {
            base.join(&expanded).to_string_lossy().into_owned()
        }
        _ => expanded,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
session_name: sampleconfig
start_directory: '~'
windows:
- layout: main-vertical
  panes:
  - shell_command:
    - vim
    start_directory: '~'
  - shell_command:
    - cowsay "hey"
  window_name: editor
- panes:
  - shell_command:
    - tail -F /var/log/syslog
    start_directory: /var/log
  window_name: logging
- automatic_rename: true
  panes:
  - shell_command:
    - htop
"#;

    fn leaf(pane: &PaneConfig) -> &LeafPane {
        match pane {
            PaneConfig::Leaf(leaf) => leaf,
            PaneConfig::Split(_) => panic!("expected a leaf, got {:?}", pane),
        }
    }

    #[test]
    fn test_sample_config() {
        let config = SessionConfig::from_yaml_str(SAMPLE).unwrap();
        let home = expand_path("~");

        assert_eq!(config.name, "sampleconfig");
        assert_eq!(config.start_directory.as_deref(), Some(home.as_str()));
        assert_eq!(config.windows.len(), 3);

        let editor = &config.windows[0];
        assert_eq!(editor.name.as_deref(), Some("editor"));
        assert_eq!(editor.layout.as_deref(), Some("main-vertical"));
        assert_eq!(editor.panes.len(), 2);
        assert_eq!(leaf(&editor.panes[0]).shell_command, vec!["vim"]);
        assert_eq!(leaf(&editor.panes[1]).shell_command, vec!["cowsay \"hey\""]);

        let logging = &config.windows[1];
        assert_eq!(
            leaf(&logging.panes[0]).start_directory.as_deref(),
            Some("/var/log")
        );
        assert_eq!(logging.layout, None);
    }

    #[test]
    fn test_start_directory_inherits_top_down() {
        let config = SessionConfig::from_yaml_str(
            r#"
session_name: s
start_directory: /srv
windows:
- panes: [top]
- start_directory: /tmp
  panes:
  - top
  - shell_command: ls
    start_directory: /etc
"#,
        )
        .unwrap();

        let first = &config.windows[0];
        assert_eq!(first.start_directory.as_deref(), Some("/srv"));
        assert_eq!(leaf(&first.panes[0]).start_directory.as_deref(), Some("/srv"));

        let second = &config.windows[1];
        assert_eq!(second.start_directory.as_deref(), Some("/tmp"));
        assert_eq!(leaf(&second.panes[0]).start_directory.as_deref(), Some("/tmp"));
        assert_eq!(leaf(&second.panes[1]).start_directory.as_deref(), Some("/etc"));
    }

    #[test]
    fn test_no_start_directory_anywhere() {
        let config = SessionConfig::from_yaml_str("session_name: s\nwindows:\n- panes: [top]\n")
            .unwrap();
        assert_eq!(config.windows[0].start_directory, None);
        assert_eq!(leaf(&config.windows[0].panes[0]).start_directory, None);
    }

    #[test]
    fn test_missing_session_name() {
        let yaml = SAMPLE.replace("session_name: sampleconfig\n", "");
        let err = SessionConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, Error::MissingSessionName));

        let mut raw = RawSession::from_yaml_str(&yaml).unwrap();
        raw.session_name = Some("give_a_session_name".to_string());
        let config = SessionConfig::from_raw(raw).unwrap();
        assert_eq!(config.name, "give_a_session_name");
    }

    #[test]
    fn test_blank_session_name_is_missing() {
        let err = SessionConfig::from_yaml_str("session_name: '  '\nwindows: []\n").unwrap_err();
        assert!(matches!(err, Error::MissingSessionName));
    }

    #[test]
    fn test_window_names() {
        let config = SessionConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.windows[2].name, None);
        assert_eq!(config.windows[2].automatic_rename, Some(true));

        let config = SessionConfig::from_yaml_str(
            "session_name: s\nwindows:\n- panes: [top]\n- panes: [htop]\n",
        )
        .unwrap();
        assert_eq!(config.windows[0].name.as_deref(), Some("window1"));
        assert_eq!(config.windows[1].name.as_deref(), Some("window2"));
    }

    #[test]
    fn test_pane_shorthands() {
        let config = SessionConfig::from_yaml_str(
            r#"
session_name: s
windows:
- panes:
  - vim
  -
  - shell_command: make
  - shell_command: [cd src, ls]
  - shell_command: []
- window_name: empty
"#,
        )
        .unwrap();

        let panes = &config.windows[0].panes;
        assert_eq!(panes.len(), 5);
        assert_eq!(leaf(&panes[0]).shell_command, vec!["vim"]);
        assert!(leaf(&panes[1]).shell_command.is_empty());
        assert_eq!(leaf(&panes[2]).shell_command, vec!["make"]);
        assert_eq!(leaf(&panes[3]).shell_command, vec!["cd src", "ls"]);
        assert!(leaf(&panes[4]).shell_command.is_empty());

        let empty = &config.windows[1];
        assert_eq!(empty.panes.len(), 1);
        assert!(leaf(&empty.panes[0]).shell_command.is_empty());
    }

    #[test]
    fn test_shell_command_before_is_prepended() {
        let config = SessionConfig::from_yaml_str(
            r#"
session_name: s
shell_command_before: source .env
windows:
- shell_command_before: [nvm use]
  panes:
  - npm start
  - shell_command_before: clear
    shell_command: npm test
"#,
        )
        .unwrap();

        let panes = &config.windows[0].panes;
        assert_eq!(
            leaf(&panes[0]).shell_command,
            vec!["source .env", "nvm use", "npm start"]
        );
        assert_eq!(
            leaf(&panes[1]).shell_command,
            vec!["source .env", "nvm use", "clear", "npm test"]
        );
    }

    #[test]
    fn test_nested_panes_get_depth_first_ids() {
        let config = SessionConfig::from_yaml_str(
            r#"
session_name: s
windows:
- split: horizontal
  panes:
  - vim
  - split: vertical
    start_directory: /tmp
    panes:
    - ls
    - panes:
      - top
      - htop
  - git status
"#,
        )
        .unwrap();

        let window = &config.windows[0];
        assert_eq!(window.split, Some(SplitDirection::Horizontal));

        let leaves = window.leaves();
        let ids: Vec<usize> = leaves.iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        let commands: Vec<&str> = leaves.iter().map(|l| l.shell_command[0].as_str()).collect();
        assert_eq!(commands, vec!["vim", "ls", "top", "htop", "git status"]);

        // Group directory reaches nested leaves, but not siblings after the group
        assert_eq!(leaves[3].start_directory.as_deref(), Some("/tmp"));
        assert_eq!(leaves[4].start_directory, None);

        let PaneConfig::Split(group) = &window.panes[1] else {
            panic!("expected a group");
        };
        assert_eq!(group.split, Some(SplitDirection::Vertical));
        assert_eq!(group.children.len(), 2);
    }

    #[test]
    fn test_group_with_command_is_rejected() {
        let err = SessionConfig::from_yaml_str(
            r#"
session_name: s
windows:
- panes:
  - vim
  - shell_command: ls
    panes: [top]
"#,
        )
        .unwrap_err();
        match err {
            Error::InvalidConfig { location, .. } => assert_eq!(location, "windows[0].panes[1]"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let err = SessionConfig::from_yaml_str(
            "session_name: s\nwindows:\n- panes:\n  - panes: []\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_options_and_layout() {
        let config = SessionConfig::from_yaml_str(
            r#"
session_name: s
windows:
- layout: ''
  options:
    main-pane-height: 50
    synchronize-panes: true
    pane-border-status: top
  panes: [vim]
"#,
        )
        .unwrap();

        let window = &config.windows[0];
        assert_eq!(window.layout, None);
        let options: Vec<(&str, &str)> = window
            .options
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            options,
            vec![
                ("main-pane-height", "50"),
                ("synchronize-panes", "on"),
                ("pane-border-status", "top"),
            ]
        );
    }

    #[test]
    fn test_json_config() {
        let config = SessionConfig::from_json_str(
            r#"{
                "session_name": "json",
                "windows": [
                    {"window_name": "one", "panes": [{"shell_command": ["vim"]}, "ls"]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.name, "json");
        assert_eq!(config.windows[0].leaves().len(), 2);
    }

    #[test]
    fn test_from_value() {
        let value: serde_yaml::Value = serde_yaml::from_str(SAMPLE).unwrap();
        let config = SessionConfig::from_value(value).unwrap();
        assert_eq!(config.name, "sampleconfig");
        assert_eq!(config.windows.len(), 3);
        assert_eq!(config.windows[1].name.as_deref(), Some("logging"));

        let value = serde_yaml::to_value(serde_json::json!({
            "windows": [{"panes": ["top"]}]
        }))
        .unwrap();
        let err = SessionConfig::from_value(value).unwrap_err();
        assert!(matches!(err, Error::MissingSessionName));
    }

    /// Write a normalized tree back out with every value spelled out
    fn respell(config: &SessionConfig) -> serde_yaml::Value {
        fn pane(p: &PaneConfig) -> serde_json::Value {
            match p {
                PaneConfig::Leaf(leaf) => serde_json::json!({
                    "shell_command": leaf.shell_command,
                    "start_directory": leaf.start_directory,
                }),
                PaneConfig::Split(group) => serde_json::json!({
                    "split": group.split,
                    "start_directory": group.start_directory,
                    "panes": group.children.iter().map(pane).collect::<Vec<_>>(),
                }),
            }
        }

        let windows: Vec<_> = config
            .windows
            .iter()
            .map(|w| {
                serde_json::json!({
                    "window_name": w.name,
                    "start_directory": w.start_directory,
                    "panes": w.panes.iter().map(pane).collect::<Vec<_>>(),
                })
            })
            .collect();
        serde_yaml::to_value(serde_json::json!({
            "session_name": config.name,
            "start_directory": config.start_directory,
            "windows": windows,
        }))
        .unwrap()
    }

    #[test]
    fn test_normalizing_twice_changes_nothing() {
        let config = SessionConfig::from_yaml_str(
            r#"
session_name: s
start_directory: /srv
shell_command_before: source .env
windows:
- panes:
  - vim
  - start_directory: /tmp
    panes:
    - ls
    - shell_command: top
      start_directory: /etc
- start_directory: /var/log
  panes: [tail -F syslog]
"#,
        )
        .unwrap();
        let again = SessionConfig::from_value(respell(&config)).unwrap();

        let effective = |c: &SessionConfig| -> Vec<(Option<String>, Vec<String>)> {
            c.windows
                .iter()
                .flat_map(|w| w.leaves())
                .map(|l| (l.start_directory.clone(), l.shell_command.clone()))
                .collect()
        };
        assert_eq!(effective(&config), effective(&again));
        assert_eq!(
            effective(&again)[2],
            (Some("/etc".to_string()), vec!["source .env".to_string(), "top".to_string()])
        );
        let dirs: Vec<_> = again.windows.iter().map(|w| w.start_directory.clone()).collect();
        assert_eq!(dirs, vec![Some("/srv".to_string()), Some("/var/log".to_string())]);
    }

    #[test]
    fn test_misspelled_keys_are_rejected() {
        let err = SessionConfig::from_yaml_str(
            "session_name: s\nwindows:\n- panes:\n  - shell_comand: vim\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));

        let err = SessionConfig::from_yaml_str("session_name: s\nwindows:\n- layuot: tiled\n")
            .unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_session_name_uses_tmux_spelling() {
        let config =
            SessionConfig::from_yaml_str("session_name: api.v2:dev\nwindows: []\n").unwrap();
        assert_eq!(config.name, "api_v2_dev");
        assert_eq!(tmux_session_name("plain".to_string()), "plain");
    }

    #[test]
    fn test_load_config_resolves_relative_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.yaml");
        std::fs::write(
            &path,
            "start_directory: ./app\nwindows:\n- panes:\n  - shell_command: ls\n    start_directory: /abs\n  - top\n",
        )
        .unwrap();

        let err = load_config(&path, None).unwrap_err();
        assert!(matches!(err, Error::MissingSessionName));

        let config = load_config(&path, Some("named")).unwrap();
        let expected = dir.path().join("./app").to_string_lossy().into_owned();
        assert_eq!(config.name, "named");
        assert_eq!(config.start_directory.as_deref(), Some(expected.as_str()));

        let leaves = config.windows[0].leaves();
        assert_eq!(leaves[0].start_directory.as_deref(), Some("/abs"));
        assert_eq!(leaves[1].start_directory.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, r#"{"session_name": "j", "windows": []}"#).unwrap();
        let config = load_config(&path, None).unwrap();
        assert_eq!(config.name, "j");
        assert!(config.windows.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/mosaic.yaml"), None).unwrap_err();
        assert!(matches!(err, Error::ReadConfig { .. }));
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/abs/path"), "/abs/path");
        assert_eq!(expand_path("rel"), "rel");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x"), home.join("x").to_string_lossy());
        }
    }
}
