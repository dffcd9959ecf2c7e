//! Error types for mosaic-core

use thiserror::Error;

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration is invalid; nothing was sent to tmux
    Configuration,
    /// A tmux command failed or could not be run
    Multiplexer,
    /// The target session or window already exists in a state we won't touch
    ReuseConflict,
}

/// Core error type for workspace loading and building
#[derive(Debug, Error)]
pub enum Error {
    /// The config has no `session_name` (or it is empty)
    #[error("config is missing a session_name")]
    MissingSessionName,

    /// A config entry has the wrong shape
    #[error("invalid config at {location}: {message}")]
    InvalidConfig { location: String, message: String },

    /// YAML could not be parsed into a config
    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON could not be parsed into a config
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a config file failed
    #[error("failed to read {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The tmux binary could not be executed
    #[error("failed to execute tmux: {0}")]
    Spawn(#[source] std::io::Error),

    /// tmux ran and reported failure
    #[error("`tmux {command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    /// tmux succeeded but printed something we could not read back
    #[error("unexpected output from `tmux {command}`: {output:?}")]
    UnexpectedOutput { command: String, output: String },

    /// A session with the configured name is already running
    #[error("session '{session}' already exists")]
    SessionExists { session: String },

    /// Reuse was requested but the session is not in its initial state
    #[error(
        "session '{session}' has {windows} window(s) and {panes} pane(s) in its first window; \
         refusing to build into it"
    )]
    ReuseConflict {
        session: String,
        windows: usize,
        panes: usize,
    },

    /// A step of building a window failed
    #[error("window {window} ({name}): {step} failed: {source}")]
    Window {
        window: usize,
        name: String,
        step: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Creating or feeding a pane failed
    #[error("window {window}, pane {pane}: {source}")]
    Pane {
        window: usize,
        pane: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error, looking through location wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingSessionName
            | Error::InvalidConfig { .. }
            | Error::Yaml(_)
            | Error::Json(_)
            | Error::ReadConfig { .. } => ErrorKind::Configuration,
            Error::Spawn(_) | Error::Command { .. } | Error::UnexpectedOutput { .. } => {
                ErrorKind::Multiplexer
            }
            Error::SessionExists { .. } | Error::ReuseConflict { .. } => ErrorKind::ReuseConflict,
            Error::Window { source, .. } | Error::Pane { source, .. } => source.kind(),
        }
    }

    pub(crate) fn invalid(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for mosaic-core operations
pub type Result<T> = std::result::Result<T, Error>;
