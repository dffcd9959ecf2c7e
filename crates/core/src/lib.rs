//! Mosaic Core - Core library for the mosaic workspace builder
//!
//! This crate provides the core functionality for mosaic including:
//! - Configuration parsing, validation and default propagation
//! - The multiplexer facade and its tmux implementation
//! - The workspace builder that turns a config into windows and panes

pub mod builder;
pub mod config;
pub mod error;
pub mod mux;
pub mod tmux;

#[cfg(test)]
mod testing;

// Re-export commonly used types at crate root
pub use builder::{BuildOptions, BuildReport, BuiltWindow, WorkspaceBuilder, load_workspace};
pub use config::{
    LeafId, LeafPane, PaneConfig, PaneGroup, RawSession, SessionConfig, WindowConfig, load_config,
    tmux_session_name,
};
pub use error::{Error, ErrorKind, Result};
pub use mux::{Multiplexer, Pane, Session, SplitDirection, SplitSpec, Window, WindowSpec};
pub use tmux::TmuxClient;
