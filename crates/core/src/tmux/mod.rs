//! Tmux backend for mosaic workspaces.
//!
//! # Submodules
//!
//! - [`commands`]: Low-level tmux command builders (NewSession, SplitWindow, etc.)
//! - [`client`]: [`TmuxClient`], the [`Multiplexer`](crate::Multiplexer) implementation
//!
//! # Usage
//!
//! ```ignore
//! use mosaic_core::{TmuxClient, load_workspace, BuildOptions};
//!
//! let client = TmuxClient::new();
//! let (session, report) = load_workspace(&client, &config, &BuildOptions::default())?;
//! attach_session(client.tmux(), &session.name)?;
//! ```

mod client;
mod commands;

pub use client::TmuxClient;
pub use commands::*;
