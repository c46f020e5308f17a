// src/error.rs
//! Error taxonomy for one refresh cycle.
//!
//! Nothing here escapes the cycle boundary: the scheduler logs the error and keeps the
//! previously published leaderboard and artifact.
use std::{io, path::PathBuf};

use thiserror::Error;

/// Remote side of the cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("remote host or user not configured")]
    NotConfigured,

    #[error("cannot connect to {host}:{port}: {reason}")]
    Connect { host: String, port: u16, reason: String },

    #[error("authentication failed for user {user}: {reason}")]
    Auth { user: String, reason: String },

    #[error("cannot list {dir}: {reason}")]
    Listing { dir: String, reason: String },

    #[error("cannot transfer {file}: {reason}")]
    Transfer { file: String, reason: String },

    #[error("local snapshot store: {0}")]
    Store(#[from] io::Error),
}

impl FetchError {
    /// Errors that abort the whole fetch for this cycle.
    /// `Transfer` only skips one file.
    pub fn is_transport(&self) -> bool {
        !matches!(self, FetchError::Transfer { .. })
    }
}

/// One snapshot file that could not be turned into a tree.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot encode leaderboard image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("cannot write artifact {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Stage failures that end a cycle without publishing.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("cannot scan snapshot directory {}: {source}", dir.display())]
    Scan { dir: PathBuf, source: io::Error },

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },

    #[error("cannot read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}
