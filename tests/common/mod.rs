// tests/common/mod.rs
//
// Shared fixtures: an in-memory remote, connectors over it, and options rooted in a temp dir.
//
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dex_board::config::consts::REMOTE_PATH;
use dex_board::config::{AppOptions, FetchOptions};
use dex_board::error::FetchError;
use dex_board::fetch::{join_remote, Connector, RemoteDir, RemoteEntry};

#[derive(Clone, Default)]
pub struct MemDir {
    pub dirs: HashMap<String, Vec<RemoteEntry>>,
    pub files: HashMap<String, Vec<u8>>,
}

impl MemDir {
    /// `files` placed directly under the default remote data directory.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let mut dir = MemDir::default();
        let mut entries = Vec::new();
        for (name, body) in files {
            entries.push(RemoteEntry { name: name.to_string(), is_dir: false });
            dir.files.insert(join_remote(REMOTE_PATH, name), body.as_bytes().to_vec());
        }
        dir.dirs.insert(REMOTE_PATH.to_string(), entries);
        dir
    }

    pub fn put(&mut self, path: &str, body: &str) {
        self.files.insert(path.to_string(), body.as_bytes().to_vec());
    }
}

impl RemoteDir for MemDir {
    fn list(&mut self, dir: &str) -> Result<Vec<RemoteEntry>, FetchError> {
        self.dirs.get(dir).cloned().ok_or_else(|| FetchError::Listing {
            dir: dir.to_string(),
            reason: "no such directory".to_string(),
        })
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.files.get(path).cloned().ok_or_else(|| FetchError::Transfer {
            file: path.to_string(),
            reason: "no such file".to_string(),
        })
    }
}

pub fn serving(remote: MemDir) -> Connector {
    Box::new(move |_: &FetchOptions| -> Result<Box<dyn RemoteDir>, FetchError> {
        Ok(Box::new(remote.clone()))
    })
}

/// Like `serving`, but refuses to connect while `down` is set.
pub fn switchable(remote: MemDir, down: Arc<AtomicBool>) -> Connector {
    Box::new(move |opts: &FetchOptions| -> Result<Box<dyn RemoteDir>, FetchError> {
        if down.load(Ordering::SeqCst) {
            return Err(FetchError::Connect {
                host: opts.host.clone(),
                port: opts.port,
                reason: "connection refused".to_string(),
            });
        }
        Ok(Box::new(remote.clone()))
    })
}

/// Remote configured, store and artifact under `root`, short refresh interval.
pub fn options(root: &Path) -> AppOptions {
    let mut opts = AppOptions::default();
    opts.fetch.host = "mc.example.net".to_string();
    opts.fetch.user = "steve".to_string();
    opts.fetch.password = "hunter2".to_string();
    opts.store.data_dir = root.join("data");
    opts.render.out_path = root.join("leaderboard.png");
    opts.schedule.interval = Duration::from_millis(20);
    opts
}

pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
