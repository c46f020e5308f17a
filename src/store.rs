// src/store.rs
//! Local snapshot store: the directory that holds this cycle's downloaded player
//! files plus the optional identity map. Files are overwritten in place every cycle.
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;

use crate::config::StoreOptions;
use crate::error::SnapshotError;
use crate::file::{self, has_ext};

/// Normalized player id (lowercase hex, no separators) → display name.
pub type IdentityMap = HashMap<String, String>;

#[derive(Clone, Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    identity_file: String,
}

impl SnapshotStore {
    pub fn new(opts: &StoreOptions) -> Self {
        Self { dir: opts.data_dir.clone(), identity_file: opts.identity_file.clone() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn identity_path(&self) -> PathBuf { self.dir.join(&self.identity_file) }

    pub fn ensure(&self) -> io::Result<()> { file::ensure_directory(&self.dir) }

    /// Overwrite one snapshot file. `name` must already be a bare file name.
    pub fn write(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(name);
        file::write_atomic(&path, bytes)?;
        Ok(path)
    }

    /// Snapshot files with the data extension, sorted by file name.
    /// The identity map file is never a snapshot. A missing directory is an empty store.
    pub fn snapshot_paths(&self, ext: &str) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut out = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() { continue; }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else { continue };
            if name == self.identity_file || !has_ext(name, ext) { continue; }
            out.push(path);
        }
        out.sort();
        Ok(out)
    }

    /// Identity map from the store, empty when the file is absent or malformed.
    pub fn identity_map(&self) -> IdentityMap {
        match fs::read(self.identity_path()) {
            Ok(bytes) => parse_identity_map(&String::from_utf8_lossy(&bytes)),
            Err(_) => IdentityMap::new(),
        }
    }
}

/// Read and parse one snapshot. Invalid UTF-8 is replaced, not rejected.
pub fn read_snapshot(path: &Path) -> Result<Value, SnapshotError> {
    let bytes = fs::read(path)
        .map_err(|source| SnapshotError::Read { path: path.to_path_buf(), source })?;
    let text = String::from_utf8_lossy(&bytes);
    serde_json::from_str(&text)
        .map_err(|source| SnapshotError::Parse { path: path.to_path_buf(), source })
}

#[derive(Deserialize)]
struct CacheEntry {
    #[serde(default)]
    uuid: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
}

/// `[{ "uuid": "...", "name": "..." }, ...]`. Entries without both string fields are skipped.
pub fn parse_identity_map(text: &str) -> IdentityMap {
    let Ok(entries) = serde_json::from_str::<Vec<Value>>(text) else {
        return IdentityMap::new();
    };
    let mut map = IdentityMap::new();
    for raw in entries {
        let Ok(entry) = serde_json::from_value::<CacheEntry>(raw) else { continue };
        let (Some(Value::String(uuid)), Some(Value::String(name))) = (entry.uuid, entry.name) else {
            continue;
        };
        let id = normalize_id(&uuid);
        if !id.is_empty() && !name.is_empty() {
            map.insert(id, name);
        }
    }
    map
}

/// Lowercase, separators stripped.
pub fn normalize_id(raw: &str) -> String {
    raw.chars().filter(|c| *c != '-').flat_map(char::to_lowercase).collect()
}
