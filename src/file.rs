// src/file.rs
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicU64, Ordering},
};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// Replace `path` with `bytes` so that a concurrent reader sees either the old
/// file or the new one, never a partial write: write a sibling temp file, sync, rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let tmp = temp_sibling(path);
    let res = (|| {
        let mut f = File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if res.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    res
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| s!("artifact"));
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    // unique per write: the refresh cycle and an upload may replace the same file at once
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", process::id()))
}

/// Last path component of a remote listing entry, or `None` if it cannot be
/// stored safely (empty, `.`/`..`, or a temp-file name).
pub fn safe_file_name(remote: &str) -> Option<&str> {
    let base = remote.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." || base.ends_with(".tmp") {
        return None;
    }
    Some(base)
}

/// Case-insensitive extension check on a file name (`ext` includes the dot).
pub fn has_ext(name: &str, ext: &str) -> bool {
    name.len() > ext.len() && name.to_ascii_lowercase().ends_with(&ext.to_ascii_lowercase())
}
