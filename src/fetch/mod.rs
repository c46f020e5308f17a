// src/fetch/mod.rs
//! Remote fetcher: copy every data file from the remote directory into the local
//! snapshot store, over FTP or SFTP.
//!
//! One connection per cycle. A file that fails to transfer is logged and skipped;
//! a connect/auth/listing failure aborts the fetch for this cycle and the pipeline
//! carries on with whatever the store already holds. No retries: the next cycle is the retry.
mod ftp;
mod sftp;

pub use ftp::FtpDir;
pub use sftp::SftpDir;

use crate::config::{FetchOptions, TransportKind};
use crate::error::FetchError;
use crate::file::{has_ext, safe_file_name};
use crate::progress::Progress;
use crate::store::SnapshotStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub is_dir: bool,
}

/// An open remote file tree. Paths are remote, `/`-separated.
pub trait RemoteDir {
    fn list(&mut self, dir: &str) -> Result<Vec<RemoteEntry>, FetchError>;
    fn read(&mut self, path: &str) -> Result<Vec<u8>, FetchError>;
    /// Polite goodbye. Errors are ignored; the connection is dropped either way.
    fn close(&mut self) {}
}

/// Opens a connection for one cycle.
pub type Connector = Box<dyn Fn(&FetchOptions) -> Result<Box<dyn RemoteDir>, FetchError> + Send + Sync>;

pub fn connect(opts: &FetchOptions) -> Result<Box<dyn RemoteDir>, FetchError> {
    match opts.transport {
        TransportKind::Ftp => Ok(Box::new(FtpDir::connect(opts)?)),
        TransportKind::Sftp => Ok(Box::new(SftpDir::connect(opts)?)),
    }
}

pub fn default_connector() -> Connector {
    Box::new(connect)
}

/// Fetch for one cycle. Never fails: transport problems are logged and count as 0 downloads.
pub fn fetch(
    opts: &FetchOptions,
    store: &SnapshotStore,
    connector: &Connector,
    progress: &mut dyn Progress,
) -> usize {
    if !opts.is_configured() {
        logw!("Fetch: remote host/user not configured; using local snapshot");
        return 0;
    }

    let mut remote = match connector(opts) {
        Ok(r) => r,
        Err(e) => {
            loge!("Fetch: {e}; using local snapshot");
            return 0;
        }
    };

    let result = fetch_into(remote.as_mut(), opts, store, progress);
    remote.close();

    match result {
        Ok(n) => n,
        Err(e) => {
            loge!("Fetch: {e}; using local snapshot");
            0
        }
    }
}

/// Download all matching files from an open connection. Returns how many landed in the store.
pub fn fetch_into(
    remote: &mut dyn RemoteDir,
    opts: &FetchOptions,
    store: &SnapshotStore,
    progress: &mut dyn Progress,
) -> Result<usize, FetchError> {
    let (dir, names) = locate(remote, &opts.remote_path, &opts.data_ext)?;
    store.ensure()?;

    progress.begin(names.len());
    progress.log(&format!("Fetching {} files from {dir}", names.len()));

    let mut downloaded = 0usize;
    for name in &names {
        let Some(local) = safe_file_name(name) else {
            logw!("Fetch: skipping unsafe remote name {name:?}");
            continue;
        };
        let path = join_remote(&dir, name);
        match transfer(remote, &path, |bytes| store.write(local, bytes).map(|_| ())) {
            Ok(()) => {
                downloaded += 1;
                progress.item_done(local);
            }
            Err(e) => {
                logw!("Fetch: {e}");
                progress.item_failed(local, &e.to_string());
            }
        }
    }

    if let Some(remote_id) = &opts.identity_remote_path {
        let identity = store.identity_path();
        match transfer(remote, remote_id, |bytes| crate::file::write_atomic(&identity, bytes)) {
            Ok(()) => logd!("Fetch: identity map refreshed from {remote_id}"),
            Err(e) => logw!("Fetch: identity map: {e}"),
        }
    }

    progress.finish();
    logf!("Fetch: downloaded {downloaded}/{} files from {dir}", names.len());
    Ok(downloaded)
}

/// Read one remote file and hand it to `save`. Every failure is a per-file `Transfer` error.
fn transfer(
    remote: &mut dyn RemoteDir,
    path: &str,
    save: impl FnOnce(&[u8]) -> std::io::Result<()>,
) -> Result<(), FetchError> {
    let bytes = remote.read(path).map_err(|e| match e {
        FetchError::Transfer { .. } => e,
        other => FetchError::Transfer { file: path.to_string(), reason: other.to_string() },
    })?;
    save(&bytes).map_err(|e| FetchError::Transfer { file: path.to_string(), reason: e.to_string() })
}

/// Directory that actually holds the data files, with their names (sorted).
/// If `root` has none, the first subdirectory (by name) that does is used; only one level deep.
fn locate(remote: &mut dyn RemoteDir, root: &str, ext: &str) -> Result<(String, Vec<String>), FetchError> {
    let entries = remote.list(root)?;
    let files = matching(&entries, ext);
    if !files.is_empty() {
        return Ok((root.to_string(), files));
    }

    let mut subdirs: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_dir && e.name != "." && e.name != "..")
        .map(|e| e.name.as_str())
        .collect();
    subdirs.sort_unstable();

    for sub in subdirs {
        let dir = join_remote(root, sub);
        match remote.list(&dir) {
            Ok(inner) => {
                let files = matching(&inner, ext);
                if !files.is_empty() {
                    logd!("Fetch: no data files in {root}, using {dir}");
                    return Ok((dir, files));
                }
            }
            Err(e) => logd!("Fetch: probe {dir}: {e}"),
        }
    }
    Ok((root.to_string(), Vec::new()))
}

fn matching(entries: &[RemoteEntry], ext: &str) -> Vec<String> {
    let mut out: Vec<String> = entries
        .iter()
        .filter(|e| !e.is_dir && has_ext(&e.name, ext))
        .map(|e| e.name.clone())
        .collect();
    out.sort();
    out
}

/// Join remote paths with exactly one `/`. A name that is already absolute wins.
pub fn join_remote(dir: &str, name: &str) -> String {
    if name.starts_with('/') || dir.is_empty() {
        return name.to_string();
    }
    join!(dir.trim_end_matches('/'), "/", name)
}

/// Last path component of a listing line (some servers return full paths).
pub(crate) fn base_name(path: &str) -> String {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path).to_string()
}
