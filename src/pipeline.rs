// src/pipeline.rs
//! One refresh cycle: fetch → resolve + extract per snapshot → rank → render → publish.
//!
//! The new leaderboard is published only after its artifact is on disk, so readers
//! never see a board whose image failed to render.
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::board::{BoardCell, Entry, Leaderboard};
use crate::config::AppOptions;
use crate::error::CycleError;
use crate::extract::count_caught_with_source;
use crate::fetch::{self, Connector};
use crate::log::fmt_elapsed;
use crate::progress::Progress;
use crate::render;
use crate::resolve::resolve_name;
use crate::store::{self, SnapshotStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub downloaded: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub rows: usize,
    pub artifact: PathBuf,
    pub elapsed: Duration,
}

/// Scored snapshots from the local store, plus how many files were unreadable.
#[derive(Debug, Default)]
pub struct Collected {
    pub entries: Vec<Entry>,
    pub skipped: usize,
}

pub struct Pipeline {
    opts: AppOptions,
    store: SnapshotStore,
    board: Arc<BoardCell>,
    connector: Connector,
}

impl Pipeline {
    pub fn new(opts: AppOptions, board: Arc<BoardCell>) -> Self {
        Self {
            store: SnapshotStore::new(&opts.store),
            opts,
            board,
            connector: fetch::default_connector(),
        }
    }

    /// Swap the transport (tests, dry runs).
    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }

    pub fn run_cycle(&self, progress: &mut dyn Progress) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        logf!("Cycle: begin");

        let downloaded = fetch::fetch(&self.opts.fetch, &self.store, &self.connector, progress);

        let collected = collect(&self.store, &self.opts.fetch.data_ext, progress)?;
        let parsed = collected.entries.len();
        let board = Leaderboard::build(collected.entries, self.opts.render.max_rows, Utc::now());
        let rows = board.len();

        let artifact = render::write_artifact(&board, &self.opts.render)?;
        self.board.publish(board);

        let elapsed = started.elapsed();
        logf!(
            "Cycle: ok downloaded={downloaded} parsed={parsed} skipped={} rows={rows} artifact={} in {}",
            collected.skipped,
            artifact.display(),
            fmt_elapsed(elapsed)
        );
        Ok(CycleReport { downloaded, parsed, skipped: collected.skipped, rows, artifact, elapsed })
    }
}

/// Resolve and score every snapshot in the store. Unparseable files are skipped,
/// not scored as zero.
pub fn collect(store: &SnapshotStore, ext: &str, progress: &mut dyn Progress) -> Result<Collected, CycleError> {
    let paths = store
        .snapshot_paths(ext)
        .map_err(|source| CycleError::Scan { dir: store.dir().to_path_buf(), source })?;
    let ids = store.identity_map();

    progress.begin(paths.len());
    let mut out = Collected::default();

    for path in paths {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match store::read_snapshot(&path) {
            Ok(content) => {
                let name = resolve_name(&path, &content, &ids);
                let (count, source) = count_caught_with_source(&content);
                logd!("Collect: {file} → {name} = {count} ({source:?})");
                progress.item_done(&file);
                out.entries.push(Entry { file, name, count });
            }
            Err(e) => {
                logw!("Collect: {e}");
                progress.item_failed(&file, &e.to_string());
                out.skipped += 1;
            }
        }
    }

    progress.finish();
    Ok(out)
}
