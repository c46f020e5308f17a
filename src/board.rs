// src/board.rs
use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// One scored snapshot, before ranking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub file: String,
    pub name: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub name: String,
    pub count: u64,
}

/// Ranked, truncated rows plus when they were computed. Built whole, never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    rows: Vec<LeaderboardRow>,
    generated_at: DateTime<Utc>,
}

impl Leaderboard {
    pub fn build(entries: Vec<Entry>, max_rows: usize, generated_at: DateTime<Utc>) -> Self {
        Self { rows: rank(entries, max_rows), generated_at }
    }

    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self { rows: Vec::new(), generated_at }
    }

    pub fn rows(&self) -> &[LeaderboardRow] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn generated_at(&self) -> DateTime<Utc> { self.generated_at }

    /// `(name, count)` pairs in rank order.
    pub fn pairs(&self) -> Vec<(String, u64)> {
        self.rows.iter().map(|r| (r.name.clone(), r.count)).collect()
    }
}

/// Count descending, then case-insensitive name, then exact name and file name so
/// the order never depends on input order.
pub fn rank(mut entries: Vec<Entry>, max_rows: usize) -> Vec<LeaderboardRow> {
    entries.sort_by(compare);
    entries
        .into_iter()
        .take(max_rows)
        .map(|e| LeaderboardRow { name: e.name, count: e.count })
        .collect()
}

fn compare(a: &Entry, b: &Entry) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| fold(&a.name).cmp(&fold(&b.name)))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.file.cmp(&b.file))
}

fn fold(s: &str) -> String { s.to_lowercase() }

/// The published leaderboard. One writer (the refresh cycle) swaps in a whole new
/// `Arc`; readers clone the current `Arc` and never see a half-built board.
#[derive(Debug, Default)]
pub struct BoardCell {
    current: RwLock<Option<Arc<Leaderboard>>>,
}

impl BoardCell {
    pub fn new() -> Self { Self::default() }

    pub fn publish(&self, board: Leaderboard) -> Arc<Leaderboard> {
        let board = Arc::new(board);
        *self.current.write() = Some(Arc::clone(&board));
        board
    }

    /// `None` until the first successful cycle.
    pub fn current(&self) -> Option<Arc<Leaderboard>> {
        self.current.read().clone()
    }
}
