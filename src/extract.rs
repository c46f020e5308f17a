// src/extract.rs
//! Captured-species count from one snapshot. Ordered heuristics, first hit wins:
//!
//! 1. `pokedex.caught` list → distinct elements
//! 2. `pokedex.caughtCount` integer → as is
//! 3. top-level list under a known alias → distinct elements
//! 4. any object key anywhere matching a caught/captured alias (case-insensitive)
//!    whose value is a list → the largest distinct count among them
//!
//! Nothing matches → 0. Shape mismatches are misses, never errors.
use serde_json::Value;

use crate::snapshot::{self, ValueExt, Visitor, distinct_count};

pub const CAUGHT_LIST_PATH: &[&str] = &["pokedex", "caught"];
pub const CAUGHT_COUNT_PATH: &[&str] = &["pokedex", "caughtCount"];
pub const TOP_LEVEL_LISTS: &[&str] = &["caughtSpecies", "caught_species", "capturedSpecies", "captured"];
/// Lowercase.
pub const DEEP_KEYS: &[&str] = &["caught", "caughtspecies", "captured", "capturedspecies"];

/// Which heuristic produced the count. Useful in debug logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    CaughtList,
    CaughtCount,
    TopLevelList,
    DeepSearch,
    Nothing,
}

pub fn count_caught(content: &Value) -> u64 {
    count_caught_with_source(content).0
}

pub fn count_caught_with_source(content: &Value) -> (u64, Source) {
    if let Some(items) = content.at(CAUGHT_LIST_PATH).and_then(ValueExt::list) {
        return (distinct_count(items) as u64, Source::CaughtList);
    }
    if let Some(n) = content.at(CAUGHT_COUNT_PATH).and_then(ValueExt::count) {
        return (n, Source::CaughtCount);
    }
    if let Some(items) = TOP_LEVEL_LISTS
        .iter()
        .find_map(|k| content.field(k).and_then(ValueExt::list))
    {
        return (distinct_count(items) as u64, Source::TopLevelList);
    }

    let mut best = DeepBest::default();
    snapshot::walk(content, &mut best);
    if best.found {
        (best.count as u64, Source::DeepSearch)
    } else {
        (0, Source::Nothing)
    }
}

#[derive(Default)]
struct DeepBest {
    count: usize,
    found: bool,
}

impl Visitor for DeepBest {
    fn visit_entry(&mut self, key: &str, value: &Value) {
        let Some(items) = value.list() else { return };
        if DEEP_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k)) {
            self.found = true;
            self.count = self.count.max(distinct_count(items));
        }
    }
}
