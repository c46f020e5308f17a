// src/resolve.rs
//! Display name for one snapshot, in priority order:
//! 1. 32-hex player id in the file name, looked up in the identity map
//! 2. a short string field inside the content (`playerName`, `name`, `player`)
//! 3. the first 16 characters of the file stem
use std::path::Path;

use serde_json::Value;

use crate::snapshot::ValueExt;
use crate::store::IdentityMap;

pub const NAME_FIELDS: &[&str] = &["playerName", "name", "player"];
pub const MAX_NAME_CHARS: usize = 32;
pub const STEM_CHARS: usize = 16;
const ID_LEN: usize = 32;

pub fn resolve_name(path: &Path, content: &Value, ids: &IdentityMap) -> String {
    let stem = file_stem(path);

    if let Some(name) = player_id(&stem).and_then(|id| ids.get(&id)) {
        return name.clone();
    }

    if let Some(name) = NAME_FIELDS
        .iter()
        .filter_map(|k| content.field(k).and_then(ValueExt::text))
        .find(|v| is_display_name(v))
    {
        return name.to_string();
    }

    let short: String = stem.chars().take(STEM_CHARS).collect();
    if short.is_empty() { s!("?") } else { short }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_display_name(v: &str) -> bool {
    let n = v.chars().count();
    (1..=MAX_NAME_CHARS).contains(&n) && !v.trim().is_empty()
}

/// First run of 32 hex digits in the lowercased stem. Player files are usually
/// named after the dashed UUID, so a stem without a bare run is retried with dashes removed.
pub fn player_id(stem: &str) -> Option<String> {
    let lower = stem.to_ascii_lowercase();
    first_hex_run(&lower).or_else(|| first_hex_run(&lower.replace('-', "")))
}

fn first_hex_run(s: &str) -> Option<String> {
    let b = s.as_bytes();
    let mut run = 0usize;
    for (i, c) in b.iter().enumerate() {
        if c.is_ascii_hexdigit() {
            run += 1;
            if run == ID_LEN {
                return Some(s[i + 1 - ID_LEN..=i].to_string());
            }
        } else {
            run = 0;
        }
    }
    None
}
