//! Pure bookkeeping for the site history rebuild: minute bucketing of update
//! events, snapshot tracking, and commit message synthesis.
//!
//! Everything in this module is deterministic and free of I/O, so the
//! grouping and diff rules can be exercised without a repository or a
//! network. The orchestration in [`crate::site_history`] is the only caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::site::SiteUpdate;

/// Per-file state tracked in a snapshot, keyed by canonical filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileState {
    pub path: String,
    pub hash: String,
}

/// Filename → state mapping describing the site at one point in the
/// reconstructed history.
pub type Snapshot = BTreeMap<String, FileState>;

/// A group of update events whose timestamps round up to the same minute;
/// the unit of one synthetic commit.
#[derive(Debug, Clone, PartialEq)]
pub struct MinuteBucket {
    pub minute: DateTime<Utc>,
    pub updates: Vec<SiteUpdate>,
}

/// Rounds a timestamp up to the next whole minute. An event at 12:00:59
/// lands in the 12:01 bucket; an event at exactly 12:01:00 lands in 12:02.
pub fn round_up_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    let floored = ts
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts);
    floored + Duration::minutes(1)
}

/// Groups a chronologically ordered event list into minute buckets.
///
/// Adjacent events with equal rounded timestamps always share a bucket, and
/// events with different rounded timestamps never do. Order within a bucket
/// is the input order.
pub fn group_by_minute(updates: Vec<SiteUpdate>) -> Vec<MinuteBucket> {
    let mut buckets: Vec<MinuteBucket> = Vec::new();
    for update in updates {
        let minute = round_up_to_minute(update.timestamp);
        match buckets.last_mut() {
            Some(bucket) if bucket.minute == minute => bucket.updates.push(update),
            _ => buckets.push(MinuteBucket {
                minute,
                updates: vec![update],
            }),
        }
    }
    buckets
}

/// The filename shown to humans: `/` is the index page, everything else is
/// the path's basename (content hash and all).
pub fn display_filename(path: &str) -> String {
    if path == "/" {
        return "index.html".to_string();
    }
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// The filename files are tracked and committed under: the basename with any
/// content-hash middle segments dropped, e.g. `main.abc123.js` → `main.js`.
pub fn canonical_filename(path: &str) -> String {
    let name = display_filename(path);
    let segments: Vec<&str> = name.split('.').collect();
    match segments.as_slice() {
        [] | [_] => name,
        parts => format!("{}.{}", parts[0], parts[parts.len() - 1]),
    }
}

/// Returns the snapshot after applying a bucket's events on top of `prev`.
/// Later events win when a bucket touches the same file twice.
pub fn apply_updates(prev: &Snapshot, updates: &[SiteUpdate]) -> Snapshot {
    let mut next = prev.clone();
    for update in updates {
        next.insert(
            canonical_filename(&update.path),
            FileState {
                path: update.path.clone(),
                hash: update.hash.clone(),
            },
        );
    }
    next
}

/// Builds the commit message for the transition `prev` → `current`.
///
/// The subject line names every changed file; the body carries one line per
/// change: `name (new)` for additions, `old -> new` for path moves, and the
/// bare name for content changes. Files with identical path and hash are
/// omitted entirely.
pub fn commit_message(prev: &Snapshot, current: &Snapshot) -> String {
    let mut changed = Vec::new();
    let mut details = Vec::new();
    for (filename, state) in current {
        let new_path = display_filename(&state.path);
        match prev.get(filename) {
            None => details.push(format!("{} (new)", new_path)),
            Some(old) => {
                let old_path = display_filename(&old.path);
                if old_path != new_path {
                    details.push(format!("{} -> {}", old_path, new_path));
                } else if old.hash != state.hash {
                    details.push(new_path);
                } else {
                    continue;
                }
            }
        }
        changed.push(filename.clone());
    }
    format!("Site update: {}\n\n{}", changed.join(", "), details.join("\n"))
}
