//! Site history rebuild: replays the snapshot API's update feed as a
//! chronological series of git commits.
//!
//! The pipeline is: fetch the event feed, sort it, group it into minute
//! buckets, and for every bucket newer than the current HEAD fetch the
//! changed files concurrently, stage them, and commit with the bucket's
//! timestamp and a generated change summary. Buckets at or before HEAD are
//! skipped but still advance the running snapshot, so the first fresh
//! commit diffs against the accumulated state.

use std::path::Path;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::gitrepo::SiteRepo;
use crate::prettify;
use crate::site::{SiteClient, SiteUpdate};
use crate::timeline::{self, MinuteBucket, Snapshot};

/// Settings for a rebuild run.
#[derive(Debug, Clone)]
pub struct RebuildOptions {
    pub branch: String,
    /// Formatter shell line with a `{file}` placeholder; `None` commits
    /// files unformatted.
    pub formatter: Option<String>,
    /// Concurrent file fetches per bucket.
    pub fetch_limit: usize,
}

/// Outcome summary of a rebuild run.
#[derive(Debug, Default)]
pub struct RebuildReport {
    pub buckets: usize,
    pub commits: usize,
    pub files_written: usize,
}

pub async fn rebuild(
    site: &SiteClient,
    repo_path: &Path,
    options: &RebuildOptions,
) -> Result<RebuildReport, String> {
    let repo = SiteRepo::init(repo_path, &options.branch)
        .map_err(|e| format!("Opening repository failed: {e}"))?;
    let head_timestamp = repo
        .head_timestamp()
        .map_err(|e| format!("Reading HEAD timestamp failed: {e}"))?;
    info!(?head_timestamp, path = %repo_path.display(), "Repository ready");

    let mut updates = site
        .updates()
        .await
        .map_err(|e| format!("Fetching site updates failed: {e}"))?;
    // The upstream order is not trusted; grouping needs chronological input.
    updates.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    info!(events = updates.len(), "Fetched site update feed");

    let mut report = RebuildReport::default();
    let mut previous = Snapshot::new();

    for bucket in timeline::group_by_minute(updates) {
        report.buckets += 1;
        let current = timeline::apply_updates(&previous, &bucket.updates);

        let stale = head_timestamp.map_or(false, |head| bucket.minute <= head);
        if stale {
            debug!(minute = %bucket.minute, "Bucket not newer than HEAD, skipping");
            previous = current;
            continue;
        }

        let files = fetch_bucket_files(site, &bucket, options).await?;
        for (filename, data) in &files {
            repo.stage(filename, data)
                .map_err(|e| format!("Staging {filename} failed: {e}"))?;
        }
        report.files_written += files.len();

        let message = timeline::commit_message(&previous, &current);
        repo.commit(bucket.minute, &message)
            .map_err(|e| format!("Committing bucket at {} failed: {e}", bucket.minute))?;
        report.commits += 1;
        info!(minute = %bucket.minute, files = files.len(), "Committed site update");

        previous = current;
    }

    info!(
        commits = report.commits,
        buckets = report.buckets,
        "Site history rebuild complete"
    );
    Ok(report)
}

/// Fetches and formats every file in a bucket with a bounded, unordered
/// fan-out. Results are returned in event order so staging is deterministic
/// and later events win; the repository is only touched once the whole
/// bucket is in memory.
async fn fetch_bucket_files(
    site: &SiteClient,
    bucket: &MinuteBucket,
    options: &RebuildOptions,
) -> Result<Vec<(String, Vec<u8>)>, String> {
    let formatter = options.formatter.as_deref();
    let mut files: Vec<(usize, (String, Vec<u8>))> = stream::iter(bucket.updates.iter().enumerate())
        .map(|(i, update)| async move {
            fetch_one(site, update, formatter).await.map(|file| (i, file))
        })
        .buffer_unordered(options.fetch_limit.max(1))
        .try_collect()
        .await?;
    files.sort_by_key(|(i, _)| *i);
    Ok(files.into_iter().map(|(_, file)| file).collect())
}

async fn fetch_one(
    site: &SiteClient,
    update: &SiteUpdate,
    formatter: Option<&str>,
) -> Result<(String, Vec<u8>), String> {
    let display = timeline::display_filename(&update.path);
    debug!(file = %display, url = %update.download_url, "Fetching file");
    let raw = site
        .download(&update.download_url)
        .await
        .map_err(|e| format!("Downloading {display} failed: {e}"))?;
    let formatted = prettify::format_file(formatter, &display, raw)
        .await
        .map_err(|e| format!("Formatting {display} failed: {e:?}"))?;
    Ok((timeline::canonical_filename(&update.path), formatted))
}
