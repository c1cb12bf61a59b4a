//! Local git repository operations for the site history rebuild.
//!
//! Commits are synthesized with timestamps taken from the minute buckets
//! rather than wall-clock time, so the resulting history mirrors the site's
//! own timeline. The author/committer identity pair is fixed.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{
    BranchType, ErrorCode, IndexEntry, IndexTime, Oid, Repository, RepositoryInitOptions,
    ResetType, Signature,
};
use tracing::{debug, info};

/// Author stamped on every synthesized commit: the site's producer.
const AUTHOR: (&str, &str) = ("The Game Band", "dontmailthis@example.com");
/// Committer: the archiver.
const COMMITTER: (&str, &str) = ("Chronicler", "hi@sibr.dev");

pub struct SiteRepo {
    repo: Repository,
    branch: String,
}

impl SiteRepo {
    /// Opens the repository at `path`, initializing it with the given
    /// initial branch when absent.
    pub fn init(path: &Path, branch: &str) -> Result<Self, git2::Error> {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(branch);
        let repo = Repository::init_opts(path, &opts)?;
        Ok(Self {
            repo,
            branch: branch.to_string(),
        })
    }

    /// Author timestamp of the current HEAD commit, or `None` while the
    /// branch is unborn.
    pub fn head_timestamp(&self) -> Result<Option<DateTime<Utc>>, git2::Error> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit()?;
                let seconds = commit.author().when().seconds();
                Ok(Utc.timestamp_opt(seconds, 0).single())
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes `data` as a blob and stages it in the index under `filename`.
    pub fn stage(&self, filename: &str, data: &[u8]) -> Result<(), git2::Error> {
        let blob = self.repo.blob(data)?;
        let entry = IndexEntry {
            ctime: IndexTime::new(0, 0),
            mtime: IndexTime::new(0, 0),
            dev: 0,
            ino: 0,
            mode: 0o100644,
            uid: 0,
            gid: 0,
            file_size: data.len() as u32,
            id: blob,
            flags: 0,
            flags_extended: 0,
            path: filename.as_bytes().to_vec(),
        };
        let mut index = self.repo.index()?;
        index.add(&entry)?;
        index.write()?;
        debug!(file = filename, blob = %blob, "Staged file");
        Ok(())
    }

    /// Commits the current index to the configured branch with the fixed
    /// identities and the given timestamp, then hard-resets so the index and
    /// worktree match the new HEAD.
    pub fn commit(&self, at: DateTime<Utc>, message: &str) -> Result<Oid, git2::Error> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let time = git2::Time::new(at.timestamp(), 0);
        let author = Signature::new(AUTHOR.0, AUTHOR.1, &time)?;
        let committer = Signature::new(COMMITTER.0, COMMITTER.1, &time)?;

        let parent = match self.repo.find_branch(&self.branch, BranchType::Local) {
            Ok(branch) => Some(branch.get().peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(e),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let refname = format!("refs/heads/{}", self.branch);
        let oid = self
            .repo
            .commit(Some(&refname), &author, &committer, message, &tree, &parents)?;
        info!(commit = %oid, at = %at, "Created commit");

        let head = self.repo.revparse_single("HEAD")?;
        self.repo.reset(&head, ResetType::Hard, None)?;
        Ok(oid)
    }
}
