//! Git repository access layer.
//!
//! The changelog engine consumes repositories through the [Repository]
//! trait so it can be exercised without a real object store. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: the real implementation over the
//!   `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for tests
//!
//! The trait is an injected capability: every consumer receives a
//! `&dyn Repository`, nothing reaches for a process-wide handle.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use chrono::{DateTime, FixedOffset};

use crate::error::Result;

/// One commit as consumed by the changelog engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Full 40-character commit hash
    pub hash: String,
    /// The commit message
    pub message: String,
    /// The commit author's name
    pub author: String,
    /// The author timestamp
    pub when: DateTime<FixedOffset>,
}

/// Boundary of a commit-log query.
#[derive(Debug, Clone)]
pub enum LogRange {
    /// Every commit reachable from HEAD.
    All,
    /// Commits strictly newer than the commit the name resolves to. The
    /// name is resolved through lightweight tags, annotated tags and
    /// references before being treated as a raw hash; the boundary commit
    /// itself is excluded.
    SinceCommitish(String),
    /// Commits authored strictly after the given time.
    SinceTime(DateTime<FixedOffset>),
}

/// Read-only queries the changelog engine needs from a git repository.
///
/// Implementations never mutate repository state; any access failure
/// surfaces as an error and is neither retried nor cached.
pub trait Repository {
    /// Hash of the most recent commit, truncated to `len` hex characters.
    /// `None` (or a length beyond the full hash) yields all 40 characters.
    fn last_commit_hash(&self, len: Option<usize>) -> Result<String>;

    /// Commit records within the range, newest first. Merge commits (more
    /// than one parent) are dropped when `ignore_merges` is set.
    fn commit_log(&self, range: &LogRange, ignore_merges: bool) -> Result<Vec<CommitInfo>>;

    /// Commit a lightweight tag points to, matching the tag name against
    /// either the full rendered version or the bare upstream string.
    fn commit_at_tag(&self, full: &str, upstream: &str) -> Result<Option<String>>;

    /// Commit an annotated tag object targets, matched like
    /// [Repository::commit_at_tag].
    fn commit_at_tag_object(&self, full: &str, upstream: &str) -> Result<Option<String>>;

    /// Commit a branch or other reference points to, following symbolic
    /// references.
    fn commit_at_reference(&self, name: &str) -> Result<Option<String>>;

    /// Short name of the branch HEAD is on; fails on a detached HEAD.
    fn active_branch(&self) -> Result<String>;

    /// A configuration value, or the empty string when the key is unset.
    fn config_value(&self, section: &str, key: &str) -> Result<String>;
}
