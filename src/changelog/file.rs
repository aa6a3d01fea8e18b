//! The changelog file: an ordered entry list plus the version-transition
//! and entry-assembly engine.
//!
//! A [ChangelogFile] holds the parsed entries most-recent-first and is
//! mutated only by prepend-style add operations. Given the previous entry
//! and a requested version it decides what the next valid version must be,
//! asks the injected [Repository] for the commit range feeding the new
//! entry, and applies the purge policies over historical entries.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DchError, Result};
use crate::git::{CommitInfo, LogRange, Repository};
use crate::version::{ReleaseKind, Version};

use super::entry::{parse_entries, Entry};

// Marker line written by snapshot entries; a later auto run resumes the
// commit range from the hash it embeds.
static RE_SNAPSHOT_BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2}\*\* SNAPSHOT build @([a-f0-9]{40}) \*\*").unwrap());

/// Caller-supplied inputs for the add operations.
///
/// `None` fields fall back to the head entry's values (or, for the source
/// of the very first entry, the working directory name). `add_snapshot`
/// ignores urgency, target and the purge flags: snapshots always land as
/// urgency "low" targeting "UNRELEASED" and never purge.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub since: Option<String>,
    pub source: Option<String>,
    pub urgency: Option<String>,
    pub target: Option<String>,
    pub author: Option<String>,
    pub auto: bool,
    pub ignore_merges: bool,
    pub purge_testing: bool,
    pub purge_unstable: bool,
}

/// Render commit records as changelog body lines, one starred line per
/// commit using the first line of the message.
fn format_commit_log(commits: &[CommitInfo]) -> String {
    let mut out = String::new();
    for commit in commits {
        let first_line = commit.message.lines().next().unwrap_or("");
        out.push_str("  * ");
        out.push_str(first_line);
        out.push('\n');
    }
    out
}

/// All entries of one changelog file, most-recent-first.
#[derive(Debug, Clone, Default)]
pub struct ChangelogFile {
    entries: Vec<Entry>,
}

impl ChangelogFile {
    /// An empty changelog.
    pub fn new() -> Self {
        ChangelogFile::default()
    }

    /// Parse changelog text; zero entries is valid.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(ChangelogFile {
            entries: parse_entries(text)?,
        })
    }

    /// Read and parse a changelog file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Serialize every entry back to the flat text form, entries separated
    /// by one blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&entry.to_string());
        }
        out
    }

    /// Write the rendered changelog to disk. The full content is built in
    /// memory first, so a failed run never leaves a partial file.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = self.render();
        fs::write(path, text)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The most recent entry, whose fields serve as defaults for new ones.
    pub fn head(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Version of the most recent entry; fails on an empty changelog.
    pub fn last_version(&self) -> Result<Version> {
        match self.head() {
            Some(entry) => Ok(entry.version().clone()),
            None => Err(DchError::version(
                "the changelog file is empty, cannot get last release version",
            )),
        }
    }

    /// Decide the version of the next entry given the requested one.
    ///
    /// On an empty changelog the request is accepted with its revision
    /// normalized for its kind. Otherwise the request must compare above
    /// the stored head version; equality auto-increments the revision and
    /// anything below is a hard error.
    fn compute_new_version(&self, v: &Version, repo: &dyn Repository) -> Result<Version> {
        let mut new_version = v.clone();

        let old = match self.head() {
            None => {
                if new_version.is_snapshot() {
                    new_version.set_revision("");
                } else if new_version.is_staging()
                    || new_version.is_development()
                    || new_version.is_native()
                {
                    new_version.set_revision("1");
                }
                return Ok(new_version);
            }
            Some(head) => head.version().clone(),
        };

        // A native request means "next version for this upstream": anchor
        // the comparison on the native forms of both sides.
        if !v.is_snapshot() && v.revision().is_empty() {
            let old_native = old.extract_native();
            let new_native = new_version.extract_native();
            return match new_native.cmp(&old_native) {
                Ordering::Less => Err(DchError::version(format!(
                    "the new version {} is lesser than the old version {}",
                    v, old
                ))),
                Ordering::Equal => old.increment_revision(repo),
                Ordering::Greater => Ok(new_version),
            };
        }

        // Two snapshots compare through the dedicated hash-insensitive
        // helpers, with the stored counter copied onto the request first.
        if v.is_snapshot() && old.is_snapshot() {
            let release = old.snapshot_release()?;
            let aligned = v.with_snapshot_release(release)?;
            return match Version::compare_snapshots(&aligned, &old)? {
                Ordering::Less => Err(DchError::version(format!(
                    "the new version {} is lesser than the old version {}",
                    aligned, old
                ))),
                Ordering::Equal => aligned.increment_revision(repo),
                Ordering::Greater => Ok(new_version),
            };
        }

        // Explicit revision: compare with the stored revision copied over.
        let mut candidate = v.clone();
        candidate.set_revision(old.revision());
        match candidate.cmp(&old) {
            Ordering::Less => Err(DchError::version(format!(
                "the new version {} is lesser than the old version {}",
                candidate, old
            ))),
            Ordering::Equal => candidate.increment_revision(repo),
            Ordering::Greater => Ok(new_version),
        }
    }

    fn compute_source_name(&self, source: Option<&str>) -> Result<String> {
        let mut out = source.unwrap_or("").to_string();

        if out.is_empty() {
            if let Some(head) = self.head() {
                out = head.source().to_string();
            } else {
                // first entry of a fresh changelog: use the working
                // directory name, the way dch seeds a new package
                let path = std::env::current_dir()?;
                out = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("")
                    .to_string();
            }
        }

        if out.chars().any(char::is_whitespace) {
            return Err(DchError::entry(format!("source '{}' contains whitespace", out)));
        }
        if out.is_empty() {
            return Err(DchError::entry("source is an empty string"));
        }

        Ok(out)
    }

    fn compute_target_name(&self, target: Option<&str>) -> Result<String> {
        let mut out = target.unwrap_or("").to_string();

        if out.is_empty() {
            if let Some(head) = self.head() {
                out = head.target().to_string();
            }
        }

        if out.chars().any(char::is_whitespace) {
            return Err(DchError::entry(format!("target '{}' contains whitespace", out)));
        }
        if out.is_empty() {
            return Err(DchError::entry("target is an empty string"));
        }

        Ok(out)
    }

    fn compute_author(&self, author: Option<&str>) -> Result<String> {
        let mut out = author.unwrap_or("").to_string();

        if out.is_empty() {
            if let Some(head) = self.head() {
                out = head.author().to_string();
            }
        }

        if out.is_empty() {
            return Err(DchError::entry("author is an empty string"));
        }

        Ok(out)
    }

    /// Assemble the commit log text for a new entry.
    ///
    /// An explicit `since` wins. With `auto` and a non-empty changelog the
    /// start point is resolved from the head entry: the hash embedded in a
    /// snapshot banner, then a tag matching the head version (annotated
    /// tags preferred), then the head entry's timestamp. Otherwise the
    /// whole history is included.
    fn collect_log(
        &self,
        repo: &dyn Repository,
        since: Option<&str>,
        auto: bool,
        ignore_merges: bool,
    ) -> Result<String> {
        if let Some(since) = since {
            let commits =
                repo.commit_log(&LogRange::SinceCommitish(since.to_string()), ignore_merges)?;
            return Ok(format_commit_log(&commits));
        }

        if let Some(head) = self.head() {
            if auto {
                if head.version().kind() == ReleaseKind::Snapshot {
                    let hashes: Vec<String> = RE_SNAPSHOT_BANNER
                        .captures_iter(head.changelog())
                        .map(|caps| caps[1].to_string())
                        .collect();
                    if hashes.len() != 1 {
                        return Err(DchError::parse(
                            "cannot find a valid commit hash in the last snapshot entry",
                        ));
                    }
                    let commits = repo.commit_log(
                        &LogRange::SinceCommitish(hashes[0].clone()),
                        ignore_merges,
                    )?;
                    return Ok(format_commit_log(&commits));
                }

                let full = head.version().to_string();
                let upstream = head.version().upstream().to_string();
                let mut commit = repo.commit_at_tag_object(&full, &upstream)?;
                if commit.is_none() {
                    commit = repo.commit_at_tag(&full, &upstream)?;
                }
                if let Some(commit) = commit {
                    let commits =
                        repo.commit_log(&LogRange::SinceCommitish(commit), ignore_merges)?;
                    return Ok(format_commit_log(&commits));
                }

                let commits =
                    repo.commit_log(&LogRange::SinceTime(head.when()), ignore_merges)?;
                return Ok(format_commit_log(&commits));
            }
        }

        let commits = repo.commit_log(&LogRange::All, ignore_merges)?;
        Ok(format_commit_log(&commits))
    }

    fn build_release_log(
        &self,
        repo: &dyn Repository,
        since: Option<&str>,
        ver: &Version,
        auto: bool,
        ignore_merges: bool,
    ) -> Result<String> {
        let mut banner_version = ver.clone();
        banner_version.set_epoch(0);
        banner_version.set_revision("");

        let mut out = format!("  ** Release version {}\n\n", banner_version);
        out.push_str(&self.collect_log(repo, since, auto, ignore_merges)?);
        Ok(out)
    }

    fn build_snapshot_log(
        &self,
        repo: &dyn Repository,
        since: Option<&str>,
        auto: bool,
        ignore_merges: bool,
    ) -> Result<String> {
        let hash = repo.last_commit_hash(None)?;

        let mut out = format!("  ** SNAPSHOT build @{} **\n\n", hash);
        out.push_str(&self.collect_log(repo, since, auto, ignore_merges)?);
        Ok(out)
    }

    /// Remove Staging-kind entries when `testing` and Development-kind
    /// entries when `unstable`. The flags are named after the distribution
    /// each kind is released to, not after the kind itself.
    pub fn purge_releases(&mut self, testing: bool, unstable: bool) {
        self.entries.retain(|entry| {
            let kind = entry.version().kind();
            let is_testing = testing && kind == ReleaseKind::Staging;
            let is_unstable = unstable && kind == ReleaseKind::Development;
            !(is_testing || is_unstable)
        });
    }

    /// Remove every Snapshot-kind entry.
    pub fn purge_snapshot_releases(&mut self) {
        self.entries
            .retain(|entry| entry.version().kind() != ReleaseKind::Snapshot);
    }

    #[allow(clippy::too_many_arguments)]
    fn add_simple(
        &mut self,
        repo: &dyn Repository,
        source: Option<&str>,
        ver: &Version,
        urgency: &str,
        target: Option<&str>,
        clog: &str,
        author: Option<&str>,
    ) -> Result<(Version, Entry)> {
        let source = self.compute_source_name(source)?;
        let version = self.compute_new_version(ver, repo)?;
        let target = self.compute_target_name(target)?;
        let author = self.compute_author(author)?;

        let entry = Entry::new(&source, version.clone(), &target, urgency, clog, &author)?;
        self.entries.insert(0, entry.clone());

        Ok((version, entry))
    }

    /// Add a plain entry: purge testing/unstable entries per the flags and
    /// record the commit log with the caller's urgency and target.
    pub fn add(
        &mut self,
        repo: &dyn Repository,
        ver: &Version,
        opts: &AddOptions,
    ) -> Result<(Version, Entry)> {
        self.purge_releases(opts.purge_testing, opts.purge_unstable);

        let clog = self.collect_log(repo, opts.since.as_deref(), opts.auto, opts.ignore_merges)?;

        self.add_simple(
            repo,
            opts.source.as_deref(),
            ver,
            opts.urgency.as_deref().unwrap_or(""),
            opts.target.as_deref(),
            &clog,
            opts.author.as_deref(),
        )
    }

    /// Add a snapshot entry.
    ///
    /// Staging and Development requests are rejected before the file is
    /// touched; anything else is built into a snapshot version. The entry
    /// always lands as urgency "low" targeting "UNRELEASED", regardless of
    /// the caller's options.
    pub fn add_snapshot(
        &mut self,
        repo: &dyn Repository,
        ver: &Version,
        opts: &AddOptions,
    ) -> Result<(Version, Entry)> {
        if ver.is_staging() || ver.is_development() {
            return Err(DchError::version(format!(
                "cannot use value {} as a snapshot version",
                ver
            )));
        }
        let ver = ver.build(ReleaseKind::Snapshot, repo).map_err(|e| {
            DchError::version(format!(
                "cannot create a snapshot version from value {}: {}",
                ver, e
            ))
        })?;

        let clog =
            self.build_snapshot_log(repo, opts.since.as_deref(), opts.auto, opts.ignore_merges)?;

        self.add_simple(
            repo,
            opts.source.as_deref(),
            &ver,
            "low",
            Some("UNRELEASED"),
            &clog,
            opts.author.as_deref(),
        )
    }

    /// Add a release entry.
    ///
    /// A native request is built into a Release version, or into a Staging
    /// one when the target distribution is "unstable" (the "release to
    /// unstable" flow lands as staging). Snapshot entries are always
    /// purged first, testing/unstable entries per the flags.
    pub fn add_release(
        &mut self,
        repo: &dyn Repository,
        ver: &Version,
        opts: &AddOptions,
    ) -> Result<(Version, Entry)> {
        let mut ver = ver.clone();
        if ver.is_native() {
            let kind = if opts.target.as_deref() == Some("unstable") {
                ReleaseKind::Staging
            } else {
                ReleaseKind::Release
            };

            ver = ver.build(kind, repo).map_err(|e| {
                DchError::version(format!(
                    "cannot create a {} version from value {}: {}",
                    kind, ver, e
                ))
            })?;
        }

        self.purge_releases(opts.purge_testing, opts.purge_unstable);
        self.purge_snapshot_releases();

        let clog = self.build_release_log(
            repo,
            opts.since.as_deref(),
            &ver,
            opts.auto,
            opts.ignore_merges,
        )?;

        self.add_simple(
            repo,
            opts.source.as_deref(),
            &ver,
            opts.urgency.as_deref().unwrap_or(""),
            opts.target.as_deref(),
            &clog,
            opts.author.as_deref(),
        )
    }
}
