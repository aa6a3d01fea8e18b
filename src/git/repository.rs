use std::path::Path;

use chrono::{DateTime, FixedOffset};
use git2::{ErrorCode, ObjectType, Repository as Git2Repo, Sort};

use crate::error::{DchError, Result};
use crate::git::{CommitInfo, LogRange, Repository};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository starting at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from an existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head()?;
        Ok(head.peel_to_commit()?)
    }

    /// Resolve a commitish name the way log ranges expect: lightweight
    /// tag, annotated tag, reference, then the value itself as a hash.
    fn resolve_commitish(&self, name: &str) -> Result<String> {
        if let Some(hash) = self.commit_at_tag(name, name)? {
            return Ok(hash);
        }
        if let Some(hash) = self.commit_at_tag_object(name, name)? {
            return Ok(hash);
        }
        if let Some(hash) = self.commit_at_reference(name)? {
            return Ok(hash);
        }
        Ok(name.to_string())
    }
}

/// Author timestamp of a commit as a fixed-offset datetime.
fn commit_time(commit: &git2::Commit<'_>) -> DateTime<FixedOffset> {
    let when = commit.author().when();
    let utc = DateTime::from_timestamp(when.seconds(), 0).unwrap_or(DateTime::UNIX_EPOCH);
    match FixedOffset::east_opt(when.offset_minutes() * 60) {
        Some(offset) => utc.with_timezone(&offset),
        None => utc.fixed_offset(),
    }
}

impl Repository for Git2Repository {
    fn last_commit_hash(&self, len: Option<usize>) -> Result<String> {
        let commit = self.head_commit()?;
        let hash = commit.id().to_string();

        let len = match len {
            Some(len) if len <= hash.len() => len,
            _ => hash.len(),
        };
        Ok(hash[..len].to_string())
    }

    fn commit_log(&self, range: &LogRange, ignore_merges: bool) -> Result<Vec<CommitInfo>> {
        let boundary = match range {
            LogRange::SinceCommitish(name) => Some(self.resolve_commitish(name)?),
            _ => None,
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            if let Some(boundary) = &boundary {
                if oid.to_string() == *boundary {
                    break;
                }
            }
            if let LogRange::SinceTime(time) = range {
                if commit_time(&commit) <= *time {
                    break;
                }
            }

            if ignore_merges && commit.parent_count() > 1 {
                continue;
            }

            commits.push(CommitInfo {
                hash: oid.to_string(),
                message: commit.message().unwrap_or("").to_string(),
                author: commit.author().name().unwrap_or("unknown").to_string(),
                when: commit_time(&commit),
            });
        }

        Ok(commits)
    }

    fn commit_at_tag(&self, full: &str, upstream: &str) -> Result<Option<String>> {
        let names = self.repo.tag_names(None)?;

        for name in names.iter().flatten() {
            if name != full && name != upstream {
                continue;
            }
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            if let Some(oid) = reference.target() {
                return Ok(Some(oid.to_string()));
            }
        }

        Ok(None)
    }

    fn commit_at_tag_object(&self, full: &str, upstream: &str) -> Result<Option<String>> {
        let names = self.repo.tag_names(None)?;

        for name in names.iter().flatten() {
            if name != full && name != upstream {
                continue;
            }
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            let oid = match reference.target() {
                Some(oid) => oid,
                None => continue,
            };
            // only annotated tags are objects; lightweight tags point
            // straight at the commit and are handled by commit_at_tag
            if let Ok(tag) = self.repo.find_tag(oid) {
                if tag.target_type() == Some(ObjectType::Commit) {
                    return Ok(Some(tag.target_id().to_string()));
                }
            }
        }

        Ok(None)
    }

    fn commit_at_reference(&self, name: &str) -> Result<Option<String>> {
        let references = self.repo.references()?;

        for reference in references {
            let reference = reference?;
            let matches =
                reference.shorthand() == Some(name) || reference.name() == Some(name);
            if !matches {
                continue;
            }
            let resolved = reference.resolve()?;
            return Ok(resolved.target().map(|oid| oid.to_string()));
        }

        Ok(None)
    }

    fn active_branch(&self) -> Result<String> {
        let head = self
            .repo
            .head()
            .map_err(|e| DchError::repository(format!("cannot get head reference: {}", e)))?;

        if !head.is_branch() {
            return Err(DchError::repository(
                "the active commit is not a valid branch",
            ));
        }

        head.shorthand()
            .map(|name| name.to_string())
            .ok_or_else(|| DchError::repository("the active branch name is not valid utf-8"))
    }

    fn config_value(&self, section: &str, key: &str) -> Result<String> {
        let mut config = self
            .repo
            .config()
            .map_err(|e| DchError::repository(format!("cannot get git configuration: {}", e)))?;
        let snapshot = config.snapshot()?;

        match snapshot.get_string(&format!("{}.{}", section, key)) {
            Ok(value) => Ok(value),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}
