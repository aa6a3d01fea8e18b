use std::collections::HashMap;

use crate::error::{DchError, Result};
use crate::git::{CommitInfo, LogRange, Repository};

/// In-memory repository for exercising the engine without a real git
/// object store.
///
/// Commits are held newest-first, mirroring the traversal order of the
/// real implementation; [MockRepository::add_commit] expects callers to
/// add them in chronological order.
pub struct MockRepository {
    commits: Vec<CommitInfo>,
    head_hash: Option<String>,
    lightweight_tags: HashMap<String, String>,
    annotated_tags: HashMap<String, String>,
    references: HashMap<String, String>,
    branch: Option<String>,
    config: HashMap<String, String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            head_hash: None,
            lightweight_tags: HashMap::new(),
            annotated_tags: HashMap::new(),
            references: HashMap::new(),
            branch: None,
            config: HashMap::new(),
        }
    }

    /// Add a commit as the new head. Call in chronological order.
    pub fn add_commit(&mut self, info: CommitInfo) {
        self.commits.insert(0, info);
    }

    /// Override the hash reported for the repository head.
    pub fn set_head_hash(&mut self, hash: impl Into<String>) {
        self.head_hash = Some(hash.into());
    }

    /// Add a lightweight tag pointing at a commit hash.
    pub fn add_lightweight_tag(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        self.lightweight_tags.insert(name.into(), hash.into());
    }

    /// Add an annotated tag targeting a commit hash.
    pub fn add_annotated_tag(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        self.annotated_tags.insert(name.into(), hash.into());
    }

    /// Add a reference pointing at a commit hash.
    pub fn add_reference(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        self.references.insert(name.into(), hash.into());
    }

    /// Set the active branch name.
    pub fn set_branch(&mut self, name: impl Into<String>) {
        self.branch = Some(name.into());
    }

    /// Set a configuration value for a section/key pair.
    pub fn set_config_value(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.config
            .insert(format!("{}.{}", section.into(), key.into()), value.into());
    }

    fn resolve_commitish(&self, name: &str) -> String {
        if let Some(hash) = self.lightweight_tags.get(name) {
            return hash.clone();
        }
        if let Some(hash) = self.annotated_tags.get(name) {
            return hash.clone();
        }
        if let Some(hash) = self.references.get(name) {
            return hash.clone();
        }
        name.to_string()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn last_commit_hash(&self, len: Option<usize>) -> Result<String> {
        let hash = self
            .head_hash
            .clone()
            .or_else(|| self.commits.first().map(|commit| commit.hash.clone()))
            .ok_or_else(|| DchError::repository("mock repository has no commits"))?;

        let len = match len {
            Some(len) if len <= hash.len() => len,
            _ => hash.len(),
        };
        Ok(hash[..len].to_string())
    }

    fn commit_log(&self, range: &LogRange, ignore_merges: bool) -> Result<Vec<CommitInfo>> {
        // the mock holds no merge commits, the flag only exists for
        // interface parity
        let _ = ignore_merges;

        let boundary = match range {
            LogRange::SinceCommitish(name) => Some(self.resolve_commitish(name)),
            _ => None,
        };

        let mut commits = Vec::new();
        for commit in &self.commits {
            if let Some(boundary) = &boundary {
                if commit.hash == *boundary {
                    break;
                }
            }
            if let LogRange::SinceTime(time) = range {
                if commit.when <= *time {
                    break;
                }
            }
            commits.push(commit.clone());
        }

        Ok(commits)
    }

    fn commit_at_tag(&self, full: &str, upstream: &str) -> Result<Option<String>> {
        Ok(self
            .lightweight_tags
            .get(full)
            .or_else(|| self.lightweight_tags.get(upstream))
            .cloned())
    }

    fn commit_at_tag_object(&self, full: &str, upstream: &str) -> Result<Option<String>> {
        Ok(self
            .annotated_tags
            .get(full)
            .or_else(|| self.annotated_tags.get(upstream))
            .cloned())
    }

    fn commit_at_reference(&self, name: &str) -> Result<Option<String>> {
        Ok(self.references.get(name).cloned())
    }

    fn active_branch(&self) -> Result<String> {
        self.branch
            .clone()
            .ok_or_else(|| DchError::repository("mock repository has no active branch"))
    }

    fn config_value(&self, section: &str, key: &str) -> Result<String> {
        Ok(self
            .config
            .get(&format!("{}.{}", section, key))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn commit(hash: &str, when_rfc2822: &str) -> CommitInfo {
        CommitInfo {
            hash: hash.to_string(),
            message: "msg".to_string(),
            author: "A".to_string(),
            when: DateTime::parse_from_rfc2822(when_rfc2822).unwrap(),
        }
    }

    #[test]
    fn test_last_commit_hash_truncation() {
        let mut repo = MockRepository::new();
        repo.set_head_hash("0123456789abcdef0123456789abcdef01234567");

        assert_eq!(repo.last_commit_hash(Some(6)).unwrap(), "012345");
        assert_eq!(
            repo.last_commit_hash(None).unwrap(),
            "0123456789abcdef0123456789abcdef01234567"
        );
        assert_eq!(
            repo.last_commit_hash(Some(999)).unwrap(),
            "0123456789abcdef0123456789abcdef01234567"
        );
    }

    #[test]
    fn test_last_commit_hash_requires_commits() {
        let repo = MockRepository::new();
        assert!(repo.last_commit_hash(None).is_err());
    }

    #[test]
    fn test_commit_log_boundaries() {
        let mut repo = MockRepository::new();
        repo.add_commit(commit("a".repeat(40).as_str(), "Tue, 14 Mar 2017 10:00:00 +0000"));
        repo.add_commit(commit("b".repeat(40).as_str(), "Tue, 14 Mar 2017 12:00:00 +0000"));

        let all = repo.commit_log(&LogRange::All, false).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].hash, "b".repeat(40));

        let since = repo
            .commit_log(&LogRange::SinceCommitish("a".repeat(40)), false)
            .unwrap();
        assert_eq!(since.len(), 1);
        assert_eq!(since[0].hash, "b".repeat(40));
    }

    #[test]
    fn test_tag_lookup() {
        let mut repo = MockRepository::new();
        repo.add_lightweight_tag("1.0.0-1", "cafe");
        repo.add_annotated_tag("2.0.0", "beef");

        assert_eq!(
            repo.commit_at_tag("1.0.0-1", "1.0.0").unwrap(),
            Some("cafe".to_string())
        );
        assert_eq!(
            repo.commit_at_tag_object("2.0.0-1", "2.0.0").unwrap(),
            Some("beef".to_string())
        );
        assert_eq!(repo.commit_at_tag("3.0.0-1", "3.0.0").unwrap(), None);
    }

    #[test]
    fn test_config_values_default_to_empty() {
        let mut repo = MockRepository::new();
        repo.set_config_value("user", "name", "Test User");

        assert_eq!(repo.config_value("user", "name").unwrap(), "Test User");
        assert_eq!(repo.config_value("user", "email").unwrap(), "");
    }
}
