//! Debian-style version identifiers across the four release channels.
//!
//! A [Version] carries an epoch, an upstream string and a packaging
//! revision. Its [ReleaseKind] is always derived from the rendered string:
//! `~stg` plus a revision marks a staging build, a `.YYYYMMDD` date plus a
//! revision marks a development build, `~<n>.gbp<hash6>` with no revision
//! marks a snapshot, and everything else is a (stable) release. A version
//! with no revision and no kind suffix is "native" and is the anchor used
//! when comparing across kinds.

mod compare;
mod kind;

pub use kind::ReleaseKind;

use std::cmp::Ordering;
use std::fmt;

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DchError, Result};
use crate::git::Repository;

static RE_STAGING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+:)?\d+\.\d+\.\d+~stg-\d+$").unwrap());
static RE_DEVELOPMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+:)?\d+\.\d+\.\d+\.\d{8}-\d+$").unwrap());
static RE_SNAPSHOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+:)?\d+\.\d+\.\d+~\d+\.gbp[0-9a-f]{6}$").unwrap());

static RE_SPLIT_REVISION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\D*)(\d+)$").unwrap());
static RE_SPLIT_STAGING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)~stg$").unwrap());
static RE_SPLIT_DEVELOPMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)\.(\d{8})$").unwrap());
static RE_SPLIT_SNAPSHOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.*?)~(\d+)\.gbp([0-9a-f]{6})").unwrap());

/// Today's date in the form embedded by development versions.
fn development_date() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// One Debian-style version: `[epoch:]upstream[-revision]`.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u32,
    upstream: String,
    revision: String,
}

impl Version {
    /// Create a version from its raw parts. No validation is performed;
    /// use [Version::parse] for untrusted input.
    pub fn new(epoch: u32, upstream: impl Into<String>, revision: impl Into<String>) -> Self {
        Version {
            epoch,
            upstream: upstream.into(),
            revision: revision.into(),
        }
    }

    /// Parse a version string of the form `[epoch:]upstream[-revision]`.
    ///
    /// The upstream part must start with a digit and may contain only
    /// alphanumerics and `.+~` (plus `-` when a revision is present); the
    /// revision may contain only alphanumerics and `.+~`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DchError::version("empty version string"));
        }

        let (epoch, rest) = match input.find(':') {
            Some(idx) => {
                let value = &input[..idx];
                let epoch = value.parse::<u32>().map_err(|_| {
                    DchError::version(format!("epoch in '{}' is not a number", input))
                })?;
                (epoch, &input[idx + 1..])
            }
            None => (0, input),
        };

        let (upstream, revision) = match rest.rfind('-') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };

        if upstream.is_empty() {
            return Err(DchError::version(format!(
                "version '{}' has an empty upstream part",
                input
            )));
        }
        if !upstream.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(DchError::version(format!(
                "upstream version in '{}' must start with a digit",
                input
            )));
        }
        if !upstream
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~' | '-'))
        {
            return Err(DchError::version(format!(
                "upstream version in '{}' contains invalid characters",
                input
            )));
        }
        if rest.contains('-') && revision.is_empty() {
            return Err(DchError::version(format!(
                "version '{}' has an empty revision",
                input
            )));
        }
        if !revision
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~'))
        {
            return Err(DchError::version(format!(
                "revision in '{}' contains invalid characters",
                input
            )));
        }

        Ok(Version::new(epoch, upstream, revision))
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn set_epoch(&mut self, epoch: u32) {
        self.epoch = epoch;
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn set_revision(&mut self, revision: impl Into<String>) {
        self.revision = revision.into();
    }

    /// A native version carries no packaging revision.
    pub fn is_native(&self) -> bool {
        self.revision.is_empty()
    }

    pub fn is_snapshot(&self) -> bool {
        RE_SNAPSHOT.is_match(&self.to_string())
    }

    pub fn is_staging(&self) -> bool {
        RE_STAGING.is_match(&self.to_string())
    }

    pub fn is_development(&self) -> bool {
        RE_DEVELOPMENT.is_match(&self.to_string())
    }

    /// Stable means none of the staging/development/snapshot patterns.
    pub fn is_stable(&self) -> bool {
        !self.is_staging() && !self.is_development() && !self.is_snapshot()
    }

    /// Release kind derived from the rendered string.
    pub fn kind(&self) -> ReleaseKind {
        if self.is_snapshot() {
            ReleaseKind::Snapshot
        } else if self.is_development() {
            ReleaseKind::Development
        } else if self.is_staging() {
            ReleaseKind::Staging
        } else {
            ReleaseKind::Release
        }
    }

    /// Strip the kind suffix, the epoch and the revision, leaving the bare
    /// upstream version used as the comparison anchor across kinds.
    pub fn extract_native(&self) -> Version {
        let mut out = Version::new(0, self.upstream.clone(), self.revision.clone());

        if out.is_staging() {
            if let Some(caps) = RE_SPLIT_STAGING.captures(&self.upstream) {
                out.upstream = caps[1].to_string();
            }
        } else if out.is_development() {
            if let Some(caps) = RE_SPLIT_DEVELOPMENT.captures(&self.upstream) {
                out.upstream = caps[1].to_string();
            }
        } else if out.is_snapshot() {
            if let Some(caps) = RE_SPLIT_SNAPSHOT.captures(&self.upstream) {
                out.upstream = caps[1].to_string();
            }
        }
        out.revision = String::new();

        out
    }

    /// Promote this version into the requested kind.
    ///
    /// Only same-kind refresh and native-to-kind promotion are defined;
    /// every other transition fails, naming both kinds. Building a
    /// snapshot queries the repository for the current short commit hash.
    pub fn build(&self, target: ReleaseKind, repo: &dyn Repository) -> Result<Version> {
        let mut out = self.clone();

        match target {
            ReleaseKind::Release => {
                if out.is_snapshot() || out.is_staging() {
                    let epoch = out.epoch;
                    out = out.extract_native();
                    out.epoch = epoch;
                    out.revision = "1".to_string();
                } else if out.is_native() {
                    out.revision = "1".to_string();
                } else if !out.is_stable() {
                    return Err(DchError::version(format!(
                        "cannot build a release version from {} version {}",
                        out.kind(),
                        out
                    )));
                }
            }
            ReleaseKind::Staging => {
                if out.is_snapshot() {
                    let epoch = out.epoch;
                    out = out.extract_native();
                    out.upstream.push_str("~stg");
                    out.epoch = epoch;
                    out.revision = "1".to_string();
                } else if out.is_staging() {
                    // already staging, nothing to do
                } else if out.is_native() {
                    out.upstream.push_str("~stg");
                    out.revision = "1".to_string();
                } else {
                    return Err(DchError::version(format!(
                        "cannot build a staging version from {} version {}",
                        out.kind(),
                        out
                    )));
                }
            }
            ReleaseKind::Development => {
                if out.is_development() {
                    // already development, nothing to do
                } else if out.is_stable() {
                    out.upstream = format!("{}.{}", out.upstream, development_date());
                    out.revision = "1".to_string();
                } else {
                    return Err(DchError::version(format!(
                        "cannot build a development version from {} version {}",
                        out.kind(),
                        out
                    )));
                }
            }
            ReleaseKind::Snapshot => {
                let hash = repo.last_commit_hash(Some(6))?;
                if out.is_snapshot() {
                    let caps = RE_SPLIT_SNAPSHOT.captures(&out.upstream).ok_or_else(|| {
                        DchError::version(format!("the version {} is not a valid snapshot", out))
                    })?;
                    out.upstream = format!("{}~{}.gbp{}", &caps[1], &caps[2], hash);
                    out.revision = String::new();
                } else if out.is_native() {
                    out.upstream = format!("{}~1.gbp{}", out.upstream, hash);
                    out.revision = String::new();
                } else {
                    return Err(DchError::version(format!(
                        "cannot build a snapshot version from {} version {}",
                        out.kind(),
                        out
                    )));
                }
            }
        }

        Ok(out)
    }

    /// Produce the next revision of this version.
    ///
    /// Snapshots bump the embedded counter and refresh the embedded hash
    /// from the repository head. Development versions whose embedded date
    /// has fallen behind the calendar are rewritten to today with the
    /// counter reset to 1. Every other kind increments the trailing
    /// integer of the revision, keeping any non-digit prefix.
    pub fn increment_revision(&self, repo: &dyn Repository) -> Result<Version> {
        // Epoch is left untouched
        let mut out = Version::new(self.epoch, String::new(), String::new());

        if self.kind() == ReleaseKind::Snapshot {
            let caps = RE_SPLIT_SNAPSHOT.captures(&self.upstream).ok_or_else(|| {
                DchError::version(format!("the version {} is not a valid snapshot", self))
            })?;
            let release = caps[2].parse::<i64>().map_err(|e| {
                DchError::version(format!("cannot get the revision from the value {}: {}", self, e))
            })?;
            let release = release.checked_add(1).ok_or_else(|| {
                DchError::version(format!("revision of {} is too large to increment", self))
            })?;

            let hash = repo.last_commit_hash(Some(6))?;

            out.upstream = format!("{}~{}.gbp{}", &caps[1], release, hash);
            // Snapshot revision is always empty
            out.revision = self.revision.clone();
        } else {
            let caps = RE_SPLIT_REVISION.captures(&self.revision).ok_or_else(|| {
                DchError::version(format!("cannot find valid revision number in {}", self))
            })?;
            let mut release = caps[2].parse::<i64>().map_err(|e| {
                DchError::version(format!("cannot get the revision from the value {}: {}", self, e))
            })?;

            out.upstream = self.upstream.clone();
            if self.kind() == ReleaseKind::Development {
                let date = development_date();
                let dcaps = RE_SPLIT_DEVELOPMENT.captures(&self.upstream).ok_or_else(|| {
                    DchError::version(format!("the version {} is not a valid development version", self))
                })?;
                if dcaps[2] == date {
                    release += 1;
                } else {
                    out.upstream = format!("{}.{}", &dcaps[1], date);
                    release = 1;
                }
            } else {
                release = release.checked_add(1).ok_or_else(|| {
                    DchError::version(format!("revision of {} is too large to increment", self))
                })?;
            }

            out.revision = format!("{}{}", &caps[1], release);
        }

        Ok(out)
    }

    /// The counter embedded in a snapshot version's suffix.
    pub fn snapshot_release(&self) -> Result<i64> {
        let caps = RE_SPLIT_SNAPSHOT.captures(&self.upstream).ok_or_else(|| {
            DchError::version(format!("the version {} is not a valid snapshot", self))
        })?;
        caps[2].parse::<i64>().map_err(|e| {
            DchError::version(format!("cannot get the snapshot release from {}: {}", self, e))
        })
    }

    /// Replace the counter embedded in a snapshot version's suffix,
    /// keeping the embedded hash.
    pub fn with_snapshot_release(&self, release: i64) -> Result<Version> {
        let caps = RE_SPLIT_SNAPSHOT.captures(&self.upstream).ok_or_else(|| {
            DchError::version(format!("the version {} is not a valid snapshot", self))
        })?;

        let mut out = self.clone();
        out.upstream = format!("{}~{}.gbp{}", &caps[1], release, &caps[3]);
        Ok(out)
    }

    /// Compare two snapshot versions with the embedded commit hash removed
    /// from both sides, so that only the upstream base and the counter
    /// decide the order.
    pub fn compare_snapshots(a: &Version, b: &Version) -> Result<Ordering> {
        let ca = RE_SPLIT_SNAPSHOT.captures(&a.upstream).ok_or_else(|| {
            DchError::version(format!("the version {} is not a valid snapshot", a))
        })?;
        let cb = RE_SPLIT_SNAPSHOT.captures(&b.upstream).ok_or_else(|| {
            DchError::version(format!("the version {} is not a valid snapshot", b))
        })?;

        let na = Version::new(
            a.epoch,
            format!("{}~{}.gbp", &ca[1], &ca[2]),
            a.revision.clone(),
        );
        let nb = Version::new(
            b.epoch,
            format!("{}~{}.gbp", &cb[1], &cb[2]),
            b.revision.clone(),
        );

        Ok(na.cmp(&nb))
    }

    /// Compare two version strings, failing when either does not parse.
    pub fn compare_strings(a: &str, b: &str) -> Result<Ordering> {
        let va = Version::parse(a)
            .map_err(|_| DchError::version(format!("value {} is not a valid version", a)))?;
        let vb = Version::parse(b)
            .map_err(|_| DchError::version(format!("value {} is not a valid version", b)))?;

        Ok(va.cmp(&vb))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}:", self.epoch)?;
        }
        f.write_str(&self.upstream)?;
        if !self.revision.is_empty() {
            write!(f, "-{}", self.revision)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare::compare_component(&self.upstream, &other.upstream))
            .then_with(|| compare::compare_component(&self.revision, &other.revision))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the comparison rules, so versions differing only in
// leading zeros of a numeric run are equal.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn repo_with_head(hash: &str) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.set_head_hash(hash);
        repo
    }

    #[test]
    fn test_parse_stable() {
        let v = Version::parse("1.0.0-1").unwrap();
        assert_eq!(v, Version::new(0, "1.0.0", "1"));
    }

    #[test]
    fn test_parse_staging() {
        let v = Version::parse("1.0.0~stg-2").unwrap();
        assert_eq!(v, Version::new(0, "1.0.0~stg", "2"));
    }

    #[test]
    fn test_parse_development() {
        let v = Version::parse("1.0.0.20180101-1").unwrap();
        assert_eq!(v, Version::new(0, "1.0.0.20180101", "1"));
    }

    #[test]
    fn test_parse_snapshot() {
        let v = Version::parse("1.0.0~1.gbp123456").unwrap();
        assert_eq!(v, Version::new(0, "1.0.0~1.gbp123456", ""));
    }

    #[test]
    fn test_parse_epoch() {
        let v = Version::parse("4:1.0.0").unwrap();
        assert_eq!(v.epoch(), 4);
        assert_eq!(v.upstream(), "1.0.0");
        assert!(v.revision().is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Version::parse("abcd").is_err());
        assert!(Version::parse("").is_err());
        assert!(Version::parse("x:1.0.0").is_err());
        assert!(Version::parse("1.0.0-").is_err());
        assert!(Version::parse("1.0 .0").is_err());
    }

    #[test]
    fn test_render_round_trip() {
        for s in ["1.0.0", "1.0.0-1", "4:1.0.0-2", "1.0.0~stg-2", "1.0.0~1.gbp123456"] {
            assert_eq!(Version::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(Version::parse("1.0.0-1").unwrap().kind(), ReleaseKind::Release);
        assert_eq!(Version::parse("1.0.0~stg-2").unwrap().kind(), ReleaseKind::Staging);
        assert_eq!(
            Version::parse("1.0.0.20180101-1").unwrap().kind(),
            ReleaseKind::Development
        );
        assert_eq!(
            Version::parse("1.0.0~1.gbp123456").unwrap().kind(),
            ReleaseKind::Snapshot
        );
    }

    #[test]
    fn test_native_classification() {
        let v = Version::parse("1.0.0").unwrap();
        assert!(v.is_native());
        assert!(v.is_stable());
        assert_eq!(v.kind(), ReleaseKind::Release);

        // a revision makes it stable but no longer native
        let v = Version::parse("1.0.0-1").unwrap();
        assert!(!v.is_native());
        assert!(v.is_stable());
    }

    #[test]
    fn test_extract_native() {
        let cases = [
            (Version::new(0, "1.0.0", ""), "1.0.0"),
            (Version::new(2, "1.0.0", "1"), "1.0.0"),
            (Version::new(4, "1.0.0~stg", "4"), "1.0.0"),
            (Version::new(3, "1.0.0.20180101", "4"), "1.0.0"),
            (Version::new(3, "1.0.0~1.gbp123456", ""), "1.0.0"),
        ];
        for (v, want) in cases {
            let native = v.extract_native();
            assert_eq!(native, Version::new(0, want, ""));
            assert_eq!(native.epoch(), 0);
            assert!(native.revision().is_empty());
        }
    }

    #[test]
    fn test_build_release() {
        let repo = repo_with_head("abcdef4242424242424242424242424242424242");

        let built = Version::new(0, "1.0.0", "").build(ReleaseKind::Release, &repo).unwrap();
        assert_eq!(built, Version::new(0, "1.0.0", "1"));

        // idempotent on an existing release
        let built = Version::new(2, "1.0.0", "1").build(ReleaseKind::Release, &repo).unwrap();
        assert_eq!(built, Version::new(2, "1.0.0", "1"));

        let built = Version::new(4, "1.0.0~stg", "4").build(ReleaseKind::Release, &repo).unwrap();
        assert_eq!(built, Version::new(4, "1.0.0", "1"));

        let built = Version::new(3, "1.0.0~1.gbp123456", "")
            .build(ReleaseKind::Release, &repo)
            .unwrap();
        assert_eq!(built, Version::new(3, "1.0.0", "1"));

        // there is no promotion path from development to release
        let err = Version::new(3, "1.0.0.20180101", "4")
            .build(ReleaseKind::Release, &repo)
            .unwrap_err();
        assert!(err.to_string().contains("development"));
    }

    #[test]
    fn test_build_staging() {
        let repo = repo_with_head("abcdef4242424242424242424242424242424242");

        let built = Version::new(0, "1.0.0", "").build(ReleaseKind::Staging, &repo).unwrap();
        assert_eq!(built, Version::new(0, "1.0.0~stg", "1"));

        let built = Version::new(3, "1.0.0", "").build(ReleaseKind::Staging, &repo).unwrap();
        assert_eq!(built, Version::new(3, "1.0.0~stg", "1"));

        let built = Version::new(3, "1.0.0~stg", "1").build(ReleaseKind::Staging, &repo).unwrap();
        assert_eq!(built, Version::new(3, "1.0.0~stg", "1"));

        let built = Version::new(3, "1.0.0~1.gbp123456", "")
            .build(ReleaseKind::Staging, &repo)
            .unwrap();
        assert_eq!(built, Version::new(3, "1.0.0~stg", "1"));

        assert!(Version::new(0, "1.0.0", "1").build(ReleaseKind::Staging, &repo).is_err());
        assert!(Version::new(0, "1.0.0.20180101", "1")
            .build(ReleaseKind::Staging, &repo)
            .is_err());
    }

    #[test]
    fn test_build_development() {
        let repo = repo_with_head("abcdef4242424242424242424242424242424242");
        let date = development_date();

        let built = Version::new(3, "1.0.0", "").build(ReleaseKind::Development, &repo).unwrap();
        assert_eq!(built, Version::new(3, format!("1.0.0.{}", date), "1"));

        let built = Version::new(3, "1.0.0", "34")
            .build(ReleaseKind::Development, &repo)
            .unwrap();
        assert_eq!(built, Version::new(3, format!("1.0.0.{}", date), "1"));

        // no-op keeps an older embedded date
        let built = Version::new(3, "1.0.0.20180101", "33")
            .build(ReleaseKind::Development, &repo)
            .unwrap();
        assert_eq!(built, Version::new(3, "1.0.0.20180101", "33"));

        assert!(Version::new(3, "1.0.0~stg", "22")
            .build(ReleaseKind::Development, &repo)
            .is_err());
        assert!(Version::new(3, "1.0.0~1.gbp123456", "")
            .build(ReleaseKind::Development, &repo)
            .is_err());
    }

    #[test]
    fn test_build_snapshot() {
        let repo = repo_with_head("fedcba9876543210fedcba9876543210fedcba98");

        let built = Version::new(3, "1.0.0", "").build(ReleaseKind::Snapshot, &repo).unwrap();
        assert_eq!(built, Version::new(3, "1.0.0~1.gbpfedcba", ""));

        // refresh keeps the counter and swaps the hash
        let built = Version::new(3, "1.0.0~35.gbp123456", "")
            .build(ReleaseKind::Snapshot, &repo)
            .unwrap();
        assert_eq!(built, Version::new(3, "1.0.0~35.gbpfedcba", ""));

        assert!(Version::new(3, "1.0.0", "1").build(ReleaseKind::Snapshot, &repo).is_err());
        assert!(Version::new(3, "1.0.0~stg", "1")
            .build(ReleaseKind::Snapshot, &repo)
            .is_err());
        assert!(Version::new(3, "1.0.0.20180101", "1")
            .build(ReleaseKind::Snapshot, &repo)
            .is_err());
    }

    #[test]
    fn test_build_snapshot_hash_failure() {
        let repo = MockRepository::new();
        assert!(Version::new(3, "1.0.0", "").build(ReleaseKind::Snapshot, &repo).is_err());
    }

    #[test]
    fn test_increment_revision() {
        let repo = repo_with_head("fedcba9876543210fedcba9876543210fedcba98");
        let date = development_date();

        let cases = [
            ("1.0.0-1", "1.0.0-2"),
            ("1.0.0~stg-1", "1.0.0~stg-2"),
            ("1.0.0-test1", "1.0.0-test2"),
        ];
        for (input, want) in cases {
            let got = Version::parse(input).unwrap().increment_revision(&repo).unwrap();
            assert_eq!(got.to_string(), want, "incrementing {}", input);
        }

        // a stale embedded date resets the counter
        let got = Version::parse("1.0.0.20180101-4")
            .unwrap()
            .increment_revision(&repo)
            .unwrap();
        assert_eq!(got.to_string(), format!("1.0.0.{}-1", date));

        let got = Version::parse(&format!("1.0.0.{}-1", date))
            .unwrap()
            .increment_revision(&repo)
            .unwrap();
        assert_eq!(got.to_string(), format!("1.0.0.{}-2", date));

        let got = Version::parse("1.0.0~1.gbp123456")
            .unwrap()
            .increment_revision(&repo)
            .unwrap();
        assert_eq!(got.to_string(), "1.0.0~2.gbpfedcba");
    }

    #[test]
    fn test_increment_revision_errors() {
        let repo = repo_with_head("fedcba9876543210fedcba9876543210fedcba98");

        // no trailing integer
        assert!(Version::parse("1.0.0-test")
            .unwrap()
            .increment_revision(&repo)
            .is_err());
        // digits may only appear as one trailing run
        assert!(Version::new(0, "1.0.0", "1x2").increment_revision(&repo).is_err());
        // integer overflow
        assert!(Version::parse("1.0.0-9999999999999999999")
            .unwrap()
            .increment_revision(&repo)
            .is_err());
        assert!(Version::new(0, "1.0.0~9999999999999999999.gbp123456", "")
            .increment_revision(&repo)
            .is_err());
        // snapshot increment needs a reachable repository head
        assert!(Version::parse("1.0.0~1.gbp123456")
            .unwrap()
            .increment_revision(&MockRepository::new())
            .is_err());
    }

    #[test]
    fn test_increment_strictly_increases() {
        let repo = repo_with_head("fedcba9876543210fedcba9876543210fedcba98");
        let cases = vec![
            "1.0.0-1".to_string(),
            "1.0.0~stg-3".to_string(),
            format!("1.0.0.{}-1", development_date()),
        ];
        for s in &cases {
            let v = Version::parse(s).unwrap();
            let next = v.increment_revision(&repo).unwrap();
            assert!(next > v, "{} should sort above {}", next, v);
        }
    }

    #[test]
    fn test_compare() {
        let equal = [
            ("1.0.0-1", "1.0.0-1"),
            ("1.0.0~stg-1", "1.0.0~stg-1"),
            ("1.0.0.20180101-1", "1.0.0.20180101-1"),
            ("1.0.0~1.gbp123456", "1.0.0~1.gbp123456"),
        ];
        for (a, b) in equal {
            assert_eq!(Version::compare_strings(a, b).unwrap(), Ordering::Equal);
        }

        let less = [
            ("1.0.0~1.gbp123456", "1.0.0~stg-1"),
            ("1.0.0~stg-1", "1.0.0-1"),
            ("1.0.0~1.gbp123456", "1.0.0-1"),
            ("1.0.0-1", "1.0.0.20180101-1"),
            ("1.0.0-1", "1.0.0-2"),
            ("1.0.0~stg-1", "1.0.0~stg-2"),
            ("1.0.0.20180101-1", "1.0.0.20180101-2"),
            ("1.0.0~1.gbp123456", "1.0.0~2.gbp123456"),
            ("1.0.0-1", "1:0.0.1-1"),
        ];
        for (a, b) in less {
            assert_eq!(
                Version::compare_strings(a, b).unwrap(),
                Ordering::Less,
                "{} should sort below {}",
                a,
                b
            );
        }

        assert!(Version::compare_strings("abc", "1.0.0-1").is_err());
        assert!(Version::compare_strings("1.0.0-1", "def").is_err());
    }

    #[test]
    fn test_snapshot_release_helpers() {
        let v = Version::new(0, "0.0.4~3.gbp123456", "");
        assert_eq!(v.snapshot_release().unwrap(), 3);

        let replaced = v.with_snapshot_release(7).unwrap();
        assert_eq!(replaced, Version::new(0, "0.0.4~7.gbp123456", ""));

        assert!(Version::new(0, "1.0.0", "1").snapshot_release().is_err());
        assert!(Version::new(0, "1.0.0", "1").with_snapshot_release(2).is_err());
    }

    #[test]
    fn test_compare_snapshots_ignores_hash() {
        let a = Version::new(0, "0.0.4~1.gbp123456", "");
        let b = Version::new(0, "0.0.4~1.gbpabcdef", "");
        assert_eq!(Version::compare_snapshots(&a, &b).unwrap(), Ordering::Equal);

        let c = Version::new(0, "0.0.4~2.gbp123456", "");
        assert_eq!(Version::compare_snapshots(&a, &c).unwrap(), Ordering::Less);

        let stable = Version::new(0, "0.0.4", "1");
        assert!(Version::compare_snapshots(&a, &stable).is_err());
    }
}
