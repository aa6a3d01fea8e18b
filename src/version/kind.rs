use std::fmt;

/// Release channel a version belongs to, encoded in its suffix syntax.
///
/// The kind is always derived from a rendered version string, never stored
/// on its own. Each kind originates from a class of git branches: stable
/// releases come from "release" (or "master"), staging builds from
/// "staging", and everything else is development work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    Release,
    Staging,
    Development,
    Snapshot,
}

impl ReleaseKind {
    /// The branch a version of this kind is expected to be built from.
    pub fn source_branch(&self) -> &'static str {
        match self {
            ReleaseKind::Release => "release",
            ReleaseKind::Staging => "staging",
            _ => "develop",
        }
    }

    /// Map a branch name to the kind of version it produces.
    ///
    /// "master" and "release" build stable releases, "staging" builds
    /// staging versions, and any other branch is treated as development.
    pub fn from_branch(branch: &str) -> Self {
        match branch {
            "master" | "release" => ReleaseKind::Release,
            "staging" => ReleaseKind::Staging,
            _ => ReleaseKind::Development,
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseKind::Release => "release",
            ReleaseKind::Staging => "staging",
            ReleaseKind::Development => "development",
            ReleaseKind::Snapshot => "snapshot",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_branch() {
        assert_eq!(ReleaseKind::Release.source_branch(), "release");
        assert_eq!(ReleaseKind::Staging.source_branch(), "staging");
        assert_eq!(ReleaseKind::Development.source_branch(), "develop");
        assert_eq!(ReleaseKind::Snapshot.source_branch(), "develop");
    }

    #[test]
    fn test_from_branch() {
        assert_eq!(ReleaseKind::from_branch("master"), ReleaseKind::Release);
        assert_eq!(ReleaseKind::from_branch("release"), ReleaseKind::Release);
        assert_eq!(ReleaseKind::from_branch("staging"), ReleaseKind::Staging);
        assert_eq!(ReleaseKind::from_branch("develop"), ReleaseKind::Development);
        assert_eq!(
            ReleaseKind::from_branch("feature/login"),
            ReleaseKind::Development
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ReleaseKind::Release.to_string(), "release");
        assert_eq!(ReleaseKind::Snapshot.to_string(), "snapshot");
    }
}
