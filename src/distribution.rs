//! Distribution-name validity per source branch.
//!
//! Development branches release to "unstable" and the staging branch to
//! "testing"; the release branches accept the known Debian and Ubuntu
//! stable code names.

const TESTING: &[&str] = &["testing"];

const UNSTABLE: &[&str] = &["unstable"];

const STABLE: &[&str] = &[
    // Ubuntu
    "warty", "hoary", "breezy", "dapper", "edgy", "feisty", "gutsy", "hardy", "intrepid",
    "jaunty", "karmic", "lucid", "maverick", "natty", "oneiric", "precise", "quantal", "rairing",
    "saucy", "trusty", "utopic", "vivid", "willy", "xenial", "yakkety", "zesty", "artful",
    "bionic",
    // Debian
    "stable", "hamm", "slink", "potato", "woody", "sarge", "etch", "lenny", "squeeze", "wheezy",
    "jessie", "stretch", "buster",
];

/// Whether a distribution name may be released from the given branch.
/// Unknown branches are treated like "develop".
pub fn is_valid_for_branch(distribution: &str, branch: &str) -> bool {
    let list = match branch {
        "staging" => TESTING,
        "master" | "release" => STABLE,
        _ => UNSTABLE,
    };

    list.contains(&distribution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_develop_accepts_unstable_only() {
        assert!(is_valid_for_branch("unstable", "develop"));
        assert!(!is_valid_for_branch("testing", "develop"));
        assert!(!is_valid_for_branch("stable", "develop"));
    }

    #[test]
    fn test_staging_accepts_testing_only() {
        assert!(is_valid_for_branch("testing", "staging"));
        assert!(!is_valid_for_branch("unstable", "staging"));
    }

    #[test]
    fn test_release_branches_accept_stable_names() {
        for branch in ["master", "release"] {
            assert!(is_valid_for_branch("stable", branch));
            assert!(is_valid_for_branch("stretch", branch));
            assert!(is_valid_for_branch("bionic", branch));
            assert!(!is_valid_for_branch("unstable", branch));
        }
    }

    #[test]
    fn test_unknown_branch_behaves_like_develop() {
        assert!(is_valid_for_branch("unstable", "feature/login"));
        assert!(!is_valid_for_branch("testing", "feature/login"));
    }
}
