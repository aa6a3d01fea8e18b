use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail, Result};
use clap::Parser;

use git_dch::changelog::{AddOptions, ChangelogFile};
use git_dch::config;
use git_dch::distribution;
use git_dch::git::{Git2Repository, Repository};
use git_dch::ui;
use git_dch::version::{ReleaseKind, Version};

const STANDARD_CHANGELOG_FILE: &str = "./debian/changelog";

const URGENCY_CHOICES: [&str; 5] = ["low", "medium", "high", "emergency", "critical"];

#[derive(clap::Parser)]
#[command(
    name = "git-dch",
    about = "Generate and maintain a Debian changelog from git commits"
)]
struct Args {
    #[arg(
        short = 'a',
        long,
        conflicts_with = "since",
        help = "Autocomplete changelog from last snapshot or tag"
    )]
    auto: bool,

    #[arg(long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, value_name = "DISTRIBUTION", help = "Set distribution")]
    distribution: Option<String>,

    #[arg(
        long,
        value_name = "BRANCH",
        help = "Force the branch name to use while generating the changelog"
    )]
    force_branch: Option<String>,

    #[arg(
        long,
        help = "Use the provided distribution even if it does not match the known distributions"
    )]
    force_distribution: bool,

    #[arg(
        long,
        help = "Use name and email from git configuration for the changelog trailer"
    )]
    git_author: bool,

    #[arg(long, help = "Ignore merge commits in git history")]
    ignore_merges: bool,

    #[arg(
        short = 'N',
        long,
        value_name = "NEW_VERSION",
        help = "Use this as base for the new version number"
    )]
    new_version: Option<String>,

    #[arg(long, help = "Purge old unstable releases from the changelog")]
    purge_unstable: bool,

    #[arg(long, help = "Purge old testing releases from the changelog")]
    purge_testing: bool,

    #[arg(
        short = 'R',
        long,
        conflicts_with = "snapshot",
        help = "Mark as release"
    )]
    release: bool,

    #[arg(
        long,
        value_name = "SINCE",
        help = "Commit to start from (e.g. HEAD^^^, debian/0.4.3)"
    )]
    since: Option<String>,

    #[arg(short = 'S', long, help = "Mark as snapshot build")]
    snapshot: bool,

    #[arg(
        long,
        value_name = "URGENCY",
        value_parser = URGENCY_CHOICES,
        help = "Set urgency level"
    )]
    urgency: Option<String>,

    #[arg(short = 'v', long, help = "Print version information and exit")]
    version: bool,

    #[arg(value_name = "CHANGELOG", help = "Changelog file to update")]
    changelog: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if args.version {
        println!("git-dch {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = run(&args) {
        ui::display_error(&e.to_string());
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;

    let repo = Git2Repository::open(".")?;

    let changelog_path = args
        .changelog
        .clone()
        .or_else(|| config.changelog.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(STANDARD_CHANGELOG_FILE));

    let mut file = ChangelogFile::from_path(&changelog_path).map_err(|e| {
        anyhow!(
            "cannot open changelog file {}: {}",
            changelog_path.display(),
            e
        )
    })?;

    // flags win over file defaults
    let distribution_name = args
        .distribution
        .clone()
        .or_else(|| config.distribution.clone())
        .unwrap_or_else(|| "unstable".to_string());
    let urgency = args
        .urgency
        .clone()
        .or_else(|| config.urgency.clone())
        .unwrap_or_else(|| "medium".to_string());
    let ignore_merges = args.ignore_merges || config.ignore_merges;

    let author = resolve_author(&repo, &file, args.git_author)?;
    let requested = resolve_version(&repo, &file, args, &distribution_name)?;

    let opts = AddOptions {
        since: args.since.clone(),
        source: None,
        urgency: Some(urgency),
        target: Some(distribution_name),
        author: Some(author),
        auto: args.auto,
        ignore_merges,
        purge_testing: args.purge_testing,
        purge_unstable: args.purge_unstable,
    };

    let (new_version, _) = if args.snapshot {
        file.add_snapshot(&repo, &requested, &opts)?
    } else if args.release {
        file.add_release(&repo, &requested, &opts)?
    } else {
        file.add(&repo, &requested, &opts)?
    };

    file.write_to_path(&changelog_path)?;

    println!("New version: {}", new_version);

    Ok(())
}

/// Author for the new entry's trailer line.
///
/// With `--git-author` the identity always comes from git configuration;
/// otherwise the previous entry's author is kept, falling back to git
/// configuration for a fresh changelog.
fn resolve_author(repo: &dyn Repository, file: &ChangelogFile, git_author: bool) -> Result<String> {
    if !git_author {
        if let Some(head) = file.head() {
            return Ok(head.author().to_string());
        }
    }

    author_from_git_config(repo)
}

fn author_from_git_config(repo: &dyn Repository) -> Result<String> {
    let name = repo
        .config_value("user", "name")
        .map_err(|e| anyhow!("cannot get user name from git configuration: {}", e))?;
    let email = repo
        .config_value("user", "email")
        .map_err(|e| anyhow!("cannot get user email from git configuration: {}", e))?;

    if name.is_empty() {
        bail!("value of user.name in git configuration is empty");
    }
    if email.is_empty() {
        bail!("value of user.email in git configuration is empty");
    }

    Ok(format!("{} <{}>", name, email))
}

/// Parse the requested version (defaulting to the stored head version),
/// build it for the active branch's release kind and validate that both
/// the version and the distribution fit that branch.
fn resolve_version(
    repo: &dyn Repository,
    file: &ChangelogFile,
    args: &Args,
    distribution_name: &str,
) -> Result<Version> {
    let requested_text = match &args.new_version {
        Some(value) => value.clone(),
        None => file.last_version()?.to_string(),
    };

    let mut parsed = Version::parse(&requested_text).map_err(|e| {
        anyhow!(
            "the given version ({}) has a wrong format: {}",
            requested_text,
            e
        )
    })?;

    let active_branch = match &args.force_branch {
        Some(branch) => branch.clone(),
        None => repo.active_branch().map_err(|e| {
            anyhow!(
                "cannot get active branch from git: {}\nUse the --force-branch parameter to fix this error",
                e
            )
        })?,
    };

    if !args.snapshot {
        let kind = ReleaseKind::from_branch(&active_branch);
        parsed = parsed.build(kind, repo).map_err(|e| {
            anyhow!(
                "cannot build a valid version for branch {}: {}",
                active_branch,
                e
            )
        })?;
    }

    // a non-native version may only be generated from its kind's branch
    if !parsed.is_native() && parsed.kind().source_branch() != active_branch {
        bail!("cannot use version {} with branch {}", parsed, active_branch);
    }

    if !distribution::is_valid_for_branch(distribution_name, &active_branch)
        && !args.force_distribution
    {
        bail!(
            "the distribution {} is not valid for branch {}\nUse --force-distribution to use it anyway",
            distribution_name,
            active_branch
        );
    }

    Ok(parsed)
}
