//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::config::SyncConfig;

/// Top-level CLI parser for `bugmirror`.
#[derive(Debug, Parser)]
#[command(
    name = "bugmirror",
    version,
    about = "Mirror Launchpad bugs into GitHub issues and link them back"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mirror every eligible bug into the destination repository.
    Sync {
        /// Which bugs to mirror and where.
        #[command(flatten)]
        target: TargetArgs,
        /// Report what would be mirrored without creating anything.
        #[arg(long)]
        dry_run: bool,
        /// Stop after this many bugs.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Print the bugs that are eligible for mirroring.
    List {
        /// Which bugs to list.
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Launchpad project searched for bugs.
    #[arg(long, env = "BUGMIRROR_PROJECT", default_value = "maas")]
    pub project: String,
    /// Launchpad project whose task marks a bug as mirrored.
    #[arg(long, env = "BUGMIRROR_UI_PROJECT", default_value = "maas-ui")]
    pub ui_project: String,
    /// Destination GitHub repository, `owner/name`.
    #[arg(long, env = "BUGMIRROR_REPO", default_value = "canonical/maas-ui")]
    pub repo: String,
    /// Base URL the repository is registered under on Launchpad.
    #[arg(
        long,
        env = "BUGMIRROR_BUG_TRACKER",
        default_value = "https://github.com/canonical/maas-ui/issues"
    )]
    pub bug_tracker: String,
    /// Accepted task status; repeat or comma-separate for several.
    #[arg(
        long = "status",
        value_delimiter = ',',
        default_values_t = default_statuses()
    )]
    pub statuses: Vec<String>,
    /// Accepted bug tag; repeat or comma-separate for several.
    #[arg(long = "tag", value_delimiter = ',', default_values_t = ["ui".to_string()])]
    pub tags: Vec<String>,
}

fn default_statuses() -> Vec<String> {
    ["New", "Incomplete", "Confirmed", "Triaged", "In Progress"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl TargetArgs {
    /// Converts parsed arguments into a run configuration.
    #[must_use]
    pub fn to_config(&self) -> SyncConfig {
        SyncConfig {
            project: self.project.clone(),
            ui_project: self.ui_project.clone(),
            repo: self.repo.clone(),
            bug_tracker: self.bug_tracker.clone(),
            statuses: self.statuses.clone(),
            tags: self.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_sync_with_defaults() {
        let cli = Cli::parse_from(["bugmirror", "sync"]);
        let Command::Sync { target, dry_run, limit } = cli.command else {
            panic!("expected sync");
        };
        assert!(!dry_run);
        assert_eq!(limit, None);
        let config = target.to_config();
        assert_eq!(config.ui_project, "maas-ui");
        assert_eq!(config.statuses.len(), 5);
        assert!(config.statuses.contains(&"In Progress".to_string()));
        assert_eq!(config.tags, vec!["ui".to_string()]);
    }

    #[test]
    fn parses_repeated_and_delimited_filters() {
        let cli = Cli::parse_from([
            "bugmirror", "list", "--status", "New", "--status", "Triaged,Confirmed", "--tag",
            "ui,frontend",
        ]);
        let Command::List { target } = cli.command else { panic!("expected list") };
        assert_eq!(target.statuses, vec!["New", "Triaged", "Confirmed"]);
        assert_eq!(target.tags, vec!["ui", "frontend"]);
    }

    #[test]
    fn parses_sync_switches() {
        let cli = Cli::parse_from(["bugmirror", "sync", "--dry-run", "--limit", "1"]);
        assert!(matches!(cli.command, Command::Sync { dry_run: true, limit: Some(1), .. }));
    }

    #[test]
    fn list_rejects_sync_only_switches() {
        assert!(Cli::try_parse_from(["bugmirror", "list", "--dry-run"]).is_err());
    }
}
