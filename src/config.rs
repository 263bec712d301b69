//! Run configuration and tracker credentials.

use std::env;

use crate::adapters::live::launchpad::LaunchpadCredentials;

/// Environment variable holding the GitHub access token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// What to mirror and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Source project searched for bugs.
    pub project: String,
    /// Source project that marks a bug as mirrored.
    pub ui_project: String,
    /// Destination repository, `"owner/name"`.
    pub repo: String,
    /// Base URL the destination is registered under on the source tracker.
    pub bug_tracker: String,
    /// Accepted task statuses.
    pub statuses: Vec<String>,
    /// Accepted tags.
    pub tags: Vec<String>,
}

impl SyncConfig {
    /// Checks the configuration before anything goes over the network.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.project.trim().is_empty() || self.ui_project.trim().is_empty() {
            return Err("Project names must not be empty".to_string());
        }
        if self.project == self.ui_project {
            return Err(format!(
                "Source and UI project are both {}; bugs would never become eligible",
                self.project
            ));
        }
        match self.repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {}
            _ => return Err(format!("Repository must look like owner/name, got: {}", self.repo)),
        }
        if !self.bug_tracker.starts_with("http://") && !self.bug_tracker.starts_with("https://") {
            return Err(format!("Bug tracker must be a URL, got: {}", self.bug_tracker));
        }
        if self.statuses.iter().any(|s| s.trim().is_empty()) || self.statuses.is_empty() {
            return Err("At least one non-empty --status is required".to_string());
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) || self.tags.is_empty() {
            return Err("At least one non-empty --tag is required".to_string());
        }
        Ok(())
    }
}

/// Credentials for both trackers, taken from the environment.
///
/// Missing credentials are not an error here: reads work anonymously and
/// writes fail with a message naming the missing variable.
#[derive(Clone, Default)]
pub struct Credentials {
    /// GitHub bearer token.
    pub github_token: Option<String>,
    /// Pre-authorized Launchpad OAuth token.
    pub launchpad: Option<LaunchpadCredentials>,
}

impl Credentials {
    /// Reads credentials from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            github_token: env::var(GITHUB_TOKEN_VAR).ok().filter(|t| !t.trim().is_empty()),
            launchpad: LaunchpadCredentials::from_env(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("launchpad", &self.launchpad.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
