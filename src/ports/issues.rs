//! Issue tracker port for the destination repository (GitHub).

use serde::{Deserialize, Serialize};

/// A repository that accepts issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// `"owner/name"`.
    pub full_name: String,
    /// Browser link to the repository.
    pub html_url: String,
}

/// An issue in the destination repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Number allocated by the tracker, unique within the repository.
    pub number: u64,
    /// The issue title.
    pub title: String,
    /// The issue body.
    pub body: String,
    /// Browser link to the issue.
    pub html_url: String,
    /// `"open"` or `"closed"`.
    pub state: String,
}

/// Creates and lists issues in an external tracker.
pub trait IssueTracker: Send + Sync {
    /// Looks up a repository by `"owner/name"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository does not exist or has issues disabled.
    fn repository(
        &self,
        full_name: &str,
    ) -> Result<Repository, Box<dyn std::error::Error + Send + Sync>>;

    /// Creates a new issue and returns it with its allocated number.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be created.
    fn create_issue(
        &self,
        repo: &Repository,
        title: &str,
        body: &str,
    ) -> Result<Issue, Box<dyn std::error::Error + Send + Sync>>;

    /// Lists every issue in the repository, open and closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the issues cannot be listed.
    fn list_issues(
        &self,
        repo: &Repository,
    ) -> Result<Vec<Issue>, Box<dyn std::error::Error + Send + Sync>>;
}
