//! Mirrors one bug into the destination repository and links it back.
//!
//! Every issue this tool creates carries the bug's web link in a fixed body
//! header. That link is the dedupe key: before creating an issue the writer
//! looks it up among the repository's existing issues, so an issue left
//! behind by an interrupted write-back is reused instead of duplicated.

use std::collections::HashMap;

use tracing::{info, warn};

use super::error::SyncError;
use crate::ports::{Bug, BugSource, BugTrackerRef, Issue, IssueTracker, Project, Repository};

/// API prefix of a person reference on the source tracker.
pub const OWNER_LINK_PREFIX: &str = "https://api.launchpad.net/1.0/~";

const BODY_HEADER: &str = "Bug originally filed by ";

/// Extracts the bare username from an owner reference.
///
/// The prefix is stripped once; a reference without it is returned whole.
#[must_use]
pub fn get_username(owner_link: &str) -> &str {
    owner_link.strip_prefix(OWNER_LINK_PREFIX).unwrap_or(owner_link)
}

/// Builds the destination issue body for a bug.
#[must_use]
pub fn issue_body(owner: &str, web_link: &str, description: &str) -> String {
    format!("{BODY_HEADER}{owner} at {web_link}\n\n{description}")
}

/// Recovers the bug web link from a body built by [`issue_body`].
fn mirrored_link(body: &str) -> Option<&str> {
    let header = body.strip_prefix(BODY_HEADER)?;
    let header = header.split_once("\n\n").map_or(header, |(first, _)| first);
    let (_, link) = header.split_once(" at ")?;
    Some(link.trim())
}

/// Where mirrored bugs go and how they are linked back.
#[derive(Debug, Clone)]
pub struct MirrorTarget {
    /// Destination repository.
    pub repo: Repository,
    /// Project the new source task targets.
    pub ui_project: Project,
    /// Registration of the destination repository on the source tracker.
    pub bug_tracker: BugTrackerRef,
}

/// Result of mirroring one bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// A new issue was created and linked.
    Created(Issue),
    /// An issue from an earlier, interrupted run was linked.
    Recovered(Issue),
}

impl MirrorOutcome {
    /// The issue the bug now points at.
    #[must_use]
    pub fn issue(&self) -> &Issue {
        match self {
            Self::Created(issue) | Self::Recovered(issue) => issue,
        }
    }
}

/// Creates issues and writes watches back, one bug at a time.
pub struct MirrorWriter<'a> {
    bugs: &'a dyn BugSource,
    issues: &'a dyn IssueTracker,
    target: &'a MirrorTarget,
    by_link: Option<HashMap<String, Issue>>,
}

impl<'a> MirrorWriter<'a> {
    /// Creates a writer for `target`.
    #[must_use]
    pub fn new(
        bugs: &'a dyn BugSource,
        issues: &'a dyn IssueTracker,
        target: &'a MirrorTarget,
    ) -> Self {
        Self { bugs, issues, target, by_link: None }
    }

    /// Mirrors `bug` and records the watch on the source tracker.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DestinationUnavailable`] if the issue cannot be
    /// found or created, and [`SyncError::WriteBackFailure`] if the watch or
    /// task cannot be written after the issue exists.
    pub fn mirror(&mut self, bug: &Bug) -> Result<MirrorOutcome, SyncError> {
        let outcome = match self.existing_issue(&bug.web_link)? {
            Some(issue) => {
                warn!(bug = bug.id, issue = issue.number, "reusing issue from an earlier run");
                MirrorOutcome::Recovered(issue)
            }
            None => {
                let body = issue_body(get_username(&bug.owner_link), &bug.web_link, &bug.description);
                let issue = self
                    .issues
                    .create_issue(&self.target.repo, &bug.title, &body)
                    .map_err(SyncError::DestinationUnavailable)?;
                info!(bug = bug.id, issue = issue.number, "created issue");
                self.remember(&bug.web_link, &issue);
                MirrorOutcome::Created(issue)
            }
        };

        self.write_back(bug, outcome.issue()).map_err(|source| SyncError::WriteBackFailure {
            bug_id: bug.id,
            issue_number: outcome.issue().number,
            source,
        })?;
        Ok(outcome)
    }

    /// Watch, then task, then the save linking them. The bug stays eligible
    /// until its UI task carries a watch, so a failure at any step is
    /// retried by the next run. A UI task left by an earlier attempt is
    /// reused rather than added twice.
    fn write_back(
        &self,
        bug: &Bug,
        issue: &Issue,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let watch =
            self.bugs.add_watch(bug, &self.target.bug_tracker, &issue.number.to_string())?;
        let existing = self
            .bugs
            .bug_tasks(bug)?
            .into_iter()
            .find(|task| task.target_link == self.target.ui_project.self_link);
        let task = match existing {
            Some(task) => task,
            None => self.bugs.add_task(bug, &self.target.ui_project)?,
        };
        self.bugs.link_watch(&task, &watch)?;
        info!(bug = bug.id, issue = issue.number, watch = %watch, "linked bug to issue");
        Ok(())
    }

    fn existing_issue(&mut self, web_link: &str) -> Result<Option<Issue>, SyncError> {
        if self.by_link.is_none() {
            let issues = self
                .issues
                .list_issues(&self.target.repo)
                .map_err(SyncError::DestinationUnavailable)?;
            let index = issues
                .into_iter()
                .filter_map(|issue| Some((mirrored_link(&issue.body)?.to_string(), issue)))
                .collect();
            self.by_link = Some(index);
        }
        Ok(self.by_link.as_ref().and_then(|index| index.get(web_link)).cloned())
    }

    fn remember(&mut self, web_link: &str, issue: &Issue) {
        if let Some(index) = self.by_link.as_mut() {
            index.insert(web_link.to_string(), issue.clone());
        }
    }
}
