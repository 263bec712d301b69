//! Lazy listing of bugs that still need a mirror.
//!
//! A bug is eligible when one of its tasks in the source project matches the
//! status and tag filters and it has no UI-project task linked to a watch.
//! A UI-project task without a watch is a write-back that stopped halfway,
//! so the bug is yielded again for repair. Pages of tasks are fetched only
//! as the iterator advances.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use super::error::SyncError;
use crate::ports::{Bug, BugSource, BugTask, Project, TaskSearch};

/// What to look for on the source tracker.
#[derive(Debug, Clone)]
pub struct EligibleQuery {
    /// Project whose tasks are searched.
    pub project: Project,
    /// Project that marks a bug as already mirrored.
    pub ui_project: Project,
    /// Accepted task statuses.
    pub statuses: Vec<String>,
    /// Tags, any of which must be present on the bug.
    pub tags: Vec<String>,
}

impl EligibleQuery {
    fn validate(&self) -> Result<(), SyncError> {
        if self.statuses.iter().all(|s| s.trim().is_empty()) {
            return Err(SyncError::InvalidQuery("at least one status is required".to_string()));
        }
        if self.tags.iter().all(|t| t.trim().is_empty()) {
            return Err(SyncError::InvalidQuery("at least one tag is required".to_string()));
        }
        Ok(())
    }

    fn search(&self) -> TaskSearch {
        TaskSearch {
            project_link: self.project.self_link.clone(),
            statuses: self.statuses.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Position in the remote task collection.
#[derive(Debug)]
enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

/// Forward-only sequence of eligible bugs.
///
/// Each call to `next` may perform remote fetches. The first error ends the
/// sequence; listing again starts a fresh query.
pub struct EligibleBugs<'a> {
    source: &'a dyn BugSource,
    query: &'a EligibleQuery,
    search: TaskSearch,
    pending: VecDeque<BugTask>,
    cursor: Cursor,
    seen: HashSet<String>,
    failed: bool,
}

/// Starts listing eligible bugs for `query`.
///
/// Nothing is fetched until the returned iterator is advanced.
///
/// # Errors
///
/// Returns [`SyncError::InvalidQuery`] if the status or tag set is empty.
pub fn list_eligible_bugs<'a>(
    source: &'a dyn BugSource,
    query: &'a EligibleQuery,
) -> Result<EligibleBugs<'a>, SyncError> {
    query.validate()?;
    Ok(EligibleBugs {
        source,
        query,
        search: query.search(),
        pending: VecDeque::new(),
        cursor: Cursor::Start,
        seen: HashSet::new(),
        failed: false,
    })
}

impl EligibleBugs<'_> {
    /// Pulls the next page into `pending`. Returns `false` once exhausted.
    fn fetch_page(&mut self) -> Result<bool, SyncError> {
        let cursor = match &self.cursor {
            Cursor::Start => None,
            Cursor::Next(link) => Some(link.as_str()),
            Cursor::Exhausted => return Ok(false),
        };
        let page =
            self.source.search_tasks(&self.search, cursor).map_err(SyncError::SourceUnavailable)?;
        debug!(tasks = page.tasks.len(), more = page.next.is_some(), "fetched task page");

        self.cursor = page.next.map_or(Cursor::Exhausted, Cursor::Next);
        self.pending.extend(page.tasks);
        Ok(true)
    }

    /// Resolves a task to its bug if the bug still needs a mirror.
    fn examine(&mut self, task: &BugTask) -> Result<Option<Bug>, SyncError> {
        if !self.query.statuses.iter().any(|s| *s == task.status) {
            return Ok(None);
        }
        if !self.seen.insert(task.bug_link.clone()) {
            return Ok(None);
        }

        let related = self.source.related_tasks(task).map_err(SyncError::SourceUnavailable)?;
        match related.iter().find(|t| t.target_link == self.query.ui_project.self_link) {
            Some(ui_task) if ui_task.bug_watch_link.is_some() => {
                debug!(bug = %task.bug_link, "already tracked in UI project");
                return Ok(None);
            }
            Some(_) => debug!(bug = %task.bug_link, "UI task has no watch; needs repair"),
            None => {}
        }

        let bug = self.source.bug(&task.bug_link).map_err(SyncError::SourceUnavailable)?;
        if !bug.tags.iter().any(|tag| self.query.tags.contains(tag)) {
            return Ok(None);
        }
        Ok(Some(bug))
    }

    fn fail(&mut self, err: SyncError) -> Result<Bug, SyncError> {
        self.failed = true;
        Err(err)
    }
}

impl Iterator for EligibleBugs<'_> {
    type Item = Result<Bug, SyncError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(task) = self.pending.pop_front() {
                match self.examine(&task) {
                    Ok(Some(bug)) => return Some(Ok(bug)),
                    Ok(None) => continue,
                    Err(err) => return Some(self.fail(err)),
                }
            }
            match self.fetch_page() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => return Some(self.fail(err)),
            }
        }
    }
}
