//! Bug source port for the originating tracker (Launchpad).

use serde::{Deserialize, Serialize};

/// A project registered on the source tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Short project name (e.g. `"maas"`).
    pub name: String,
    /// Human-readable project name.
    pub display_name: String,
    /// Canonical API link; task targets are compared against this.
    pub self_link: String,
}

/// A bug's tracking record within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugTask {
    /// Canonical API link of the task.
    pub self_link: String,
    /// Link to the underlying bug.
    pub bug_link: String,
    /// Link to the project (or series) this task targets.
    pub target_link: String,
    /// Task status, in the tracker's vocabulary (e.g. `"Triaged"`).
    pub status: String,
    /// Collection of tasks for the same bug in other targets.
    pub related_tasks_link: Option<String>,
    /// Watch linked to this task, if any.
    pub bug_watch_link: Option<String>,
}

/// The tracker-agnostic bug report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    /// Numeric bug id.
    pub id: u64,
    /// Bug title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// API link of the reporter (`https://api.launchpad.net/1.0/~name`).
    pub owner_link: String,
    /// Browser link to the bug page.
    pub web_link: String,
    /// Tags attached to the bug.
    pub tags: Vec<String>,
    /// Canonical API link of the bug.
    pub self_link: String,
}

/// A remote bug tracker registered on the source tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugTrackerRef {
    /// Canonical API link of the tracker registration.
    pub self_link: String,
    /// Base URL the tracker was registered with.
    pub base_url: String,
}

/// Parameters of a task search scoped to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSearch {
    /// Project whose tasks are searched.
    pub project_link: String,
    /// Accepted task statuses.
    pub statuses: Vec<String>,
    /// Tags, any of which must be present on the bug.
    pub tags: Vec<String>,
}

/// One page of a task search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPage {
    /// Tasks on this page.
    pub tasks: Vec<BugTask>,
    /// Cursor for the following page; `None` on the last page.
    pub next: Option<String>,
}

/// Read and write access to the originating bug tracker.
///
/// Each method is one remote round trip. Callers sequence them; the port
/// performs no caching or retries.
pub trait BugSource: Send + Sync {
    /// Looks up a project by its short name.
    ///
    /// # Errors
    ///
    /// Returns an error if the project does not exist or the tracker is unreachable.
    fn project(&self, name: &str) -> Result<Project, Box<dyn std::error::Error + Send + Sync>>;

    /// Looks up the registration of a remote bug tracker by base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no tracker is registered under `base_url`.
    fn bug_tracker(
        &self,
        base_url: &str,
    ) -> Result<BugTrackerRef, Box<dyn std::error::Error + Send + Sync>>;

    /// Fetches one page of tasks matching `search`.
    ///
    /// `cursor` is `None` for the first page and the previous page's
    /// [`TaskPage::next`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn search_tasks(
        &self,
        search: &TaskSearch,
        cursor: Option<&str>,
    ) -> Result<TaskPage, Box<dyn std::error::Error + Send + Sync>>;

    /// Lists the tasks for the same bug in other targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be fetched.
    fn related_tasks(
        &self,
        task: &BugTask,
    ) -> Result<Vec<BugTask>, Box<dyn std::error::Error + Send + Sync>>;

    /// Fetches a bug by its API link.
    ///
    /// # Errors
    ///
    /// Returns an error if the bug cannot be fetched.
    fn bug(&self, bug_link: &str) -> Result<Bug, Box<dyn std::error::Error + Send + Sync>>;

    /// Lists every task of `bug`, across all targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be fetched.
    fn bug_tasks(
        &self,
        bug: &Bug,
    ) -> Result<Vec<BugTask>, Box<dyn std::error::Error + Send + Sync>>;

    /// Adds a watch on `bug` for `remote_bug` in `tracker` and returns its link.
    ///
    /// Adding a watch that already exists returns the existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the watch cannot be created.
    fn add_watch(
        &self,
        bug: &Bug,
        tracker: &BugTrackerRef,
        remote_bug: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Adds a task on `bug` targeting `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be created.
    fn add_task(
        &self,
        bug: &Bug,
        target: &Project,
    ) -> Result<BugTask, Box<dyn std::error::Error + Send + Sync>>;

    /// Points `task` at `watch_link` and saves it.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be saved.
    fn link_watch(
        &self,
        task: &BugTask,
        watch_link: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
