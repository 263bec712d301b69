//! In-memory trackers for tests and local experiments.
//!
//! Both adapters are cheap to clone; clones share state, so a test can hand
//! one clone to a [`ServiceContext`](crate::context::ServiceContext) and keep
//! another to inspect what the run did.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{
    Bug, BugSource, BugTask, BugTrackerRef, Issue, IssueTracker, Project, Repository, TaskPage,
    TaskSearch,
};

const LP_ROOT: &str = "https://api.launchpad.net/1.0/";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
struct StoredTask {
    bug_id: u64,
    task: BugTask,
}

#[derive(Debug, Clone)]
struct StoredWatch {
    bug_id: u64,
    tracker_link: String,
    remote_bug: String,
    self_link: String,
}

#[derive(Debug)]
struct LaunchpadState {
    projects: BTreeMap<String, Project>,
    trackers: Vec<BugTrackerRef>,
    bugs: BTreeMap<u64, Bug>,
    tasks: Vec<StoredTask>,
    watches: Vec<StoredWatch>,
    page_size: usize,
    server_filtering: bool,
    fail_search: bool,
    fail_add_watch: bool,
    fail_add_task: bool,
    fail_link_watch: bool,
    search_calls: usize,
}

/// Launchpad stand-in holding projects, bugs, tasks and watches.
#[derive(Debug, Clone)]
pub struct MemoryLaunchpad {
    state: Arc<Mutex<LaunchpadState>>,
}

impl Default for MemoryLaunchpad {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLaunchpad {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LaunchpadState {
                projects: BTreeMap::new(),
                trackers: Vec::new(),
                bugs: BTreeMap::new(),
                tasks: Vec::new(),
                watches: Vec::new(),
                page_size: 75,
                server_filtering: true,
                fail_search: false,
                fail_add_watch: false,
                fail_add_task: false,
                fail_link_watch: false,
                search_calls: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LaunchpadState> {
        self.state.lock().expect("memory launchpad lock poisoned")
    }

    /// Registers a project and returns it.
    pub fn add_project(&self, name: &str) -> Project {
        let project = Project {
            name: name.to_string(),
            display_name: name.to_uppercase(),
            self_link: format!("{LP_ROOT}{name}"),
        };
        self.lock().projects.insert(name.to_string(), project.clone());
        project
    }

    /// Registers a remote bug tracker under `base_url`.
    pub fn register_bug_tracker(&self, base_url: &str) -> BugTrackerRef {
        let mut state = self.lock();
        let tracker = BugTrackerRef {
            self_link: format!("{LP_ROOT}bugs/bugtrackers/tracker-{}", state.trackers.len() + 1),
            base_url: base_url.to_string(),
        };
        state.trackers.push(tracker.clone());
        tracker
    }

    /// Files a bug reported by `jane.doe` and returns it.
    pub fn add_bug(&self, id: u64, title: &str, tags: &[&str]) -> Bug {
        self.insert_bug(Bug {
            id,
            title: title.to_string(),
            description: format!("Steps to reproduce bug {id}"),
            owner_link: format!("{LP_ROOT}~jane.doe"),
            web_link: format!("https://bugs.launchpad.net/maas/+bug/{id}"),
            tags: tags.iter().map(ToString::to_string).collect(),
            self_link: format!("{LP_ROOT}bugs/{id}"),
        })
    }

    /// Stores a fully specified bug and returns it.
    pub fn insert_bug(&self, bug: Bug) -> Bug {
        self.lock().bugs.insert(bug.id, bug.clone());
        bug
    }

    /// Adds a task for bug `bug_id` in `project` with `status`.
    ///
    /// # Panics
    ///
    /// Panics if the bug or project has not been added.
    pub fn add_bug_task(&self, bug_id: u64, project: &str, status: &str) -> BugTask {
        let mut state = self.lock();
        let target = state.projects.get(project).expect("unknown project").self_link.clone();
        let bug_link = state.bugs.get(&bug_id).expect("unknown bug").self_link.clone();
        let task = new_task(bug_id, &bug_link, &target, project, status);
        state.tasks.push(StoredTask { bug_id, task: task.clone() });
        task
    }

    /// Sets how many tasks a search page holds.
    pub fn set_page_size(&self, size: usize) {
        self.lock().page_size = size.max(1);
    }

    /// Makes searches return every task of the project, ignoring filters.
    pub fn disable_server_filtering(&self) {
        self.lock().server_filtering = false;
    }

    /// Makes task searches fail.
    pub fn fail_search(&self, fail: bool) {
        self.lock().fail_search = fail;
    }

    /// Makes `add_watch` fail.
    pub fn fail_add_watch(&self, fail: bool) {
        self.lock().fail_add_watch = fail;
    }

    /// Makes `add_task` fail.
    pub fn fail_add_task(&self, fail: bool) {
        self.lock().fail_add_task = fail;
    }

    /// Makes `link_watch` fail.
    pub fn fail_link_watch(&self, fail: bool) {
        self.lock().fail_link_watch = fail;
    }

    /// Number of `search_tasks` calls served so far.
    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.lock().search_calls
    }

    /// `(tracker link, remote bug)` for every watch on the bug.
    #[must_use]
    pub fn watches(&self, bug_id: u64) -> Vec<(String, String)> {
        self.lock()
            .watches
            .iter()
            .filter(|w| w.bug_id == bug_id)
            .map(|w| (w.tracker_link.clone(), w.remote_bug.clone()))
            .collect()
    }

    /// Target links of every task on the bug.
    #[must_use]
    pub fn task_targets(&self, bug_id: u64) -> Vec<String> {
        self.lock()
            .tasks
            .iter()
            .filter(|t| t.bug_id == bug_id)
            .map(|t| t.task.target_link.clone())
            .collect()
    }

    /// Watch linked to the bug's task in `project`, if any.
    #[must_use]
    pub fn linked_watch(&self, bug_id: u64, project: &str) -> Option<String> {
        let state = self.lock();
        let target = &state.projects.get(project)?.self_link;
        state
            .tasks
            .iter()
            .find(|t| t.bug_id == bug_id && t.task.target_link == *target)
            .and_then(|t| t.task.bug_watch_link.clone())
    }
}

fn new_task(bug_id: u64, bug_link: &str, target: &str, project: &str, status: &str) -> BugTask {
    let self_link = format!("{LP_ROOT}{project}/+bug/{bug_id}");
    BugTask {
        related_tasks_link: Some(format!("{self_link}/related_tasks")),
        self_link,
        bug_link: bug_link.to_string(),
        target_link: target.to_string(),
        status: status.to_string(),
        bug_watch_link: None,
    }
}

fn not_found(what: &str, key: &str) -> BoxError {
    format!("{what} not found: {key}").into()
}

impl BugSource for MemoryLaunchpad {
    fn project(&self, name: &str) -> Result<Project, BoxError> {
        self.lock().projects.get(name).cloned().ok_or_else(|| not_found("Project", name))
    }

    fn bug_tracker(&self, base_url: &str) -> Result<BugTrackerRef, BoxError> {
        self.lock()
            .trackers
            .iter()
            .find(|t| t.base_url == base_url)
            .cloned()
            .ok_or_else(|| not_found("Bug tracker", base_url))
    }

    fn search_tasks(&self, search: &TaskSearch, cursor: Option<&str>) -> Result<TaskPage, BoxError> {
        let mut state = self.lock();
        state.search_calls += 1;
        if state.fail_search {
            return Err("Launchpad task search failed (503): service unavailable".into());
        }

        let start = match cursor {
            Some(c) => c
                .strip_prefix("memory:start=")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| format!("Bad cursor: {c}"))?,
            None => 0,
        };
        let matching: Vec<BugTask> = state
            .tasks
            .iter()
            .filter(|t| t.task.target_link == search.project_link)
            .filter(|t| {
                if !state.server_filtering {
                    return true;
                }
                let tagged = state
                    .bugs
                    .get(&t.bug_id)
                    .is_some_and(|bug| bug.tags.iter().any(|tag| search.tags.contains(tag)));
                tagged && search.statuses.contains(&t.task.status)
            })
            .map(|t| t.task.clone())
            .collect();

        let end = (start + state.page_size).min(matching.len());
        let tasks = matching.get(start..end).map(<[BugTask]>::to_vec).unwrap_or_default();
        let next = (end < matching.len()).then(|| format!("memory:start={end}"));
        Ok(TaskPage { tasks, next })
    }

    fn related_tasks(&self, task: &BugTask) -> Result<Vec<BugTask>, BoxError> {
        let state = self.lock();
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.task.bug_link == task.bug_link && t.task.self_link != task.self_link)
            .map(|t| t.task.clone())
            .collect())
    }

    fn bug(&self, bug_link: &str) -> Result<Bug, BoxError> {
        self.lock()
            .bugs
            .values()
            .find(|b| b.self_link == bug_link)
            .cloned()
            .ok_or_else(|| not_found("Bug", bug_link))
    }

    fn bug_tasks(&self, bug: &Bug) -> Result<Vec<BugTask>, BoxError> {
        Ok(self
            .lock()
            .tasks
            .iter()
            .filter(|t| t.bug_id == bug.id)
            .map(|t| t.task.clone())
            .collect())
    }

    fn add_watch(
        &self,
        bug: &Bug,
        tracker: &BugTrackerRef,
        remote_bug: &str,
    ) -> Result<String, BoxError> {
        let mut state = self.lock();
        if state.fail_add_watch {
            return Err("Launchpad addWatch failed (503): service unavailable".into());
        }
        if let Some(existing) = state.watches.iter().find(|w| {
            w.bug_id == bug.id && w.tracker_link == tracker.self_link && w.remote_bug == remote_bug
        }) {
            return Ok(existing.self_link.clone());
        }
        let self_link = format!("{LP_ROOT}bugs/{}/+watch/{}", bug.id, state.watches.len() + 1);
        state.watches.push(StoredWatch {
            bug_id: bug.id,
            tracker_link: tracker.self_link.clone(),
            remote_bug: remote_bug.to_string(),
            self_link: self_link.clone(),
        });
        Ok(self_link)
    }

    fn add_task(&self, bug: &Bug, target: &Project) -> Result<BugTask, BoxError> {
        let mut state = self.lock();
        if state.fail_add_task {
            return Err("Launchpad addTask failed (401): Unauthorized".into());
        }
        if state.tasks.iter().any(|t| t.bug_id == bug.id && t.task.target_link == target.self_link) {
            return Err(format!("A fix for this bug has already been requested for {}", target.name).into());
        }
        let task = new_task(bug.id, &bug.self_link, &target.self_link, &target.name, "New");
        state.tasks.push(StoredTask { bug_id: bug.id, task: task.clone() });
        Ok(task)
    }

    fn link_watch(&self, task: &BugTask, watch_link: &str) -> Result<(), BoxError> {
        let mut state = self.lock();
        if state.fail_link_watch {
            return Err("Launchpad task save failed (412): Precondition Failed".into());
        }
        let stored = state
            .tasks
            .iter_mut()
            .find(|t| t.task.self_link == task.self_link)
            .ok_or_else(|| not_found("Task", &task.self_link))?;
        stored.task.bug_watch_link = Some(watch_link.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct GitHubState {
    repos: BTreeMap<String, Repository>,
    issues: Vec<(String, Issue)>,
    create_attempts: usize,
    fail_create_on: Option<usize>,
    list_calls: usize,
}

/// GitHub stand-in allocating issue numbers from 1.
#[derive(Debug, Clone, Default)]
pub struct MemoryGitHub {
    state: Arc<Mutex<GitHubState>>,
}

impl MemoryGitHub {
    /// Creates a tracker with no repositories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GitHubState> {
        self.state.lock().expect("memory github lock poisoned")
    }

    /// Adds a repository named `"owner/name"`.
    pub fn add_repository(&self, full_name: &str) -> Repository {
        let repo = Repository {
            full_name: full_name.to_string(),
            html_url: format!("https://github.com/{full_name}"),
        };
        self.lock().repos.insert(full_name.to_string(), repo.clone());
        repo
    }

    /// Makes the `attempt`-th issue creation (1-based) fail.
    pub fn fail_create_on(&self, attempt: usize) {
        self.lock().fail_create_on = Some(attempt);
    }

    /// Every issue created so far, across repositories.
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.lock().issues.iter().map(|(_, issue)| issue.clone()).collect()
    }

    /// Number of `list_issues` calls served so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }
}

impl IssueTracker for MemoryGitHub {
    fn repository(&self, full_name: &str) -> Result<Repository, BoxError> {
        self.lock().repos.get(full_name).cloned().ok_or_else(|| not_found("Repository", full_name))
    }

    fn create_issue(&self, repo: &Repository, title: &str, body: &str) -> Result<Issue, BoxError> {
        let mut state = self.lock();
        state.create_attempts += 1;
        if state.fail_create_on == Some(state.create_attempts) {
            return Err("GitHub issue creation failed (502): Bad Gateway".into());
        }
        let number = state.issues.len() as u64 + 1;
        let issue = Issue {
            number,
            title: title.to_string(),
            body: body.to_string(),
            html_url: format!("{}/issues/{number}", repo.html_url),
            state: "open".to_string(),
        };
        state.issues.push((repo.full_name.clone(), issue.clone()));
        Ok(issue)
    }

    fn list_issues(&self, repo: &Repository) -> Result<Vec<Issue>, BoxError> {
        let mut state = self.lock();
        state.list_calls += 1;
        Ok(state
            .issues
            .iter()
            .filter(|(name, _)| *name == repo.full_name)
            .map(|(_, issue)| issue.clone())
            .collect())
    }
}
