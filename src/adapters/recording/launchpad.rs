//! Recording adapter for the `BugSource` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{Bug, BugSource, BugTask, BugTrackerRef, Project, TaskPage, TaskSearch};

const PORT: &str = "launchpad";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Records source tracker calls while delegating to an inner implementation.
pub struct RecordingBugSource {
    inner: Box<dyn BugSource>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingBugSource {
    /// Wraps `inner`, appending each call to `recorder`.
    pub fn new(inner: Box<dyn BugSource>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct SearchInput<'a> {
    search: &'a TaskSearch,
    cursor: Option<&'a str>,
}

#[derive(Serialize)]
struct WatchInput<'a> {
    bug: &'a str,
    tracker: &'a str,
    remote_bug: &'a str,
}

#[derive(Serialize)]
struct TaskInput<'a> {
    bug: &'a str,
    target: &'a str,
}

#[derive(Serialize)]
struct LinkInput<'a> {
    task: &'a str,
    watch: &'a str,
}

impl BugSource for RecordingBugSource {
    fn project(&self, name: &str) -> Result<Project, BoxError> {
        let result = self.inner.project(name);
        record_result(&self.recorder, PORT, "project", &serde_json::json!({ "name": name }), &result);
        result
    }

    fn bug_tracker(&self, base_url: &str) -> Result<BugTrackerRef, BoxError> {
        let result = self.inner.bug_tracker(base_url);
        let input = serde_json::json!({ "base_url": base_url });
        record_result(&self.recorder, PORT, "bug_tracker", &input, &result);
        result
    }

    fn search_tasks(&self, search: &TaskSearch, cursor: Option<&str>) -> Result<TaskPage, BoxError> {
        let result = self.inner.search_tasks(search, cursor);
        record_result(&self.recorder, PORT, "search_tasks", &SearchInput { search, cursor }, &result);
        result
    }

    fn related_tasks(&self, task: &BugTask) -> Result<Vec<BugTask>, BoxError> {
        let result = self.inner.related_tasks(task);
        let input = serde_json::json!({ "task": task.self_link });
        record_result(&self.recorder, PORT, "related_tasks", &input, &result);
        result
    }

    fn bug(&self, bug_link: &str) -> Result<Bug, BoxError> {
        let result = self.inner.bug(bug_link);
        record_result(&self.recorder, PORT, "bug", &serde_json::json!({ "bug": bug_link }), &result);
        result
    }

    fn bug_tasks(&self, bug: &Bug) -> Result<Vec<BugTask>, BoxError> {
        let result = self.inner.bug_tasks(bug);
        let input = serde_json::json!({ "bug": bug.self_link });
        record_result(&self.recorder, PORT, "bug_tasks", &input, &result);
        result
    }

    fn add_watch(
        &self,
        bug: &Bug,
        tracker: &BugTrackerRef,
        remote_bug: &str,
    ) -> Result<String, BoxError> {
        let result = self.inner.add_watch(bug, tracker, remote_bug);
        let input =
            WatchInput { bug: &bug.self_link, tracker: &tracker.self_link, remote_bug };
        record_result(&self.recorder, PORT, "add_watch", &input, &result);
        result
    }

    fn add_task(&self, bug: &Bug, target: &Project) -> Result<BugTask, BoxError> {
        let result = self.inner.add_task(bug, target);
        let input = TaskInput { bug: &bug.self_link, target: &target.self_link };
        record_result(&self.recorder, PORT, "add_task", &input, &result);
        result
    }

    fn link_watch(&self, task: &BugTask, watch_link: &str) -> Result<(), BoxError> {
        let result = self.inner.link_watch(task, watch_link);
        let input = LinkInput { task: &task.self_link, watch: watch_link };
        record_result(&self.recorder, PORT, "link_watch", &input, &result);
        result
    }
}
