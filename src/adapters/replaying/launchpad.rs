//! Replaying adapter for the `BugSource` port.

use std::sync::Mutex;

use super::{next_output, replay_result, BoxError};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{Bug, BugSource, BugTask, BugTrackerRef, Project, TaskPage, TaskSearch};

const PORT: &str = "launchpad";

/// Serves recorded source tracker results from a cassette.
pub struct ReplayingBugSource {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingBugSource {
    /// Create a replaying source backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay<T: serde::de::DeserializeOwned>(&self, method: &str) -> Result<T, BoxError> {
        replay_result(next_output(&self.replayer, PORT, method))
    }
}

impl BugSource for ReplayingBugSource {
    fn project(&self, _name: &str) -> Result<Project, BoxError> {
        self.replay("project")
    }

    fn bug_tracker(&self, _base_url: &str) -> Result<BugTrackerRef, BoxError> {
        self.replay("bug_tracker")
    }

    fn search_tasks(&self, _search: &TaskSearch, _cursor: Option<&str>) -> Result<TaskPage, BoxError> {
        self.replay("search_tasks")
    }

    fn related_tasks(&self, _task: &BugTask) -> Result<Vec<BugTask>, BoxError> {
        self.replay("related_tasks")
    }

    fn bug(&self, _bug_link: &str) -> Result<Bug, BoxError> {
        self.replay("bug")
    }

    fn bug_tasks(&self, _bug: &Bug) -> Result<Vec<BugTask>, BoxError> {
        self.replay("bug_tasks")
    }

    fn add_watch(
        &self,
        _bug: &Bug,
        _tracker: &BugTrackerRef,
        _remote_bug: &str,
    ) -> Result<String, BoxError> {
        self.replay("add_watch")
    }

    fn add_task(&self, _bug: &Bug, _target: &Project) -> Result<BugTask, BoxError> {
        self.replay("add_task")
    }

    fn link_watch(&self, _task: &BugTask, _watch_link: &str) -> Result<(), BoxError> {
        self.replay("link_watch")
    }
}
