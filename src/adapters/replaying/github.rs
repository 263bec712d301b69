//! Replaying adapter for the `IssueTracker` port.

use std::sync::Mutex;

use super::{next_output, replay_result, BoxError};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{Issue, IssueTracker, Repository};

const PORT: &str = "github";

/// Serves recorded issue tracker results from a cassette.
pub struct ReplayingIssueTracker {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingIssueTracker {
    /// Create a replaying issue tracker backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl IssueTracker for ReplayingIssueTracker {
    fn repository(&self, _full_name: &str) -> Result<Repository, BoxError> {
        replay_result(next_output(&self.replayer, PORT, "repository"))
    }

    fn create_issue(&self, _repo: &Repository, _title: &str, _body: &str) -> Result<Issue, BoxError> {
        replay_result(next_output(&self.replayer, PORT, "create_issue"))
    }

    fn list_issues(&self, _repo: &Repository) -> Result<Vec<Issue>, BoxError> {
        replay_result(next_output(&self.replayer, PORT, "list_issues"))
    }
}
