//! Recording adapter for the `IssueTracker` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{Issue, IssueTracker, Repository};

const PORT: &str = "github";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Records issue tracker calls while delegating to an inner implementation.
pub struct RecordingIssueTracker {
    inner: Box<dyn IssueTracker>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingIssueTracker {
    /// Wraps `inner`, appending each call to `recorder`.
    pub fn new(inner: Box<dyn IssueTracker>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct CreateIssueInput<'a> {
    repo: &'a str,
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct RepoInput<'a> {
    repo: &'a str,
}

impl IssueTracker for RecordingIssueTracker {
    fn repository(&self, full_name: &str) -> Result<Repository, BoxError> {
        let result = self.inner.repository(full_name);
        record_result(&self.recorder, PORT, "repository", &RepoInput { repo: full_name }, &result);
        result
    }

    fn create_issue(&self, repo: &Repository, title: &str, body: &str) -> Result<Issue, BoxError> {
        let result = self.inner.create_issue(repo, title, body);
        let input = CreateIssueInput { repo: &repo.full_name, title, body };
        record_result(&self.recorder, PORT, "create_issue", &input, &result);
        result
    }

    fn list_issues(&self, repo: &Repository) -> Result<Vec<Issue>, BoxError> {
        let result = self.inner.list_issues(repo);
        let input = RepoInput { repo: &repo.full_name };
        record_result(&self.recorder, PORT, "list_issues", &input, &result);
        result
    }
}
