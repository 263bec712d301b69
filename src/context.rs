//! Service context bundling the tracker port trait objects.

use std::path::Path;

use crate::adapters::live::{LiveGitHub, LiveLaunchpad};
use crate::adapters::recording::{RecordingBugSource, RecordingIssueTracker};
use crate::adapters::replaying::{ReplayingBugSource, ReplayingIssueTracker};
use crate::cassette::config::CassetteConfig;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::config::Credentials;
use crate::ports::{
    Bug, BugSource, BugTask, BugTrackerRef, Issue, IssueTracker, Project, Repository, TaskPage,
    TaskSearch,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Bundles both tracker ports into a single context.
///
/// Constructors wire up different adapter implementations (live,
/// recording, replaying). Tests build one directly with [`ServiceContext::new`].
pub struct ServiceContext {
    /// Source tracker holding the bugs.
    pub bugs: Box<dyn BugSource>,
    /// Destination tracker receiving the issues.
    pub issues: Box<dyn IssueTracker>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(bugs: Box<dyn BugSource>, issues: Box<dyn IssueTracker>) -> Self {
        Self { bugs, issues }
    }

    /// Creates a live context talking to both production APIs.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn live(credentials: &Credentials) -> Result<Self, String> {
        Ok(Self {
            bugs: Box::new(LiveLaunchpad::new(credentials.launchpad.clone())?),
            issues: Box::new(LiveGitHub::new(credentials.github_token.clone())?),
        })
    }

    /// Creates a live context whose calls are also recorded under `base`.
    ///
    /// The returned session must be finished after the context is dropped.
    /// This is the developer-only mechanism behind `BUGMIRROR_RECORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory or a client cannot be created.
    pub fn recording_at(
        base: &Path,
        credentials: &Credentials,
    ) -> Result<(Self, RecordingSession), String> {
        let live = Self::live(credentials)?;
        let session = RecordingSession::new(base)?;
        let ctx = live.recorded(&session);
        Ok((ctx, session))
    }

    /// Wraps both ports of this context in recording adapters.
    #[must_use]
    pub fn recorded(self, session: &RecordingSession) -> Self {
        Self {
            bugs: Box::new(RecordingBugSource::new(self.bugs, session.launchpad.clone())),
            issues: Box::new(RecordingIssueTracker::new(self.issues, session.github.clone())),
        }
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// Each port gets its own replayer over the same cassette, so per-port
    /// cursors are independent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self {
            bugs: Box::new(ReplayingBugSource::new(CassetteReplayer::new(&cassette))),
            issues: Box::new(ReplayingIssueTracker::new(CassetteReplayer::new(&cassette))),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette use an adapter that panics with
    /// a clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;
        Ok(Self {
            bugs: match replayers.launchpad {
                Some(r) => Box::new(ReplayingBugSource::new(r)),
                None => Box::new(PanickingBugSource),
            },
            issues: match replayers.github {
                Some(r) => Box::new(ReplayingIssueTracker::new(r)),
                None => Box::new(PanickingIssueTracker),
            },
        })
    }
}

// --- Panicking adapters for unspecified ports ---

fn unconfigured(port: &str) -> ! {
    panic!("{port} port not configured in CassetteConfig; no cassette loaded for it");
}

struct PanickingBugSource;
impl BugSource for PanickingBugSource {
    fn project(&self, _name: &str) -> Result<Project, BoxError> {
        unconfigured("launchpad")
    }
    fn bug_tracker(&self, _base_url: &str) -> Result<BugTrackerRef, BoxError> {
        unconfigured("launchpad")
    }
    fn search_tasks(&self, _search: &TaskSearch, _cursor: Option<&str>) -> Result<TaskPage, BoxError> {
        unconfigured("launchpad")
    }
    fn related_tasks(&self, _task: &BugTask) -> Result<Vec<BugTask>, BoxError> {
        unconfigured("launchpad")
    }
    fn bug(&self, _bug_link: &str) -> Result<Bug, BoxError> {
        unconfigured("launchpad")
    }
    fn bug_tasks(&self, _bug: &Bug) -> Result<Vec<BugTask>, BoxError> {
        unconfigured("launchpad")
    }
    fn add_watch(&self, _bug: &Bug, _tracker: &BugTrackerRef, _remote: &str) -> Result<String, BoxError> {
        unconfigured("launchpad")
    }
    fn add_task(&self, _bug: &Bug, _target: &Project) -> Result<BugTask, BoxError> {
        unconfigured("launchpad")
    }
    fn link_watch(&self, _task: &BugTask, _watch_link: &str) -> Result<(), BoxError> {
        unconfigured("launchpad")
    }
}

struct PanickingIssueTracker;
impl IssueTracker for PanickingIssueTracker {
    fn repository(&self, _full_name: &str) -> Result<Repository, BoxError> {
        unconfigured("github")
    }
    fn create_issue(&self, _repo: &Repository, _title: &str, _body: &str) -> Result<Issue, BoxError> {
        unconfigured("github")
    }
    fn list_issues(&self, _repo: &Repository) -> Result<Vec<Issue>, BoxError> {
        unconfigured("github")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::Interaction;
    use chrono::Utc;
    use serde_json::json;

    fn write_cassette(path: &Path, interactions: Vec<Interaction>) {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            tool_version: "0.1.0".into(),
            interactions,
        };
        cassette.save(path).unwrap();
    }

    fn repository_interaction(seq: u64) -> Interaction {
        Interaction {
            seq,
            port: "github".into(),
            method: "repository".into(),
            input: json!({"repo": "canonical/maas-ui"}),
            output: json!({"Ok": {
                "full_name": "canonical/maas-ui",
                "html_url": "https://github.com/canonical/maas-ui"
            }}),
        }
    }

    #[test]
    fn replaying_context_from_monolithic_cassette() {
        let dir = std::env::temp_dir().join("bugmirror_ctx_test_mono");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("full.cassette.yaml");

        write_cassette(
            &path,
            vec![
                Interaction {
                    seq: 0,
                    port: "launchpad".into(),
                    method: "bug_tracker".into(),
                    input: json!({"base_url": "https://example.com"}),
                    output: json!({"Err": "No bug tracker is registered for https://example.com"}),
                },
                repository_interaction(1),
            ],
        );

        let ctx = ServiceContext::replaying(&path).unwrap();
        let repo = ctx.issues.repository("canonical/maas-ui").unwrap();
        assert_eq!(repo.full_name, "canonical/maas-ui");
        assert!(ctx.bugs.bug_tracker("https://example.com").is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replaying_from_per_port_cassettes() {
        let dir = std::env::temp_dir().join("bugmirror_ctx_test_ports");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("github.cassette.yaml");
        write_cassette(&path, vec![repository_interaction(0)]);

        let config = CassetteConfig { github: Some(path), ..CassetteConfig::default() };
        let ctx = ServiceContext::replaying_from(&config).unwrap();
        assert_eq!(
            ctx.issues.repository("canonical/maas-ui").unwrap().html_url,
            "https://github.com/canonical/maas-ui"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[should_panic(expected = "not configured in CassetteConfig")]
    fn unspecified_port_panics_with_clear_message() {
        let ctx = ServiceContext::replaying_from(&CassetteConfig::default()).unwrap();
        let _ = ctx.bugs.project("maas");
    }
}
