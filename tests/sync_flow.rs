//! End-to-end mirror passes against in-memory trackers.

use bugmirror::adapters::memory::{MemoryGitHub, MemoryLaunchpad};
use bugmirror::config::SyncConfig;
use bugmirror::context::ServiceContext;
use bugmirror::sync::{
    eligible_query, format_report, list_eligible_bugs, run_sync, SyncError, SyncOptions,
};

const TRACKER: &str = "https://github.com/canonical/maas-ui/issues";

fn config() -> SyncConfig {
    SyncConfig {
        project: "maas".to_string(),
        ui_project: "maas-ui".to_string(),
        repo: "canonical/maas-ui".to_string(),
        bug_tracker: TRACKER.to_string(),
        statuses: ["New", "Incomplete", "Confirmed", "Triaged", "In Progress"]
            .into_iter()
            .map(String::from)
            .collect(),
        tags: vec!["ui".to_string()],
    }
}

struct Fixture {
    lp: MemoryLaunchpad,
    gh: MemoryGitHub,
    tracker_link: String,
}

impl Fixture {
    fn new() -> Self {
        let lp = MemoryLaunchpad::new();
        lp.add_project("maas");
        lp.add_project("maas-ui");
        let tracker_link = lp.register_bug_tracker(TRACKER).self_link;
        let gh = MemoryGitHub::new();
        gh.add_repository("canonical/maas-ui");
        Self { lp, gh, tracker_link }
    }

    fn file(&self, id: u64, title: &str, tags: &[&str], status: &str) {
        self.lp.add_bug(id, title, tags);
        self.lp.add_bug_task(id, "maas", status);
    }

    fn context(&self) -> ServiceContext {
        ServiceContext::new(Box::new(self.lp.clone()), Box::new(self.gh.clone()))
    }

    fn eligible_ids(&self) -> Vec<u64> {
        let ctx = self.context();
        let query = eligible_query(&ctx, &config()).unwrap();
        list_eligible_bugs(ctx.bugs.as_ref(), &query)
            .unwrap()
            .map(|bug| bug.unwrap().id)
            .collect()
    }
}

#[test]
fn two_eligible_bugs_become_two_linked_issues() {
    let fx = Fixture::new();
    fx.file(101, "Login button misaligned", &["ui"], "New");
    fx.file(102, "Table does not sort", &["ui", "tables"], "Triaged");
    fx.file(103, "Kernel panic", &["kernel"], "New");
    fx.file(104, "Old UI glitch", &["ui"], "Fix Released");

    let report = run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap();

    let issues = fx.gh.issues();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].title, "Login button misaligned");
    assert_eq!(
        issues[0].body,
        "Bug originally filed by jane.doe at https://bugs.launchpad.net/maas/+bug/101\n\n\
         Steps to reproduce bug 101"
    );
    assert_eq!(fx.lp.watches(101), vec![(fx.tracker_link.clone(), "1".to_string())]);
    assert_eq!(fx.lp.watches(102).len(), 1);
    assert!(fx.lp.watches(103).is_empty());
    assert!(fx.lp.linked_watch(101, "maas-ui").is_some());
    assert!(format_report(&report).ends_with("Issues created: 2"));
}

#[test]
fn mirrored_bugs_are_no_longer_eligible() {
    let fx = Fixture::new();
    fx.file(1, "One", &["ui"], "Confirmed");
    fx.file(2, "Two", &["ui"], "In Progress");
    assert_eq!(fx.eligible_ids(), vec![1, 2]);

    run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap();
    assert!(fx.eligible_ids().is_empty());

    let again = run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap();
    assert!(again.created.is_empty());
    assert_eq!(fx.gh.issues().len(), 2);
}

#[test]
fn creation_failure_on_second_bug_stops_the_run() {
    let fx = Fixture::new();
    fx.file(1, "One", &["ui"], "New");
    fx.file(2, "Two", &["ui"], "New");
    fx.file(3, "Three", &["ui"], "New");
    fx.gh.fail_create_on(2);

    let err = run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap_err();

    assert!(matches!(err, SyncError::DestinationUnavailable(_)));
    assert_eq!(fx.gh.issues().len(), 1);
    assert_eq!(fx.lp.watches(1).len(), 1);
    assert!(fx.lp.watches(2).is_empty());
    assert!(fx.lp.watches(3).is_empty());
    assert_eq!(fx.eligible_ids(), vec![2, 3]);
}

#[test]
fn interrupted_write_back_is_repaired_without_a_new_issue() {
    let fx = Fixture::new();
    fx.file(7, "Flaky", &["ui"], "New");

    fx.lp.fail_add_task(true);
    let err = run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap_err();
    assert!(matches!(err, SyncError::WriteBackFailure { bug_id: 7, issue_number: 1, .. }));
    assert_eq!(fx.eligible_ids(), vec![7]);

    fx.lp.fail_add_task(false);
    let report = run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.recovered.len(), 1);
    assert_eq!(fx.gh.issues().len(), 1);
    assert_eq!(fx.lp.watches(7).len(), 1);
    assert!(fx.eligible_ids().is_empty());
    assert!(format_report(&report).contains("LINKED #1 to bug 7: Flaky"));
}

#[derive(Clone, Copy, Debug)]
enum WriteBackStep {
    Watch,
    Task,
    Link,
}

impl WriteBackStep {
    fn fail(self, lp: &MemoryLaunchpad, fail: bool) {
        match self {
            Self::Watch => lp.fail_add_watch(fail),
            Self::Task => lp.fail_add_task(fail),
            Self::Link => lp.fail_link_watch(fail),
        }
    }
}

#[test]
fn failure_at_any_write_back_step_is_repaired_by_the_next_run() {
    for step in [WriteBackStep::Watch, WriteBackStep::Task, WriteBackStep::Link] {
        let fx = Fixture::new();
        fx.file(8, "Half linked", &["ui"], "New");

        step.fail(&fx.lp, true);
        let err = run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap_err();
        assert!(
            matches!(err, SyncError::WriteBackFailure { bug_id: 8, issue_number: 1, .. }),
            "{step:?}: {err}"
        );
        assert!(fx.lp.linked_watch(8, "maas-ui").is_none(), "{step:?}");
        assert_eq!(fx.eligible_ids(), vec![8], "{step:?}: bug must stay eligible");

        step.fail(&fx.lp, false);
        let report = run_sync(&fx.context(), &config(), SyncOptions::default()).unwrap();

        assert_eq!(report.recovered.len(), 1, "{step:?}");
        assert_eq!(fx.gh.issues().len(), 1, "{step:?}");
        assert_eq!(fx.lp.watches(8).len(), 1, "{step:?}");
        assert_eq!(
            fx.lp.linked_watch(8, "maas-ui"),
            Some("https://api.launchpad.net/1.0/bugs/8/+watch/1".to_string()),
            "{step:?}"
        );
        assert!(fx.eligible_ids().is_empty(), "{step:?}");
    }
}

#[test]
fn limit_and_dry_run_compose() {
    let fx = Fixture::new();
    for id in 1..=4 {
        fx.file(id, "Bug", &["ui"], "New");
    }

    let options = SyncOptions { dry_run: true, limit: Some(2) };
    let report = run_sync(&fx.context(), &config(), options).unwrap();

    assert_eq!(report.pending.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(fx.gh.issues().is_empty());
    assert!(format_report(&report).ends_with("Issues created: 0"));
}
