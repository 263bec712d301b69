//! Record-replay round-trip integration test.
//!
//! Records a full mirror pass against in-memory trackers, then replays the
//! per-port cassettes and checks that the pass produces the same report
//! without either tracker behind it.

use bugmirror::adapters::memory::{MemoryGitHub, MemoryLaunchpad};
use bugmirror::cassette::config::CassetteConfig;
use bugmirror::cassette::format::Cassette;
use bugmirror::cassette::session::RecordingSession;
use bugmirror::config::SyncConfig;
use bugmirror::context::ServiceContext;
use bugmirror::sync::{format_report, run_sync, SyncOptions};

const TRACKER: &str = "https://github.com/canonical/maas-ui/issues";

fn config() -> SyncConfig {
    SyncConfig {
        project: "maas".to_string(),
        ui_project: "maas-ui".to_string(),
        repo: "canonical/maas-ui".to_string(),
        bug_tracker: TRACKER.to_string(),
        statuses: vec!["New".to_string(), "Triaged".to_string()],
        tags: vec!["ui".to_string()],
    }
}

fn memory_context() -> ServiceContext {
    let lp = MemoryLaunchpad::new();
    lp.add_project("maas");
    lp.add_project("maas-ui");
    lp.register_bug_tracker(TRACKER);
    lp.set_page_size(1);
    for (id, title) in [(11, "Sidebar flickers"), (12, "Wrong icon")] {
        lp.add_bug(id, title, &["ui"]);
        lp.add_bug_task(id, "maas", "New");
    }
    let gh = MemoryGitHub::new();
    gh.add_repository("canonical/maas-ui");
    ServiceContext::new(Box::new(lp), Box::new(gh))
}

#[test]
fn record_then_replay_produces_identical_report() {
    let base = std::env::temp_dir().join("bugmirror_record_replay_test");
    let _ = std::fs::remove_dir_all(&base);

    // --- Phase 1: record a pass against in-memory trackers ---
    let session = RecordingSession::new(&base).unwrap();
    let ctx = memory_context().recorded(&session);
    let recorded = format_report(&run_sync(&ctx, &config(), SyncOptions::default()).unwrap());
    drop(ctx);
    let dir = session.finish().unwrap();

    assert!(recorded.ends_with("Issues created: 2"));
    let github = Cassette::load(&dir.join("github.cassette.yaml")).unwrap();
    assert_eq!(github.count_for("github"), 4, "repository, list_issues and two creations");
    let launchpad = Cassette::load(&dir.join("launchpad.cassette.yaml")).unwrap();
    assert!(launchpad.interactions.iter().any(|i| i.method == "link_watch"));

    // --- Phase 2: replay twice and compare ---
    let config_paths = CassetteConfig::from_session_dir(&dir);
    for _ in 0..2 {
        let replay = ServiceContext::replaying_from(&config_paths).unwrap();
        let replayed =
            format_report(&run_sync(&replay, &config(), SyncOptions::default()).unwrap());
        assert_eq!(replayed, recorded);
    }

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn recorded_failure_replays_as_failure() {
    let base = std::env::temp_dir().join("bugmirror_record_replay_failure_test");
    let _ = std::fs::remove_dir_all(&base);

    let lp = MemoryLaunchpad::new();
    lp.add_project("maas");
    lp.add_project("maas-ui");
    lp.register_bug_tracker(TRACKER);
    lp.add_bug(5, "Broken", &["ui"]);
    lp.add_bug_task(5, "maas", "New");
    let gh = MemoryGitHub::new();
    gh.add_repository("canonical/maas-ui");
    gh.fail_create_on(1);

    let session = RecordingSession::new(&base).unwrap();
    let ctx = ServiceContext::new(Box::new(lp), Box::new(gh)).recorded(&session);
    let recorded = run_sync(&ctx, &config(), SyncOptions::default()).unwrap_err().to_string();
    drop(ctx);
    let dir = session.finish().unwrap();

    let replay = ServiceContext::replaying_from(&CassetteConfig::from_session_dir(&dir)).unwrap();
    let replayed = run_sync(&replay, &config(), SyncOptions::default()).unwrap_err().to_string();
    assert_eq!(replayed, recorded);
    assert!(replayed.contains("502"));

    let _ = std::fs::remove_dir_all(&base);
}
