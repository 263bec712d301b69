//! `bugmirror sync` command.

use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::sync::{format_report, run_sync, SyncOptions};

/// Execute the `sync` command and print its report.
///
/// # Errors
///
/// Returns an error string if the mirror pass stops early.
pub fn run(
    ctx: &ServiceContext,
    config: &SyncConfig,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<(), String> {
    let report = run_sync(ctx, config, SyncOptions { dry_run, limit }).map_err(|e| e.to_string())?;
    if dry_run {
        println!("Dry run; nothing was created.");
    }
    println!("{}", format_report(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryGitHub, MemoryLaunchpad};

    fn config() -> SyncConfig {
        SyncConfig {
            project: "maas".to_string(),
            ui_project: "maas-ui".to_string(),
            repo: "canonical/maas-ui".to_string(),
            bug_tracker: "https://github.com/canonical/maas-ui/issues".to_string(),
            statuses: vec!["New".to_string()],
            tags: vec!["ui".to_string()],
        }
    }

    fn context() -> (MemoryLaunchpad, MemoryGitHub, ServiceContext) {
        let lp = MemoryLaunchpad::new();
        lp.add_project("maas");
        lp.add_project("maas-ui");
        lp.register_bug_tracker("https://github.com/canonical/maas-ui/issues");
        let gh = MemoryGitHub::new();
        gh.add_repository("canonical/maas-ui");
        let ctx = ServiceContext::new(Box::new(lp.clone()), Box::new(gh.clone()));
        (lp, gh, ctx)
    }

    #[test]
    fn dry_run_creates_nothing() {
        let (lp, gh, ctx) = context();
        lp.add_bug(1, "One", &["ui"]);
        lp.add_bug_task(1, "maas", "New");

        run(&ctx, &config(), true, None).unwrap();
        assert!(gh.issues().is_empty());
        assert!(lp.watches(1).is_empty());
    }

    #[test]
    fn failure_is_reported_as_message() {
        let (lp, gh, ctx) = context();
        lp.add_bug(1, "One", &["ui"]);
        lp.add_bug_task(1, "maas", "New");
        gh.fail_create_on(1);

        let err = run(&ctx, &config(), false, None).unwrap_err();
        assert!(err.contains("destination tracker unavailable"), "{err}");
    }
}
