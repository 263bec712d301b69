//! The mirror pass: list eligible bugs, create issues, link them back.

pub mod error;
pub mod reader;
pub mod writer;

use std::fmt::Write;

use tracing::info;

pub use error::{PortError, SyncError};
pub use reader::{list_eligible_bugs, EligibleBugs, EligibleQuery};
pub use writer::{get_username, issue_body, MirrorOutcome, MirrorTarget, MirrorWriter};

use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::ports::Bug;

/// Run-level switches that do not change what is eligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// List what would be mirrored without touching either tracker.
    pub dry_run: bool,
    /// Stop after this many bugs.
    pub limit: Option<usize>,
}

/// A bug together with the issue it now points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredBug {
    /// Source bug id.
    pub bug_id: u64,
    /// Source bug title.
    pub title: String,
    /// Destination issue number.
    pub issue_number: u64,
}

/// What a run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Bugs for which a new issue was created.
    pub created: Vec<MirroredBug>,
    /// Bugs linked to an issue left by an earlier, interrupted run.
    pub recovered: Vec<MirroredBug>,
    /// Bugs a dry run would have mirrored.
    pub pending: Vec<Bug>,
}

impl SyncReport {
    fn record(&mut self, bug: &Bug, outcome: &MirrorOutcome) {
        let entry = MirroredBug {
            bug_id: bug.id,
            title: bug.title.clone(),
            issue_number: outcome.issue().number,
        };
        match outcome {
            MirrorOutcome::Created(_) => self.created.push(entry),
            MirrorOutcome::Recovered(_) => self.recovered.push(entry),
        }
    }
}

/// Resolves the handles both components need.
///
/// # Errors
///
/// Returns the first lookup failure, classified by tracker.
fn resolve(
    ctx: &ServiceContext,
    config: &SyncConfig,
) -> Result<(EligibleQuery, MirrorTarget), SyncError> {
    let query = eligible_query(ctx, config)?;
    let bug_tracker =
        ctx.bugs.bug_tracker(&config.bug_tracker).map_err(SyncError::SourceUnavailable)?;
    let repo = ctx.issues.repository(&config.repo).map_err(SyncError::DestinationUnavailable)?;

    let ui_project = query.ui_project.clone();
    Ok((query, MirrorTarget { repo, ui_project, bug_tracker }))
}

/// Builds the query for listing eligible bugs, without touching the destination.
///
/// # Errors
///
/// Returns [`SyncError::SourceUnavailable`] if a project lookup fails.
pub fn eligible_query(
    ctx: &ServiceContext,
    config: &SyncConfig,
) -> Result<EligibleQuery, SyncError> {
    Ok(EligibleQuery {
        project: ctx.bugs.project(&config.project).map_err(SyncError::SourceUnavailable)?,
        ui_project: ctx.bugs.project(&config.ui_project).map_err(SyncError::SourceUnavailable)?,
        statuses: config.statuses.clone(),
        tags: config.tags.clone(),
    })
}

/// Mirrors every eligible bug, in listing order, stopping at the first error.
///
/// Work committed before an error stays committed; running again picks up
/// where this run stopped.
///
/// # Errors
///
/// Returns the [`SyncError`] that stopped the run.
pub fn run_sync(
    ctx: &ServiceContext,
    config: &SyncConfig,
    options: SyncOptions,
) -> Result<SyncReport, SyncError> {
    let (query, target) = resolve(ctx, config)?;
    let mut writer = MirrorWriter::new(ctx.bugs.as_ref(), ctx.issues.as_ref(), &target);
    let mut report = SyncReport::default();

    info!(
        project = %query.project.name,
        ui_project = %query.ui_project.name,
        repo = %target.repo.full_name,
        dry_run = options.dry_run,
        "starting mirror pass"
    );

    let bugs = list_eligible_bugs(ctx.bugs.as_ref(), &query)?;
    for bug in bugs.take(options.limit.unwrap_or(usize::MAX)) {
        let bug = bug?;
        if options.dry_run {
            report.pending.push(bug);
            continue;
        }
        let outcome = writer.mirror(&bug)?;
        report.record(&bug, &outcome);
    }

    Ok(report)
}

/// Renders a report; the final line is the count of issues created.
#[must_use]
pub fn format_report(report: &SyncReport) -> String {
    let mut out = String::new();
    for bug in &report.pending {
        let _ = writeln!(out, "  WOULD MIRROR bug {}: {}", bug.id, bug.title);
    }
    for entry in &report.created {
        let _ = writeln!(
            out,
            "  CREATED #{} for bug {}: {}",
            entry.issue_number, entry.bug_id, entry.title
        );
    }
    for entry in &report.recovered {
        let _ = writeln!(
            out,
            "  LINKED #{} to bug {}: {}",
            entry.issue_number, entry.bug_id, entry.title
        );
    }
    let _ = write!(out, "Issues created: {}", report.created.len());
    out
}

/// Renders eligible bugs one per line.
#[must_use]
pub fn format_bugs(bugs: &[Bug]) -> String {
    if bugs.is_empty() {
        return "No eligible bugs.".to_string();
    }
    bugs.iter()
        .map(|bug| format!("  {} {} ({})", bug.id, bug.title, bug.web_link))
        .collect::<Vec<_>>()
        .join("\n")
}
