//! Command dispatch and handlers.

pub mod list;
pub mod sync;

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::Credentials;
use crate::context::ServiceContext;

/// Environment variable naming the directory recordings are written under.
pub const RECORD_VAR: &str = "BUGMIRROR_RECORD";

/// Dispatch a parsed command to its handler.
///
/// The configuration is validated before any tracker is contacted. When
/// `BUGMIRROR_RECORD` is set to a directory path, all port interactions are
/// recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if the configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let target = match command {
        Command::Sync { target, .. } | Command::List { target } => target,
    };
    target.to_config().validate()?;

    let credentials = Credentials::from_env();
    let (ctx, session) = if let Ok(path) = env::var(RECORD_VAR) {
        let (ctx, session) = ServiceContext::recording_at(&PathBuf::from(path), &credentials)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&credentials)?, None)
    };

    let result = dispatch_with_context(command, &ctx);

    // Finish recording after the command completes, even on error.
    if let Some(session) = session {
        // Drop the context first to release the recorder references.
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the command fails.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Sync { target, dry_run, limit } => {
            sync::run(ctx, &target.to_config(), *dry_run, *limit)
        }
        Command::List { target } => list::run(ctx, &target.to_config()),
    }
}

fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    info!(dir = %output_dir.display(), "recording saved");
    Ok(())
}
