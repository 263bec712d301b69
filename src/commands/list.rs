//! `bugmirror list` command.

use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::sync::{eligible_query, format_bugs, list_eligible_bugs};

/// Execute the `list` command: print eligible bugs without mirroring.
///
/// Only the source tracker is contacted.
///
/// # Errors
///
/// Returns an error string if the source tracker cannot be queried.
pub fn run(ctx: &ServiceContext, config: &SyncConfig) -> Result<(), String> {
    let query = eligible_query(ctx, config).map_err(|e| e.to_string())?;
    let bugs = list_eligible_bugs(ctx.bugs.as_ref(), &query)
        .and_then(|bugs| bugs.collect::<Result<Vec<_>, _>>())
        .map_err(|e| e.to_string())?;
    println!("{}", format_bugs(&bugs));
    Ok(())
}
