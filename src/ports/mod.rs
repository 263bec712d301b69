//! Port traits defining external boundaries.
//!
//! The tool talks to exactly two systems: the source bug tracker and the
//! destination issue tracker. Implementations live in `src/adapters/`.

pub mod bugs;
pub mod issues;

pub use bugs::{Bug, BugSource, BugTask, BugTrackerRef, Project, TaskPage, TaskSearch};
pub use issues::{Issue, IssueTracker, Repository};
