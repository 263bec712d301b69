//! Live adapters that call the real tracker APIs.

pub mod github;
pub mod launchpad;

pub use github::LiveGitHub;
pub use launchpad::LiveLaunchpad;
