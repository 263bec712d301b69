//! Record and replay of tracker interactions.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
