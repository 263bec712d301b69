//! Binary entrypoint for the `bugmirror` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    bugmirror::logging::init();

    // Recording is handled in commands::dispatch via BUGMIRROR_RECORD=<dir>.
    match bugmirror::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
