//! Binary entrypoint for the `routesync` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env is fine; the process environment still applies.
    let _ = dotenvy::dotenv();
    match routesync::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
