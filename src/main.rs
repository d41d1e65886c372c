//! Binary entrypoint for the `codedigest` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Recording is handled in codedigest::run via CODEDIGEST_RECORD=<path>.
    match codedigest::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
