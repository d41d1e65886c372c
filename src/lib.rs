//! Core library entry for the `codedigest` CLI.
//!
//! Walks a source tree, summarizes every declaration (methods through an
//! LLM), caches per-file summaries, and packs the result into size-bounded
//! text chunks.

pub mod adapters;
pub mod cache;
pub mod cassette;
pub mod cli;
pub mod config;
pub mod context;
pub mod decl;
pub mod error;
pub mod output;
pub mod pack;
pub mod pipeline;
pub mod ports;
pub mod summarize;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DigestConfig;
use crate::context::ServiceContext;
use crate::error::DigestError;
use crate::pipeline::Pipeline;

/// Env var naming a cassette file to record LLM interactions into.
pub const RECORD_VAR: &str = "CODEDIGEST_RECORD";

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns [`DigestError::Configuration`] for invalid arguments, a missing
/// root or credential, and whatever the pipeline reports otherwise.
pub fn run<I, T>(args: I) -> Result<(), DigestError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(DigestError::Configuration(err.to_string())),
    };

    let config = DigestConfig::resolve(&cli, |name| {
        // A `.env` file is optional; real environment variables win.
        let _ = dotenvy::dotenv();
        std::env::var(name).ok()
    })?;
    init_logging(&cli.log_level);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DigestError::Configuration(format!("failed to start runtime: {e}")))?;

    let ctx = match std::env::var_os(RECORD_VAR) {
        Some(path) => ServiceContext::recording(&PathBuf::from(path), &config)?,
        None => ServiceContext::live(&config)?,
    };
    let report = runtime.block_on(Pipeline::new(&ctx, &config).run())?;
    println!("{report}");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_without_root() {
        let err = run(["codedigest"]).unwrap_err();
        assert_eq!(err.kind(), "configuration_failure");
    }

    #[test]
    fn run_errors_on_unknown_flag() {
        let err = run(["codedigest", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), "configuration_failure");
    }

    #[test]
    fn run_errors_on_missing_folder() {
        let err = run(["codedigest", "/no/such/codedigest/root"]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn help_is_not_an_error() {
        assert!(run(["codedigest", "--help"]).is_ok());
    }
}
