//! vault2vault - Rekey Ansible vault content across a directory tree.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vault2vault::cli::output;
use vault2vault::cli::{execute, Cli};
use vault2vault::core::constants::LOG_ENV;
use vault2vault::error::{ConfigError, Error, KeyError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("vault2vault=debug")
        } else {
            EnvFilter::new("vault2vault=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(&cli) {
        Ok(summary) if summary.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            let suggestion = match &e {
                Error::Key(KeyError::NoSource("old")) => {
                    Some("pass --old-pass-file or --old-pass-env")
                }
                Error::Key(KeyError::NoSource(_)) => Some("pass --new-pass-file or --new-pass-env"),
                Error::Config(ConfigError::Parse(_) | ConfigError::InvalidValue { .. }) => {
                    Some("check .vault2vault.toml or the file given with --config")
                }
                _ => None,
            };

            output::error(&e.to_string());
            if let Some(hint) = suggestion {
                output::hint(hint);
            }
            std::process::exit(1);
        }
    }
}
