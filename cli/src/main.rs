use chainconf::LoaderSettings;
use clap::Parser;
use errors::ConfigResult;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;
pub mod ux_error;

use commands::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match log_filter(cli.log_level.as_deref()) {
        Ok(filter) => filter,
        Err(err) => {
            ux_error::report(&anyhow::Error::new(err));
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Show(args) => commands::show::run(args),
        Commands::Parse(args) => commands::parse::run(args),
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Encrypt(args) => commands::encrypt::run(args)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ux_error::report(&err);
            ExitCode::FAILURE
        }
    }
}

/// `--log-level` goes through [`LoaderSettings`] validation; without it `RUST_LOG` applies.
fn log_filter(level: Option<&str>) -> ConfigResult<EnvFilter> {
    match level {
        Some(level) => {
            let settings = LoaderSettings::with_logging_level(level).validated()?;
            Ok(EnvFilter::default().add_directive(settings.level_filter().into()))
        }
        None => Ok(EnvFilter::from_default_env())
    }
}
