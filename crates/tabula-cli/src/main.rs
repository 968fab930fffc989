//! Tabula CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tabula_cli::cli::Cli;
use tabula_cli::commands::{Context, command_name, run};
use tabula_cli::logging::{LogConfig, init_logging};
use tabula_cli::settings::{Settings, load_from, settings_path};
use tracing::Instrument;
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();

    let settings_file = cli.config.clone().or_else(settings_path);
    let (settings, settings_error) = match settings_file.as_deref().map(load_from) {
        Some(Ok(settings)) => (settings, None),
        Some(Err(error)) => (Settings::default(), Some(error)),
        None => (Settings::default(), None),
    };

    let log_config = log_config_from_cli(&cli, &settings);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Some(error) = settings_error {
        tracing::warn!(error = %format!("{error:#}"), "Ignoring unreadable settings, using defaults");
    }

    let ctx = Context::from_cli(&cli, settings, settings_file);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("error: failed to start runtime: {error}");
            std::process::exit(1);
        }
    };

    let span = tracing::info_span!("command", name = command_name(&cli.command));
    let exit_code = match runtime.block_on(run(&cli.command, &ctx).instrument(span)) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration: `--log-level`, then `-v`/`-q`, then the
/// settings file, then the default.
fn log_config_from_cli(cli: &Cli, settings: &Settings) -> LogConfig {
    let explicit = cli.log_level.is_some() || cli.verbosity.is_present();
    let level_filter = match (cli.log_level, cli.verbosity.is_present(), settings.logging.level) {
        (Some(level), _, _) => LevelFilter::from(level),
        (None, true, _) => cli.verbosity.tracing_level_filter(),
        (None, false, Some(level)) => LevelFilter::from(level),
        (None, false, None) => cli.verbosity.tracing_level_filter(),
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter,
        use_env_filter: !explicit,
        format: cli.log_format.unwrap_or(settings.logging.format),
        log_file: cli.log_file.clone(),
        with_ansi,
        ..LogConfig::default()
    }
}
