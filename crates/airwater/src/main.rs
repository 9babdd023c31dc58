#![forbid(unsafe_code)]

use std::path::PathBuf;

use airwater::cli::app::{Cli, Command, RuntimeArgs};
use airwater::cli::commands;
use airwater::config::{ConfigOverrides, EnvConfig, RuntimeConfig};
use airwater::models::QueryEnvelopeCommandFailure;
use airwater::query::QueryEngine;
use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_INPUT_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    airwater::telemetry::init_tracing(cli.runtime.verbose);

    let command_name = cli.command.name();
    tracing::debug!(command = command_name, "starting");

    match execute(cli) {
        Ok(()) => {
            tracing::debug!(command = command_name, exit_code = EXIT_SUCCESS, "completed");
            EXIT_SUCCESS
        }
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            eprintln!("airwater: failed `{command_name}` (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    if let Command::Schema(args) = &cli.command {
        return commands::schema::run(args);
    }

    let config = resolve_runtime_config(&cli.runtime)?;
    let engine = QueryEngine::with_layout(config.database_path, config.layout);
    tracing::debug!(
        database = %engine.database_path().display(),
        table = %engine.layout().table,
        "resolved runtime config"
    );

    match &cli.command {
        Command::Countries(args) => commands::browse::run_countries(args, &engine),
        Command::Regions(args) => commands::browse::run_regions(args, &engine),
        Command::Rows(args) => commands::browse::run_rows(args, &engine),
        Command::Kpis(args) => commands::analytics::run_kpis(args, &engine),
        Command::Top(args) => commands::analytics::run_top(args, &engine),
        Command::Dashboard(args) => commands::analytics::run_dashboard(args, &engine),
        Command::Compare(args) => commands::compare::run_compare(args, &engine),
        Command::CompareGlobal(args) => commands::compare::run_compare_global(args, &engine),
        Command::Export(args) => commands::export::run(args, &engine),
        Command::Schema(args) => commands::schema::run(args),
    }
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<QueryEnvelopeCommandFailure>() {
        Some(failure) if failure.kind().is_user_correctable() => EXIT_INPUT_FAILURE,
        _ => EXIT_RUNTIME_FAILURE,
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn resolve_runtime_config(args: &RuntimeArgs) -> Result<RuntimeConfig> {
    let home_dir = match &args.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };

    let cwd = match &args.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    let overrides = ConfigOverrides {
        database: args.db.as_deref(),
        table: args.table.as_deref(),
    };
    airwater::config::resolve_runtime_config(&home_dir, &cwd, &overrides, &EnvConfig::from_env()?)
}
