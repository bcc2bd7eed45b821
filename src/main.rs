mod cli;
mod commands;
mod config;
mod device;
mod paths;
mod runner;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config: Option<PathBuf>,
    pub device: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        config: cli.config,
        device: cli.device,
    };

    match dispatch(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Run(args) => commands::run::run(ctx, args),
        Command::Render(args) => commands::run::render(ctx, args),
        Command::Gather(output) => commands::facts::gather(ctx, output),
        Command::Parse(args) => commands::facts::parse(ctx, args),
        Command::Validate { file } => commands::validate::run(ctx, &file),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "stpconf", &mut io::stdout());
            Ok(())
        }
    }
}

fn report_error(err: &anyhow::Error) {
    ui::error(&format!("{err:#}"));
    if let Some(reconcile_err) = err.downcast_ref::<reconcile::Error>() {
        let category = reconcile_err.category();
        ui::dim(&format!("{}: {}", category.description(), category.advice()));
    }
}
