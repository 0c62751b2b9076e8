//! `stratus` binary.

use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use miette::GraphicalReportHandler;

use stratus::StratusError;
use stratus_cli::{Args, error_adapter};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);
    debug!(args:?; "Arguments");

    match stratus_cli::run(&args) {
        Ok(rendered) => {
            info!(path:? = rendered.path(); "Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_reports(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logger(level: &str) {
    let parsed = LevelFilter::from_str(level).ok();

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(parsed.unwrap_or(LevelFilter::Warn))
        .init();

    if parsed.is_none() {
        warn!(level; "Unknown log level, falling back to warn");
    }
}

fn print_reports(err: &StratusError) {
    let handler = GraphicalReportHandler::new();
    for report in error_adapter::reports(err) {
        let mut out = String::new();
        match handler.render_report(&mut out, &report) {
            Ok(()) => error!("{out}"),
            Err(_) => error!("{report}"),
        }
    }
}
