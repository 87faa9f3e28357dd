use std::process;
use std::str::FromStr;

use clap::Parser;
use log::{LevelFilter, debug};

use flowchart_layout::Args;

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(args:?; "Parsed arguments");

    if let Err(err) = flowchart_layout::run(&args) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
