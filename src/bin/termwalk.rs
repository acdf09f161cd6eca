//! Termwalk CLI binary.

use std::process;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use termwalk::cli::args::TermwalkArgs;
use termwalk::cli::commands::execute_command;

fn main() {
    let args = TermwalkArgs::parse();

    let level = match args.verbosity() {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };

    // RUST_LOG takes precedence over the verbosity flags.
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
