// src/bin/batchop.rs

use batchop::cli::{Cli, dispatcher};
use clap::Parser;
use colored::*;

/// The main entry point of the `batchop` application.
/// It sets up logging, parses arguments, dispatches to the handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = dispatcher::dispatch(Cli::parse()) {
        eprintln!("\n{}: {:#}", batchop::t!("label.error").red().bold(), e);
        std::process::exit(1);
    }
}
