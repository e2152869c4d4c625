// src/cli/mod.rs

use crate::constants::{DEFAULT_DELIMITER, DEFAULT_OUTPUT_FILENAME};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod dispatcher;
pub mod handlers;

/// Builds the color-aware help text from the localized template.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let template = t!("cli.help.template");

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// batchop: runs account-administration tools in bulk from a directive file.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// File receiving the invocations that failed, in directive format.
    #[arg(short, long, global = true, default_value = DEFAULT_OUTPUT_FILENAME)]
    pub output: String,

    /// Field delimiter used by headers and invocation lines.
    #[arg(short, long, global = true, default_value_t = DEFAULT_DELIMITER)]
    pub delimiter: char,

    /// Do not echo each command before running it.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of `batchop`.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Executes every invocation of a directive file.
    Run {
        /// The directive file to execute.
        input: PathBuf,
    },
}
