// src/cli/handlers/run.rs

use crate::{
    core::{
        batch_executor::{self, BatchOptions, BatchSummary},
        directive_parser::{self, ParseWarning},
        failure_sink::FailureLog,
        paths,
    },
    system::{
        executor::{ProcessRunner, SystemRunner},
        probe::{ExecutableProbe, SystemProbe},
    },
};
use anyhow::{Context, Result};
use colored::*;
use scopeguard::ScopeGuard;
use std::path::Path;

///
/// Main entry point for the 'run' command.
///
pub fn handle(input: &Path, output: &str, delimiter: char, echo: bool) -> Result<()> {
    let output = paths::expand_path(output)?;
    let summary = execute_run(
        input,
        &output,
        BatchOptions { delimiter, echo },
        &SystemProbe,
        &SystemRunner,
    )?;

    println!(
        "\n{}",
        format!(
            t!("run.summary"),
            succeeded = summary.succeeded.to_string().green().bold(),
            failed = summary.failed.to_string().red().bold()
        )
    );
    if summary.failed > 0 {
        println!(t!("run.summary.failures_written"), path = output.display().to_string().cyan());
    } else {
        println!(t!("run.summary.no_failures"), path = output.display().to_string().cyan());
    }
    Ok(())
}

/// Parses `input`, runs every invocation and writes the failures to `output`.
///
/// Nothing is written when the directive file cannot be read. Once execution
/// has started, the failure file is written on every way out of this function,
/// unwinding included.
pub fn execute_run(
    input: &Path,
    output: &Path,
    options: BatchOptions,
    probe: &dyn ExecutableProbe,
    runner: &dyn ProcessRunner,
) -> Result<BatchSummary> {
    let report = directive_parser::parse_directive_file(input, probe)
        .with_context(|| format!(t!("run.error.unreadable_input"), path = input.display()))?;
    print_warnings(&report.warnings);

    if report.directives.is_empty() {
        println!("{}", t!("run.empty").yellow());
    }

    let mut failures = scopeguard::guard(FailureLog::new(), |pending| {
        log::error!("Run aborted, flushing {} failure(s)", pending.failure_count());
        if let Err(e) = pending.write_to(output) {
            eprintln!(
                "{}: {}",
                t!("label.error").red().bold(),
                format!(t!("run.error.write_failures"), path = output.display(), error = e)
            );
        }
    });

    let summary = batch_executor::execute_directives(&report.directives, runner, &mut failures, options);

    let failures = ScopeGuard::into_inner(failures);
    failures
        .write_to(output)
        .with_context(|| format!(t!("run.error.write_failures_context"), path = output.display()))?;

    Ok(summary)
}

fn print_warnings(warnings: &[ParseWarning]) {
    for warning in warnings {
        let message = match warning {
            ParseWarning::ToolNotExecutable { tool, line } => {
                format!(t!("run.warn.tool_not_executable"), tool = tool, line = line)
            }
            ParseWarning::MissingHeader { tool, line } => {
                format!(t!("run.warn.missing_header"), tool = tool, line = line)
            }
        };
        eprintln!("{}: {}", t!("label.warning").yellow().bold(), message);
    }
}
