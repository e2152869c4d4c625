// src/core/batch_executor.rs

use crate::{
    core::{binder::Header, failure_sink::FailureLog},
    models::{DirectiveFile, ToolBlock},
    system::executor::ProcessRunner,
};
use colored::*;

/// Knobs for one batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Field delimiter for headers and rows.
    pub delimiter: char,
    /// Print each command before running it.
    pub echo: bool,
}

/// Outcome counters for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Invocations that exited with status zero.
    pub succeeded: usize,
    /// Invocations recorded in the failure log.
    pub failed: usize,
}

// --- Main Public Function ---

/// Runs every invocation of every block, strictly in input order.
///
/// A failing invocation never stops the run: its original line is appended to
/// `failures` and execution moves on to the next one. Nothing is retried and
/// nothing is rolled back.
pub fn execute_directives(
    directives: &DirectiveFile,
    runner: &dyn ProcessRunner,
    failures: &mut FailureLog,
    options: BatchOptions,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for block in &directives.blocks {
        execute_block(block, runner, failures, options, &mut summary);
    }
    log::debug!(
        "Batch finished: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );
    summary
}

// --- Execution Helpers ---

fn execute_block(
    block: &ToolBlock,
    runner: &dyn ProcessRunner,
    failures: &mut FailureLog,
    options: BatchOptions,
    summary: &mut BatchSummary,
) {
    let header = Header::parse(&block.header, options.delimiter);

    let positional_count = header.positional_count();
    if positional_count != 1 {
        log::warn!(
            "Header '{}' for '{}' has {} positional tokens",
            block.header,
            block.tool,
            positional_count
        );
        eprintln!(
            "{}: {}",
            t!("label.warning").yellow().bold(),
            format!(
                t!("run.warn.positional_count"),
                header = block.header,
                tool = block.tool,
                count = positional_count
            )
        );
    }

    for line in &block.invocations {
        let command = header.bind(&block.tool, line, options.delimiter);
        if options.echo {
            println!("{} {}", "→".blue(), command.quoted().green());
        }

        match runner.run(&command) {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                log::warn!("Invocation failed: {}", e);
                failures.record(&block.tool, &block.header, line);
                summary.failed += 1;
            }
        }
    }
}
