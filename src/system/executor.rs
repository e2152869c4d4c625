// src/system/executor.rs

use crate::models::CommandLine;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{0}' exited with status code {1}.")]
    NonZeroExitStatus(String, i32),
    #[error("Command '{0}' was terminated before it could exit.")]
    Terminated(String),
}

/// Runs one synthesized command and reports whether it succeeded.
///
/// The batch executor only talks to this trait, so tests can substitute a
/// scripted runner for the real process spawner.
pub trait ProcessRunner {
    /// Runs `command` to completion. `Ok(())` means exit status zero.
    fn run(&self, command: &CommandLine) -> Result<(), ExecutionError>;
}

/// Spawns real child processes. Standard streams are inherited so the tool's
/// own diagnostics reach the operator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &CommandLine) -> Result<(), ExecutionError> {
        execute_command(command)
    }
}

/// Executes a command synchronously. The program is spawned directly with its
/// argument vector; no shell is involved, so values are never re-split.
pub fn execute_command(command: &CommandLine) -> Result<(), ExecutionError> {
    if command.program.trim().is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    log::debug!("Spawning: {}", command.quoted());

    let status = StdCommand::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ExecutionError::CommandFailed(command.to_string(), e))?;

    if status.success() {
        return Ok(());
    }

    match status.code() {
        Some(code) => Err(ExecutionError::NonZeroExitStatus(command.to_string(), code)),
        // No exit code: the process was killed by a signal.
        None => Err(ExecutionError::Terminated(command.to_string())),
    }
}
