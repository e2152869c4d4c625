// src/system/probe.rs

use std::env;
use std::fs::{self, Metadata};
use std::path::Path;

/// Decides whether a tool named in a directive file can be run.
pub trait ExecutableProbe {
    /// `true` if `tool` names something this host can execute.
    fn is_executable(&self, tool: &str) -> bool;
}

/// Checks the real filesystem. A bare name (no path separator) is looked up on
/// `PATH`, a path is checked directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl ExecutableProbe for SystemProbe {
    fn is_executable(&self, tool: &str) -> bool {
        if tool.contains(std::path::MAIN_SEPARATOR) || tool.contains('/') {
            return is_executable_file(Path::new(tool));
        }
        is_executable_in_path(tool)
    }
}

fn is_executable_in_path(executable_name: &str) -> bool {
    if let Ok(path_var) = env::var("PATH") {
        for path in env::split_paths(&path_var) {
            if is_executable_file(&path.join(executable_name)) {
                return true;
            }
        }
    }
    false
}

fn is_executable_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && has_execute_bit(&meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn has_execute_bit(meta: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_bit(_meta: &Metadata) -> bool {
    true
}
