// src/core/failure_sink.rs

use crate::{
    constants::SEPARATOR_LINE,
    system::secure_fs::{self, SecureFsError},
};
use std::{fmt::Write as _, fs, io, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Refusing to write the failure file: {0}")]
    Refused(#[from] SecureFsError),
    #[error("Could not write failure file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Failed invocations of one `(tool, header)` group, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub tool: String,
    pub header: String,
    pub invocations: Vec<String>,
}

/// In-memory buffer of every failed invocation of a run.
///
/// It is rendered in the directive grammar, so the file it produces can be
/// fed straight back into `batchop run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLog {
    records: Vec<FailureRecord>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the original text of a failed invocation.
    pub fn record(&mut self, tool: &str, header: &str, invocation: &str) {
        let existing = self
            .records
            .iter_mut()
            .find(|r| r.tool == tool && r.header == header);

        if let Some(record) = existing {
            record.invocations.push(invocation.to_string());
            return;
        }

        self.records.push(FailureRecord {
            tool: tool.to_string(),
            header: header.to_string(),
            invocations: vec![invocation.to_string()],
        });
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.records
    }

    /// Total number of failed invocations.
    pub fn failure_count(&self) -> usize {
        self.records.iter().map(|r| r.invocations.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders every group as `tool`, `header`, the failed lines, then a separator.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{}", record.tool);
            let _ = writeln!(out, "{}", record.header);
            for line in &record.invocations {
                let _ = writeln!(out, "{}", line);
            }
            let _ = writeln!(out, "{}", SEPARATOR_LINE);
        }
        out
    }

    /// Overwrites `path` with the rendered log. An empty log produces an empty file.
    pub fn write_to(&self, path: &Path) -> Result<(), SinkError> {
        secure_fs::ensure_not_symlink(path)?;
        log::debug!(
            "Writing {} failed invocation(s) to '{}'",
            self.failure_count(),
            path.display()
        );
        fs::write(path, self.render()).map_err(|e| SinkError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
