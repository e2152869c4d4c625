// src/models.rs

use crate::constants::POSITIONAL_TOKEN;
use std::fmt;

// --- DIRECTIVE MODELS ---

/// One group of invocations sharing a tool and a header line.
///
/// Both `header` and every entry of `invocations` hold the text exactly as it
/// appeared in the directive file, so a failed line can be written back out
/// without any lossy re-rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolBlock {
    /// Tool path or bare name, trimmed.
    pub tool: String,
    /// Header line, verbatim.
    pub header: String,
    /// Invocation lines, verbatim and in input order.
    pub invocations: Vec<String>,
}

/// A parsed directive file. Blocks stay in input order; only directly adjacent
/// blocks with the same `(tool, header)` are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveFile {
    pub blocks: Vec<ToolBlock>,
}

impl DirectiveFile {
    /// Appends one invocation line to the last block when it has the same
    /// `(tool, header)`, otherwise opens a new block at the end.
    pub fn push_invocation(&mut self, tool: &str, header: &str, line: &str) {
        let existing = self
            .blocks
            .last_mut()
            .filter(|b| b.tool == tool && b.header == header);

        if let Some(block) = existing {
            block.invocations.push(line.to_string());
            return;
        }

        self.blocks.push(ToolBlock {
            tool: tool.to_string(),
            header: header.to_string(),
            invocations: vec![line.to_string()],
        });
    }

    /// Total number of invocations across every block.
    pub fn invocation_count(&self) -> usize {
        self.blocks.iter().map(|b| b.invocations.len()).sum()
    }

    /// `true` when there is nothing to execute.
    pub fn is_empty(&self) -> bool {
        self.invocation_count() == 0
    }
}

// --- COMMAND MODELS ---

/// How a single header token maps onto the synthesized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionToken {
    /// `-`: the value is passed as the bare positional argument.
    Positional,
    /// One-character name, rendered as `-x`.
    Short(String),
    /// Longer name, rendered as `--name`.
    Long(String),
}

impl OptionToken {
    /// Classifies a trimmed header token. Returns `None` for an empty token,
    /// which keeps its column but never produces output.
    pub fn from_header_token(token: &str) -> Option<Self> {
        if token.is_empty() {
            None
        } else if token == POSITIONAL_TOKEN {
            Some(Self::Positional)
        } else if token.chars().count() == 1 {
            Some(Self::Short(token.to_string()))
        } else {
            Some(Self::Long(token.to_string()))
        }
    }

    /// The flag text for this token, or `None` for the positional placeholder.
    pub fn flag(&self) -> Option<String> {
        match self {
            Self::Positional => None,
            Self::Short(name) => Some(format!("-{}", name)),
            Self::Long(name) => Some(format!("--{}", name)),
        }
    }
}

/// A fully bound command, ready for a process runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Renders the command with shell quoting where a value needs it. Used when
    /// echoing commands, so values with spaces stay unambiguous.
    pub fn quoted(&self) -> String {
        let parts = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shlex::try_join(parts).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
