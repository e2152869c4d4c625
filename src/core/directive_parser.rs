// src/core/directive_parser.rs

use crate::{
    constants::{COMMENT_PREFIX, SEPARATOR_MIN_DASHES},
    models::DirectiveFile,
    system::{
        probe::ExecutableProbe,
        secure_fs::{self, SecureFsError},
    },
};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

lazy_static! {
    static ref SEPARATOR_RE: Regex =
        Regex::new(&format!(r"^\s*-{{{},}}\s*$", SEPARATOR_MIN_DASHES))
            .expect("separator pattern is valid");
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot read directive file: {0}")]
    Unreadable(#[from] SecureFsError),
}

/// A non-fatal problem noticed while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// The tool could not be executed; its block was discarded up to the next separator.
    ToolNotExecutable { tool: String, line: usize },
    /// A separator arrived before the tool's header line.
    MissingHeader { tool: String, line: usize },
}

/// Result of parsing one directive file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub directives: DirectiveFile,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    AwaitingTool,
    /// The named tool was rejected; everything up to the next separator is dropped.
    SkippingBlock { discarded: usize },
    AwaitingHeader { tool: String, line: usize },
    CollectingInvocations { tool: String, header: String },
}

/// Line-driven state machine turning directive text into grouped tool blocks.
pub struct DirectiveParser<'a> {
    probe: &'a dyn ExecutableProbe,
    state: ParserState,
    line_number: usize,
    report: ParseReport,
}

impl std::fmt::Debug for DirectiveParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveParser")
            .field("state", &self.state)
            .field("line_number", &self.line_number)
            .finish_non_exhaustive()
    }
}

impl<'a> DirectiveParser<'a> {
    pub fn new(probe: &'a dyn ExecutableProbe) -> Self {
        Self {
            probe,
            state: ParserState::AwaitingTool,
            line_number: 0,
            report: ParseReport::default(),
        }
    }

    /// Feeds one line (without its terminator) through the state machine.
    pub fn feed_line(&mut self, line: &str) {
        self.line_number += 1;

        if is_ignorable(line) {
            log::trace!("Line {}: ignored", self.line_number);
            return;
        }
        let separator = is_separator(line);

        let state = std::mem::replace(&mut self.state, ParserState::AwaitingTool);
        self.state = match state {
            ParserState::AwaitingTool if separator => {
                log::debug!("Line {}: stray separator ignored", self.line_number);
                ParserState::AwaitingTool
            }
            ParserState::AwaitingTool => {
                let tool = line.trim().to_string();
                if self.probe.is_executable(&tool) {
                    log::debug!("Line {}: tool '{}'", self.line_number, tool);
                    ParserState::AwaitingHeader {
                        tool,
                        line: self.line_number,
                    }
                } else {
                    log::warn!(
                        "Line {}: tool '{}' is not executable, skipping its block",
                        self.line_number,
                        tool
                    );
                    self.report.warnings.push(ParseWarning::ToolNotExecutable {
                        tool,
                        line: self.line_number,
                    });
                    ParserState::SkippingBlock { discarded: 0 }
                }
            }
            ParserState::SkippingBlock { discarded } if separator => {
                log::debug!("Skipped block ended after {} discarded line(s)", discarded);
                ParserState::AwaitingTool
            }
            ParserState::SkippingBlock { discarded } => ParserState::SkippingBlock {
                discarded: discarded + 1,
            },
            ParserState::AwaitingHeader { tool, line } if separator => {
                log::warn!("Tool '{}' (line {}) has no header", tool, line);
                self.report
                    .warnings
                    .push(ParseWarning::MissingHeader { tool, line });
                ParserState::AwaitingTool
            }
            ParserState::AwaitingHeader { tool, .. } => {
                log::debug!("Line {}: header '{}'", self.line_number, line);
                ParserState::CollectingInvocations {
                    tool,
                    header: line.to_string(),
                }
            }
            ParserState::CollectingInvocations { .. } if separator => ParserState::AwaitingTool,
            ParserState::CollectingInvocations { tool, header } => {
                log::trace!("Line {}: invocation for '{}'", self.line_number, tool);
                self.report.directives.push_invocation(&tool, &header, line);
                ParserState::CollectingInvocations { tool, header }
            }
        };
    }

    /// Ends the input. An open block is closed as if a separator followed it.
    pub fn finish(self) -> ParseReport {
        if let ParserState::AwaitingHeader { tool, line } = self.state {
            let mut report = self.report;
            report
                .warnings
                .push(ParseWarning::MissingHeader { tool, line });
            return report;
        }
        self.report
    }
}

/// Parses directive text that is already in memory.
pub fn parse_str(content: &str, probe: &dyn ExecutableProbe) -> ParseReport {
    let mut parser = DirectiveParser::new(probe);
    for line in content.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Reads and parses a directive file. Any failure to read it is fatal and is
/// reported before a single line is interpreted.
pub fn parse_directive_file(
    path: &Path,
    probe: &dyn ExecutableProbe,
) -> Result<ParseReport, ParseError> {
    let content = secure_fs::read_to_string_checked(path)?;
    log::debug!(
        "Parsing directive file '{}' ({} bytes)",
        path.display(),
        content.len()
    );
    Ok(parse_str(&content, probe))
}

fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX)
}

/// `true` for a line made of at least three dashes.
pub fn is_separator(line: &str) -> bool {
    SEPARATOR_RE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts every tool except the ones listed.
    struct RejectingProbe(Vec<&'static str>);

    impl ExecutableProbe for RejectingProbe {
        fn is_executable(&self, tool: &str) -> bool {
            !self.0.contains(&tool)
        }
    }

    fn accept_all() -> RejectingProbe {
        RejectingProbe(vec![])
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator("---"));
        assert!(is_separator("----------  "));
        assert!(!is_separator("--"));
        assert!(!is_separator("-"));
        assert!(!is_separator("--- x"));
    }

    #[test]
    fn test_parse_single_block() {
        let input = "useradd\n-;c;m\nalice;Alice;\nbob;Bob;\n---\n";
        let report = parse_str(input, &accept_all());

        assert!(report.warnings.is_empty());
        assert_eq!(report.directives.blocks.len(), 1);
        let block = &report.directives.blocks[0];
        assert_eq!(block.tool, "useradd");
        assert_eq!(block.header, "-;c;m");
        assert_eq!(block.invocations, vec!["alice;Alice;", "bob;Bob;"]);
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored_everywhere() {
        let input = "# leading comment\n\nuserdel\n# before header\n-\n\n  # indented\nluser\n---\n";
        let report = parse_str(input, &accept_all());

        let block = &report.directives.blocks[0];
        assert_eq!(block.header, "-");
        assert_eq!(block.invocations, vec!["luser"]);
    }

    #[test]
    fn test_interleaved_blocks_stay_in_input_order() {
        let input = "userdel\n-\na\n---\ngroupdel\n-\ng\n---\nuserdel\n-\nb\n---\n";
        let report = parse_str(input, &accept_all());

        let tools: Vec<&str> = report.directives.blocks.iter().map(|b| b.tool.as_str()).collect();
        assert_eq!(tools, vec!["userdel", "groupdel", "userdel"]);
        assert_eq!(report.directives.blocks[0].invocations, vec!["a"]);
        assert_eq!(report.directives.blocks[2].invocations, vec!["b"]);
    }

    #[test]
    fn test_same_tool_with_different_headers_stays_separate() {
        let input = "useradd\n-\na\n---\nuseradd\n-;c\nb;Bee\n---\n";
        let report = parse_str(input, &accept_all());
        assert_eq!(report.directives.blocks.len(), 2);
    }

    #[test]
    fn test_non_executable_tool_block_is_skipped() {
        let input = "/opt/missing/useradd\n-;c\nalice;Alice\nbob;Bob\n---\nuserdel\n-\ncarol\n---\n";
        let report = parse_str(input, &RejectingProbe(vec!["/opt/missing/useradd"]));

        assert_eq!(
            report.warnings,
            vec![ParseWarning::ToolNotExecutable {
                tool: "/opt/missing/useradd".to_string(),
                line: 1
            }]
        );
        assert_eq!(report.directives.blocks.len(), 1);
        assert_eq!(report.directives.blocks[0].tool, "userdel");
        assert_eq!(report.directives.blocks[0].invocations, vec!["carol"]);
    }

    #[test]
    fn test_missing_final_separator_closes_block() {
        let report = parse_str("userdel\n-\nluser", &accept_all());
        assert_eq!(report.directives.invocation_count(), 1);
    }

    #[test]
    fn test_separator_before_header_warns() {
        let report = parse_str("userdel\n---\ngroupdel\n-\ng\n", &accept_all());
        assert_eq!(
            report.warnings,
            vec![ParseWarning::MissingHeader {
                tool: "userdel".to_string(),
                line: 1
            }]
        );
        assert_eq!(report.directives.blocks[0].tool, "groupdel");
    }

    #[test]
    fn test_invocation_text_is_kept_verbatim() {
        let report = parse_str("usermod\n-;c\nalice;  Alice Smith  \n", &accept_all());
        assert_eq!(
            report.directives.blocks[0].invocations,
            vec!["alice;  Alice Smith  "]
        );
    }

    #[test]
    fn test_missing_directive_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_directive_file(&dir.path().join("nope.txt"), &accept_all());
        assert!(matches!(result, Err(ParseError::Unreadable(_))));
    }
}
