// src/core/binder.rs

use crate::models::{CommandLine, OptionToken};

/// A header line split into option tokens, one per column.
///
/// Columns keep their index even when the token is empty, so row fields stay
/// aligned with the header they were written against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    tokens: Vec<Option<OptionToken>>,
}

impl Header {
    /// Splits `header_line` on `delimiter`, trimming whitespace around each token.
    pub fn parse(header_line: &str, delimiter: char) -> Self {
        let tokens = header_line
            .split(delimiter)
            .map(|token| OptionToken::from_header_token(token.trim()))
            .collect();
        Self { tokens }
    }

    /// How many `-` placeholders the header carries. A well-formed header has one.
    pub fn positional_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Some(OptionToken::Positional)))
            .count()
    }

    /// Binds one invocation row into a command line for `program`.
    ///
    /// # Logic:
    /// - A non-empty value under a flag becomes `flag value`.
    /// - An empty value under a flag becomes a bare switch.
    /// - The value under `-` becomes the positional argument; an empty one is dropped.
    /// - Row fields past the last header column are ignored.
    ///
    /// Valued options come first, then switches, then the positional argument,
    /// each group in header order.
    pub fn bind(&self, program: &str, row: &str, delimiter: char) -> CommandLine {
        let mut valued: Vec<String> = Vec::new();
        let mut switches: Vec<String> = Vec::new();
        let mut positional: Option<String> = None;

        for (token, value) in self.tokens.iter().zip(split_row(row, delimiter)) {
            let Some(token) = token else {
                continue;
            };

            match token.flag() {
                None => {
                    if !value.is_empty() {
                        positional = Some(value.to_string());
                    }
                }
                Some(flag) if value.is_empty() => switches.push(flag),
                Some(flag) => {
                    valued.push(flag);
                    valued.push(value.to_string());
                }
            }
        }

        let mut args = valued;
        args.extend(switches);
        args.extend(positional);

        CommandLine {
            program: program.to_string(),
            args,
        }
    }
}

/// Splits an invocation row into fields. Only trailing whitespace is trimmed:
/// leading whitespace in a value is treated as intentional.
pub fn split_row(row: &str, delimiter: char) -> impl Iterator<Item = &str> {
    row.split(delimiter).map(str::trim_end)
}
