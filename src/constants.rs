// src/constants.rs

/// The failure file written at the end of every run when `-o` is not given.
pub const DEFAULT_OUTPUT_FILENAME: &str = "./batchop.err";

/// Field delimiter shared by header and invocation lines.
pub const DEFAULT_DELIMITER: char = ';';

/// Header token that binds the tool's bare positional argument.
pub const POSITIONAL_TOKEN: &str = "-";

/// Minimum run of dashes that closes a tool block.
pub const SEPARATOR_MIN_DASHES: usize = 3;

/// Separator written after every group in the failure file.
pub const SEPARATOR_LINE: &str = "---";

/// Marks a comment line in directive files.
pub const COMMENT_PREFIX: char = '#';
