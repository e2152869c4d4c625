//! # batchop
//!
//! Bulk user and group administration driven by directive files.
//!
//! A directive file names an administrative tool, a header describing how each
//! column maps onto the tool's flags, and one line per invocation. `batchop`
//! binds every line into a command, runs it, and writes the lines that failed
//! back out in the same grammar so the batch can be resubmitted.
//!
//! The [`core::option_resolver`] module holds the option resolution engine used
//! by front-ends that talk to the directory and credential services.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
