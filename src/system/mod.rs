//! # System Interaction Layer
//!
//! This module provides abstractions for interacting with the underlying operating system.
//! It serves as a boundary between the core batch logic and the specifics of process
//! management, file access, and external services.
//!
//! ## Modules
//!
//! - **`executor`**: Spawns the administrative tools synchronously and maps their exit
//!   status onto success or failure.
//! - **`probe`**: Decides whether a tool named in a directive file is executable.
//! - **`secure_fs`**: Hardened reads (symlink refusal, open-time race detection) for every
//!   file the core consumes.
//! - **`collaborators`**: Traits for the directory, credential and host services consulted
//!   by option defaults.

pub mod collaborators;
pub mod executor;
pub mod probe;
pub mod secure_fs;
