// src/system/secure_fs.rs

//! Hardened file access shared by the directive parser and the config cache.
//!
//! Every read goes through [`open_checked`]: symbolic links are refused before
//! the open, and after the open the path and the handle are stat'ed again. Any
//! difference between the three views means the file was swapped underneath
//! us, and the read is aborted.

use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecureFsError {
    #[error("'{path}' could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("'{path}' is a symbolic link and was refused.")]
    SymbolicLink { path: String },
    #[error("'{path}' is not a regular file.")]
    NotAFile { path: String },
    #[error("'{path}' changed while it was being opened.")]
    RaceDetected { path: String },
}

impl SecureFsError {
    /// `true` when the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == ErrorKind::NotFound)
    }

    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Opens `path` for reading after the symlink and race checks described above.
pub fn open_checked(path: &Path) -> Result<File, SecureFsError> {
    let display = || path.display().to_string();

    let before = fs::symlink_metadata(path).map_err(|e| SecureFsError::io(path, e))?;
    if before.file_type().is_symlink() {
        return Err(SecureFsError::SymbolicLink { path: display() });
    }
    if !before.is_file() {
        return Err(SecureFsError::NotAFile { path: display() });
    }

    let file = File::open(path).map_err(|e| SecureFsError::io(path, e))?;
    let handle = file.metadata().map_err(|e| SecureFsError::io(path, e))?;
    let after = fs::symlink_metadata(path).map_err(|e| SecureFsError::io(path, e))?;

    if after.file_type().is_symlink() || !same_file(&before, &handle) || !same_file(&handle, &after)
    {
        log::debug!("Open-time mismatch detected for '{}'", path.display());
        return Err(SecureFsError::RaceDetected { path: display() });
    }

    Ok(file)
}

/// Reads a whole file as UTF-8 through [`open_checked`].
pub fn read_to_string_checked(path: &Path) -> Result<String, SecureFsError> {
    let mut file = open_checked(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| SecureFsError::io(path, e))?;
    Ok(content)
}

/// Refuses to write through a symbolic link. A missing path is fine.
pub fn ensure_not_symlink(path: &Path) -> Result<(), SecureFsError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => Err(SecureFsError::SymbolicLink {
            path: path.display().to_string(),
        }),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SecureFsError::io(path, e)),
    }
}

#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    a.file_type() == b.file_type()
        && a.len() == b.len()
        && a.modified().ok() == b.modified().ok()
}
