//! File reading and writing for the form
//!
//! Loaded files are read whole as UTF-8 text. Saved results are written
//! atomically (tempfile + fsync + rename) with owner-only permissions on
//! Unix, so a saved file is either complete or absent.

use crate::error::{ErrorCategory, ErrorKind, Result, TextlockError};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Source of file contents for a pending read.
pub trait TextSource {
    fn read_text(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTextSource;

impl TextSource for FsTextSource {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        // Invalid UTF-8 surfaces as io::ErrorKind::InvalidData.
        fs::read_to_string(path)
    }
}

/// Atomically replace `path` with `contents`.
///
/// Writes go to a tempfile in the same directory which is flushed,
/// fsynced and then renamed over the target.
pub fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        TextlockError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    temp_file
        .write_all(contents)
        .map_err(|e| internal_io("failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| internal_io("failed to flush tempfile", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| internal_io("failed to sync file prior to rename", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| internal_io("failed to get tempfile metadata", e))?
            .permissions();
        perms.set_mode(0o600);
        temp_file
            .as_file()
            .set_permissions(perms)
            .map_err(|e| internal_io("failed to set tempfile permissions", e))?;
    }

    temp_file.persist(path).map_err(|e| {
        TextlockError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn internal_io(msg: &str, err: io::Error) -> TextlockError {
    TextlockError::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, err)
}

/// Classify a failed read of a loaded file. Missing and non-UTF-8 files
/// are the user's problem; anything else is internal.
pub(crate) fn read_error(path: &Path, err: io::Error) -> TextlockError {
    let category = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::InvalidData => ErrorCategory::User,
        _ => ErrorCategory::Internal,
    };
    TextlockError::with_kind_and_source(
        category,
        ErrorKind::FileRead,
        format!("failed to read from {}", path.display()),
        err,
    )
}
