//! Saving results as timestamped text files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::info;

use crate::error::Result;
use crate::file_ops;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "textlock";

/// `PREFIX_YYYYMMDD_HHMMSS.txt`
pub fn artifact_name<Tz: TimeZone>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.txt", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// Write `text` into `dir` under a timestamped name and return the path.
pub fn save<Tz: TimeZone>(
    dir: &Path,
    prefix: &str,
    text: &str,
    at: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    let path = dir.join(artifact_name(prefix, at));
    file_ops::write_file_atomic(&path, text.as_bytes())
        .map_err(|e| e.with_context(format!("failed to save {}", path.display())))?;
    info!(path = %path.display(), bytes = text.len(), "result saved");
    Ok(path)
}
