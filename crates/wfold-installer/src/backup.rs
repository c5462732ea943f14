use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Writes `original` to `backup` unless a backup already exists. Returns whether one was created.
///
/// An existing backup always holds the earliest pre-patch bytes, so it is never replaced.
pub fn ensure_backup(backup: &Path, original: &[u8]) -> Result<bool> {
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(backup)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to create backup: {}", backup.display()));
        }
    };
    file.write_all(original)
        .with_context(|| format!("failed to write backup: {}", backup.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to flush backup: {}", backup.display()))?;
    Ok(true)
}
