use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use wfold_core::FoldError;

pub fn verify_marker_present(path: &Path, marker: &str) -> Result<()> {
    let text = read_for_verification(path)?;
    if text.contains(marker) {
        return Ok(());
    }
    Err(FoldError::Verification {
        path: path.to_path_buf(),
        detail: format!("marker `{marker}` is missing after write"),
    }
    .into())
}

pub fn verify_markers_absent(path: &Path, markers: &[&str]) -> Result<()> {
    let text = read_for_verification(path)?;
    match markers.iter().find(|marker| text.contains(*marker)) {
        Some(marker) => Err(FoldError::Verification {
            path: path.to_path_buf(),
            detail: format!("marker `{marker}` is still present after restore"),
        }
        .into()),
        None => Ok(()),
    }
}

fn read_for_verification(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to re-read for verification: {}", path.display()))
}
