use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};
use wfold_core::{ArtifactFile, ArtifactRole, Strictness};
use wfold_patcher::patch_artifact;

use crate::backup::ensure_backup;
use crate::locate::locate_assets;
use crate::verify::verify_marker_present;
use crate::{ExtensionLayout, FileOutcome, InstallOptions, InstallReport};

/// Patches host, bundle and locale in order, stopping at the first failure.
///
/// Files written before a failure stay written; each one has its `.bak` next to it.
pub fn install(
    layout: &ExtensionLayout,
    strictness: Strictness,
    options: InstallOptions,
) -> Result<InstallReport> {
    let assets = locate_assets(layout, strictness)?;
    let mut files = Vec::new();
    for (role, path) in assets.entries() {
        files.push(patch_file(role, path, options)?);
    }
    Ok(InstallReport {
        root: layout.root().to_path_buf(),
        dry_run: options.dry_run,
        files,
    })
}

fn patch_file(role: ArtifactRole, path: &Path, options: InstallOptions) -> Result<FileOutcome> {
    let file = ArtifactFile::read(path, role)?;
    let (shape, rewrite) = patch_artifact(role, &file.content)?;
    debug!(
        role = role.as_str(),
        path = %path.display(),
        transition = ?rewrite.transition,
        "computed rewrite"
    );

    let mut backup_created = false;
    if !options.dry_run {
        if rewrite.changed() {
            backup_created = ensure_backup(&file.backup_path(), file.content.as_bytes())?;
            fs::write(path, &rewrite.text)
                .with_context(|| format!("failed to write {}: {}", role.as_str(), path.display()))?;
            info!(role = role.as_str(), path = %path.display(), "patched");
        }
        verify_marker_present(path, rewrite.marker)?;
    }

    Ok(FileOutcome {
        role,
        path: path.to_path_buf(),
        shape,
        transition: rewrite.transition,
        marker: rewrite.marker,
        backup_created,
    })
}
