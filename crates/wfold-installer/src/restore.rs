use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use wfold_core::{backup_path_for, ArtifactRole, Strictness};
use wfold_patcher::residual_markers;

use crate::fs_utils::remove_file_if_exists;
use crate::locate::locate_assets;
use crate::verify::verify_markers_absent;
use crate::{ExtensionLayout, RestoreOutcome, RestoreStatus, UninstallOptions, UninstallReport};

pub fn uninstall(
    layout: &ExtensionLayout,
    strictness: Strictness,
    options: UninstallOptions,
) -> Result<UninstallReport> {
    let assets = locate_assets(layout, strictness)?;
    let mut files = Vec::new();
    for (role, path) in assets.entries() {
        files.push(restore_file(role, path, options)?);
    }
    Ok(UninstallReport {
        root: layout.root().to_path_buf(),
        files,
    })
}

/// Copies `<path>.bak` back over `path` and checks that no fold marker survived.
pub fn restore_file(
    role: ArtifactRole,
    path: &Path,
    options: UninstallOptions,
) -> Result<RestoreOutcome> {
    let backup = backup_path_for(path);
    let markers = residual_markers(role);

    if !backup.is_file() {
        let live = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}: {}", role.as_str(), path.display()))?;
        let status = if markers.iter().any(|marker| live.contains(marker)) {
            warn!(
                path = %path.display(),
                "file carries fold markers but has no backup; reinstall the extension to clean it"
            );
            RestoreStatus::PatchedWithoutBackup
        } else {
            RestoreStatus::NoBackup
        };
        return Ok(RestoreOutcome {
            role,
            path: path.to_path_buf(),
            status,
            backup_removed: false,
        });
    }

    let original =
        fs::read(&backup).with_context(|| format!("failed to read backup: {}", backup.display()))?;
    fs::write(path, &original)
        .with_context(|| format!("failed to restore {}: {}", role.as_str(), path.display()))?;
    verify_markers_absent(path, markers)?;
    info!(role = role.as_str(), path = %path.display(), "restored from backup");

    let backup_removed = if options.keep_backups {
        false
    } else {
        remove_file_if_exists(&backup)
            .with_context(|| format!("failed to remove backup: {}", backup.display()))?
    };
    Ok(RestoreOutcome {
        role,
        path: path.to_path_buf(),
        status: RestoreStatus::Restored,
        backup_removed,
    })
}
