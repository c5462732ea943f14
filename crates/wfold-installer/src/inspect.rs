use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use wfold_core::{backup_path_for, ArtifactRole, Strictness};
use wfold_patcher::{artifact_state, bundle_state};

use crate::locate::locate_assets;
use crate::{BackupInspection, ExtensionLayout, FileInspection, InspectReport};

/// Read-only report of every patchable file; nothing is written.
pub fn inspect(layout: &ExtensionLayout, strictness: Strictness) -> Result<InspectReport> {
    let assets = locate_assets(layout, strictness)?;
    let files = assets
        .entries()
        .into_iter()
        .map(|(role, path)| inspect_file(role, path))
        .collect::<Result<Vec<_>>>()?;
    Ok(InspectReport {
        root: layout.root().to_path_buf(),
        files,
    })
}

fn inspect_file(role: ArtifactRole, path: &Path) -> Result<FileInspection> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}: {}", role.as_str(), path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let (shape, state) = match role {
        ArtifactRole::Bundle => {
            let (shape, state) = bundle_state(&text);
            (Some(shape), state)
        }
        _ => (None, artifact_state(role, &text)),
    };

    let backup_path = backup_path_for(path);
    let backup = if backup_path.is_file() {
        let backup_bytes = fs::read(&backup_path)
            .with_context(|| format!("failed to read backup: {}", backup_path.display()))?;
        Some(BackupInspection {
            path: backup_path,
            sha256: sha256_hex(&backup_bytes),
        })
    } else {
        None
    };

    Ok(FileInspection {
        role,
        path: path.to_path_buf(),
        shape,
        state,
        live_sha256: sha256_hex(&bytes),
        backup,
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
