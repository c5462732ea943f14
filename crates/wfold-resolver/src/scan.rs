use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;
use tracing::debug;
use wfold_core::{
    parse_release_version, version_from_dir_name, FoldError, Strictness, EXTENSION_DIR_PREFIX,
};

use crate::{select_target, Candidate};

#[derive(Debug, Deserialize)]
struct PackageJson {
    version: Option<String>,
}

pub fn user_home_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        let profile = std::env::var("USERPROFILE")
            .context("USERPROFILE is not set; cannot resolve the user home directory")?;
        return Ok(PathBuf::from(profile));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve user home")?;
    Ok(PathBuf::from(home))
}

/// Extension folders of the VS Code distributions the extension ships to.
pub fn default_extension_roots(home: &Path) -> Vec<PathBuf> {
    [".vscode", ".vscode-insiders", ".vscode-oss"]
        .iter()
        .map(|editor| home.join(editor).join("extensions"))
        .collect()
}

pub fn scan_extension_roots(roots: &[PathBuf]) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    for root in roots {
        if !root.is_dir() {
            debug!(root = %root.display(), "extension root missing; skipping");
            continue;
        }

        for entry in fs::read_dir(root)
            .with_context(|| format!("failed to read extension root: {}", root.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(EXTENSION_DIR_PREFIX) {
                continue;
            }
            candidates.push(candidate_for_dir(&entry.path()));
        }
    }

    candidates.sort_by(|left, right| left.dir.cmp(&right.dir));
    Ok(candidates)
}

/// Version declared by the install's `package.json`, if present and a plain release triple.
pub fn read_package_version(dir: &Path) -> Option<Version> {
    let raw = fs::read_to_string(dir.join("package.json")).ok()?;
    let package: PackageJson = serde_json::from_str(&raw).ok()?;
    parse_release_version(package.version.as_deref()?)
}

pub fn validate_override(dir: &Path) -> Result<Candidate> {
    if !dir.is_dir() {
        return Err(FoldError::Resolution(format!(
            "explicit extension directory does not exist or is not a directory: {}",
            dir.display()
        ))
        .into());
    }

    let name = dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if !name.starts_with(EXTENSION_DIR_PREFIX) {
        return Err(FoldError::Resolution(format!(
            "explicit extension directory must be named {EXTENSION_DIR_PREFIX}<version>...: {}",
            dir.display()
        ))
        .into());
    }

    Ok(candidate_for_dir(dir))
}

/// Picks the install to patch: an explicit override wins, otherwise every root is scanned.
pub fn resolve_target(
    roots: &[PathBuf],
    explicit_dir: Option<&Path>,
    strictness: Strictness,
) -> Result<Candidate> {
    if let Some(dir) = explicit_dir {
        debug!(dir = %dir.display(), "using explicit extension directory");
        return validate_override(dir);
    }

    let candidates = scan_extension_roots(roots)?;
    if candidates.is_empty() {
        let searched = roots
            .iter()
            .map(|root| format!("- {}", root.display()))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(FoldError::Resolution(format!(
            "no installed extension found matching {EXTENSION_DIR_PREFIX}*\nsearched:\n{searched}"
        ))
        .into());
    }

    select_target(&candidates, strictness)
}

fn candidate_for_dir(dir: &Path) -> Candidate {
    let mtime = fs::metadata(dir)
        .and_then(|metadata| metadata.modified())
        .unwrap_or(UNIX_EPOCH);
    let version = read_package_version(dir).or_else(|| {
        dir.file_name()
            .and_then(|name| name.to_str())
            .and_then(version_from_dir_name)
    });
    Candidate::new(dir, mtime, version)
}
