use std::path::{Path, PathBuf};

use wfold_core::ArtifactRole;
use wfold_patcher::{BundleShape, PatchState, Transition};

/// Files of one install that the patch touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSet {
    pub host: PathBuf,
    pub bundle: PathBuf,
    pub locale: Option<PathBuf>,
}

impl AssetSet {
    /// Host first, then bundle, then locale: the order files are patched and restored in.
    pub fn entries(&self) -> Vec<(ArtifactRole, &Path)> {
        let mut entries = vec![
            (ArtifactRole::Host, self.host.as_path()),
            (ArtifactRole::Bundle, self.bundle.as_path()),
        ];
        if let Some(locale) = &self.locale {
            entries.push((ArtifactRole::Locale, locale.as_path()));
        }
        entries
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub role: ArtifactRole,
    pub path: PathBuf,
    pub shape: Option<BundleShape>,
    pub transition: Transition,
    pub marker: &'static str,
    pub backup_created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub files: Vec<FileOutcome>,
}

impl InstallReport {
    pub fn changed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|file| file.transition != Transition::Unchanged)
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    pub keep_backups: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStatus {
    Restored,
    NoBackup,
    /// Fold markers are present but no backup exists to restore from.
    PatchedWithoutBackup,
}

impl RestoreStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restored => "restored",
            Self::NoBackup => "no backup",
            Self::PatchedWithoutBackup => "patched without backup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub role: ArtifactRole,
    pub path: PathBuf,
    pub status: RestoreStatus,
    pub backup_removed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub root: PathBuf,
    pub files: Vec<RestoreOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInspection {
    pub role: ArtifactRole,
    pub path: PathBuf,
    pub shape: Option<BundleShape>,
    pub state: PatchState,
    pub live_sha256: String,
    pub backup: Option<BackupInspection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInspection {
    pub path: PathBuf,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub root: PathBuf,
    pub files: Vec<FileInspection>,
}
