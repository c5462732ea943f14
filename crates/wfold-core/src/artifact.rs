use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactRole {
    Host,
    Bundle,
    Locale,
}

impl ArtifactRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Bundle => "bundle",
            Self::Locale => "locale",
        }
    }
}

/// A patch target read fresh from disk for the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub role: ArtifactRole,
    pub content: String,
}

impl ArtifactFile {
    pub fn read(path: impl Into<PathBuf>, role: ArtifactRole) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {} file: {}", role.as_str(), path.display()))?;
        Ok(Self {
            path,
            role,
            content,
        })
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.path)
    }
}

/// `<path>.bak`, keeping the original extension in place.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".bak");
    PathBuf::from(raw)
}
