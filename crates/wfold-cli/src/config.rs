use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use wfold_core::Strictness;
use wfold_resolver::default_extension_roots;

use crate::manual::DEFAULT_MANUAL_URL;

pub(crate) const CONFIG_ENV_VAR: &str = "WFOLD_CONFIG";
const CONFIG_FILE_NAME: &str = "wfold.toml";

/// Optional user settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FoldConfig {
    /// Replaces the built-in VS Code extension roots when non-empty.
    pub extension_roots: Vec<PathBuf>,
    pub strict_target: bool,
    pub manual_url: String,
    /// Replaces `~/Downloads`, `~`, cwd when non-empty.
    pub manual_dirs: Vec<PathBuf>,
    pub download_manual: bool,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            extension_roots: Vec::new(),
            strict_target: true,
            manual_url: DEFAULT_MANUAL_URL.to_string(),
            manual_dirs: Vec::new(),
            download_manual: true,
        }
    }
}

impl FoldConfig {
    pub(crate) fn extension_roots(&self, home: &Path) -> Vec<PathBuf> {
        if self.extension_roots.is_empty() {
            return default_extension_roots(home);
        }
        self.extension_roots.clone()
    }

    pub(crate) fn manual_dirs(&self, home: &Path, cwd: Option<&Path>) -> Vec<PathBuf> {
        if !self.manual_dirs.is_empty() {
            return self.manual_dirs.clone();
        }
        let mut dirs = vec![home.join("Downloads"), home.to_path_buf()];
        dirs.extend(cwd.map(Path::to_path_buf));
        dirs
    }

    /// `--lenient` always wins; otherwise the file decides.
    pub(crate) fn strictness(&self, lenient_flag: bool) -> Strictness {
        Strictness::from_lenient_flag(lenient_flag || !self.strict_target)
    }
}

pub(crate) fn parse_config(raw: &str) -> Result<FoldConfig> {
    toml::from_str(raw).context("invalid wfold config")
}

/// Loads `explicit`, else `$WFOLD_CONFIG`, else the default file. Only the default may be absent.
pub(crate) fn load_config(explicit: Option<&Path>, home: &Path) -> Result<FoldConfig> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV_VAR).filter(|raw| !raw.is_empty()).map(PathBuf::from));

    let path = match requested {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            path
        }
        None => {
            let path = default_config_path(home);
            if !path.is_file() {
                return Ok(FoldConfig::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("in {}", path.display()))
}

pub(crate) fn default_config_path(home: &Path) -> PathBuf {
    if cfg!(windows) {
        if let Some(appdata) = env::var_os("APPDATA").filter(|raw| !raw.is_empty()) {
            return PathBuf::from(appdata).join("wfold").join(CONFIG_FILE_NAME);
        }
    }
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home.join(".config"));
    config_home.join("wfold").join(CONFIG_FILE_NAME)
}
