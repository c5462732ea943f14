use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

const COLLAPSE_SETTING_LINE: &str =
    r#"(?m)^[ \t]*codex\.workflow\.collapseByDefault[ \t]*=[ \t]*"[^"\r\n]*"[ \t]*(?:\r?\n|$)"#;

pub fn codex_config_path(home: &Path) -> PathBuf {
    home.join(".codex").join("config.toml")
}

/// Text with the collapse setting removed, or `None` when the setting is absent.
pub fn strip_collapse_setting(text: &str) -> Result<Option<String>> {
    let setting = Regex::new(COLLAPSE_SETTING_LINE).context("invalid collapse setting pattern")?;
    if !setting.is_match(text) {
        return Ok(None);
    }
    let blank_runs = Regex::new(r"\n{3,}").context("invalid blank line pattern")?;
    let stripped = setting.replace_all(text, "");
    Ok(Some(blank_runs.replace_all(&stripped, "\n\n").into_owned()))
}

/// Returns whether the file was rewritten. A missing file is left alone.
pub fn remove_collapse_setting(config_path: &Path) -> Result<bool> {
    if !config_path.is_file() {
        return Ok(false);
    }
    let text = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let Some(cleaned) = strip_collapse_setting(&text)? else {
        return Ok(false);
    };
    fs::write(config_path, cleaned)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    Ok(true)
}
