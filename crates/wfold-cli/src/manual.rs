use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use tracing::debug;

use crate::render::OutputStyle;

pub(crate) const DEFAULT_MANUAL_URL: &str =
    "https://raw.githubusercontent.com/MaxMiksa/Codex-Folding/main/docs/AI_OPERATOR_MANUAL.md";
pub(crate) const MANUAL_FILE_NAME: &str = "Codex-Folding-AI-Operator-Manual.md";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const DOWNLOAD_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("wfold/", env!("CARGO_PKG_VERSION"));

/// Fetches the operator manual and saves it into the first directory that accepts it.
pub(crate) fn download_manual(url: &str, dirs: &[PathBuf], style: OutputStyle) -> Result<PathBuf> {
    let spinner = start_spinner(style, "downloading operator manual");
    let fetched = fetch_manual(url);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    save_manual(&fetched?, dirs)
}

fn fetch_manual(url: &str) -> Result<String> {
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to request {url}"))?
        .error_for_status()
        .with_context(|| format!("unexpected response from {url}"))?;
    response
        .text()
        .with_context(|| format!("failed to read response body from {url}"))
}

pub(crate) fn save_manual(content: &str, dirs: &[PathBuf]) -> Result<PathBuf> {
    for dir in dirs {
        match write_into(dir, content) {
            Ok(path) => return Ok(path),
            Err(err) => debug!(dir = %dir.display(), "manual not saved here: {err:#}"),
        }
    }
    Err(anyhow!("no writable directory for the operator manual"))
}

fn write_into(dir: &Path, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(MANUAL_FILE_NAME);
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn start_spinner(style: OutputStyle, message: &str) -> Option<ProgressBar> {
    if style != OutputStyle::Rich {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    Some(spinner)
}
