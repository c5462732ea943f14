use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;
use wfold_core::{FoldError, Strictness};

use crate::{AssetSet, ExtensionLayout};

const BUNDLE_REF_PATTERN: &str = r#"src="\./assets/(index-[^"/]+\.js)""#;
const LOCALE_REF_PATTERN: &str = r"zh-CN-[A-Za-z0-9_-]+\.js";
const LOCALE_PREFIX: &str = "zh-CN-";

pub fn locate_assets(layout: &ExtensionLayout, strictness: Strictness) -> Result<AssetSet> {
    let host = layout.host_path();
    if !host.is_file() {
        return Err(
            FoldError::Locate(format!("host script not found: {}", host.display())).into(),
        );
    }

    let entry_html = layout.entry_html_path();
    if !entry_html.is_file() {
        return Err(FoldError::Locate(format!(
            "webview entry not found: {}",
            entry_html.display()
        ))
        .into());
    }
    let html = fs::read_to_string(&entry_html)
        .with_context(|| format!("failed to read webview entry: {}", entry_html.display()))?;
    let bundle_name = single_bundle_ref(&html, &entry_html)?;
    let bundle = layout.asset_path(&bundle_name);
    if !bundle.is_file() {
        return Err(FoldError::Locate(format!(
            "webview bundle referenced by {} is missing: {}",
            entry_html.display(),
            bundle.display()
        ))
        .into());
    }

    let bundle_text = fs::read_to_string(&bundle)
        .with_context(|| format!("failed to read webview bundle: {}", bundle.display()))?;
    let siblings = list_locale_siblings(&layout.assets_dir())?;
    let referenced = locale_refs(&bundle_text)?;
    let locale = choose_locale(&siblings, &referenced, strictness)?
        .map(|name| layout.asset_path(&name));

    debug!(
        bundle = %bundle.display(),
        locale = ?locale.as_ref().map(|path| path.display().to_string()),
        "located extension assets"
    );
    Ok(AssetSet {
        host,
        bundle,
        locale,
    })
}

/// Distinct `./assets/index-*.js` script references, in order of first appearance.
pub fn parse_bundle_refs(html: &str) -> Result<Vec<String>> {
    let pattern = Regex::new(BUNDLE_REF_PATTERN).context("invalid bundle reference pattern")?;
    let mut seen = BTreeSet::new();
    let mut refs = Vec::new();
    for captures in pattern.captures_iter(html) {
        let name = captures[1].to_string();
        if seen.insert(name.clone()) {
            refs.push(name);
        }
    }
    Ok(refs)
}

fn single_bundle_ref(html: &str, entry_html: &Path) -> Result<String> {
    let refs = parse_bundle_refs(html)?;
    match refs.as_slice() {
        [] => Err(FoldError::Locate(format!(
            "no ./assets/index-*.js script reference in {}",
            entry_html.display()
        ))
        .into()),
        [only] => Ok(only.clone()),
        many => Err(FoldError::Locate(format!(
            "ambiguous webview bundle: {} references {} index scripts ({})",
            entry_html.display(),
            many.len(),
            many.join(", ")
        ))
        .into()),
    }
}

pub fn locale_refs(bundle_text: &str) -> Result<BTreeSet<String>> {
    let pattern = Regex::new(LOCALE_REF_PATTERN).context("invalid locale reference pattern")?;
    Ok(pattern
        .find_iter(bundle_text)
        .map(|found| found.as_str().to_string())
        .collect())
}

fn list_locale_siblings(assets_dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    if !assets_dir.is_dir() {
        return Ok(names);
    }
    let entries = fs::read_dir(assets_dir)
        .with_context(|| format!("failed to read assets dir: {}", assets_dir.display()))?;
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to iterate assets dir: {}", assets_dir.display()))?;
        if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(LOCALE_PREFIX) && name.ends_with(".js") {
            names.insert(name);
        }
    }
    Ok(names)
}

/// Picks the locale chunk the bundle actually loads; `None` when the install ships no locale.
pub fn choose_locale(
    siblings: &BTreeSet<String>,
    referenced: &BTreeSet<String>,
    strictness: Strictness,
) -> Result<Option<String>> {
    if siblings.is_empty() {
        return Ok(None);
    }

    let matched: Vec<&String> = siblings.intersection(referenced).collect();
    let (pool, reason): (Vec<&String>, &str) = match matched.len() {
        0 => (siblings.iter().collect(), "none is referenced by the bundle"),
        1 => return Ok(Some(matched[0].clone())),
        _ => (matched, "the bundle references several"),
    };
    if pool.len() == 1 {
        return Ok(Some(pool[0].clone()));
    }
    if strictness.is_strict() {
        let listed = pool
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(FoldError::Locate(format!(
            "ambiguous locale file: {reason} of {listed}; rerun with --lenient to pick the first"
        ))
        .into());
    }
    // BTreeSet order makes the first entry the lexicographically smallest.
    Ok(pool.first().map(|name| (*name).clone()))
}
