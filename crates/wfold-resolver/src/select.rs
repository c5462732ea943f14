use anyhow::Result;
use tracing::debug;
use wfold_core::{FoldError, Strictness};

use crate::Candidate;

pub fn select_target(candidates: &[Candidate], strictness: Strictness) -> Result<Candidate> {
    if candidates.is_empty() {
        return Err(FoldError::Resolution(
            "no openai.chatgpt extension candidates found".to_string(),
        )
        .into());
    }

    let Some(max_version) = candidates
        .iter()
        .filter_map(|candidate| candidate.version.as_ref())
        .max()
    else {
        if strictness.is_strict() {
            return Err(FoldError::Resolution(format_resolution_failure(
                "cannot resolve extension target: no candidate carries a parsable MAJOR.MINOR.PATCH version",
                candidates.iter(),
            ))
            .into());
        }
        let picked = newest_by_mtime(candidates.iter())?;
        debug!(dir = %picked.dir.display(), "no parsable versions; picked newest install by mtime");
        return Ok(picked.clone());
    };

    let highest = candidates
        .iter()
        .filter(|candidate| candidate.version.as_ref() == Some(max_version))
        .collect::<Vec<_>>();

    if let [only] = highest.as_slice() {
        debug!(dir = %only.dir.display(), version = %max_version, "selected unique highest version");
        return Ok((*only).clone());
    }

    if strictness.is_strict() {
        return Err(FoldError::Resolution(format_resolution_failure(
            &format!(
                "ambiguous extension target: {} candidates share the highest version {max_version}",
                highest.len()
            ),
            highest.iter().copied(),
        ))
        .into());
    }

    let picked = newest_by_mtime(highest.iter().copied())?;
    debug!(
        dir = %picked.dir.display(),
        version = %max_version,
        "broke highest-version tie by mtime"
    );
    Ok(picked.clone())
}

/// Newest modification time wins; equal times fall back to the smallest path.
fn newest_by_mtime<'a>(candidates: impl Iterator<Item = &'a Candidate>) -> Result<&'a Candidate> {
    candidates
        .max_by(|left, right| {
            left.mtime
                .cmp(&right.mtime)
                .then_with(|| right.dir.cmp(&left.dir))
        })
        .ok_or_else(|| {
            FoldError::Resolution("no openai.chatgpt extension candidates found".to_string())
                .into()
        })
}

fn format_resolution_failure<'a>(
    headline: &str,
    candidates: impl Iterator<Item = &'a Candidate>,
) -> String {
    let mut lines = vec![headline.to_string(), "candidates:".to_string()];
    lines.extend(candidates.map(|candidate| format!("- {candidate}")));
    lines.push("rerun with --ext-dir <path> to pick one explicitly".to_string());
    lines.join("\n")
}
