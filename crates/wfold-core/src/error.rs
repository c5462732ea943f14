use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure categories of a patch run.
///
/// Each variant maps to a different operator action: resolution and locate errors call for an
/// explicit `--ext-dir`, anchor errors mean the upstream build drifted, incompatible patches need
/// a restore from backup, and verification errors point at the write path itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoldError {
    #[error("{0}")]
    Resolution(String),

    #[error("{0}")]
    Locate(String),

    #[error("{context}: {label} anchor not found (expected `{excerpt}`)")]
    AnchorNotFound {
        context: String,
        label: String,
        excerpt: String,
    },

    #[error("{context}: {label} anchor matched {count} times; refusing to guess the splice point")]
    AmbiguousAnchor {
        context: String,
        label: String,
        count: usize,
    },

    #[error(
        "{context}: previous patch detected ({marker}) that cannot be upgraded in place; restore from .bak and re-run install"
    )]
    IncompatiblePatch { context: String, marker: String },

    #[error("{context}: existing patch block is damaged ({detail}); restore from .bak and re-run install")]
    DamagedPatchBlock { context: String, detail: String },

    #[error("verification failed for {}: {detail}", path.display())]
    Verification { path: PathBuf, detail: String },
}

impl FoldError {
    pub fn anchor_not_found(context: &str, label: &str, anchor: &str) -> Self {
        Self::AnchorNotFound {
            context: context.to_string(),
            label: label.to_string(),
            excerpt: excerpt(anchor, 72),
        }
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut = text.chars().take(max_chars).collect::<String>();
    cut.push_str("...");
    cut
}
