//! Anchor-based rewriting of the extension's host, webview bundle and locale files.
//!
//! Every transform here is pure: it takes the current file text and returns either the text to
//! write or an error. Nothing in this crate touches the filesystem.

mod anchor;
mod bundle;
mod host;
mod locale;
mod marker;
mod shape;

use anyhow::Result;
use wfold_core::ArtifactRole;

pub use anchor::Anchor;
pub use bundle::{bundle_state, patch_bundle};
pub use host::{host_state, patch_host};
pub use locale::{locale_state, patch_locale};
pub use marker::{Lineage, PatchState, Rewrite, Transition};
pub use shape::{detect_shape, BundleShape};

/// Substrings that must be gone from a file once its backup has been restored.
pub fn residual_markers(role: ArtifactRole) -> &'static [&'static str] {
    match role {
        ArtifactRole::Host => &["CODEX_WORKFLOW_FOLD_HOST", "codex-workflow-collapse"],
        ArtifactRole::Bundle => &["CODEX_WORKFLOW_FOLD_PATCH", "__codexWorkflow"],
        ArtifactRole::Locale => &[locale::VERIFY_MARKER],
    }
}

/// Patches a file of the given role. Bundles also report the shape they were routed to.
pub fn patch_artifact(role: ArtifactRole, text: &str) -> Result<(Option<BundleShape>, Rewrite)> {
    match role {
        ArtifactRole::Host => Ok((None, patch_host(text)?)),
        ArtifactRole::Bundle => {
            let (shape, rewrite) = patch_bundle(text)?;
            Ok((Some(shape), rewrite))
        }
        ArtifactRole::Locale => Ok((None, patch_locale(text)?)),
    }
}

pub fn artifact_state(role: ArtifactRole, text: &str) -> PatchState {
    match role {
        ArtifactRole::Host => host_state(text),
        ArtifactRole::Bundle => bundle_state(text).1,
        ArtifactRole::Locale => locale_state(text),
    }
}
