use anyhow::Result;
use wfold_core::FoldError;

use crate::anchor::insert_at;
use crate::marker::{PatchState, Rewrite, Transition};

const CONTEXT: &str = "locale";
const EXPORT_TAIL: &str = "};export{e as default};";

/// Written last, so its presence means the whole set landed.
const SENTINEL_KEY: &str = "codex.workflow.headerSuffix";
pub(crate) const VERIFY_MARKER: &str = "codex.workflow.label";

const ADDITIONS: &str = concat!(
    r#","codex.workflow.label":"工作流""#,
    r#","codex.workflow.status.working":"进行中""#,
    r#","codex.workflow.status.done":"完成""#,
    r#","codex.workflow.headerSuffix":"（{status}，{elapsed}）""#,
);

pub fn patch_locale(text: &str) -> Result<Rewrite> {
    match locale_state(text) {
        PatchState::Unpatched => {}
        PatchState::Incompatible { marker } => {
            return Err(FoldError::IncompatiblePatch {
                context: CONTEXT.to_string(),
                marker,
            }
            .into())
        }
        _ => return Ok(Rewrite::unchanged(text, VERIFY_MARKER)),
    }
    let offset = text
        .rfind(EXPORT_TAIL)
        .ok_or_else(|| FoldError::anchor_not_found(CONTEXT, "locale export tail", EXPORT_TAIL))?;
    Ok(Rewrite {
        text: insert_at(text, offset, ADDITIONS),
        transition: Transition::Applied,
        marker: VERIFY_MARKER,
    })
}

pub fn locale_state(text: &str) -> PatchState {
    if text.contains(SENTINEL_KEY) {
        PatchState::Current {
            marker: SENTINEL_KEY,
        }
    } else if text.contains(VERIFY_MARKER) {
        PatchState::Incompatible {
            marker: VERIFY_MARKER.to_string(),
        }
    } else {
        PatchState::Unpatched
    }
}
