//! Legacy and unrecognised bundles: the payload rebinds the exported conversation helpers by
//! name, so it only needs a splice point in front of the module's export list.

use anyhow::Result;
use wfold_core::FoldError;

use crate::marker::{Lineage, PatchState, Rewrite, Transition};

const GENERIC_PAYLOAD: &str = include_str!("../../payload/generic.js");

/// The untagged first-generation block is not in the upgrade list and reads as incompatible.
pub(crate) const LINEAGE: Lineage = Lineage {
    context: "bundle",
    family: "CODEX_WORKFLOW_FOLD_PATCH",
    begin: "/* CODEX_WORKFLOW_FOLD_PATCH */",
    end: "/* END CODEX_WORKFLOW_FOLD_PATCH */",
    current: "/* CODEX_WORKFLOW_FOLD_PATCH_V14 */",
    upgradable: &[
        "/* CODEX_WORKFLOW_FOLD_PATCH_V13 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V12 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V11 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V10 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V9 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V8 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V7 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V6 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V5 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V4 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V3 */",
        "/* CODEX_WORKFLOW_FOLD_PATCH_V2 */",
    ],
    legacy: &[],
    separator: "\n",
};

pub(crate) fn apply(text: &str) -> Result<Rewrite> {
    let body = GENERIC_PAYLOAD.trim();
    match LINEAGE.state(text) {
        PatchState::Current { marker } => Ok(Rewrite::unchanged(text, marker)),
        PatchState::Upgradable { from } => Ok(Rewrite {
            text: LINEAGE.upgrade(text, from, body)?,
            transition: Transition::Upgraded { from },
            marker: LINEAGE.current,
        }),
        PatchState::Incompatible { marker } => Err(LINEAGE.incompatible(marker).into()),
        PatchState::Unpatched => {
            let offset = text.rfind("export{").ok_or_else(|| {
                FoldError::anchor_not_found(LINEAGE.context, "module export", "export{")
            })?;
            Ok(Rewrite {
                text: LINEAGE.insert(text, offset, body),
                transition: Transition::Applied,
                marker: LINEAGE.current,
            })
        }
    }
}
