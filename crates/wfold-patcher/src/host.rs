use anyhow::Result;
use tracing::debug;
use wfold_core::FoldError;

use crate::anchor::Anchor;
use crate::marker::{Lineage, PatchState, Rewrite, Transition};

const HOST_PAYLOAD: &str = include_str!("../payload/host.js");

pub(crate) const LINEAGE: Lineage = Lineage {
    context: "host",
    family: "CODEX_WORKFLOW_FOLD_HOST",
    begin: "/* CODEX_WORKFLOW_FOLD_HOST */",
    end: "/* END CODEX_WORKFLOW_FOLD_HOST */",
    current: "/* CODEX_WORKFLOW_FOLD_HOST_V7 */",
    upgradable: &[V6_TAG],
    legacy: &[(V6_TAG, V6_PAYLOAD)],
    separator: "",
};

const V6_TAG: &str = "/* CODEX_WORKFLOW_FOLD_HOST_V6 */";

/// The V6 payload as it was spliced in, without block delimiters.
pub(crate) const V6_PAYLOAD: &str = r#"/* CODEX_WORKFLOW_FOLD_HOST_V6 */let wf="collapse";try{let vs=require("vscode"),v=vs?.workspace?.getConfiguration?.()?.get?.("codex.workflow.collapseByDefault");(v==="collapse"||v==="expand"||v==="disable")&&(wf=v)}catch{}try{if(typeof l==="string"&&!l.includes("codex-workflow-collapse")){let meta="<meta name=\"codex-workflow-collapse\" content=\""+wf+"\">\n",l2=l.replace("</head>",meta+"</head>");l2===l&&(l2=l.replace("<head>","<head>"+meta),l2===l&&(l2=l.replace(/<head[^>]*>/,m=>m+meta))),l=l2}}catch{}"#;

/// End of the production HTML builder, directly followed by the development variant.
const RETURN_BEFORE_DEV: Anchor = Anchor::new(
    "production html return",
    "}return l}getWebviewContentDevelopment",
);
const PRODUCTION_FN: Anchor = Anchor::new(
    "production html builder",
    "async getWebviewContentProduction(e){",
);
const RETURN_HTML: &str = "return l}";

pub fn patch_host(text: &str) -> Result<Rewrite> {
    let body = HOST_PAYLOAD.trim();
    match LINEAGE.state(text) {
        PatchState::Current { marker } => Ok(Rewrite::unchanged(text, marker)),
        PatchState::Upgradable { from } => Ok(Rewrite {
            text: LINEAGE.upgrade(text, from, body)?,
            transition: Transition::Upgraded { from },
            marker: LINEAGE.current,
        }),
        PatchState::Incompatible { marker } => Err(LINEAGE.incompatible(marker).into()),
        PatchState::Unpatched => {
            let offset = splice_offset(text)?;
            debug!(offset, "splicing host payload");
            Ok(Rewrite {
                text: LINEAGE.insert(text, offset, body),
                transition: Transition::Applied,
                marker: LINEAGE.current,
            })
        }
    }
}

pub fn host_state(text: &str) -> PatchState {
    LINEAGE.state(text)
}

/// Offset of the `return l}` that hands the production HTML back.
fn splice_offset(text: &str) -> Result<usize> {
    if RETURN_BEFORE_DEV.occurrences(text) > 0 {
        return Ok(RETURN_BEFORE_DEV.locate(text, LINEAGE.context)? + 1);
    }
    let fn_start = PRODUCTION_FN.locate(text, LINEAGE.context)?;
    let body_start = fn_start + PRODUCTION_FN.text.len();
    text[body_start..]
        .find(RETURN_HTML)
        .map(|at| body_start + at)
        .ok_or_else(|| {
            FoldError::anchor_not_found(LINEAGE.context, "production html return", RETURN_HTML)
                .into()
        })
}
