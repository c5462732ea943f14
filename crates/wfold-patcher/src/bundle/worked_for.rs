//! Worked-for bundles: builds that render a "worked for <time>" row per agent turn.
//!
//! Both known builds share the same splice recipe and differ only in minified identifiers and
//! memo-cache slots, so each is described by a [`WorkedForProfile`].

use anyhow::Result;
use tracing::debug;
use wfold_core::FoldError;

use crate::anchor::Anchor;
use crate::marker::{Lineage, PatchState, Rewrite, Transition};

const WORKED_FOR_PAYLOAD: &str = include_str!("../../payload/worked_for.js");

pub(crate) const EXPORT_BOUNDARY: &str = "}));export{";
pub(crate) const EXPORT: &str = "export{";

pub(crate) const LINEAGE_V71: Lineage = Lineage {
    context: "bundle (worked-for v71)",
    family: "CODEX_WORKFLOW_FOLD_PATCH",
    begin: "/* CODEX_WORKFLOW_FOLD_PATCH_V71 */",
    end: "/* END CODEX_WORKFLOW_FOLD_PATCH_V71 */",
    current: "/* CODEX_WORKFLOW_FOLD_PATCH_V71_W1 */",
    upgradable: &[],
    legacy: &[],
    separator: "\n",
};

pub(crate) const LINEAGE_V73: Lineage = Lineage {
    context: "bundle (worked-for v73)",
    current: "/* CODEX_WORKFLOW_FOLD_PATCH_V73_W1 */",
    ..LINEAGE_V71
};

pub(crate) struct WorkedForProfile {
    pub lineage: Lineage,
    /// Turn-to-items mapper; rerouted through the fold so collapsed turns drop their steps.
    pub mapper: Anchor,
    pub mapper_patched: &'static str,
    /// Memoised `worked-for` row component; left intact and handed to the payload as a prop.
    pub row: Anchor,
    pub worked_case: Anchor,
    pub worked_case_patched: &'static str,
    /// Turn view memo; gains a cache slot keyed on the store version.
    pub memo: Anchor,
    pub memo_patched: &'static str,
}

impl WorkedForProfile {
    fn anchors(&self) -> [Anchor; 4] {
        [self.mapper, self.row, self.worked_case, self.memo]
    }

    /// True when every splice anchor is present at least once.
    pub fn fingerprint(&self, text: &str) -> bool {
        self.anchors()
            .iter()
            .all(|anchor| text.contains(anchor.text))
    }
}

pub(crate) const V71: WorkedForProfile = WorkedForProfile {
    lineage: LINEAGE_V71,
    mapper: Anchor::new(
        "turn item mapper",
        "const s=JJe(t.status);return{items:aet({items:n,status:s,turnStartedAtMs:t.turnStartedAtMs??null,finalAssistantStartedAtMs:t.finalAssistantStartedAtMs??null}),status:s,cwd:t.params?.cwd?t.params.cwd:null,collaborationMode:t.params?.collaborationMode??null}}function aet(",
    ),
    mapper_patched: "const s=JJe(t.status),__cwfMode=__codexWorkflowCollapseModeV71(),__cwfItems=aet({items:n,status:s,turnStartedAtMs:t.turnStartedAtMs??null,finalAssistantStartedAtMs:t.finalAssistantStartedAtMs??null}),__cwfOut=__codexWorkflowApplyV71({items:__cwfItems,mode:__cwfMode,turn:t,status:s,store:__codexWorkflowStoreV71});return{items:__cwfOut,status:s,cwd:t.params?.cwd?t.params.cwd:null,collaborationMode:t.params?.collaborationMode??null}}function aet(",
    row: Anchor::new("worked-for row component", "function k2n(t){"),
    worked_case: Anchor::new(
        "worked-for render case",
        "case\"worked-for\":{let f;return e[38]!==n.timeLabel?(f=p.jsx(k2n,{timeLabel:n.timeLabel}),e[38]=n.timeLabel,e[39]=f):f=e[39],f}",
    ),
    worked_case_patched: "case\"worked-for\":return p.jsx(__codexWorkflowWorkedForRowV71,{item:n,store:__codexWorkflowStoreV71,row:k2n});",
    memo: Anchor::new(
        "turn view memo",
        "const n=ae.c(8),{conversationId:r,turn:i,requests:s,conversationDetailLevel:o,cwd:a}=e;let l;n[0]!==i||n[1]!==s?(l=qK(i,s),n[0]=i,n[1]=s,n[2]=l):l=n[2];",
    ),
    memo_patched: "const n=ae.c(9),{conversationId:r,turn:i,requests:s,conversationDetailLevel:o,cwd:a}=e,__cwfViewVersion=__codexWorkflowUseStoreVersionV71(__codexWorkflowStoreV71);let l;n[0]!==i||n[1]!==s||n[8]!==__cwfViewVersion?(l=qK(i,s),n[0]=i,n[1]=s,n[8]=__cwfViewVersion,n[2]=l):l=n[2];",
};

pub(crate) const V73: WorkedForProfile = WorkedForProfile {
    lineage: LINEAGE_V73,
    mapper: Anchor::new(
        "turn item mapper",
        "const s=jtt(t.status);return{items:Vtt({items:n,status:s,turnStartedAtMs:t.turnStartedAtMs??null,finalAssistantStartedAtMs:t.finalAssistantStartedAtMs??null}),status:s,cwd:t.params?.cwd?t.params.cwd:null,collaborationMode:t.params?.collaborationMode??null}}function Vtt(",
    ),
    mapper_patched: "const s=jtt(t.status),__cwfMode=__codexWorkflowCollapseModeV71(),__cwfItems=Vtt({items:n,status:s,turnStartedAtMs:t.turnStartedAtMs??null,finalAssistantStartedAtMs:t.finalAssistantStartedAtMs??null}),__cwfOut=__codexWorkflowApplyV71({items:__cwfItems,mode:__cwfMode,turn:t,status:s,store:__codexWorkflowStoreV71});return{items:__cwfOut,status:s,cwd:t.params?.cwd?t.params.cwd:null,collaborationMode:t.params?.collaborationMode??null}}function Vtt(",
    row: Anchor::new("worked-for row component", "function T3n(t){"),
    worked_case: Anchor::new(
        "worked-for render case",
        "case\"worked-for\":{let f;return e[39]!==n.timeLabel?(f=p.jsx(T3n,{timeLabel:n.timeLabel}),e[39]=n.timeLabel,e[40]=f):f=e[40],f}",
    ),
    worked_case_patched: "case\"worked-for\":return p.jsx(__codexWorkflowWorkedForRowV71,{item:n,store:__codexWorkflowStoreV71,row:T3n});",
    memo: Anchor::new(
        "turn view memo",
        "const n=oe.c(8),{conversationId:r,turn:i,requests:s,conversationDetailLevel:o,cwd:a}=e;let l;n[0]!==i||n[1]!==s?(l=oR(i,s),n[0]=i,n[1]=s,n[2]=l):l=n[2];",
    ),
    memo_patched: "const n=oe.c(9),{conversationId:r,turn:i,requests:s,conversationDetailLevel:o,cwd:a}=e,__cwfViewVersion=__codexWorkflowUseStoreVersionV71(__codexWorkflowStoreV71);let l;n[0]!==i||n[1]!==s||n[8]!==__cwfViewVersion?(l=oR(i,s),n[0]=i,n[1]=s,n[8]=__cwfViewVersion,n[2]=l):l=n[2];",
};

pub(crate) fn apply_v71(text: &str) -> Result<Rewrite> {
    apply(&V71, text)
}

pub(crate) fn apply_v73(text: &str) -> Result<Rewrite> {
    apply(&V73, text)
}

fn apply(profile: &WorkedForProfile, text: &str) -> Result<Rewrite> {
    let lineage = &profile.lineage;
    match lineage.state(text) {
        PatchState::Current { marker } => return Ok(Rewrite::unchanged(text, marker)),
        PatchState::Incompatible { marker } => return Err(lineage.incompatible(marker).into()),
        // Worked-for lineages have no predecessors yet.
        PatchState::Upgradable { from } => return Err(lineage.incompatible(from.to_string()).into()),
        PatchState::Unpatched => {}
    }

    let context = lineage.context;
    for anchor in profile.anchors() {
        anchor.locate(text, context)?;
    }

    let patched = profile
        .mapper
        .replace(text, profile.mapper_patched, context)?;
    let patched = profile
        .worked_case
        .replace(&patched, profile.worked_case_patched, context)?;
    let patched = profile
        .memo
        .replace(&patched, profile.memo_patched, context)?;

    let offset = splice_offset(&patched, context)?;
    debug!(context, offset, "splicing worked-for payload");
    Ok(Rewrite {
        text: lineage.insert(&patched, offset, WORKED_FOR_PAYLOAD.trim()),
        transition: Transition::Applied,
        marker: lineage.current,
    })
}

/// After the last `}));` that directly precedes `export{`, else right before the last `export{`.
fn splice_offset(text: &str, context: &str) -> Result<usize> {
    if let Some(at) = text.rfind(EXPORT_BOUNDARY) {
        return Ok(at + "}));".len());
    }
    text.rfind(EXPORT)
        .ok_or_else(|| FoldError::anchor_not_found(context, "module export", EXPORT).into())
}
