use anyhow::Result;
use wfold_core::FoldError;

use crate::anchor::insert_at;

/// One family of patch markers: the block delimiters plus the version tags that may sit inside.
///
/// A patched block always reads `begin, current, body, end` joined by `separator`, so replacing
/// an older block in place yields exactly what a fresh apply would have produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lineage {
    pub context: &'static str,
    /// Substring shared by every marker this tool has ever written for the file kind.
    pub family: &'static str,
    pub begin: &'static str,
    pub end: &'static str,
    pub current: &'static str,
    pub upgradable: &'static [&'static str],
    /// Unbounded payloads written before blocks had delimiters, keyed by their version tag.
    pub legacy: &'static [(&'static str, &'static str)],
    pub separator: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchState {
    Unpatched,
    Current { marker: &'static str },
    Upgradable { from: &'static str },
    Incompatible { marker: String },
}

impl PatchState {
    pub fn describe(&self) -> String {
        match self {
            Self::Unpatched => "unpatched".to_string(),
            Self::Current { marker } => format!("patched {marker}"),
            Self::Upgradable { from } => format!("upgradeable from {from}"),
            Self::Incompatible { marker } => format!("incompatible {marker}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Unchanged,
    Upgraded { from: &'static str },
}

/// Result of a pure transform. `marker` is what verification must find after the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub transition: Transition,
    pub marker: &'static str,
}

impl Rewrite {
    pub fn unchanged(text: &str, marker: &'static str) -> Self {
        Self {
            text: text.to_string(),
            transition: Transition::Unchanged,
            marker,
        }
    }

    pub fn changed(&self) -> bool {
        self.transition != Transition::Unchanged
    }
}

impl Lineage {
    pub fn state(&self, text: &str) -> PatchState {
        if text.contains(self.current) {
            return PatchState::Current {
                marker: self.current,
            };
        }
        if let Some(from) = self
            .upgradable
            .iter()
            .copied()
            .find(|tag| text.contains(tag))
        {
            return PatchState::Upgradable { from };
        }
        match marker_token(text, self.family) {
            Some(marker) => PatchState::Incompatible { marker },
            None => PatchState::Unpatched,
        }
    }

    pub fn wrap(&self, body: &str) -> String {
        [self.begin, self.current, body, self.end].join(self.separator)
    }

    /// Splices a fresh block at `offset`, padded by the separator on both sides.
    pub fn insert(&self, text: &str, offset: usize, body: &str) -> String {
        let block = format!("{sep}{}{sep}", self.wrap(body), sep = self.separator);
        insert_at(text, offset, &block)
    }

    /// Swaps the block tagged `from` for the current one.
    pub fn upgrade(&self, text: &str, from: &'static str, body: &str) -> Result<String> {
        match self.legacy.iter().find(|(tag, _)| *tag == from) {
            Some((_, old)) => self.replace_legacy(text, from, old, body),
            None => self.replace_block(text, body),
        }
    }

    /// Legacy payloads have no end marker, so only their exact text can be replaced.
    fn replace_legacy(&self, text: &str, from: &str, old: &str, body: &str) -> Result<String> {
        let hits: Vec<usize> = text.match_indices(old).map(|(at, _)| at).collect();
        let &[start] = hits.as_slice() else {
            return Err(self
                .damaged(format!(
                    "expected the {from} payload exactly once, found it {} times",
                    hits.len()
                ))
                .into());
        };

        let mut out = String::with_capacity(text.len() + body.len());
        out.push_str(&text[..start]);
        out.push_str(&self.wrap(body));
        out.push_str(&text[start + old.len()..]);
        Ok(out)
    }

    /// Replaces the existing `begin..=end` span with a freshly wrapped body.
    pub fn replace_block(&self, text: &str, body: &str) -> Result<String> {
        let begins: Vec<usize> = text.match_indices(self.begin).map(|(at, _)| at).collect();
        let ends: Vec<usize> = text.match_indices(self.end).map(|(at, _)| at).collect();
        let (&[start], &[end_at]) = (begins.as_slice(), ends.as_slice()) else {
            return Err(self
                .damaged(format!(
                    "expected one begin and one end marker, found {} and {}",
                    begins.len(),
                    ends.len()
                ))
                .into());
        };
        if end_at < start {
            return Err(self.damaged("end marker precedes begin marker".to_string()).into());
        }
        let stop = end_at + self.end.len();

        let mut out = String::with_capacity(text.len() + body.len());
        out.push_str(&text[..start]);
        out.push_str(&self.wrap(body));
        out.push_str(&text[stop..]);
        Ok(out)
    }

    pub fn incompatible(&self, marker: String) -> FoldError {
        FoldError::IncompatiblePatch {
            context: self.context.to_string(),
            marker,
        }
    }

    fn damaged(&self, detail: String) -> FoldError {
        FoldError::DamagedPatchBlock {
            context: self.context.to_string(),
            detail,
        }
    }
}

/// First identifier-like run starting at a `family` occurrence, e.g. `CODEX_WORKFLOW_FOLD_PATCH_V9`.
pub(crate) fn marker_token(text: &str, family: &str) -> Option<String> {
    let start = text.find(family)?;
    let token = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    Some(token)
}
