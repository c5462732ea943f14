use anyhow::Result;
use wfold_core::FoldError;

/// A literal substring that must occur exactly once in the text it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub label: &'static str,
    pub text: &'static str,
}

impl Anchor {
    pub const fn new(label: &'static str, text: &'static str) -> Self {
        Self { label, text }
    }

    pub fn occurrences(&self, haystack: &str) -> usize {
        haystack.matches(self.text).count()
    }

    /// Byte offset of the single occurrence.
    pub fn locate(&self, haystack: &str, context: &str) -> Result<usize> {
        let mut hits = haystack.match_indices(self.text).map(|(at, _)| at);
        let Some(first) = hits.next() else {
            return Err(FoldError::anchor_not_found(context, self.label, self.text).into());
        };
        let extra = hits.count();
        if extra > 0 {
            return Err(FoldError::AmbiguousAnchor {
                context: context.to_string(),
                label: self.label.to_string(),
                count: extra + 1,
            }
            .into());
        }
        Ok(first)
    }

    pub fn replace(&self, haystack: &str, replacement: &str, context: &str) -> Result<String> {
        let start = self.locate(haystack, context)?;
        let mut out = String::with_capacity(haystack.len() + replacement.len());
        out.push_str(&haystack[..start]);
        out.push_str(replacement);
        out.push_str(&haystack[start + self.text.len()..]);
        Ok(out)
    }
}

pub(crate) fn insert_at(text: &str, offset: usize, block: &str) -> String {
    let mut out = String::with_capacity(text.len() + block.len());
    out.push_str(&text[..offset]);
    out.push_str(block);
    out.push_str(&text[offset..]);
    out
}
