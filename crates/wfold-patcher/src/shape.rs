use std::fmt;

use crate::bundle::worked_for::{LINEAGE_V71, LINEAGE_V73, V71, V73};

/// Symbol exported by the legacy, non-minified-API bundles the generic payload rebinds.
const LEGACY_MAPPER_SYMBOL: &str = "function mapStateToLocalConversationItems";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleShape {
    WorkedForV73,
    WorkedForV71,
    Generic,
}

impl BundleShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorkedForV73 => "worked-for-v73",
            Self::WorkedForV71 => "worked-for-v71",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for BundleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ShapeProbe = (BundleShape, fn(&str) -> bool);

/// Checked in order; the first probe that matches decides the shape.
const PROBES: [ShapeProbe; 2] = [
    (BundleShape::WorkedForV73, is_worked_for_v73),
    (BundleShape::WorkedForV71, is_worked_for_v71),
];

pub fn detect_shape(text: &str) -> BundleShape {
    PROBES
        .iter()
        .find(|(_, probe)| probe(text))
        .map(|(shape, _)| *shape)
        .unwrap_or(BundleShape::Generic)
}

fn is_worked_for_v73(text: &str) -> bool {
    text.contains(LINEAGE_V73.current) || V73.fingerprint(text)
}

fn is_worked_for_v71(text: &str) -> bool {
    text.contains(LINEAGE_V71.current)
        || (V71.fingerprint(text) && !text.contains(LEGACY_MAPPER_SYMBOL))
}
