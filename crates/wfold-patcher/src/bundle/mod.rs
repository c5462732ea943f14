use anyhow::Result;
use tracing::debug;

use crate::marker::{Lineage, PatchState, Rewrite};
use crate::shape::{detect_shape, BundleShape};

pub(crate) mod generic;
pub(crate) mod worked_for;

type Transform = fn(&str) -> Result<Rewrite>;

fn transform_for(shape: BundleShape) -> Transform {
    match shape {
        BundleShape::WorkedForV73 => worked_for::apply_v73,
        BundleShape::WorkedForV71 => worked_for::apply_v71,
        BundleShape::Generic => generic::apply,
    }
}

fn lineage_for(shape: BundleShape) -> &'static Lineage {
    match shape {
        BundleShape::WorkedForV73 => &worked_for::LINEAGE_V73,
        BundleShape::WorkedForV71 => &worked_for::LINEAGE_V71,
        BundleShape::Generic => &generic::LINEAGE,
    }
}

/// Detects the bundle's shape and runs that shape's transform.
pub fn patch_bundle(text: &str) -> Result<(BundleShape, Rewrite)> {
    let shape = detect_shape(text);
    debug!(%shape, "detected bundle shape");
    let rewrite = transform_for(shape)(text)?;
    Ok((shape, rewrite))
}

pub fn bundle_state(text: &str) -> (BundleShape, PatchState) {
    let shape = detect_shape(text);
    (shape, lineage_for(shape).state(text))
}
