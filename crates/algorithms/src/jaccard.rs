//! Jaccard dissimilarity between category footprints
//!
//! `dissimilarity = 1 - |A ∩ B| / |A ∪ B|` over the cells of two presence
//! masks. 0 means identical footprints, 1 means disjoint ones.

use serde::Serialize;

use crate::mask::CategoryMask;
use connimpact_core::{Error, Result};

/// Intersection and union cell counts of two masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaskOverlap {
    /// Cells where the mask sum is 2
    pub intersection: usize,
    /// Cells where the mask sum is at least 1
    pub union: usize,
}

impl MaskOverlap {
    /// Count overlap of two co-registered masks.
    pub fn between(base: &CategoryMask, alt: &CategoryMask) -> Result<Self> {
        base.raster().ensure_same_grid(alt.raster())?;

        let mut intersection = 0;
        let mut union = 0;
        for (&b, &a) in base.raster().data().iter().zip(alt.raster().data().iter()) {
            match b + a {
                2 => {
                    intersection += 1;
                    union += 1;
                }
                1 => union += 1,
                _ => {}
            }
        }

        Ok(Self { intersection, union })
    }

    /// Jaccard dissimilarity, or `None` when the union is empty
    pub fn dissimilarity(&self) -> Option<f64> {
        if self.union == 0 {
            return None;
        }
        Some(1.0 - self.intersection as f64 / self.union as f64)
    }
}

/// Jaccard dissimilarity of two category masks.
///
/// # Errors
/// - [`Error::ShapeMismatch`] when the masks are not co-registered.
/// - [`Error::EmptyUnion`] when the category is absent from both masks, where
///   the ratio is undefined. The error carries the class id of `base`.
pub fn jaccard_dissimilarity(base: &CategoryMask, alt: &CategoryMask) -> Result<f64> {
    MaskOverlap::between(base, alt)?
        .dissimilarity()
        .ok_or(Error::EmptyUnion {
            class_id: base.class_id(),
        })
}
