//! # ConnImpact Algorithms
//!
//! Comparison of a baseline and an alternative connectivity scenario.
//!
//! ## Modules
//!
//! - **difference**: pixel-wise `alternative - baseline` with both-no-data masking
//! - **mask**: per-category presence masks and per-category difference grids
//! - **jaccard**: Jaccard dissimilarity of category footprints
//! - **transition**: full category-by-category transition matrix
//! - **cover**: row-aligned delta of existing area / cover summaries
//! - **categories**: category presence and unknown-category policy
//! - **report**: assembly of all products into one report

pub mod categories;
pub mod cover;
pub mod difference;
pub mod jaccard;
pub mod mask;
mod maybe_rayon;
pub mod report;
pub mod transition;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::categories::UnknownCategoryPolicy;
    pub use crate::cover::{cover_delta, CoverDeltaRow, CoverSummaryRow};
    pub use crate::difference::grid_difference;
    pub use crate::jaccard::{jaccard_dissimilarity, MaskOverlap};
    pub use crate::mask::{category_difference, category_mask, CategoryMask};
    pub use crate::report::{
        assemble_report, ComparisonInputs, ComparisonOptions, DifferenceReport, Product,
        ScenarioProducts,
    };
    pub use crate::transition::{
        transition_matrix, PercentCoverBasis, TransitionMatrix, TransitionParams, TransitionRecord,
    };
    pub use connimpact_core::prelude::*;
}
