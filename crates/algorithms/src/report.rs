//! Difference report assembly
//!
//! Runs every comparison product over a baseline / alternative pair and
//! collects the results. Products are independent: when the inputs of one
//! are missing it is recorded as skipped and the others still run.
//! Configuration problems, co-registration failures and (under
//! [`UnknownCategoryPolicy::Fail`]) unknown categories abort the whole run.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::categories::{check_categories, present_classes, UnknownCategoryPolicy};
use crate::cover::{cover_delta, CoverDeltaRow, CoverSummaryRow};
use crate::difference::grid_difference;
use crate::jaccard::MaskOverlap;
use crate::mask::{category_difference, category_mask};
use crate::transition::{
    transition_matrix, NamedTransition, PercentCoverBasis, TransitionMatrix, TransitionParams,
};
use connimpact_core::{AreaUnit, CategoryTable, Error, Raster, Result, DEFAULT_NODATA};

/// Output products of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Difference of the normalized current rasters
    ContinuousDifference,
    /// Overall and per-category differences of the category rasters, with Jaccard scores
    CategoricalDifference,
    /// Full category transition matrix
    Transitions,
    /// Row-aligned delta of existing cover summaries
    CoverDelta,
}

impl Product {
    pub fn label(self) -> &'static str {
        match self {
            Product::ContinuousDifference => "continuous difference",
            Product::CategoricalDifference => "categorical difference",
            Product::Transitions => "transition matrix",
            Product::CoverDelta => "cover delta",
        }
    }
}

/// Products available from one scenario run
#[derive(Debug, Clone, Default)]
pub struct ScenarioProducts {
    /// Normalized cumulative current
    pub normalized_current: Option<Raster<f64>>,
    /// Connectivity categories
    pub categories: Option<Raster<i32>>,
    /// Existing per-category area / cover summary
    pub cover_summary: Option<Vec<CoverSummaryRow>>,
}

/// Tunables of a comparison
#[derive(Debug, Clone, Copy)]
pub struct ComparisonOptions {
    /// No-data sentinel of inputs and outputs
    pub nodata: f64,
    pub area_unit: AreaUnit,
    pub percent_cover: PercentCoverBasis,
    pub unknown_categories: UnknownCategoryPolicy,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            nodata: DEFAULT_NODATA,
            area_unit: AreaUnit::default(),
            percent_cover: PercentCoverBasis::default(),
            unknown_categories: UnknownCategoryPolicy::default(),
        }
    }
}

/// Everything a comparison needs, assembled by the caller.
#[derive(Debug, Clone)]
pub struct ComparisonInputs {
    pub categories: CategoryTable,
    pub baseline: ScenarioProducts,
    pub alternative: ScenarioProducts,
    pub options: ComparisonOptions,
}

/// Difference grid of one category
#[derive(Debug, Clone)]
pub struct CategoryDifference {
    pub key: i32,
    pub class_id: i32,
    pub raster: Raster<f64>,
}

impl CategoryDifference {
    /// Deterministic output name, derived from the category key
    pub fn file_stem(&self) -> String {
        format!("category_difference_{}", self.key)
    }
}

/// Jaccard dissimilarity of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DissimilarityRecord {
    pub category_key: i32,
    pub jaccard_dissimilarity: f64,
    /// The category was absent from both scenarios; the score was set to 1.0
    pub empty_union: bool,
}

/// Categorical comparison results
#[derive(Debug, Clone)]
pub struct CategoricalImpact {
    pub overall: Raster<f64>,
    pub per_category: Vec<CategoryDifference>,
    pub dissimilarity: Vec<DissimilarityRecord>,
}

/// Transition matrix with its named rendering
#[derive(Debug, Clone)]
pub struct TransitionSummary {
    pub matrix: TransitionMatrix,
    pub rows: Vec<NamedTransition>,
}

/// A product that could not be computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedProduct {
    pub product: Product,
    pub reason: String,
}

/// Class ids of one scenario's category raster that the table does not know
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownClasses {
    pub scenario: &'static str,
    pub class_ids: Vec<i32>,
}

/// Everything a comparison produced
#[derive(Debug, Clone, Default)]
pub struct DifferenceReport {
    pub continuous: Option<Raster<f64>>,
    pub categorical: Option<CategoricalImpact>,
    pub transitions: Option<TransitionSummary>,
    pub cover_delta: Option<Vec<CoverDeltaRow>>,
    pub skipped: Vec<SkippedProduct>,
    /// Unconfigured classes tolerated under [`UnknownCategoryPolicy::Skip`]
    pub unknown_classes: Vec<UnknownClasses>,
}

impl DifferenceReport {
    pub fn is_skipped(&self, product: Product) -> bool {
        self.skipped.iter().any(|s| s.product == product)
    }
}

/// Run every comparison product over `inputs`.
pub fn assemble_report(inputs: &ComparisonInputs) -> Result<DifferenceReport> {
    let mut report = DifferenceReport::default();

    report.continuous = degrade(
        Product::ContinuousDifference,
        continuous_difference(inputs),
        &mut report.skipped,
    )?;
    report.unknown_classes = validate_categories(inputs)?;
    report.categorical = degrade(
        Product::CategoricalDifference,
        categorical_impact(inputs),
        &mut report.skipped,
    )?;
    report.transitions = degrade(
        Product::Transitions,
        transitions(inputs),
        &mut report.skipped,
    )?;
    report.cover_delta = degrade(
        Product::CoverDelta,
        summary_delta(inputs),
        &mut report.skipped,
    )?;

    info!(skipped = report.skipped.len(), "comparison finished");
    Ok(report)
}

/// Turn a recoverable failure into a skipped product; propagate anything else.
fn degrade<T>(
    product: Product,
    outcome: Result<T>,
    skipped: &mut Vec<SkippedProduct>,
) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_recoverable() => {
            warn!(product = product.label(), "skipped: {}", e);
            skipped.push(SkippedProduct {
                product,
                reason: e.to_string(),
            });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Both sides of an input pair, or [`Error::InputMissing`] naming the absent side(s).
fn require_pair<'a, T>(
    product: Product,
    what: &str,
    baseline: Option<&'a T>,
    alternative: Option<&'a T>,
) -> Result<(&'a T, &'a T)> {
    match (baseline, alternative) {
        (Some(b), Some(a)) => Ok((b, a)),
        (None, None) => Err(Error::InputMissing {
            product: product.label(),
            reason: format!("{} is missing from both scenarios", what),
        }),
        (None, Some(_)) => Err(Error::InputMissing {
            product: product.label(),
            reason: format!("{} is missing from the baseline scenario", what),
        }),
        (Some(_), None) => Err(Error::InputMissing {
            product: product.label(),
            reason: format!("{} is missing from the alternative scenario", what),
        }),
    }
}

fn continuous_difference(inputs: &ComparisonInputs) -> Result<Raster<f64>> {
    let (base, alt) = require_pair(
        Product::ContinuousDifference,
        "normalized current raster",
        inputs.baseline.normalized_current.as_ref(),
        inputs.alternative.normalized_current.as_ref(),
    )?;
    info!("computing normalized current difference");
    grid_difference(base, alt, inputs.options.nodata)
}

/// Check both category rasters against the table once per run.
///
/// Nothing is checked unless both rasters are present; the products that
/// need them report the missing side themselves.
fn validate_categories(inputs: &ComparisonInputs) -> Result<Vec<UnknownClasses>> {
    let (Some(base), Some(alt)) = (
        inputs.baseline.categories.as_ref(),
        inputs.alternative.categories.as_ref(),
    ) else {
        return Ok(Vec::new());
    };

    let opts = &inputs.options;
    let mut unknown = Vec::new();
    for (scenario, grid) in [("baseline", base), ("alternative", alt)] {
        let class_ids = check_categories(
            grid,
            &inputs.categories,
            opts.nodata,
            opts.unknown_categories,
            scenario,
        )?;
        if !class_ids.is_empty() {
            unknown.push(UnknownClasses {
                scenario,
                class_ids,
            });
        }
    }
    Ok(unknown)
}

fn category_rasters(
    inputs: &ComparisonInputs,
    product: Product,
) -> Result<(&Raster<i32>, &Raster<i32>)> {
    require_pair(
        product,
        "connectivity category raster",
        inputs.baseline.categories.as_ref(),
        inputs.alternative.categories.as_ref(),
    )
}

fn categorical_impact(inputs: &ComparisonInputs) -> Result<CategoricalImpact> {
    let (base, alt) = category_rasters(inputs, Product::CategoricalDifference)?;
    let nodata = inputs.options.nodata;

    info!("computing connectivity category difference");
    let overall = grid_difference(base, alt, nodata)?;

    // Per-category products follow the configured order, restricted to the
    // classes present in the baseline raster.
    let present = present_classes(base, nodata);
    let mut per_category = Vec::new();
    let mut dissimilarity = Vec::new();

    for category in inputs.categories.iter().filter(|c| present.contains(&c.class_id)) {
        let base_mask = category_mask(base, category.class_id);
        let alt_mask = category_mask(alt, category.class_id);

        let raster = category_difference(&base_mask, &alt_mask, nodata)?;
        let overlap = MaskOverlap::between(&base_mask, &alt_mask)?;
        let (score, empty_union) = match overlap.dissimilarity() {
            Some(score) => (score, false),
            None => {
                warn!(
                    class_id = category.class_id,
                    "category absent from both scenarios; Jaccard dissimilarity set to 1"
                );
                (1.0, true)
            }
        };
        debug!(
            key = category.key,
            intersection = overlap.intersection,
            union = overlap.union,
            score,
            "category compared"
        );

        per_category.push(CategoryDifference {
            key: category.key,
            class_id: category.class_id,
            raster,
        });
        dissimilarity.push(DissimilarityRecord {
            category_key: category.key,
            jaccard_dissimilarity: score,
            empty_union,
        });
    }

    Ok(CategoricalImpact {
        overall,
        per_category,
        dissimilarity,
    })
}

fn transitions(inputs: &ComparisonInputs) -> Result<TransitionSummary> {
    require_pair(
        Product::Transitions,
        "connectivity category summary",
        inputs.baseline.cover_summary.as_ref(),
        inputs.alternative.cover_summary.as_ref(),
    )?;
    let (base, alt) = category_rasters(inputs, Product::Transitions)?;

    info!(categories = inputs.categories.len(), "computing category transitions");
    let params = TransitionParams {
        area_unit: inputs.options.area_unit,
        percent_cover: inputs.options.percent_cover,
    };
    let matrix = transition_matrix(
        base,
        alt,
        &inputs.categories.class_ids(),
        base.cell_area(),
        params,
    )?;
    let rows = matrix.named(&inputs.categories)?;
    Ok(TransitionSummary { matrix, rows })
}

fn summary_delta(inputs: &ComparisonInputs) -> Result<Vec<CoverDeltaRow>> {
    let (base, alt) = require_pair(
        Product::CoverDelta,
        "connectivity category summary",
        inputs.baseline.cover_summary.as_ref(),
        inputs.alternative.cover_summary.as_ref(),
    )?;
    info!("computing cover summary delta");
    cover_delta(base, alt, &inputs.categories)
}
