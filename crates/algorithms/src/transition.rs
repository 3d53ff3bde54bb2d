//! Category transition matrix
//!
//! For every ordered pair `(from, to)` of configured categories, counts the
//! cells that are `from` in the baseline and `to` in the alternative, and
//! derives an area and a percent cover from that count.
//!
//! Records are produced in from-major order (outer loop `from`, inner loop
//! `to`) following the order of the category list, including `from == to`
//! pairs and pairs that never occur.

use serde::{Deserialize, Serialize};

use crate::mask::{category_mask, CategoryMask};
use crate::maybe_rayon::*;
use connimpact_core::raster::{Raster, RasterElement};
use connimpact_core::{AreaUnit, CategoryTable, Error, Result};

/// Denominator used for the percent cover of a transition.
///
/// The connectivity tool this engine replaces normalised each transition
/// count by the frequency table of its 0/1 transition indicator, i.e. by the
/// number of cells in the grid. Read literally as "cells where the indicator
/// is 1" the value collapses to 1.0 for every occurring transition. Both
/// readings, plus a per-baseline-category share, are available here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentCoverBasis {
    /// `count / total grid cells`
    #[default]
    TotalCells,
    /// `count / transition cells`, which is 1.0 whenever the transition occurs
    TransitionCells,
    /// `count / baseline cells of the "from" category`
    BaselineCategoryCells,
}

impl PercentCoverBasis {
    fn percent(self, count: usize, total_cells: usize, from_cells: usize) -> f64 {
        let denominator = match self {
            PercentCoverBasis::TotalCells => total_cells,
            PercentCoverBasis::TransitionCells => count,
            PercentCoverBasis::BaselineCategoryCells => from_cells,
        };
        if count == 0 || denominator == 0 {
            0.0
        } else {
            count as f64 / denominator as f64
        }
    }
}

/// Parameters for building a transition matrix
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionParams {
    /// Unit of the reported area
    pub area_unit: AreaUnit,
    /// Percent cover formula
    pub percent_cover: PercentCoverBasis,
}

/// One (from, to) entry of the matrix, identified by class ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub from: i32,
    pub to: i32,
    pub pixel_count: usize,
    pub area: f64,
    pub percent_cover: f64,
}

/// A transition record rendered with category names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTransition {
    pub from: String,
    pub to: String,
    pub area: f64,
    pub percent_cover: f64,
}

/// Complete from-major transition matrix.
#[derive(Debug, Clone)]
pub struct TransitionMatrix {
    classes: Vec<i32>,
    records: Vec<TransitionRecord>,
}

impl TransitionMatrix {
    /// Class ids in matrix order
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    /// All records, from-major
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for one ordered pair
    pub fn get(&self, from: i32, to: i32) -> Option<&TransitionRecord> {
        let k = self.classes.len();
        let i = self.classes.iter().position(|&c| c == from)?;
        let j = self.classes.iter().position(|&c| c == to)?;
        self.records.get(i * k + j)
    }

    /// Total pixels leaving `from` towards any configured category
    pub fn from_total(&self, from: i32) -> usize {
        self.records
            .iter()
            .filter(|r| r.from == from)
            .map(|r| r.pixel_count)
            .sum()
    }

    /// Render the records with display names from `table`.
    ///
    /// # Errors
    /// [`Error::UnknownCategory`] if a class id is missing from the table.
    pub fn named(&self, table: &CategoryTable) -> Result<Vec<NamedTransition>> {
        self.records
            .iter()
            .map(|r| {
                Ok(NamedTransition {
                    from: table.name_of_class(r.from)?.to_string(),
                    to: table.name_of_class(r.to)?.to_string(),
                    area: r.area,
                    percent_cover: r.percent_cover,
                })
            })
            .collect()
    }
}

/// Build the full transition matrix between two categorical rasters.
///
/// # Arguments
/// * `baseline` - Categorical raster of the baseline scenario
/// * `alternative` - Categorical raster of the alternative scenario
/// * `classes` - Ordered, distinct class ids; this order is the output order
/// * `cell_area` - Area of one cell in square meters
/// * `params` - Area unit and percent cover formula
///
/// # Errors
/// - [`Error::ShapeMismatch`] when the rasters are not co-registered
/// - [`Error::InvalidParameter`] for duplicate class ids or a non-positive cell area
pub fn transition_matrix<T, U>(
    baseline: &Raster<T>,
    alternative: &Raster<U>,
    classes: &[i32],
    cell_area: f64,
    params: TransitionParams,
) -> Result<TransitionMatrix>
where
    T: RasterElement,
    U: RasterElement,
{
    baseline.ensure_same_grid(alternative)?;

    if !(cell_area.is_finite() && cell_area > 0.0) {
        return Err(Error::InvalidParameter {
            name: "cell_area",
            value: cell_area.to_string(),
            reason: "must be a positive finite area".into(),
        });
    }
    for (i, c) in classes.iter().enumerate() {
        if classes[..i].contains(c) {
            return Err(Error::InvalidParameter {
                name: "classes",
                value: c.to_string(),
                reason: "class ids must be distinct".into(),
            });
        }
    }

    let base_masks: Vec<CategoryMask> =
        classes.iter().map(|&c| category_mask(baseline, c)).collect();
    let alt_masks: Vec<CategoryMask> =
        classes.iter().map(|&c| category_mask(alternative, c)).collect();
    let from_cells: Vec<usize> = base_masks.iter().map(CategoryMask::present_count).collect();
    let total_cells = baseline.len();

    let k = classes.len();
    let pairs: Vec<(usize, usize)> = (0..k).flat_map(|i| (0..k).map(move |j| (i, j))).collect();

    // Indexed collect keeps from-major order regardless of scheduling.
    let records: Vec<TransitionRecord> = pairs
        .into_par_iter()
        .map(|(i, j)| {
            let count = transition_count(&base_masks[i], &alt_masks[j]);
            let (area, percent_cover) = if count > 0 {
                (
                    params.area_unit.area_of(count, cell_area),
                    params.percent_cover.percent(count, total_cells, from_cells[i]),
                )
            } else {
                (0.0, 0.0)
            };
            TransitionRecord {
                from: classes[i],
                to: classes[j],
                pixel_count: count,
                area,
                percent_cover,
            }
        })
        .collect();

    Ok(TransitionMatrix {
        classes: classes.to_vec(),
        records,
    })
}

/// Cells where the baseline mask and the alternative mask sum to 2
fn transition_count(base: &CategoryMask, alt: &CategoryMask) -> usize {
    base.raster()
        .data()
        .iter()
        .zip(alt.raster().data().iter())
        .filter(|&(&b, &a)| b + a == 2)
        .count()
}
