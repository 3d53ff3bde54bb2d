//! Row-aligned delta of existing area / percent-cover summaries

use serde::{Deserialize, Serialize};

use connimpact_core::{CategoryTable, Error, Result};

/// One row of a scenario's category summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverSummaryRow {
    /// Category display name
    pub category: String,
    /// Area covered by the category
    pub area: f64,
    /// Share of the landscape covered by the category
    pub percent_cover: f64,
}

/// `alternative - baseline` for one summary row, keyed by category key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverDeltaRow {
    pub category_key: i32,
    pub area_delta: f64,
    pub cover_delta: f64,
}

/// Subtract the baseline summary from the alternative summary row by row.
///
/// Rows are paired by position and must name the same category at each
/// position. Category names are translated to keys through `table`.
///
/// # Errors
/// - [`Error::TableMismatch`] when the tables differ in length or in the
///   category at some position
/// - [`Error::UnknownCategory`] when a name is not configured
pub fn cover_delta(
    baseline: &[CoverSummaryRow],
    alternative: &[CoverSummaryRow],
    table: &CategoryTable,
) -> Result<Vec<CoverDeltaRow>> {
    if baseline.len() != alternative.len() {
        return Err(Error::TableMismatch(format!(
            "baseline has {} rows, alternative has {}",
            baseline.len(),
            alternative.len()
        )));
    }

    baseline
        .iter()
        .zip(alternative)
        .enumerate()
        .map(|(row, (b, a))| {
            if b.category != a.category {
                return Err(Error::TableMismatch(format!(
                    "row {}: baseline category {:?} vs alternative category {:?}",
                    row, b.category, a.category
                )));
            }
            Ok(CoverDeltaRow {
                category_key: table.key_of_name(&b.category)?,
                area_delta: a.area - b.area,
                cover_delta: a.percent_cover - b.percent_cover,
            })
        })
        .collect()
}
