//! Category presence and validation against the configured table

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use connimpact_core::{CategoryTable, Error, Raster, Result};

/// What to do with category raster values missing from the configured table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Log a warning and leave the cells out of every per-category product
    #[default]
    Skip,
    /// Abort with [`Error::UnknownCategory`]
    Fail,
}

/// Distinct valid class values of a categorical raster, ascending.
///
/// Cells equal to the raster's own no-data value or to `nodata` are ignored.
pub fn present_classes(grid: &Raster<i32>, nodata: f64) -> BTreeSet<i32> {
    grid.data()
        .iter()
        .copied()
        .filter(|&v| !grid.is_nodata(v) && f64::from(v) != nodata)
        .collect()
}

/// Class values present in `grid` that the table does not know about.
pub fn unknown_classes(grid: &Raster<i32>, table: &CategoryTable, nodata: f64) -> Vec<i32> {
    present_classes(grid, nodata)
        .into_iter()
        .filter(|&c| !table.contains_class(c))
        .collect()
}

/// Apply `policy` to the unknown classes of `grid`.
///
/// Returns the unknown classes that were tolerated (empty when none).
pub fn check_categories(
    grid: &Raster<i32>,
    table: &CategoryTable,
    nodata: f64,
    policy: UnknownCategoryPolicy,
    label: &str,
) -> Result<Vec<i32>> {
    let unknown = unknown_classes(grid, table, nodata);
    if unknown.is_empty() {
        return Ok(unknown);
    }

    match policy {
        UnknownCategoryPolicy::Fail => Err(Error::UnknownCategory(format!(
            "{} category raster contains class ids {:?}",
            label, unknown
        ))),
        UnknownCategoryPolicy::Skip => {
            warn!(
                scenario = label,
                classes = ?unknown,
                "category raster contains unconfigured class ids; they are skipped"
            );
            Ok(unknown)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connimpact_core::Category;

    fn table() -> CategoryTable {
        CategoryTable::new(vec![Category::new(10, 1, "Low"), Category::new(20, 2, "High")]).unwrap()
    }

    fn grid() -> Raster<i32> {
        let mut g = Raster::from_vec(vec![2, 1, -9999, 9, 1, 4], 2, 3).unwrap();
        g.set_nodata(Some(-9999));
        g
    }

    #[test]
    fn test_present_classes_sorted_without_nodata() {
        let present: Vec<i32> = present_classes(&grid(), -9999.0).into_iter().collect();
        assert_eq!(present, vec![1, 2, 4, 9]);
    }

    #[test]
    fn test_unknown_classes() {
        assert_eq!(unknown_classes(&grid(), &table(), -9999.0), vec![4, 9]);
    }

    #[test]
    fn test_policy() {
        let (grid, table) = (grid(), table());
        let skipped = check_categories(&grid, &table, -9999.0, UnknownCategoryPolicy::Skip, "a");
        assert_eq!(skipped.unwrap(), vec![4, 9]);

        let err = check_categories(&grid, &table, -9999.0, UnknownCategoryPolicy::Fail, "a");
        assert!(matches!(err, Err(Error::UnknownCategory(_))));
    }

    #[test]
    fn test_sentinel_without_raster_nodata() {
        let g = Raster::from_vec(vec![1, -9999], 1, 2).unwrap();
        assert!(unknown_classes(&g, &table(), -9999.0).is_empty());
    }
}
