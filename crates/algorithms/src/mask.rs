//! Binary category masks and per-category difference grids

use ndarray::Array2;

use crate::maybe_rayon::*;
use connimpact_core::raster::{Raster, RasterElement};
use connimpact_core::{Error, Result};

/// Presence (1) / absence (0) of one category in a categorical raster.
///
/// The mask has no no-data encoding: no-data cells of the source simply fail
/// the equality test and are stored as 0.
#[derive(Debug, Clone)]
pub struct CategoryMask {
    class_id: i32,
    raster: Raster<u8>,
}

impl CategoryMask {
    /// Class id this mask marks
    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    /// The underlying {0,1} raster
    pub fn raster(&self) -> &Raster<u8> {
        &self.raster
    }

    /// Number of cells where the category is present
    pub fn present_count(&self) -> usize {
        self.raster.count_where(|v| v == 1)
    }
}

/// Build the presence mask of `class_id` in `grid`.
pub fn category_mask<T: RasterElement>(grid: &Raster<T>, class_id: i32) -> CategoryMask {
    let target = f64::from(class_id);
    let raster = grid.map(|v| u8::from(v.to_f64() == Some(target)));
    CategoryMask { class_id, raster }
}

/// Per-category difference grid: `alt_mask - base_mask`.
///
/// Cells where the category is absent from both scenarios (mask sum 0) are
/// set to `nodata`. Every other cell keeps the raw difference: -1 (lost),
/// +1 (gained), or 0 (present in both).
pub fn category_difference(
    base: &CategoryMask,
    alt: &CategoryMask,
    nodata: f64,
) -> Result<Raster<f64>> {
    base.raster.ensure_same_grid(&alt.raster)?;

    let (rows, cols) = base.raster.shape();
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let b = unsafe { base.raster.get_unchecked(row, col) };
                    let a = unsafe { alt.raster.get_unchecked(row, col) };
                    if b + a == 0 {
                        nodata
                    } else {
                        f64::from(a) - f64::from(b)
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let data =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut output = base.raster.with_data(data)?;
    output.set_nodata(Some(nodata));
    Ok(output)
}
