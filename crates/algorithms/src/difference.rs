//! Pixel-wise scenario differencing
//!
//! `difference = alternative - baseline`, computed in `f64` whatever the
//! input cell type so that integer category rasters cannot overflow or
//! truncate.
//!
//! No-data handling is deliberately asymmetric: a cell is no-data in the
//! output only when it is no-data in *both* inputs. When only one side is
//! no-data the subtraction is carried out with the sentinel as a value, which
//! yields a large-magnitude number (e.g. `0.4 - (-9999) = 9999.4`). Callers
//! relying on "either side no-data" masking must apply it themselves.

use ndarray::Array2;

use crate::maybe_rayon::*;
use connimpact_core::raster::{matches_nodata, Raster, RasterElement};
use connimpact_core::{Error, Result};

/// Compute `alternative - baseline` for two co-registered rasters.
///
/// # Arguments
/// * `baseline` - Raster of the baseline scenario; its metadata is copied to the output
/// * `alternative` - Raster of the alternative scenario
/// * `nodata` - Sentinel marking missing cells in both inputs and in the output
///
/// # Errors
/// [`Error::ShapeMismatch`] when the rasters do not share shape and resolution.
pub fn grid_difference<T, U>(
    baseline: &Raster<T>,
    alternative: &Raster<U>,
    nodata: f64,
) -> Result<Raster<f64>>
where
    T: RasterElement,
    U: RasterElement,
{
    baseline.ensure_same_grid(alternative)?;
    let (rows, cols) = baseline.shape();
    let base = baseline.data();
    let alt = alternative.data();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            base.row(row)
                .iter()
                .zip(alt.row(row).iter())
                .map(|(&b, &a)| {
                    let b = as_f64(b);
                    let a = as_f64(a);
                    if matches_nodata(b, nodata) && matches_nodata(a, nodata) {
                        nodata
                    } else {
                        a - b
                    }
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut output = baseline.with_data(array)?;
    output.set_nodata(Some(nodata));
    Ok(output)
}

fn as_f64<T: RasterElement>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
