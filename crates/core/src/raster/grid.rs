//! Main Raster type

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;

/// A georeferenced 2D raster grid.
///
/// `Raster<T>` stores values of type `T` in a 2D grid with associated
/// geographic metadata (transform, CRS, no-data sentinel). Rasters read from
/// a scenario are treated as immutable; every comparison step allocates a new
/// raster for its output.
///
/// # Example
///
/// ```ignore
/// use connimpact_core::Raster;
///
/// let mut raster: Raster<f64> = Raster::filled(2, 2, -9999.0);
/// raster.set_nodata(Some(-9999.0));
/// raster.set(0, 0, 0.42)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    /// Affine transformation
    transform: GeoTransform,
    /// Coordinate reference system
    crs: Option<CRS>,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from existing row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        }
    }

    /// Wrap `data` in a new raster carrying this raster's transform and CRS.
    ///
    /// The no-data value is left unset; the caller decides the output sentinel.
    pub fn with_data<U: RasterElement>(&self, data: Array2<U>) -> Result<Raster<U>> {
        if data.dim() != self.shape() {
            let (rows, cols) = data.dim();
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Raster {
            data,
            transform: self.transform,
            crs: self.crs,
            nodata: None,
        })
    }

    /// Build a new raster by applying `f` to every cell, keeping this raster's metadata
    pub fn map<U, F>(&self, f: F) -> Raster<U>
    where
        U: RasterElement,
        F: Fn(T) -> U,
    {
        Raster {
            data: self.data.mapv(f),
            transform: self.transform,
            crs: self.crs,
            nodata: None,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the CRS
    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Set the CRS
    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Cell size (assumes square cells)
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Area of one cell in squared CRS units
    pub fn cell_area(&self) -> f64 {
        self.transform.cell_area()
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Fail with [`Error::ShapeMismatch`] unless `other` has the same shape
    /// and pixel resolution as this raster, and an equivalent CRS when both
    /// rasters carry one.
    pub fn ensure_same_grid<U: RasterElement>(&self, other: &Raster<U>) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                expected: format!("{} x {} cells", self.rows(), self.cols()),
                actual: format!("{} x {} cells", other.rows(), other.cols()),
            });
        }
        if !self.transform.same_resolution(other.transform()) {
            let (ex, ey) = self.transform.resolution();
            let (ax, ay) = other.transform().resolution();
            return Err(Error::ShapeMismatch {
                expected: format!("resolution {} x {}", ex, ey),
                actual: format!("resolution {} x {}", ax, ay),
            });
        }
        if let (Some(a), Some(b)) = (self.crs(), other.crs()) {
            if a != b {
                return Err(Error::ShapeMismatch {
                    expected: format!("CRS {}", a),
                    actual: format!("CRS {}", b),
                });
            }
        }
        Ok(())
    }

    /// Number of cells satisfying `predicate`
    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(T) -> bool,
    {
        self.data.iter().filter(|&&v| predicate(v)).count()
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }

            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }

            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::filled(100, 200, 0.0);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_from_vec_rejects_bad_length() {
        let err = Raster::<i32>::from_vec(vec![1, 2, 3], 2, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }

    #[test]
    fn test_statistics_skip_nodata() {
        let mut raster = Raster::from_vec(vec![1.0, 2.0, -9999.0, 3.0], 2, 2).unwrap();
        raster.set_nodata(Some(-9999.0));

        let stats = raster.statistics();
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(3.0));
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.nodata_count, 1);
    }

    #[test]
    fn test_ensure_same_grid_shape() {
        let a: Raster<f64> = Raster::filled(3, 3, 0.0);
        let b: Raster<i32> = Raster::filled(3, 4, 0);
        assert!(matches!(a.ensure_same_grid(&b), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_ensure_same_grid_resolution() {
        let mut a: Raster<f64> = Raster::filled(3, 3, 0.0);
        a.set_transform(GeoTransform::new(0.0, 0.0, 30.0, -30.0));
        let mut b: Raster<f64> = Raster::filled(3, 3, 0.0);
        b.set_transform(GeoTransform::new(0.0, 0.0, 90.0, -90.0));
        assert!(a.ensure_same_grid(&b).is_err());

        b.set_transform(GeoTransform::new(0.0, 0.0, 30.0, -30.0));
        assert!(a.ensure_same_grid(&b).is_ok());
    }

    #[test]
    fn test_ensure_same_grid_crs() {
        let mut a: Raster<i32> = Raster::filled(2, 2, 1);
        let mut b: Raster<i32> = Raster::filled(2, 2, 1);
        a.set_crs(Some(CRS::from_epsg(32719)));
        assert!(a.ensure_same_grid(&b).is_ok());

        b.set_crs(Some(CRS::from_epsg(32718)));
        let err = a.ensure_same_grid(&b).unwrap_err();
        assert!(err.to_string().contains("EPSG:32718"));

        b.set_crs(Some(CRS::from_epsg(32719)));
        assert!(a.ensure_same_grid(&b).is_ok());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let mut raster = Raster::from_vec(vec![1, 2, 3, 4], 2, 2).unwrap();
        raster.set_transform(GeoTransform::new(5.0, 5.0, 2.0, -2.0));
        let doubled: Raster<f64> = raster.map(|v| v as f64 * 2.0);
        assert_eq!(doubled.get(1, 1).unwrap(), 8.0);
        assert_eq!(doubled.transform(), raster.transform());
        assert_eq!(doubled.nodata(), None);
    }

    #[test]
    fn test_count_where() {
        let raster = Raster::from_vec(vec![1, 2, 2, 2], 2, 2).unwrap();
        assert_eq!(raster.count_where(|v| v == 2), 3);
    }
}
