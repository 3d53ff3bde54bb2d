//! Raster data structures

mod element;
mod geotransform;
mod grid;

pub use element::{matches_nodata, RasterElement};
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
