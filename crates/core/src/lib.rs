//! # ConnImpact Core
//!
//! Core types and I/O for comparing connectivity scenario outputs.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid with a no-data sentinel
//! - `GeoTransform`: Affine transformation, resolution and cell area
//! - `CategoryTable`: Validated lookup between category keys, class ids and names
//! - `AreaUnit`: Conversion of pixel counts to reported areas
//! - GeoTIFF reading and writing

pub mod category;
pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod units;

pub use category::{Category, CategoryTable};
pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use units::AreaUnit;

/// Conventional no-data sentinel of connectivity model outputs
pub const DEFAULT_NODATA: f64 = -9999.0;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::category::{Category, CategoryTable};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::units::AreaUnit;
    pub use crate::DEFAULT_NODATA;
}
