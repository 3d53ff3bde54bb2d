//! Area unit conversion

use serde::{Deserialize, Serialize};

/// Unit in which transition areas are reported.
///
/// Cell areas are taken from the raster transform in squared CRS units, which
/// for projected connectivity outputs are square meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    SquareMeters,
    Hectares,
    #[default]
    SquareKilometers,
}

impl AreaUnit {
    /// Number of square meters in one unit
    pub fn square_meters(self) -> f64 {
        match self {
            AreaUnit::SquareMeters => 1.0,
            AreaUnit::Hectares => 1.0e4,
            AreaUnit::SquareKilometers => 1.0e6,
        }
    }

    /// Area of `cells` cells of `cell_area` square meters, in this unit
    pub fn area_of(self, cells: usize, cell_area: f64) -> f64 {
        cells as f64 * cell_area / self.square_meters()
    }
}
