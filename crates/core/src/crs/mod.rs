//! Coordinate reference systems as stored in GeoTIFF geokeys
//!
//! Rasters are never reprojected here. A CRS only travels with a grid so
//! that co-registration can be checked and difference products are written
//! back with their input's reference system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// GTModelTypeGeoKey
pub const MODEL_TYPE_GEOKEY: u16 = 1024;
/// GTRasterTypeGeoKey
pub const RASTER_TYPE_GEOKEY: u16 = 1025;
/// GeographicTypeGeoKey
pub const GEOGRAPHIC_TYPE_GEOKEY: u16 = 2048;
/// ProjectedCSTypeGeoKey
pub const PROJECTED_CS_TYPE_GEOKEY: u16 = 3072;

/// GeoTIFF "user defined" marker; carries no EPSG code
const USER_DEFINED: u32 = 32767;

/// Whether coordinates are projected or geographic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Projected,
    Geographic,
}

impl ModelType {
    /// GTModelTypeGeoKey value
    pub fn code(self) -> u16 {
        match self {
            ModelType::Projected => 1,
            ModelType::Geographic => 2,
        }
    }

    /// GeoKey holding the EPSG code for this model
    pub fn epsg_geokey(self) -> u16 {
        match self {
            ModelType::Projected => PROJECTED_CS_TYPE_GEOKEY,
            ModelType::Geographic => GEOGRAPHIC_TYPE_GEOKEY,
        }
    }
}

/// Coordinate reference system identified by its EPSG code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRS {
    epsg: u32,
    model: ModelType,
}

impl CRS {
    /// CRS from an EPSG code. Codes in 4000..5000 are taken as geographic.
    pub fn from_epsg(code: u32) -> Self {
        let model = if (4000..5000).contains(&code) {
            ModelType::Geographic
        } else {
            ModelType::Projected
        };
        Self { epsg: code, model }
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn model(&self) -> ModelType {
        self.model
    }

    /// Read the CRS out of a flattened GeoKeyDirectory.
    ///
    /// Only keys whose value is stored inline (location 0) are considered.
    /// A projected CS key wins over a geographic one.
    pub fn from_geokeys(directory: &[u32]) -> Option<Self> {
        let count = *directory.get(3)? as usize;
        let mut geographic = None;

        for entry in directory.get(4..)?.chunks_exact(4).take(count) {
            let (key, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 || value == 0 || value == USER_DEFINED {
                continue;
            }
            match u16::try_from(key).unwrap_or_default() {
                PROJECTED_CS_TYPE_GEOKEY => {
                    return Some(Self {
                        epsg: value,
                        model: ModelType::Projected,
                    })
                }
                GEOGRAPHIC_TYPE_GEOKEY => {
                    geographic = Some(Self {
                        epsg: value,
                        model: ModelType::Geographic,
                    })
                }
                _ => {}
            }
        }
        geographic
    }
}

/// GeoKeyDirectory (version 1.1.0) for an area-pixel raster in `crs`.
///
/// Without a CRS only the raster type key is written. EPSG codes above
/// `u16::MAX` cannot be stored inline and are dropped.
pub fn geokey_directory(crs: Option<&CRS>) -> Vec<u16> {
    let mut keys: Vec<[u16; 4]> = Vec::with_capacity(3);
    let crs = crs.and_then(|c| u16::try_from(c.epsg).ok().map(|code| (c.model, code)));

    if let Some((model, _)) = crs {
        keys.push([MODEL_TYPE_GEOKEY, 0, 1, model.code()]);
    }
    // RasterPixelIsArea
    keys.push([RASTER_TYPE_GEOKEY, 0, 1, 1]);
    if let Some((model, code)) = crs {
        keys.push([model.epsg_geokey(), 0, 1, code]);
    }

    let mut directory = vec![1, 1, 0, keys.len() as u16];
    directory.extend(keys.iter().flatten());
    directory
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widen(keys: &[u16]) -> Vec<u32> {
        keys.iter().map(|&k| u32::from(k)).collect()
    }

    #[test]
    fn test_model_from_code() {
        assert_eq!(CRS::from_epsg(4326).model(), ModelType::Geographic);
        assert_eq!(CRS::from_epsg(32719).model(), ModelType::Projected);
        assert_eq!(CRS::from_epsg(32719).to_string(), "EPSG:32719");
    }

    #[test]
    fn test_directory_round_trip() {
        for code in [32719, 4326, 3857] {
            let crs = CRS::from_epsg(code);
            let dir = widen(&geokey_directory(Some(&crs)));
            assert_eq!(dir[3], 3);
            assert_eq!(CRS::from_geokeys(&dir), Some(crs));
        }
    }

    #[test]
    fn test_directory_without_crs() {
        let dir = geokey_directory(None);
        assert_eq!(dir, vec![1, 1, 0, 1, RASTER_TYPE_GEOKEY, 0, 1, 1]);
        assert_eq!(CRS::from_geokeys(&widen(&dir)), None);
    }

    #[test]
    fn test_projected_key_wins_and_user_defined_ignored() {
        let dir = [1, 1, 0, 3, 1024, 0, 1, 1, 2048, 0, 1, 4326, 3072, 0, 1, 32633];
        assert_eq!(CRS::from_geokeys(&dir).map(|c| c.epsg()), Some(32633));

        let user = [1, 1, 0, 1, 3072, 0, 1, 32767];
        assert_eq!(CRS::from_geokeys(&user), None);
        assert_eq!(CRS::from_geokeys(&[1, 1]), None);
    }
}
