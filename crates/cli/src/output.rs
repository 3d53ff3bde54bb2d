//! Writing a difference report to an output directory

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use connimpact_algorithms::report::{DifferenceReport, SkippedProduct, UnknownClasses};
use connimpact_core::io::{write_geotiff, GeoTiffOptions};
use connimpact_core::Raster;

const OVERALL_DIR: &str = "overall";
const CATEGORY_DIR: &str = "category";

/// Index of a written report, saved as `report.json`
#[derive(Debug, Serialize)]
pub struct ReportIndex<'a> {
    pub baseline_run: u32,
    pub alternative_run: u32,
    pub files: Vec<PathBuf>,
    pub skipped: &'a [SkippedProduct],
    pub unknown_classes: &'a [UnknownClasses],
}

/// Write every product present in `report` below `dir`.
///
/// Returns the written files relative to `dir`, in writing order.
pub fn write_report(report: &DifferenceReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();

    if let Some(continuous) = &report.continuous {
        let rel = Path::new(OVERALL_DIR).join("normalized_current_impact.tif");
        write_raster(continuous, dir, &rel)?;
        written.push(rel);
    }

    if let Some(categorical) = &report.categorical {
        let rel = Path::new(OVERALL_DIR).join("category_impact.tif");
        write_raster(&categorical.overall, dir, &rel)?;
        written.push(rel);

        for diff in &categorical.per_category {
            let rel = Path::new(CATEGORY_DIR).join(format!("{}.tif", diff.file_stem()));
            write_raster(&diff.raster, dir, &rel)?;
            written.push(rel);
        }

        let rel = PathBuf::from("jaccard.json");
        write_json(&categorical.dissimilarity, dir, &rel)?;
        written.push(rel);
    }

    if let Some(transitions) = &report.transitions {
        let rel = PathBuf::from("transitions.json");
        write_json(&transitions.rows, dir, &rel)?;
        written.push(rel);
    }

    if let Some(delta) = &report.cover_delta {
        let rel = PathBuf::from("cover_delta.json");
        write_json(delta, dir, &rel)?;
        written.push(rel);
    }

    Ok(written)
}

/// Write the report index next to the products.
pub fn write_index(index: &ReportIndex<'_>, dir: &Path) -> Result<PathBuf> {
    let rel = PathBuf::from("report.json");
    write_json(index, dir, &rel)?;
    Ok(rel)
}

fn write_raster(raster: &Raster<f64>, dir: &Path, rel: &Path) -> Result<()> {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_geotiff(raster, &path, Some(GeoTiffOptions::default()))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(value: &T, dir: &Path, rel: &Path) -> Result<()> {
    let path = dir.join(rel);
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use connimpact_algorithms::cover::CoverDeltaRow;
    use connimpact_algorithms::report::Product;
    use connimpact_core::io::read_geotiff;
    use connimpact_core::CRS;

    #[test]
    fn test_writes_present_products_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut continuous = Raster::from_vec(vec![0.5, -9999.0, 1.0, 2.0], 2, 2).unwrap();
        continuous.set_nodata(Some(-9999.0));
        continuous.set_crs(Some(CRS::from_epsg(32719)));

        let report = DifferenceReport {
            continuous: Some(continuous),
            cover_delta: Some(vec![CoverDeltaRow {
                category_key: 10,
                area_delta: 1.5,
                cover_delta: 0.1,
            }]),
            skipped: vec![SkippedProduct {
                product: Product::Transitions,
                reason: "no category rasters".into(),
            }],
            ..Default::default()
        };

        let written = write_report(&report, dir.path()).unwrap();
        assert_eq!(
            written,
            vec![
                PathBuf::from("overall/normalized_current_impact.tif"),
                PathBuf::from("cover_delta.json")
            ]
        );

        let back: Raster<f64> =
            read_geotiff(dir.path().join("overall/normalized_current_impact.tif"), None).unwrap();
        assert_eq!(back.nodata(), Some(-9999.0));
        assert_eq!(back.crs(), Some(&CRS::from_epsg(32719)));
        assert_eq!(back.get(1, 1).unwrap(), 2.0);

        let json = fs::read_to_string(dir.path().join("cover_delta.json")).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(rows[0]["category_key"], 10);
        assert!(!dir.path().join("transitions.json").exists());

        let index = ReportIndex {
            baseline_run: 1,
            alternative_run: 2,
            files: written,
            skipped: &report.skipped,
            unknown_classes: &report.unknown_classes,
        };
        write_index(&index, dir.path()).unwrap();
        let json = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["skipped"][0]["product"], "transitions");
    }
}
