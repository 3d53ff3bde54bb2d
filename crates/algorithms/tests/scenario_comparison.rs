//! Integration tests for baseline / alternative scenario comparison.
//!
//! Grids are small and synthetic; the larger ones are filled from a fixed
//! linear congruential sequence so every run sees the same cells.

use connimpact_algorithms::prelude::*;
use connimpact_core::{Category, GeoTransform, CRS};

const ND: f64 = -9999.0;

/// Deterministic pseudo-random sequence in [0, modulus)
fn sequence(seed: u64, len: usize, modulus: u64) -> Vec<u64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % modulus
        })
        .collect()
}

fn georef<T: connimpact_core::RasterElement>(mut r: Raster<T>) -> Raster<T> {
    let rows = r.rows() as f64;
    r.set_transform(GeoTransform::new(300_000.0, 5_000_000.0 + rows * 30.0, 30.0, -30.0));
    r
}

fn class_grid(values: Vec<i32>, rows: usize, cols: usize) -> Raster<i32> {
    let mut r = georef(Raster::from_vec(values, rows, cols).unwrap());
    r.set_nodata(Some(-9999));
    r
}

/// Category grid with classes 1..=4 and roughly one cell in ten no-data
fn random_classes(seed: u64, rows: usize, cols: usize) -> Raster<i32> {
    let values = sequence(seed, rows * cols, 40)
        .into_iter()
        .map(|v| if v < 4 { -9999 } else { (v % 4) as i32 + 1 })
        .collect();
    class_grid(values, rows, cols)
}

fn random_current(seed: u64, rows: usize, cols: usize) -> Raster<f64> {
    let values = sequence(seed, rows * cols, 1000)
        .into_iter()
        .map(|v| if v < 100 { ND } else { v as f64 / 250.0 })
        .collect();
    let mut r = georef(Raster::from_vec(values, rows, cols).unwrap());
    r.set_nodata(Some(ND));
    r
}

fn four_categories() -> CategoryTable {
    CategoryTable::new(vec![
        Category::new(101, 1, "Diffuse"),
        Category::new(102, 2, "Intensified"),
        Category::new(103, 3, "Channelized"),
        Category::new(104, 4, "Impeded"),
    ])
    .unwrap()
}

// ---------------------------------------------------------------------------
// Continuous difference
// ---------------------------------------------------------------------------

#[test]
fn difference_matches_cellwise_subtraction() {
    let base = random_current(7, 24, 17);
    let alt = random_current(11, 24, 17);
    let diff = grid_difference(&base, &alt, ND).unwrap();

    for ((&b, &a), &d) in base.data().iter().zip(alt.data().iter()).zip(diff.data().iter()) {
        if b == ND && a == ND {
            assert_eq!(d, ND);
        } else {
            assert_eq!(d, a - b);
        }
    }
}

#[test]
fn all_nodata_inputs_give_all_nodata_output() {
    let base = georef(Raster::filled(5, 4, ND));
    let alt = georef(Raster::filled(5, 4, ND));

    let diff = grid_difference(&base, &alt, ND).unwrap();
    assert!(diff.data().iter().all(|&v| v == ND));
    assert_eq!(diff.statistics().valid_count, 0);
}

#[test]
fn difference_carries_crs_and_rejects_foreign_crs() {
    let mut base = random_current(53, 6, 6);
    let mut alt = random_current(59, 6, 6);
    base.set_crs(Some(CRS::from_epsg(32719)));
    alt.set_crs(Some(CRS::from_epsg(32719)));

    let diff = grid_difference(&base, &alt, ND).unwrap();
    assert_eq!(diff.crs(), Some(&CRS::from_epsg(32719)));

    alt.set_crs(Some(CRS::from_epsg(4326)));
    assert!(matches!(
        grid_difference(&base, &alt, ND),
        Err(Error::ShapeMismatch { .. })
    ));
}

// ---------------------------------------------------------------------------
// Masks and Jaccard
// ---------------------------------------------------------------------------

#[test]
fn two_by_two_scenario() {
    let base = class_grid(vec![1, 1, 2, 2], 2, 2);
    let alt = class_grid(vec![1, 2, 2, 2], 2, 2);

    let base_mask = category_mask(&base, 1);
    let alt_mask = category_mask(&alt, 1);
    assert_eq!(base_mask.raster().data().iter().copied().collect::<Vec<u8>>(), vec![1, 1, 0, 0]);
    assert_eq!(alt_mask.raster().data().iter().copied().collect::<Vec<u8>>(), vec![1, 0, 0, 0]);

    let overlap = MaskOverlap::between(&base_mask, &alt_mask).unwrap();
    assert_eq!((overlap.intersection, overlap.union), (1, 2));
    assert_eq!(jaccard_dissimilarity(&base_mask, &alt_mask).unwrap(), 0.5);

    let params = TransitionParams::default();
    let m = transition_matrix(&base, &alt, &[1, 2], base.cell_area(), params).unwrap();
    assert_eq!(m.get(1, 1).unwrap().pixel_count, 1);
    assert_eq!(m.get(1, 2).unwrap().pixel_count, 1);
    assert_eq!(m.get(2, 1).unwrap().pixel_count, 0);
    assert_eq!(m.get(2, 2).unwrap().pixel_count, 2);
}

#[test]
fn jaccard_is_bounded_and_symmetric() {
    let base = random_classes(3, 30, 30);
    let alt = random_classes(5, 30, 30);

    for class_id in 1..=4 {
        let b = category_mask(&base, class_id);
        let a = category_mask(&alt, class_id);
        let ab = jaccard_dissimilarity(&b, &a).unwrap();
        let ba = jaccard_dissimilarity(&a, &b).unwrap();
        assert!((0.0..=1.0).contains(&ab), "class {} out of bounds: {}", class_id, ab);
        assert_eq!(ab, ba);
        assert_eq!(jaccard_dissimilarity(&b, &b).unwrap(), 0.0);
    }
}

// ---------------------------------------------------------------------------
// Transition matrix
// ---------------------------------------------------------------------------

#[test]
fn transition_matrix_is_complete_and_from_major() {
    let base = random_classes(13, 20, 25);
    let alt = random_classes(17, 20, 25);
    let classes = [4, 2, 3, 1];

    let params = TransitionParams::default();
    let m = transition_matrix(&base, &alt, &classes, base.cell_area(), params).unwrap();
    assert_eq!(m.len(), classes.len() * classes.len());

    let mut expected = Vec::new();
    for &from in &classes {
        for &to in &classes {
            expected.push((from, to));
        }
    }
    let actual: Vec<(i32, i32)> = m.records().iter().map(|r| (r.from, r.to)).collect();
    assert_eq!(actual, expected);
}

#[test]
fn transition_counts_are_conserved() {
    let base = random_classes(19, 32, 32);
    let alt = random_classes(23, 32, 32);
    let classes = [1, 2, 3, 4];

    let params = TransitionParams::default();
    let m = transition_matrix(&base, &alt, &classes, base.cell_area(), params).unwrap();

    for &from in &classes {
        // Cells of `from` whose alternative value is also a configured class
        let expected = base
            .data()
            .iter()
            .zip(alt.data().iter())
            .filter(|&(&b, &a)| b == from && classes.contains(&a))
            .count();
        assert_eq!(m.from_total(from), expected, "class {}", from);
    }
}

#[test]
fn total_cell_cover_sums_to_configured_share() {
    let base = random_classes(29, 16, 16);
    let alt = random_classes(31, 16, 16);
    let params = TransitionParams {
        area_unit: AreaUnit::SquareMeters,
        percent_cover: PercentCoverBasis::TotalCells,
    };

    let m = transition_matrix(&base, &alt, &[1, 2, 3, 4], base.cell_area(), params).unwrap();
    let counted: usize = m.records().iter().map(|r| r.pixel_count).sum();
    let cover: f64 = m.records().iter().map(|r| r.percent_cover).sum();
    let area: f64 = m.records().iter().map(|r| r.area).sum();

    approx::assert_relative_eq!(cover, counted as f64 / base.len() as f64, epsilon = 1e-12);
    approx::assert_relative_eq!(area, counted as f64 * 900.0, epsilon = 1e-6);
}

// ---------------------------------------------------------------------------
// Report assembly
// ---------------------------------------------------------------------------

fn comparison(seed: u64) -> ComparisonInputs {
    let summary = |area: f64| {
        four_categories()
            .iter()
            .map(|c| CoverSummaryRow {
                category: c.name.clone(),
                area,
                percent_cover: 0.25,
            })
            .collect::<Vec<_>>()
    };

    ComparisonInputs {
        categories: four_categories(),
        baseline: ScenarioProducts {
            normalized_current: Some(random_current(seed, 12, 9)),
            categories: Some(random_classes(seed + 1, 12, 9)),
            cover_summary: Some(summary(2.0)),
        },
        alternative: ScenarioProducts {
            normalized_current: Some(random_current(seed + 2, 12, 9)),
            categories: Some(random_classes(seed + 3, 12, 9)),
            cover_summary: Some(summary(3.0)),
        },
        options: ComparisonOptions::default(),
    }
}

#[test]
fn report_is_idempotent() {
    let inputs = comparison(41);
    let first = assemble_report(&inputs).unwrap();
    let second = assemble_report(&inputs).unwrap();

    assert_eq!(
        first.continuous.as_ref().unwrap().data(),
        second.continuous.as_ref().unwrap().data()
    );

    let a = first.categorical.unwrap();
    let b = second.categorical.unwrap();
    assert_eq!(a.dissimilarity, b.dissimilarity);
    for (x, y) in a.per_category.iter().zip(b.per_category.iter()) {
        assert_eq!(x.key, y.key);
        assert_eq!(x.raster.data(), y.raster.data());
    }

    assert_eq!(first.transitions.unwrap().rows, second.transitions.unwrap().rows);
    assert_eq!(first.cover_delta, second.cover_delta);
}

#[test]
fn report_names_category_outputs_by_key() {
    let report = assemble_report(&comparison(43)).unwrap();
    let categorical = report.categorical.unwrap();

    let stems: Vec<String> = categorical.per_category.iter().map(|c| c.file_stem()).collect();
    assert_eq!(
        stems,
        vec![
            "category_difference_101",
            "category_difference_102",
            "category_difference_103",
            "category_difference_104"
        ]
    );

    let delta = report.cover_delta.unwrap();
    assert!(delta.iter().all(|r| r.area_delta == 1.0 && r.cover_delta == 0.0));
}

#[test]
fn missing_category_rasters_keep_continuous_product() {
    let mut inputs = comparison(47);
    inputs.baseline.categories = None;
    inputs.alternative.categories = None;

    let report = assemble_report(&inputs).unwrap();
    assert!(report.continuous.is_some());
    assert!(report.is_skipped(Product::CategoricalDifference));
    assert!(report.is_skipped(Product::Transitions));
    assert!(report.cover_delta.is_some());
}
