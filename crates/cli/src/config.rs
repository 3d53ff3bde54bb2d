//! Comparison manifest
//!
//! A YAML file naming the category table, the registered scenario runs and
//! the two comparison targets. Paths inside it are relative to the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use connimpact_algorithms::categories::UnknownCategoryPolicy;
use connimpact_algorithms::report::ComparisonOptions;
use connimpact_algorithms::transition::PercentCoverBasis;
use connimpact_core::{AreaUnit, Category, CategoryTable, Error, Result, DEFAULT_NODATA};

fn default_nodata() -> f64 {
    DEFAULT_NODATA
}

/// Raw manifest as written on disk
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_nodata")]
    pub nodata: f64,
    #[serde(default)]
    pub area_unit: AreaUnit,
    #[serde(default)]
    pub percent_cover: PercentCoverBasis,
    #[serde(default)]
    pub unknown_categories: UnknownCategoryPolicy,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioRun>,
    #[serde(default)]
    pub compare: CompareTargets,
}

/// One registered scenario, either a parent scenario or one of its result runs
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRun {
    pub id: u32,
    #[serde(default)]
    pub parent: Option<u32>,
    #[serde(default)]
    pub is_result: bool,
    #[serde(default)]
    pub outputs: ScenarioOutputs,
}

/// Files produced by a connectivity run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioOutputs {
    pub normalized_current: Option<PathBuf>,
    pub categories: Option<PathBuf>,
    pub cover_summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareTargets {
    pub baseline: Option<u32>,
    pub alternative: Option<u32>,
}

/// A manifest together with the directory its relative paths hang off
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub base_dir: PathBuf,
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<LoadedManifest> {
    let contents = fs::read_to_string(path)?;
    let manifest = parse_manifest(&contents)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(LoadedManifest { manifest, base_dir })
}

pub fn parse_manifest(contents: &str) -> Result<Manifest> {
    serde_yaml::from_str(contents)
        .map_err(|e| Error::Configuration(format!("invalid manifest: {}", e)))
}

impl Manifest {
    /// Validated category table
    pub fn category_table(&self) -> Result<CategoryTable> {
        if self.categories.is_empty() {
            return Err(Error::Configuration("'categories' are required".into()));
        }
        CategoryTable::new(self.categories.clone())
    }

    /// Baseline and alternative identifiers
    pub fn targets(&self) -> Result<(u32, u32)> {
        match (self.compare.baseline, self.compare.alternative) {
            (Some(b), Some(a)) => Ok((b, a)),
            _ => Err(Error::Configuration(
                "'compare.baseline' and 'compare.alternative' scenario ids are required".into(),
            )),
        }
    }

    pub fn options(&self) -> ComparisonOptions {
        ComparisonOptions {
            nodata: self.nodata,
            area_unit: self.area_unit,
            percent_cover: self.percent_cover,
            unknown_categories: self.unknown_categories,
        }
    }

    /// Resolve a comparison target to the run whose outputs should be used.
    ///
    /// A result run is used as is. A parent scenario resolves to its most
    /// recent result run, i.e. the result child with the greatest id.
    pub fn resolve_run(&self, id: u32, label: &str) -> Result<&ScenarioRun> {
        let run = self
            .scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| {
                Error::Configuration(format!("{} scenario {} is not registered", label, id))
            })?;

        if run.is_result {
            return Ok(run);
        }

        self.scenarios
            .iter()
            .filter(|s| s.is_result && s.parent == Some(id))
            .max_by_key(|s| s.id)
            .ok_or_else(|| {
                Error::Configuration(format!("No results were found for the {} scenario", label))
            })
    }
}

impl LoadedManifest {
    /// Absolute or manifest-relative path of a configured file
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
