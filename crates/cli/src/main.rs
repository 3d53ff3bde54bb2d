//! connimpact CLI - compare baseline and alternative connectivity scenarios

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use connimpact_algorithms::cover::CoverSummaryRow;
use connimpact_algorithms::jaccard::MaskOverlap;
use connimpact_algorithms::mask::category_mask;
use connimpact_algorithms::report::{assemble_report, ComparisonInputs, ScenarioProducts};
use connimpact_core::io::read_geotiff;
use connimpact_core::{Raster, RasterElement};

use config::{load_manifest, LoadedManifest, ScenarioRun};
use output::{write_index, write_report, ReportIndex};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "connimpact")]
#[command(author, version, about = "Connectivity scenario comparison", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the baseline and alternative scenarios named in a manifest
    Compare {
        /// Comparison manifest (YAML)
        manifest: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Jaccard dissimilarity of one category between two category rasters
    Jaccard {
        /// Baseline category raster
        baseline: PathBuf,
        /// Alternative category raster
        alternative: PathBuf,
        /// Class id to compare
        #[arg(short, long = "class")]
        class_id: i32,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn read_raster<T: RasterElement>(path: &Path) -> Result<Raster<T>> {
    let pb = spinner(&format!("Reading {}...", path.display()))?;
    let raster: Raster<T> = read_geotiff(path, None)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {} ({})", raster.cols(), raster.rows(), path.display());
    Ok(raster)
}

fn read_cover_summary(path: &Path) -> Result<Vec<CoverSummaryRow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cover summary {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid cover summary {}", path.display()))
}

/// Load whichever outputs a resolved run declares.
fn load_products(loaded: &LoadedManifest, run: &ScenarioRun) -> Result<ScenarioProducts> {
    let outputs = &run.outputs;
    let normalized_current = outputs
        .normalized_current
        .as_deref()
        .map(|p| read_raster::<f64>(&loaded.resolve_path(p)))
        .transpose()?;
    let categories = outputs
        .categories
        .as_deref()
        .map(|p| read_raster::<i32>(&loaded.resolve_path(p)))
        .transpose()?;
    let cover_summary = outputs
        .cover_summary
        .as_deref()
        .map(|p| read_cover_summary(&loaded.resolve_path(p)))
        .transpose()?;

    Ok(ScenarioProducts {
        normalized_current,
        categories,
        cover_summary,
    })
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn compare(manifest_path: &Path, output_dir: &Path) -> Result<()> {
    let loaded = load_manifest(manifest_path)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;
    let manifest = &loaded.manifest;

    let categories = manifest.category_table()?;
    let (baseline_id, alternative_id) = manifest.targets()?;
    let baseline_run = manifest.resolve_run(baseline_id, "Baseline")?;
    let alternative_run = manifest.resolve_run(alternative_id, "Alternative")?;
    info!(
        "Comparing run {} (baseline {}) with run {} (alternative {})",
        baseline_run.id, baseline_id, alternative_run.id, alternative_id
    );

    let inputs = ComparisonInputs {
        categories,
        baseline: load_products(&loaded, baseline_run)?,
        alternative: load_products(&loaded, alternative_run)?,
        options: manifest.options(),
    };

    let start = Instant::now();
    let pb = spinner("Comparing scenarios...")?;
    let report = assemble_report(&inputs).context("Comparison failed")?;
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    let pb = spinner("Writing outputs...")?;
    let mut files = write_report(&report, output_dir)?;
    let index = write_index(
        &ReportIndex {
            baseline_run: baseline_run.id,
            alternative_run: alternative_run.id,
            files: files.clone(),
            skipped: &report.skipped,
            unknown_classes: &report.unknown_classes,
        },
        output_dir,
    )?;
    files.push(index);
    pb.finish_and_clear();

    for file in &files {
        println!("  {}", file.display());
    }
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.product.label(), skipped.reason);
    }
    done("Comparison", output_dir, elapsed);
    Ok(())
}

fn info_command(input: &Path) -> Result<()> {
    let raster = read_raster::<f64>(input)?;
    let (rows, cols) = raster.shape();
    let bounds = raster.bounds();
    let stats = raster.statistics();

    println!("File: {}", input.display());
    println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
    println!("Cell size: {}", raster.cell_size());
    println!("Cell area: {}", raster.cell_area());
    println!(
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    );
    if let Some(crs) = raster.crs() {
        println!("CRS: {}", crs);
    }
    if let Some(nodata) = raster.nodata() {
        println!("NoData: {}", nodata);
    }
    println!("\nStatistics:");
    if let Some(min) = stats.min {
        println!("  Min: {:.4}", min);
    }
    if let Some(max) = stats.max {
        println!("  Max: {:.4}", max);
    }
    if let Some(mean) = stats.mean {
        println!("  Mean: {:.4}", mean);
    }
    if !raster.is_empty() {
        println!(
            "  Valid cells: {} ({:.1}%)",
            stats.valid_count,
            100.0 * stats.valid_count as f64 / raster.len() as f64
        );
    }
    Ok(())
}

fn jaccard_command(baseline: &Path, alternative: &Path, class_id: i32) -> Result<()> {
    let base = read_raster::<i32>(baseline)?;
    let alt = read_raster::<i32>(alternative)?;

    let base_mask = category_mask(&base, class_id);
    let alt_mask = category_mask(&alt, class_id);
    let overlap =
        MaskOverlap::between(&base_mask, &alt_mask).context("Failed to compare category masks")?;

    println!("Class: {}", class_id);
    println!("  Intersection: {} cells", overlap.intersection);
    println!("  Union: {} cells", overlap.union);
    match overlap.dissimilarity() {
        Some(d) => println!("  Jaccard dissimilarity: {:.6}", d),
        None => println!("  Jaccard dissimilarity: undefined (class absent from both rasters)"),
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Compare { manifest, output } => compare(&manifest, &output)?,
        Commands::Info { input } => info_command(&input)?,
        Commands::Jaccard {
            baseline,
            alternative,
            class_id,
        } => jaccard_command(&baseline, &alternative, class_id)?,
    }

    Ok(())
}
