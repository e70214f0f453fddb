//! tessella-bench: CLI tool for pipeline parameter experimentation and
//! diagnostics.
//!
//! Runs the mosaic pipeline on a given image file with configurable
//! parameters, printing per-stage diagnostics. Useful for:
//!
//! - Tuning the site count against image detail
//! - Measuring per-stage durations to identify bottlenecks
//! - Verifying reproducibility across runs for a fixed RNG seed
//! - Producing SVG exports outside the app
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin tessella-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tessella_pipeline::diagnostics::{
    CycleDiagnostics, CycleSummary, StageDiagnostics, StageMetrics,
};
use tessella_pipeline::pipeline::Scattered;
use tessella_pipeline::{PipelineConfig, PixelBuffer, Region};

/// Mosaic pipeline experimentation and diagnostics for tessella.
///
/// Decodes the given image, scatters seed points over it, tessellates
/// them into a Voronoi mosaic, and prints per-stage timing and count
/// diagnostics.
#[derive(Parser)]
#[command(name = "tessella-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Number of seed points to scatter.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SITE_COUNT, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    sites: usize,

    /// Seed for the scatter RNG (fixed seed -> identical mosaics).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_RNG_SEED)]
    rng_seed: u64,

    /// Write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = PipelineConfig {
        site_count: cli.sites,
        rng_seed: cli.rng_seed,
    };

    let image = match image::open(&cli.image_path) {
        Ok(image) => image.to_rgba8(),
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let buffer = PixelBuffer::from_rgba(&image);
    let region = match Region::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height())) {
        Ok(region) => region,
        Err(e) => {
            eprintln!("Error deriving display region: {e}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({}x{})",
        cli.image_path.display(),
        image.width(),
        image.height(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let cycle_start = Instant::now();

        let scatter_start = Instant::now();
        let scattered = Scattered::new(region, &config);
        let scatter = StageDiagnostics {
            duration: scatter_start.elapsed(),
            metrics: StageMetrics::Scatter {
                site_count: scattered.seeds().len(),
            },
        };

        let tessellate_start = Instant::now();
        let tessellated = match scattered.tessellate() {
            Ok(tessellated) => tessellated,
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        };
        let degenerate_cells = tessellated.degenerate_count();
        let tessellate = StageDiagnostics {
            duration: tessellate_start.elapsed(),
            metrics: StageMetrics::Tessellate {
                cell_count: tessellated.cells().len(),
                degenerate_cells,
            },
        };

        let sample_start = Instant::now();
        let sampled = tessellated.sample(&buffer);
        let sample = StageDiagnostics {
            duration: sample_start.elapsed(),
            metrics: StageMetrics::Sample {
                cell_count: sampled.cells().len(),
                gray_fallbacks: degenerate_cells,
            },
        };

        let diagnostics = CycleDiagnostics {
            scatter,
            tessellate,
            sample,
            total_duration: cycle_start.elapsed(),
            summary: CycleSummary {
                site_count: config.site_count,
                cell_count: sampled.cells().len(),
                degenerate_cells,
                buffer_width: image.width(),
                buffer_height: image.height(),
            },
        };

        if cli.json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", diagnostics.report());
        }

        // Write SVG on the first run only.
        if run == 0
            && let Some(ref svg_path) = cli.svg
        {
            let title = cli
                .image_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("tessella");
            let desc = format!("{} sites, RNG seed {}", config.site_count, config.rng_seed);
            let metadata = tessella_export::SvgMetadata {
                title: Some(title),
                description: Some(&desc),
            };

            let mut store = tessella_pipeline::MosaicStore::new();
            store.replace(sampled.region(), sampled.into_cells());
            let Some(state) = store.snapshot() else {
                eprintln!("Error: no mosaic state to export");
                return ExitCode::FAILURE;
            };

            let svg = tessella_export::to_svg(&state, &metadata);
            match std::fs::write(svg_path, &svg) {
                Ok(()) => {
                    eprintln!(
                        "SVG written to {} ({} bytes)",
                        svg_path.display(),
                        svg.len(),
                    );
                }
                Err(e) => {
                    eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                }
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    ExitCode::SUCCESS
}
