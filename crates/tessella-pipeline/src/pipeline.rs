//! Incremental cycle driver: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::generate`] which runs a whole recompute cycle in one
//! call, these stage types let the caller drive execution one step at a
//! time:
//!
//! ```rust
//! # use tessella_pipeline::pipeline::Scattered;
//! # use tessella_pipeline::{PipelineConfig, PipelineError, PixelBuffer, Region};
//! # fn run(buffer: PixelBuffer<'_>) -> Result<(), PipelineError> {
//! let region = Region::new(0.0, 0.0, 640.0, 480.0)?;
//! let config = PipelineConfig::default();
//! let sampled = Scattered::new(region, &config)
//!     .tessellate()?
//!     .sample(&buffer);
//!
//! let _cells = sampled.into_cells();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next stage (or
//! `Result` for the fallible tessellation step). All stage data is
//! scratch owned by the cycle: dropping a stage value discards the
//! cycle with no effect on any committed mosaic.

use crate::types::{Cell, ColoredCell, PipelineConfig, PipelineError, PixelBuffer, Point, Region};
use crate::{color, seed, voronoi};

// ───────────────────────── Stage 1: Scattered ────────────────────────

/// Cycle state after seed scattering.
///
/// Call [`tessellate`](Self::tessellate) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing — call .tessellate() to continue"]
pub struct Scattered {
    region: Region,
    seeds: Vec<Point>,
}

impl Scattered {
    /// Scatter seeds over `region` with the config's deterministic RNG.
    pub fn new(region: Region, config: &PipelineConfig) -> Self {
        let seeds = seed::scatter_seeded(region, config.site_count, config.rng_seed);
        Self { region, seeds }
    }

    /// Start a cycle from pre-made seed points (custom samplers, tests).
    pub const fn from_seeds(region: Region, seeds: Vec<Point>) -> Self {
        Self { region, seeds }
    }

    /// The scattered seed points.
    #[must_use]
    pub fn seeds(&self) -> &[Point] {
        &self.seeds
    }

    /// Advance to the tessellation stage: Delaunay triangulation,
    /// Voronoi dual, and region clipping.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InsufficientPoints`] when there are no
    /// seeds at all and [`PipelineError::DegenerateInput`] when three or
    /// more seeds are all collinear.
    pub fn tessellate(self) -> Result<Tessellated, PipelineError> {
        let cells = voronoi::tessellate(&self.seeds, self.region)?;
        Ok(Tessellated {
            region: self.region,
            seeds: self.seeds,
            cells,
        })
    }
}

// ───────────────────────── Stage 2: Tessellated ──────────────────────

/// Cycle state after Voronoi tessellation and clipping.
///
/// Call [`sample`](Self::sample) to advance to the final stage.
#[must_use = "pipeline stages are consumed by advancing — call .sample() to continue"]
pub struct Tessellated {
    region: Region,
    seeds: Vec<Point>,
    cells: Vec<Cell>,
}

impl Tessellated {
    /// The seed points the cells were derived from.
    #[must_use]
    pub fn seeds(&self) -> &[Point] {
        &self.seeds
    }

    /// The clipped cells, one per seed point, in seed order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of flagged degenerate (duplicate-seed) cells.
    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    /// Advance to the color sampling stage.
    ///
    /// Reads the pixel buffer for every cell; degenerate cells get the
    /// neutral gray fallback.
    pub fn sample(self, buffer: &PixelBuffer<'_>) -> Sampled {
        let cells = color::sample_cells(self.cells, self.region, buffer);
        Sampled {
            region: self.region,
            cells,
        }
    }
}

// ───────────────────────── Stage 3: Sampled ──────────────────────────

/// Final cycle state: colored cells ready to commit.
#[must_use = "the sampled cells are the cycle's result — call .into_cells() to take them"]
pub struct Sampled {
    region: Region,
    cells: Vec<ColoredCell>,
}

impl Sampled {
    /// The region the cells partition.
    #[must_use]
    pub const fn region(&self) -> Region {
        self.region
    }

    /// The colored cells, one per seed point, in seed order.
    #[must_use]
    pub fn cells(&self) -> &[ColoredCell] {
        &self.cells
    }

    /// Take ownership of the colored cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<ColoredCell> {
        self.cells
    }
}
