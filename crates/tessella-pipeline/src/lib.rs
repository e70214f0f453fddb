//! tessella-pipeline: Pure Voronoi mosaic pipeline (sans-IO).
//!
//! Converts a raster image into a stylized mosaic through:
//! seed scattering -> Delaunay triangulation -> Voronoi dual
//! derivation -> region clipping -> per-cell color sampling.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! pixel buffers and returns structured cell data. Image decoding and
//! file output live with the external collaborators (see
//! `tessella-bench`); vector serialization lives in `tessella-export`.

pub mod color;
pub mod delaunay;
pub mod diagnostics;
pub mod geometry;
pub mod orchestrator;
pub mod pipeline;
pub mod seed;
pub mod store;
pub mod types;
pub mod voronoi;

pub use orchestrator::{CommitOutcome, Frame, Orchestrator, PipelineState};
pub use store::MosaicStore;
pub use types::{
    Cell, ColoredCell, MosaicState, PipelineConfig, PipelineError, PixelBuffer, Point, Region, Rgb,
    RgbaImage,
};

/// Run one full recompute cycle.
///
/// Scatters `config.site_count` seed points over `region` with the
/// config's deterministic RNG, tessellates them into clipped Voronoi
/// cells, and colors each cell from `buffer`. The returned cells are in
/// seed order, one per seed point; duplicate seeds yield flagged
/// degenerate cells colored neutral gray.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientPoints`] if `config.site_count`
/// is zero and [`PipelineError::DegenerateInput`] if all scattered seeds
/// are collinear.
pub fn generate(
    region: Region,
    config: &PipelineConfig,
    buffer: &PixelBuffer<'_>,
) -> Result<Vec<ColoredCell>, PipelineError> {
    let sampled = pipeline::Scattered::new(region, config)
        .tessellate()?
        .sample(buffer);
    Ok(sampled.into_cells())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn solid_red_data(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[255, 0, 0]);
        }
        data
    }

    #[test]
    fn generate_produces_one_cell_per_seed() {
        let region = Region::new(0.0, 0.0, 200.0, 100.0).unwrap();
        let config = PipelineConfig {
            site_count: 50,
            rng_seed: 6,
        };
        let data = solid_red_data(20, 10);
        let buffer = PixelBuffer::new(&data, 20, 10, 3).unwrap();

        let cells = generate(region, &config, &buffer).unwrap();
        assert_eq!(cells.len(), 50);
        for (i, colored) in cells.iter().enumerate() {
            assert_eq!(colored.cell.site(), i);
            assert_eq!(colored.color, Rgb::new(255, 0, 0));
        }
    }

    #[test]
    fn generate_is_deterministic() {
        let region = Region::new(0.0, 0.0, 320.0, 240.0).unwrap();
        let config = PipelineConfig {
            site_count: 120,
            rng_seed: 77,
        };
        let data = solid_red_data(32, 24);
        let buffer = PixelBuffer::new(&data, 32, 24, 3).unwrap();

        let first = generate(region, &config, &buffer).unwrap();
        let second = generate(region, &config, &buffer).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn generate_zero_sites_is_an_error() {
        let region = Region::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let config = PipelineConfig {
            site_count: 0,
            rng_seed: 0,
        };
        let data = solid_red_data(4, 4);
        let buffer = PixelBuffer::new(&data, 4, 4, 3).unwrap();

        assert!(matches!(
            generate(region, &config, &buffer),
            Err(PipelineError::InsufficientPoints { .. }),
        ));
    }

    #[test]
    fn generate_single_site_covers_the_region() {
        let region = Region::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let config = PipelineConfig {
            site_count: 1,
            rng_seed: 5,
        };
        let data = solid_red_data(4, 4);
        let buffer = PixelBuffer::new(&data, 4, 4, 3).unwrap();

        let cells = generate(region, &config, &buffer).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].cell.vertices(), region.corners());
        assert_eq!(cells[0].color, Rgb::new(255, 0, 0));
    }
}
