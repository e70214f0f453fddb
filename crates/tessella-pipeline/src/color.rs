//! Per-cell color sampling from the source pixel buffer.
//!
//! Each cell is colored by averaging the pixels under its polygon
//! vertices plus its centroid (the vertex mean). This is an
//! approximation — vertex-plus-centroid sampling, not full-area
//! integration — chosen as a precision/performance tradeoff: it reads a
//! handful of pixels per cell instead of rasterizing every cell.
//!
//! Vertices are mapped from region space into buffer space with an
//! affine transform and clamped to the valid index range, so samples on
//! the region boundary (which map to one-past-the-end pixel indices)
//! are recovered locally and never abort a cycle.

use crate::geometry;
use crate::types::{Cell, ColoredCell, PipelineError, PixelBuffer, Point, Region, Rgb};

/// Fallback color substituted for cells whose polygon is empty.
pub const NEUTRAL_GRAY: Rgb = Rgb::new(128, 128, 128);

/// Average the buffer pixels under the cell's vertices and centroid.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyPolygon`] for a zero-vertex cell; the
/// pipeline substitutes [`NEUTRAL_GRAY`] for those. Mapped coordinates
/// that fall outside the buffer are clamped, so
/// [`PipelineError::OutOfBoundsSample`] never escapes this function.
pub fn sample_cell(
    cell: &Cell,
    region: Region,
    buffer: &PixelBuffer<'_>,
) -> Result<Rgb, PipelineError> {
    let Some(centroid) = geometry::vertex_mean(cell.vertices()) else {
        return Err(PipelineError::EmptyPolygon { site: cell.site() });
    };

    let mut sum_r: u64 = 0;
    let mut sum_g: u64 = 0;
    let mut sum_b: u64 = 0;
    let mut samples: u64 = 0;

    for p in cell.vertices().iter().chain(std::iter::once(&centroid)) {
        let (x, y) = map_to_buffer(*p, region, buffer);
        let pixel = buffer.get(x, y)?;
        sum_r += u64::from(pixel.r);
        sum_g += u64::from(pixel.g);
        sum_b += u64::from(pixel.b);
        samples += 1;
    }

    Ok(Rgb::new(
        mean_channel(sum_r, samples),
        mean_channel(sum_g, samples),
        mean_channel(sum_b, samples),
    ))
}

/// Color every cell, substituting [`NEUTRAL_GRAY`] for flagged
/// degenerate cells.
#[must_use = "returns the colored cells"]
pub fn sample_cells(
    cells: Vec<Cell>,
    region: Region,
    buffer: &PixelBuffer<'_>,
) -> Vec<ColoredCell> {
    cells
        .into_iter()
        .map(|cell| {
            let color = sample_cell(&cell, region, buffer).unwrap_or(NEUTRAL_GRAY);
            ColoredCell { cell, color }
        })
        .collect()
}

/// Affine map from region space into buffer pixel indices, clamped to
/// the valid range.
fn map_to_buffer(p: Point, region: Region, buffer: &PixelBuffer<'_>) -> (u32, u32) {
    let x = (p.x - region.x()) / region.width() * f64::from(buffer.width());
    let y = (p.y - region.y()) / region.height() * f64::from(buffer.height());
    (
        clamp_index(x.floor(), buffer.width()),
        clamp_index(y.floor(), buffer.height()),
    )
}

/// Clamp a floored floating-point index into `0..len`.
fn clamp_index(value: f64, len: u32) -> u32 {
    let max = len - 1;
    if value <= 0.0 {
        0
    } else if value >= f64::from(max) {
        max
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            value as u32
        }
    }
}

/// Per-channel mean, rounded to the nearest integer.
fn mean_channel(sum: u64, samples: u64) -> u8 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    {
        (sum as f64 / samples as f64).round() as u8
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn region(x: f64, y: f64, w: f64, h: f64) -> Region {
        Region::new(x, y, w, h).unwrap()
    }

    /// A `width * height` RGB buffer filled by a per-pixel function.
    fn rgb_data(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        data
    }

    fn triangle_cell() -> Cell {
        Cell::new(
            0,
            vec![
                Point::new(10.0, 10.0),
                Point::new(90.0, 10.0),
                Point::new(50.0, 80.0),
            ],
        )
    }

    #[test]
    fn solid_buffer_yields_its_color_for_any_polygon() {
        let data = rgb_data(16, 16, |_, _| [255, 0, 0]);
        let buffer = PixelBuffer::new(&data, 16, 16, 3).unwrap();
        let color = sample_cell(&triangle_cell(), region(0.0, 0.0, 100.0, 100.0), &buffer).unwrap();
        assert_eq!(color, Rgb::new(255, 0, 0));
    }

    #[test]
    fn empty_cell_is_an_error() {
        let data = rgb_data(4, 4, |_, _| [0, 0, 0]);
        let buffer = PixelBuffer::new(&data, 4, 4, 3).unwrap();
        let result = sample_cell(&Cell::degenerate(5), region(0.0, 0.0, 10.0, 10.0), &buffer);
        assert!(matches!(
            result,
            Err(PipelineError::EmptyPolygon { site: 5 }),
        ));
    }

    #[test]
    fn sample_cells_substitutes_gray_for_degenerates() {
        let data = rgb_data(4, 4, |_, _| [10, 20, 30]);
        let buffer = PixelBuffer::new(&data, 4, 4, 3).unwrap();
        let cells = vec![triangle_cell(), Cell::degenerate(1)];
        let colored = sample_cells(cells, region(0.0, 0.0, 100.0, 100.0), &buffer);
        assert_eq!(colored.len(), 2);
        assert_eq!(colored[0].color, Rgb::new(10, 20, 30));
        assert_eq!(colored[1].color, NEUTRAL_GRAY);
        assert!(colored[1].cell.is_empty());
    }

    #[test]
    fn vertices_and_centroid_are_averaged() {
        // Left half black, right half white, 10x10 buffer over a
        // matching region. A square cell spanning both halves samples
        // 2 black vertices, 2 white vertices, and a centroid on the
        // white side of the split (x = 5 maps to the white column).
        let data = rgb_data(10, 10, |x, _| if x < 5 { [0, 0, 0] } else { [255, 255, 255] });
        let buffer = PixelBuffer::new(&data, 10, 10, 3).unwrap();
        let cell = Cell::new(
            0,
            vec![
                Point::new(2.0, 2.0),
                Point::new(8.0, 2.0),
                Point::new(8.0, 8.0),
                Point::new(2.0, 8.0),
            ],
        );
        let color = sample_cell(&cell, region(0.0, 0.0, 10.0, 10.0), &buffer).unwrap();
        // (0 + 255 + 255 + 0 + 255) / 5 = 153
        assert_eq!(color, Rgb::new(153, 153, 153));
    }

    #[test]
    fn boundary_vertices_clamp_instead_of_failing() {
        // Vertices on the region's right/bottom edges map to index
        // `width`/`height`, one past the end; clamping recovers them.
        let data = rgb_data(8, 8, |_, _| [1, 2, 3]);
        let buffer = PixelBuffer::new(&data, 8, 8, 3).unwrap();
        let cell = Cell::new(
            0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
        );
        let color = sample_cell(&cell, region(0.0, 0.0, 100.0, 100.0), &buffer).unwrap();
        assert_eq!(color, Rgb::new(1, 2, 3));
    }

    #[test]
    fn offset_region_uses_relative_coordinates() {
        // Region starts at (50, 50); a cell near its top-left corner
        // must sample the buffer's top-left pixel.
        let data = rgb_data(10, 10, |x, y| if x == 0 && y == 0 { [200, 0, 0] } else { [0, 0, 200] });
        let buffer = PixelBuffer::new(&data, 10, 10, 3).unwrap();
        let cell = Cell::new(
            0,
            vec![
                Point::new(50.0, 50.0),
                Point::new(50.4, 50.0),
                Point::new(50.0, 50.4),
            ],
        );
        let color = sample_cell(&cell, region(50.0, 50.0, 100.0, 100.0), &buffer).unwrap();
        assert_eq!(color, Rgb::new(200, 0, 0));
    }
}
