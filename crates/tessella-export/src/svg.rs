//! SVG export serializer.
//!
//! Converts a [`MosaicState`] into an SVG string with one filled
//! `<polygon>` element per cell, using the [`svg`] crate for document
//! construction and XML escaping.
//!
//! The document is byte-for-byte reproducible for a given state: cells
//! are emitted in store order, coordinates are formatted with Rust's
//! default `f64` formatting (lossless for the pipeline's outputs), and
//! the `svg` crate writes element attributes in sorted order. Cells
//! flagged degenerate (duplicate seed points) are omitted.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::Text;
use svg::node::element::{Description, Polygon, Title};

use tessella_pipeline::{Cell, MosaicState, Rgb};

/// Metadata to embed in the SVG document.
///
/// Both fields are optional.  When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.  Text
/// values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title — emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description — emitted as `<desc>`.
    ///
    /// Typically contains pipeline parameters (site count, RNG seed) so
    /// exported files are distinguishable.
    pub description: Option<&'a str>,
}

/// Build the `points` attribute string for a cell polygon.
///
/// Vertices are emitted as space-separated `x,y` pairs with no trailing
/// whitespace. Returns an empty string for a degenerate cell.
///
/// # Examples
///
/// ```
/// use tessella_export::polygon_points;
/// use tessella_pipeline::{Cell, Point};
///
/// let cell = Cell::new(0, vec![
///     Point::new(25.0, 25.0),
///     Point::new(75.0, 25.0),
///     Point::new(50.0, 43.75),
/// ]);
/// assert_eq!(polygon_points(&cell), "25,25 75,25 50,43.75");
/// ```
#[must_use]
pub fn polygon_points(cell: &Cell) -> String {
    cell.vertices()
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialize a mosaic state into an SVG document string.
///
/// The root element declares the pixel width/height (the region extent,
/// rounded) and a `viewBox` matching the region, so cell coordinates are
/// used as-is. Each non-degenerate [`Cell`] becomes a `<polygon>` with
/// its fill color as `rgb(r,g,b)` and no stroke; degenerate cells are
/// omitted from the output.
///
/// # Examples
///
/// ```
/// use tessella_export::{SvgMetadata, to_svg};
/// use tessella_pipeline::{Cell, ColoredCell, MosaicState, Point, Region, Rgb};
///
/// # fn main() -> Result<(), tessella_pipeline::PipelineError> {
/// let state = MosaicState {
///     version: 1,
///     region: Region::new(0.0, 0.0, 100.0, 100.0)?,
///     cells: vec![ColoredCell {
///         cell: Cell::new(0, vec![
///             Point::new(0.0, 0.0),
///             Point::new(100.0, 0.0),
///             Point::new(50.0, 100.0),
///         ]),
///         color: Rgb::new(255, 0, 0),
///     }],
/// };
/// let svg = to_svg(&state, &SvgMetadata::default());
/// assert!(svg.contains(r#"points="0,0 100,0 50,100""#));
/// assert!(svg.contains(r#"fill="rgb(255,0,0)""#));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn to_svg(state: &MosaicState, metadata: &SvgMetadata<'_>) -> String {
    let region = state.region;
    let mut doc = Document::new()
        .set("width", pixel_extent(region.width()))
        .set("height", pixel_extent(region.height()))
        .set(
            "viewBox",
            (region.x(), region.y(), region.width(), region.height()),
        );

    // Optional <title> element
    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    // Optional <desc> element
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    // One <polygon> per cell in store order; degenerate cells carry no
    // geometry and are skipped.
    for colored in &state.cells {
        if colored.cell.is_empty() {
            continue;
        }
        let polygon = Polygon::new()
            .set("points", polygon_points(&colored.cell))
            .set("fill", fill_value(colored.color))
            .set("stroke", "none");
        doc = doc.add(polygon);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// `fill` attribute value for a cell color.
fn fill_value(color: Rgb) -> String {
    format!("rgb({},{},{})", color.r, color.g, color.b)
}

/// Region extent rounded to whole pixels (at least one).
fn pixel_extent(value: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        value.round().max(1.0) as u32
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tessella_pipeline::{ColoredCell, Point, Region};

    use super::*;

    fn region(w: f64, h: f64) -> Region {
        Region::new(0.0, 0.0, w, h).unwrap()
    }

    fn triangle(site: usize) -> Cell {
        Cell::new(
            site,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 8.5),
            ],
        )
    }

    fn state(cells: Vec<ColoredCell>) -> MosaicState {
        MosaicState {
            version: 1,
            region: region(100.0, 50.0),
            cells,
        }
    }

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    // --- polygon_points ---

    #[test]
    fn polygon_points_empty_cell() {
        assert_eq!(polygon_points(&Cell::degenerate(0)), "");
    }

    #[test]
    fn polygon_points_pairs_are_space_separated() {
        let points = polygon_points(&triangle(0));
        assert_eq!(points, "0,0 10,0 5,8.5");
        assert!(!points.ends_with(' '));
    }

    #[test]
    fn polygon_points_keeps_fractional_coordinates() {
        let cell = Cell::new(0, vec![Point::new(12.25, 7.125), Point::new(3.0, 4.0)]);
        assert_eq!(polygon_points(&cell), "12.25,7.125 3,4");
    }

    // --- Document structure ---

    #[test]
    fn empty_state_produces_valid_svg_with_no_polygons() {
        let svg = to_svg(&state(vec![]), &no_meta());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r#"width="100""#));
        assert!(svg.contains(r#"height="50""#));
        assert!(svg.contains(r#"viewBox="0 0 100 50""#));
        assert!(!svg.contains("<polygon"));
    }

    #[test]
    fn one_polygon_per_colored_cell() {
        let cells = vec![
            ColoredCell {
                cell: triangle(0),
                color: Rgb::new(255, 0, 0),
            },
            ColoredCell {
                cell: Cell::new(
                    1,
                    vec![
                        Point::new(50.0, 0.0),
                        Point::new(100.0, 0.0),
                        Point::new(100.0, 50.0),
                    ],
                ),
                color: Rgb::new(0, 128, 7),
            },
        ];
        let svg = to_svg(&state(cells), &no_meta());
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains(r#"fill="rgb(255,0,0)""#));
        assert!(svg.contains(r#"fill="rgb(0,128,7)""#));
        assert!(svg.contains(r#"stroke="none""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn degenerate_cells_are_omitted() {
        let cells = vec![
            ColoredCell {
                cell: Cell::degenerate(0),
                color: Rgb::new(128, 128, 128),
            },
            ColoredCell {
                cell: triangle(1),
                color: Rgb::new(1, 2, 3),
            },
        ];
        let svg = to_svg(&state(cells), &no_meta());
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert!(!svg.contains("rgb(128,128,128)"));
    }

    #[test]
    fn fractional_region_extent_rounds_to_pixels() {
        let mosaic = MosaicState {
            version: 1,
            region: Region::new(0.0, 0.0, 799.6, 449.5).unwrap(),
            cells: vec![],
        };
        let svg = to_svg(&mosaic, &no_meta());
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains(r#"height="450""#));
    }

    // --- Metadata ---

    #[test]
    fn title_and_desc_emitted_when_present() {
        let meta = SvgMetadata {
            title: Some("sunset"),
            description: Some("3000 sites, seed 0"),
        };
        let svg = to_svg(&state(vec![]), &meta);
        assert!(svg.contains("<title>sunset</title>"));
        assert!(svg.contains("<desc>3000 sites, seed 0</desc>"));
    }

    #[test]
    fn title_and_desc_omitted_when_none() {
        let svg = to_svg(&state(vec![]), &no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
    }

    #[test]
    fn special_characters_in_metadata_are_escaped() {
        let meta = SvgMetadata {
            title: Some("a <b> & c"),
            description: None,
        };
        let svg = to_svg(&state(vec![]), &meta);
        assert!(svg.contains("<title>a &lt;b&gt; &amp; c</title>"));
    }

    // --- Reproducibility ---

    #[test]
    fn export_is_idempotent() {
        let cells = vec![ColoredCell {
            cell: triangle(0),
            color: Rgb::new(12, 200, 99),
        }];
        let mosaic = state(cells);
        let first = to_svg(&mosaic, &no_meta());
        let second = to_svg(&mosaic, &no_meta());
        assert_eq!(first, second);
    }
}
