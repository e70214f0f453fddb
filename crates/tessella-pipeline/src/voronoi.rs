//! Voronoi diagram derivation: the dual of the Delaunay triangulation,
//! clipped to the display region.
//!
//! Each site's cell is assembled by walking its fan of incident
//! triangles counterclockwise through the adjacency table and collecting
//! the circumcenters as candidate cell vertices. Interior sites produce
//! a closed fan; convex-hull sites produce an open fan whose two ends
//! are closed by extending along the outward perpendicular bisectors of
//! the hull edges far beyond the region. Either way the polygon is then
//! clipped against the region's four half-planes.
//!
//! One and two sites have no triangulation; their cells are constructed
//! directly (the whole region, or the region split along the
//! perpendicular bisector).

use crate::delaunay::{self, Triangulation};
use crate::geometry;
use crate::types::{Cell, PipelineError, Point, Region};

/// Scale applied to the region diagonal when extending open fan ends.
/// Large enough that every synthetic vertex lands far outside the clip
/// rectangle.
const EXTENSION_SCALE: f64 = 4.0;

/// Compute one clipped cell per seed point.
///
/// The returned vector has exactly `sites.len()` entries in site order.
/// Duplicate sites yield flagged degenerate cells (see
/// [`Cell::is_empty`]); they are reported, never dropped.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientPoints`] for an empty site list
/// and [`PipelineError::DegenerateInput`] when three or more sites are
/// supplied but all of them are collinear.
pub fn tessellate(sites: &[Point], region: Region) -> Result<Vec<Cell>, PipelineError> {
    match sites.len() {
        0 => Err(PipelineError::InsufficientPoints { needed: 1, got: 0 }),
        1 => Ok(vec![Cell::new(0, region.corners().to_vec())]),
        2 => Ok(two_site_cells(sites[0], sites[1], region)),
        _ => {
            let triangulation = delaunay::triangulate(sites)?;
            Ok(cells_from_triangulation(&triangulation, region))
        }
    }
}

/// Derive all cells from an existing triangulation.
#[must_use]
pub fn cells_from_triangulation(triangulation: &Triangulation, region: Region) -> Vec<Cell> {
    (0..triangulation.sites().len())
        .map(|site| build_cell(triangulation, region, site))
        .collect()
}

/// Two sites split the region along their perpendicular bisector.
///
/// A coincident pair degenerates deterministically: the lower index owns
/// the whole region, the higher one is flagged empty.
fn two_site_cells(a: Point, b: Point, region: Region) -> Vec<Cell> {
    if a == b {
        return vec![
            Cell::new(0, region.corners().to_vec()),
            Cell::degenerate(1),
        ];
    }

    let mid = Point::new(f64::midpoint(a.x, b.x), f64::midpoint(a.y, b.y));
    let toward_b = Point::new(b.x - a.x, b.y - a.y);
    let toward_a = Point::new(a.x - b.x, a.y - b.y);
    let corners = region.corners();

    vec![
        Cell::new(0, geometry::clip_half_plane(&corners, mid, toward_b)),
        Cell::new(1, geometry::clip_half_plane(&corners, mid, toward_a)),
    ]
}

/// Build the clipped cell for one site.
fn build_cell(triangulation: &Triangulation, region: Region, site: usize) -> Cell {
    if triangulation.duplicate_of(site).is_some() {
        return Cell::degenerate(site);
    }
    let Some(start) = triangulation.incident_triangle(site) else {
        return Cell::degenerate(site);
    };

    let (fan, closed) = collect_fan(triangulation, site, start);
    let centers: Vec<Point> = fan
        .iter()
        .filter_map(|&t| triangulation.circumcenter(t))
        .collect();
    if centers.is_empty() {
        return Cell::degenerate(site);
    }

    let polygon = if closed {
        centers
    } else {
        close_open_fan(triangulation, region, site, &fan, centers)
    };

    let clipped = geometry::clip_to_region(&polygon, region);
    if clipped.len() < 3 {
        return Cell::degenerate(site);
    }
    Cell::new(site, clipped)
}

/// Walk the fan of triangles incident to `site` in counterclockwise
/// rotational order.
///
/// Returns the ordered triangle indices and whether the fan closed on
/// itself (interior site) or ran into the convex hull at both ends.
fn collect_fan(triangulation: &Triangulation, site: usize, start: usize) -> (Vec<usize>, bool) {
    let limit = triangulation.triangles().len();
    let mut fan = vec![start];
    let mut closed = false;

    // Counterclockwise sweep: cross the edge entering the site.
    let mut current = start;
    for _ in 0..limit {
        let Some(k) = triangulation.triangles()[current].position_of(site) else {
            break;
        };
        match triangulation.neighbors(current)[(k + 2) % 3] {
            Some(next) if next == start => {
                closed = true;
                break;
            }
            Some(next) => {
                fan.push(next);
                current = next;
            }
            None => break,
        }
    }

    if !closed {
        // Open fan: sweep clockwise from the start to find the other
        // end, then stitch the two halves together in CCW order.
        let mut head = Vec::new();
        let mut current = start;
        for _ in 0..limit {
            let Some(k) = triangulation.triangles()[current].position_of(site) else {
                break;
            };
            match triangulation.neighbors(current)[k] {
                Some(next) => {
                    head.push(next);
                    current = next;
                }
                None => break,
            }
        }
        head.reverse();
        head.extend(fan);
        fan = head;
    }

    (fan, closed)
}

/// Which open end of a hull fan a helper is looking at.
#[derive(Clone, Copy)]
enum FanEnd {
    Clockwise,
    Counterclockwise,
}

/// Close an open (hull) fan into a finite polygon.
///
/// The two end circumcenters are extended along the outward
/// perpendicular bisectors of the hull edges, and one guard vertex along
/// the angular midpoint keeps the closing edges far from the region even
/// when the two rays open nearly 180 degrees. The caller clips the
/// result to the region.
fn close_open_fan(
    triangulation: &Triangulation,
    region: Region,
    site: usize,
    fan: &[usize],
    centers: Vec<Point>,
) -> Vec<Point> {
    let Some((&first, &last)) = fan.first().zip(fan.last()) else {
        return centers;
    };
    let (Some(cw_dir), Some(ccw_dir)) = (
        hull_edge_outward(triangulation, first, site, FanEnd::Clockwise),
        hull_edge_outward(triangulation, last, site, FanEnd::Counterclockwise),
    ) else {
        return centers;
    };

    let anchor = region.center();
    let reach = |from: Point| EXTENSION_SCALE * (region.diagonal() + from.distance(anchor));

    let first_center = centers[0];
    let last_center = centers[centers.len() - 1];
    let site_point = triangulation.sites()[site];

    // Angular midpoint of the opening; when the two rays are nearly
    // opposite the bisector sum cancels, so fall back to the direction
    // that continues the counterclockwise sweep past the CCW ray.
    let sum = Point::new(cw_dir.x + ccw_dir.x, cw_dir.y + ccw_dir.y);
    let guard_dir =
        normalize(sum).unwrap_or_else(|| Point::new(-ccw_dir.y, ccw_dir.x));

    let mut polygon = Vec::with_capacity(centers.len() + 3);
    polygon.push(offset(first_center, cw_dir, reach(first_center)));
    polygon.extend(centers);
    polygon.push(offset(last_center, ccw_dir, reach(last_center)));
    polygon.push(offset(site_point, guard_dir, reach(site_point)));
    polygon
}

/// Outward unit perpendicular of the hull edge at one open end of the
/// fan around `site`.
///
/// Returns `None` only for a degenerate triangle, which the triangulator
/// never emits.
fn hull_edge_outward(
    triangulation: &Triangulation,
    t: usize,
    site: usize,
    end: FanEnd,
) -> Option<Point> {
    let k = triangulation.triangles()[t].position_of(site)?;
    let vertices = triangulation.triangles()[t].vertices;
    let (other, opposite) = match end {
        FanEnd::Clockwise => (vertices[(k + 1) % 3], vertices[(k + 2) % 3]),
        FanEnd::Counterclockwise => (vertices[(k + 2) % 3], vertices[(k + 1) % 3]),
    };

    let p = triangulation.sites()[site];
    let q = triangulation.sites()[other];
    let w = triangulation.sites()[opposite];

    let mut direction = Point::new(-(q.y - p.y), q.x - p.x);
    let mid = Point::new(f64::midpoint(p.x, q.x), f64::midpoint(p.y, q.y));
    if (mid.x - w.x).mul_add(direction.x, (mid.y - w.y) * direction.y) < 0.0 {
        direction = Point::new(-direction.x, -direction.y);
    }
    normalize(direction)
}

fn normalize(v: Point) -> Option<Point> {
    let length = v.x.hypot(v.y);
    if length == 0.0 {
        return None;
    }
    Some(Point::new(v.x / length, v.y / length))
}

fn offset(origin: Point, direction: Point, length: f64) -> Point {
    Point::new(
        direction.x.mul_add(length, origin.x),
        direction.y.mul_add(length, origin.y),
    )
}
