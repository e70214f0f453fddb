//! Geometric primitives: robust predicates, circumcenters, and
//! polygon-vs-half-plane clipping.
//!
//! The orientation and in-circle tests delegate to the [`robust`] crate's
//! adaptive-precision implementations, so their *signs* are exact even
//! for nearly collinear or nearly cocircular input. Exact ties (a
//! predicate returning `0.0`) are resolved by the callers with one fixed
//! rule: a point exactly on a circumcircle is *not* inside it, and a
//! point exactly on a clip line is inside the kept half-plane. Identical
//! input therefore always produces identical output.

use robust::Coord;

use crate::types::{Point, Region};

/// Tolerance for collapsing duplicate polygon vertices created by
/// clipping a segment endpoint that already lies on the clip line.
const VERTEX_MERGE_EPSILON: f64 = 1e-9;

const fn coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Orientation of the triple `(a, b, c)`.
///
/// Positive when the points wind counterclockwise (positive signed
/// area), negative when clockwise, exactly zero when collinear.
#[must_use]
pub fn orientation(a: Point, b: Point, c: Point) -> f64 {
    robust::orient2d(coord(a), coord(b), coord(c))
}

/// In-circle test: is `d` strictly inside the circumcircle of the
/// counterclockwise triangle `(a, b, c)`?
///
/// Positive when `d` is strictly inside, negative when strictly outside,
/// exactly zero when cocircular. Callers treat zero as "outside" so
/// cocircular configurations never trigger cavity growth.
#[must_use]
pub fn in_circle(a: Point, b: Point, c: Point, d: Point) -> f64 {
    robust::incircle(coord(a), coord(b), coord(c), coord(d))
}

/// Circumcenter of the triangle `(a, b, c)`.
///
/// Computed with the origin translated to `a` for numerical stability.
/// Returns `None` for a degenerate (zero-area) triangle, which has no
/// circumcircle.
#[must_use]
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let bx = b.x - a.x;
    let by = b.y - a.y;
    let cx = c.x - a.x;
    let cy = c.y - a.y;

    let cross = bx.mul_add(cy, -(by * cx));
    if cross == 0.0 {
        return None;
    }

    let bb = bx.mul_add(bx, by * by);
    let cc = cx.mul_add(cx, cy * cy);
    let d = 0.5 / cross;

    Some(Point::new(
        (cy.mul_add(bb, -(by * cc))).mul_add(d, a.x),
        (bx.mul_add(cc, -(cx * bb))).mul_add(d, a.y),
    ))
}

/// Signed area of a closed polygon (shoelace formula).
///
/// Positive for counterclockwise winding.
#[must_use]
pub fn polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        doubled += a.x.mul_add(b.y, -(b.x * a.y));
    }
    doubled / 2.0
}

/// Arithmetic mean of the polygon vertices.
///
/// This is the "centroid" the color sampler uses. It is deliberately the
/// vertex mean, not the area centroid: the two differ on elongated
/// cells, and the sampled colors must match the documented
/// vertex-plus-centroid approximation.
#[must_use]
pub fn vertex_mean(vertices: &[Point]) -> Option<Point> {
    if vertices.is_empty() {
        return None;
    }
    let mut x = 0.0;
    let mut y = 0.0;
    for p in vertices {
        x += p.x;
        y += p.y;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = vertices.len() as f64;
    Some(Point::new(x / n, y / n))
}

/// Clip a closed polygon against one half-plane (Sutherland–Hodgman).
///
/// The kept side is where `dot(p - origin, normal) <= 0`, i.e. `normal`
/// points *out* of the kept half-plane. Points exactly on the line are
/// kept. Edges crossing the line are split at the intersection point.
///
/// The input must be a simple polygon; the output is its intersection
/// with the half-plane (possibly empty).
#[must_use]
pub fn clip_half_plane(vertices: &[Point], origin: Point, normal: Point) -> Vec<Point> {
    if vertices.is_empty() {
        return Vec::new();
    }

    let signed = |p: Point| (p.x - origin.x).mul_add(normal.x, (p.y - origin.y) * normal.y);

    let mut out = Vec::with_capacity(vertices.len() + 1);
    let mut prev = vertices[vertices.len() - 1];
    let mut prev_dist = signed(prev);

    for &cur in vertices {
        let cur_dist = signed(cur);
        let cur_inside = cur_dist <= 0.0;
        let prev_inside = prev_dist <= 0.0;

        if cur_inside != prev_inside {
            // The edge crosses the line; the denominator is non-zero
            // because exactly one of the two distances is positive.
            let t = prev_dist / (prev_dist - cur_dist);
            out.push(Point::new(
                t.mul_add(cur.x - prev.x, prev.x),
                t.mul_add(cur.y - prev.y, prev.y),
            ));
        }
        if cur_inside {
            out.push(cur);
        }

        prev = cur;
        prev_dist = cur_dist;
    }

    merge_coincident(out)
}

/// Clip a closed polygon to an axis-aligned rectangle by applying the
/// four boundary half-planes in turn.
#[must_use]
pub fn clip_to_region(vertices: &[Point], region: Region) -> Vec<Point> {
    let top_left = Point::new(region.x(), region.y());
    let bottom_right = Point::new(region.right(), region.bottom());

    let mut polygon = clip_half_plane(vertices, top_left, Point::new(0.0, -1.0));
    polygon = clip_half_plane(&polygon, top_left, Point::new(-1.0, 0.0));
    polygon = clip_half_plane(&polygon, bottom_right, Point::new(0.0, 1.0));
    clip_half_plane(&polygon, bottom_right, Point::new(1.0, 0.0))
}

/// Drop consecutive coincident vertices (including last-vs-first), which
/// clipping produces when a segment endpoint lies exactly on a clip line.
fn merge_coincident(vertices: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(vertices.len());
    for p in vertices {
        if let Some(&last) = out.last()
            && (last.x - p.x).abs() <= VERTEX_MERGE_EPSILON
            && (last.y - p.y).abs() <= VERTEX_MERGE_EPSILON
        {
            continue;
        }
        out.push(p);
    }
    if out.len() > 1 {
        let first = out[0];
        let last = out[out.len() - 1];
        if (last.x - first.x).abs() <= VERTEX_MERGE_EPSILON
            && (last.y - first.y).abs() <= VERTEX_MERGE_EPSILON
        {
            out.pop();
        }
    }
    out
}
