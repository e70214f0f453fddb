//! Incremental Delaunay triangulation (Bowyer–Watson).
//!
//! Sites are inserted one at a time into a working triangulation seeded
//! with an enclosing super-triangle. Each insertion removes the *cavity*
//! — every triangle whose circumcircle strictly contains the new site —
//! and re-fans the cavity boundary from the site. Because the cavity is
//! complete, the re-fanned triangles satisfy the empty-circumcircle
//! property directly; no separate edge-flip pass is needed.
//!
//! Degeneracies are handled up front rather than mid-insertion:
//! coincident sites are recorded in a duplicate map (they later become
//! flagged empty cells, see [`crate::voronoi`]), and fully collinear
//! input is rejected. Exact ties from the robust predicates (cocircular
//! sites) leave the tested triangle out of the cavity, so identical
//! input always yields the identical triangulation.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::geometry;
use crate::types::{PipelineError, Point};

/// Minimum number of seed points a triangulation requires.
pub const MIN_SITES: usize = 3;

/// Bounding-box multiple for the super-triangle corners. Shallow hull
/// triangles can have enormous circumcircles; the corners must stay
/// outside them or the finished hull gets notched where a corner fell
/// inside a cavity. The robust predicates stay exact at this scale.
const SUPER_TRIANGLE_SCALE: f64 = 1e4;

/// One triangle: three site indices in counterclockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Site indices, counterclockwise.
    pub vertices: [usize; 3],
}

impl Triangle {
    /// Local position (0–2) of `site` within this triangle, if present.
    #[must_use]
    pub fn position_of(&self, site: usize) -> Option<usize> {
        self.vertices.iter().position(|&v| v == site)
    }
}

/// A Delaunay triangulation over a fixed site array.
///
/// Triangles partition the convex hull of the (distinct) sites without
/// overlap; every edge is shared by at most two triangles. The adjacency
/// table records, for each triangle edge, the triangle on the other side.
#[derive(Debug, Clone)]
pub struct Triangulation {
    sites: Vec<Point>,
    triangles: Vec<Triangle>,
    /// `neighbors[t][j]` is the triangle sharing the edge from vertex `j`
    /// to vertex `(j + 1) % 3` of triangle `t`, or `None` on the hull.
    neighbors: Vec<[Option<usize>; 3]>,
    /// `duplicate_of[i]` is the lowest earlier site index coinciding
    /// with site `i`, or `None` for a distinct site.
    duplicate_of: Vec<Option<usize>>,
    /// One incident triangle per site (entry is `None` for duplicates).
    incident: Vec<Option<usize>>,
}

impl Triangulation {
    /// The seed points this triangulation was built over, duplicates
    /// included.
    #[must_use]
    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    /// All triangles, counterclockwise.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Neighbor table entry for triangle `t`: `result[j]` is the
    /// triangle across the edge from vertex `j` to vertex `(j + 1) % 3`.
    #[must_use]
    pub fn neighbors(&self, t: usize) -> [Option<usize>; 3] {
        self.neighbors[t]
    }

    /// The lowest earlier site index coinciding with `site`, if any.
    #[must_use]
    pub fn duplicate_of(&self, site: usize) -> Option<usize> {
        self.duplicate_of[site]
    }

    /// One triangle incident to `site` (`None` for duplicate sites).
    #[must_use]
    pub fn incident_triangle(&self, site: usize) -> Option<usize> {
        self.incident[site]
    }

    /// The three corner points of triangle `t`.
    #[must_use]
    pub fn triangle_points(&self, t: usize) -> (Point, Point, Point) {
        let [a, b, c] = self.triangles[t].vertices;
        (self.sites[a], self.sites[b], self.sites[c])
    }

    /// Circumcenter of triangle `t`.
    ///
    /// Always `Some` for triangles produced by [`triangulate`], which
    /// never emits zero-area triangles.
    #[must_use]
    pub fn circumcenter(&self, t: usize) -> Option<Point> {
        let (a, b, c) = self.triangle_points(t);
        geometry::circumcenter(a, b, c)
    }
}

/// Build the Delaunay triangulation of `sites`.
///
/// Coincident sites are retained in the site array but excluded from the
/// triangulation itself; [`Triangulation::duplicate_of`] reports them.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientPoints`] for fewer than
/// [`MIN_SITES`] sites and [`PipelineError::DegenerateInput`] when all
/// distinct sites are collinear (no triangulation exists).
pub fn triangulate(sites: &[Point]) -> Result<Triangulation, PipelineError> {
    if sites.len() < MIN_SITES {
        return Err(PipelineError::InsufficientPoints {
            needed: MIN_SITES,
            got: sites.len(),
        });
    }

    let duplicate_of = find_duplicates(sites);
    let distinct: Vec<usize> = (0..sites.len())
        .filter(|&i| duplicate_of[i].is_none())
        .collect();

    if all_collinear(sites, &distinct) {
        return Err(PipelineError::DegenerateInput);
    }

    // Working point array: the sites followed by the three super-triangle
    // corners, which enclose every distinct site.
    let super_base = sites.len();
    let mut points = sites.to_vec();
    points.extend_from_slice(&super_triangle(sites, &distinct));

    let mut tris: Vec<[usize; 3]> = vec![[super_base, super_base + 1, super_base + 2]];
    let mut alive: Vec<bool> = vec![true];

    for &site in &distinct {
        insert_site(site, &points, &mut tris, &mut alive);
    }

    Ok(strip_super_triangle(
        sites,
        duplicate_of,
        super_base,
        &tris,
        &alive,
    ))
}

/// Map each site to the lowest earlier site with bit-identical
/// coordinates.
fn find_duplicates(sites: &[Point]) -> Vec<Option<usize>> {
    let mut seen: HashMap<(u64, u64), usize> = HashMap::with_capacity(sites.len());
    let mut duplicate_of = vec![None; sites.len()];
    for (i, p) in sites.iter().enumerate() {
        match seen.entry((p.x.to_bits(), p.y.to_bits())) {
            Entry::Occupied(first) => duplicate_of[i] = Some(*first.get()),
            Entry::Vacant(slot) => {
                slot.insert(i);
            }
        }
    }
    duplicate_of
}

/// Whether every distinct site lies on one line (fewer than three
/// distinct sites counts as collinear).
fn all_collinear(sites: &[Point], distinct: &[usize]) -> bool {
    let Some((&first, rest)) = distinct.split_first() else {
        return true;
    };
    let a = sites[first];
    let Some(b) = rest.iter().map(|&i| sites[i]).find(|p| *p != a) else {
        return true;
    };
    !rest
        .iter()
        .any(|&i| geometry::orientation(a, b, sites[i]) != 0.0)
}

/// Three corners of a triangle comfortably enclosing all distinct sites.
fn super_triangle(sites: &[Point], distinct: &[usize]) -> [Point; 3] {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &i in distinct {
        min_x = min_x.min(sites[i].x);
        min_y = min_y.min(sites[i].y);
        max_x = max_x.max(sites[i].x);
        max_y = max_y.max(sites[i].y);
    }

    let cx = f64::midpoint(min_x, max_x);
    let cy = f64::midpoint(min_y, max_y);
    let reach = SUPER_TRIANGLE_SCALE * (max_x - min_x).max(max_y - min_y).max(1.0);

    [
        Point::new((-2.0_f64).mul_add(reach, cx), cy - reach),
        Point::new(2.0_f64.mul_add(reach, cx), cy - reach),
        Point::new(cx, 2.0_f64.mul_add(reach, cy)),
    ]
}

/// Insert one site: remove the cavity of circumcircle-violating
/// triangles and re-fan its boundary from the site.
fn insert_site(site: usize, points: &[Point], tris: &mut Vec<[usize; 3]>, alive: &mut Vec<bool>) {
    let p = points[site];

    // Cavity: every live triangle whose circumcircle strictly contains
    // the site. A site interior to the triangulation is strictly inside
    // its containing triangle's circumcircle, so the cavity is non-empty.
    let cavity: Vec<usize> = (0..tris.len())
        .filter(|&t| alive[t])
        .filter(|&t| {
            let [a, b, c] = tris[t];
            geometry::in_circle(points[a], points[b], points[c], p) > 0.0
        })
        .collect();
    if cavity.is_empty() {
        // Unreachable with exact predicates; leave the site
        // untriangulated rather than looping.
        return;
    }

    // Boundary edges appear in exactly one cavity triangle. Their stored
    // direction has the cavity interior on the left, so the re-fanned
    // triangles come out counterclockwise. The ordered map keeps the
    // resulting triangle order independent of hash-seed randomness.
    let mut edges: BTreeMap<(usize, usize), ((usize, usize), u8)> = BTreeMap::new();
    for &t in &cavity {
        let [a, b, c] = tris[t];
        for (u, v) in [(a, b), (b, c), (c, a)] {
            let key = (u.min(v), u.max(v));
            let entry = edges.entry(key).or_insert(((u, v), 0));
            entry.1 += 1;
        }
    }

    for &t in &cavity {
        alive[t] = false;
    }

    for ((u, v), count) in edges.into_values() {
        if count != 1 {
            continue;
        }
        // Skip zero-area fans (site exactly on the boundary line); the
        // neighboring fan triangles still cover the cavity.
        if geometry::orientation(points[u], points[v], p) <= 0.0 {
            continue;
        }
        tris.push([u, v, site]);
        alive.push(true);
    }
}

/// Drop super-triangle triangles, compact the survivors, and build the
/// adjacency and incidence tables.
fn strip_super_triangle(
    sites: &[Point],
    duplicate_of: Vec<Option<usize>>,
    super_base: usize,
    tris: &[[usize; 3]],
    alive: &[bool],
) -> Triangulation {
    let triangles: Vec<Triangle> = tris
        .iter()
        .zip(alive)
        .filter(|&(tri, &keep)| keep && tri.iter().all(|&v| v < super_base))
        .map(|(&vertices, _)| Triangle { vertices })
        .collect();

    let mut neighbors = vec![[None; 3]; triangles.len()];
    let mut incident: Vec<Option<usize>> = vec![None; sites.len()];
    let mut shared: HashMap<(usize, usize), (usize, usize)> = HashMap::new();

    for (t, tri) in triangles.iter().enumerate() {
        let [a, b, c] = tri.vertices;
        for (j, (u, v)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
            if incident[u].is_none() {
                incident[u] = Some(t);
            }
            let key = (u.min(v), u.max(v));
            match shared.entry(key) {
                Entry::Occupied(other) => {
                    let (s, k) = *other.get();
                    neighbors[t][j] = Some(s);
                    neighbors[s][k] = Some(t);
                }
                Entry::Vacant(slot) => {
                    slot.insert((t, j));
                }
            }
        }
    }

    Triangulation {
        sites: sites.to_vec(),
        triangles,
        neighbors,
        duplicate_of,
        incident,
    }
}
