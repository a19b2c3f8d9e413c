//! TIN (Triangulated Irregular Network) construction and rasterization
//!
//! Builds a conforming Delaunay triangulation from hard breaklines (and
//! optional mass points) and interpolates within each triangle using
//! barycentric coordinates for linear interpolation.
//!
//! The triangulation uses a simple incremental Bowyer-Watson algorithm.
//! Breakline segments that do not come out as triangulation edges are
//! split at their midpoint and the triangulation rebuilt, so the final
//! surface follows every breakline exactly.

use std::collections::{HashMap, HashSet};

use fluvrem_core::raster::{GeoTransform, Raster};
use fluvrem_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SamplePoint;
use crate::maybe_rayon::fill_rows;

/// Rounds of midpoint splitting before a breakline is given up on
pub const MAX_SPLIT_DEPTH: usize = 12;

/// Parameters for TIN rasterization
#[derive(Debug, Clone)]
pub struct TinParams {
    /// Output raster rows
    pub rows: usize,
    /// Output raster columns
    pub cols: usize,
    /// Output raster geotransform
    pub transform: GeoTransform,
}

impl Default for TinParams {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 100,
            transform: GeoTransform::default(),
        }
    }
}

/// Output resolution of [`tin_to_raster`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TinSampling {
    /// Number of cells along the longer side of the TIN extent
    Observations(usize),
    /// Square cells of this size in map units
    CellSize(f64),
}

impl Default for TinSampling {
    fn default() -> Self {
        TinSampling::Observations(250)
    }
}

impl TinSampling {
    /// Grid covering `extent` (min_x, min_y, max_x, max_y), anchored at its
    /// upper-left corner.
    pub fn grid_for(&self, extent: (f64, f64, f64, f64)) -> Result<TinParams> {
        let (min_x, min_y, max_x, max_y) = extent;
        let width = max_x - min_x;
        let height = max_y - min_y;

        let cell = match *self {
            TinSampling::Observations(0) => {
                return Err(Error::invalid_parameter("observations", 0, "must be at least 1"))
            }
            TinSampling::Observations(n) => width.max(height) / n as f64,
            TinSampling::CellSize(c) if c > 0.0 && c.is_finite() => c,
            TinSampling::CellSize(c) => {
                return Err(Error::invalid_parameter("cell_size", c, "must be positive and finite"))
            }
        };
        if !(cell > 0.0 && cell.is_finite()) {
            return Err(Error::Algorithm(format!(
                "TIN extent {width} x {height} is degenerate"
            )));
        }

        let cols = (width / cell).ceil().max(1.0) as usize;
        let rows = (height / cell).ceil().max(1.0) as usize;
        Ok(TinParams {
            rows,
            cols,
            transform: GeoTransform::new(min_x, max_y, cell, -cell),
        })
    }
}

/// A polyline whose segments must appear as triangulation edges
#[derive(Debug, Clone, PartialEq)]
pub struct Breakline {
    pub vertices: Vec<SamplePoint>,
}

impl Breakline {
    pub fn new(vertices: Vec<SamplePoint>) -> Self {
        Self { vertices }
    }

    /// Breakline through `coords` with every vertex at elevation `z`
    pub fn level<I>(coords: I, z: f64) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            vertices: coords
                .into_iter()
                .map(|(x, y)| SamplePoint::new(x, y, z))
                .collect(),
        }
    }
}

/// A triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub v0: usize,
    pub v1: usize,
    pub v2: usize,
}

impl Triangle {
    fn edges(&self) -> [(usize, usize); 3] {
        [
            undirected(self.v0, self.v1),
            undirected(self.v1, self.v2),
            undirected(self.v2, self.v0),
        ]
    }
}

fn undirected(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A triangulated surface
#[derive(Debug, Clone)]
pub struct Tin {
    vertices: Vec<SamplePoint>,
    triangles: Vec<Triangle>,
    conforming: bool,
}

impl Tin {
    pub fn vertices(&self) -> &[SamplePoint] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Whether every breakline segment is represented by triangulation edges
    pub fn is_conforming(&self) -> bool {
        self.conforming
    }

    /// The three corner points of a triangle
    pub fn corners(&self, tri: &Triangle) -> [SamplePoint; 3] {
        [
            self.vertices[tri.v0],
            self.vertices[tri.v1],
            self.vertices[tri.v2],
        ]
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of the triangulated vertices
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        self.triangles
            .iter()
            .flat_map(|t| self.corners(t))
            .fold(
                (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
                |(a, b, c, d), p| (a.min(p.x), b.min(p.y), c.max(p.x), d.max(p.y)),
            )
    }

    /// Linear interpolation at (x, y); `None` outside the triangulation
    pub fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        self.triangles.iter().find_map(|t| {
            let [p0, p1, p2] = self.corners(t);
            let (u, v, w) = barycentric(x, y, &p0, &p1, &p2);
            inside(u, v, w).then(|| u * p0.value + v * p1.value + w * p2.value)
        })
    }
}

/// Deduplicates vertices by exact coordinates, keeping the first value seen
#[derive(Default)]
struct VertexIndex {
    vertices: Vec<SamplePoint>,
    lookup: HashMap<(u64, u64), usize>,
}

impl VertexIndex {
    fn intern(&mut self, p: SamplePoint) -> usize {
        // +0.0 folds -0.0 onto 0.0
        let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
        *self.lookup.entry(key).or_insert_with(|| {
            self.vertices.push(p);
            self.vertices.len() - 1
        })
    }
}

/// Circumcircle of a triangle
#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

/// Compute the circumcircle of three points
fn circumcircle(p0: &SamplePoint, p1: &SamplePoint, p2: &SamplePoint) -> Option<Circumcircle> {
    let (ax, ay) = (p0.x, p0.y);
    let (bx, by) = (p1.x, p1.y);
    let (cx, cy) = (p2.x, p2.y);

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-12 {
        return None; // Degenerate triangle
    }

    let ux = ((ax * ax + ay * ay) * (by - cy)
        + (bx * bx + by * by) * (cy - ay)
        + (cx * cx + cy * cy) * (ay - by))
        / d;

    let uy = ((ax * ax + ay * ay) * (cx - bx)
        + (bx * bx + by * by) * (ax - cx)
        + (cx * cx + cy * cy) * (bx - ax))
        / d;

    let dx = ax - ux;
    let dy = ay - uy;

    Some(Circumcircle {
        cx: ux,
        cy: uy,
        radius_sq: dx * dx + dy * dy,
    })
}

/// Compute barycentric coordinates of point (px, py) within triangle (p0, p1, p2)
///
/// Returns (u, v, w) where the interpolated value is u*v0 + v*v1 + w*v2
fn barycentric(
    px: f64,
    py: f64,
    p0: &SamplePoint,
    p1: &SamplePoint,
    p2: &SamplePoint,
) -> (f64, f64, f64) {
    let v0x = p1.x - p0.x;
    let v0y = p1.y - p0.y;
    let v1x = p2.x - p0.x;
    let v1y = p2.y - p0.y;
    let v2x = px - p0.x;
    let v2y = py - p0.y;

    let dot00 = v0x * v0x + v0y * v0y;
    let dot01 = v0x * v1x + v0y * v1y;
    let dot02 = v0x * v2x + v0y * v2y;
    let dot11 = v1x * v1x + v1y * v1y;
    let dot12 = v1x * v2x + v1y * v2y;

    let inv_denom = 1.0 / (dot00 * dot11 - dot01 * dot01);
    let v = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let w = (dot00 * dot12 - dot01 * dot02) * inv_denom;
    let u = 1.0 - v - w;

    (u, v, w)
}

#[inline]
fn inside(u: f64, v: f64, w: f64) -> bool {
    const EPS: f64 = -1e-10;
    u >= EPS && v >= EPS && w >= EPS
}

fn twice_area(p0: &SamplePoint, p1: &SamplePoint, p2: &SamplePoint) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// Build Delaunay triangulation using Bowyer-Watson algorithm
fn delaunay(points: &[SamplePoint]) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }

    // Find bounding box
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;

    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    // Work in coordinates local to the bounding box; projected map
    // coordinates are large enough to spoil the circumcircle test.
    let local: Vec<SamplePoint> = points
        .iter()
        .map(|p| SamplePoint::new(p.x - min_x, p.y - min_y, p.value))
        .collect();

    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta = dx.max(dy).max(1.0);

    // Create super-triangle vertices (indices 0, 1, 2)
    let mut vertices: Vec<SamplePoint> = vec![
        SamplePoint::new(-20.0 * delta, -delta, 0.0),
        SamplePoint::new(0.5 * dx, dy + 20.0 * delta, 0.0),
        SamplePoint::new(dx + 20.0 * delta, -delta, 0.0),
    ];

    let mut triangles: Vec<Triangle> = vec![Triangle { v0: 0, v1: 1, v2: 2 }];

    // Add each point incrementally
    for point in &local {
        let vi = vertices.len(); // Index of new vertex
        vertices.push(*point);

        // Find triangles whose circumcircle contains the new point
        let bad_triangles: Vec<usize> = triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| {
                circumcircle(&vertices[tri.v0], &vertices[tri.v1], &vertices[tri.v2])
                    .map(|cc| {
                        let dx = point.x - cc.cx;
                        let dy = point.y - cc.cy;
                        dx * dx + dy * dy <= cc.radius_sq
                    })
                    .unwrap_or(false)
            })
            .map(|(ti, _)| ti)
            .collect();

        // Boundary polygon of the hole: edges not shared by two bad triangles
        let mut boundary: Vec<(usize, usize)> = Vec::new();

        for &bi in &bad_triangles {
            let tri = &triangles[bi];
            let edges = [(tri.v0, tri.v1), (tri.v1, tri.v2), (tri.v2, tri.v0)];

            for &(ea, eb) in &edges {
                let shared = bad_triangles.iter().any(|&oi| {
                    oi != bi && triangles[oi].edges().contains(&undirected(ea, eb))
                });

                if !shared {
                    boundary.push((ea, eb));
                }
            }
        }

        // Remove bad triangles (in reverse order to preserve indices)
        let mut bad_triangles = bad_triangles;
        bad_triangles.sort_unstable_by(|a, b| b.cmp(a));
        for bi in bad_triangles {
            triangles.swap_remove(bi);
        }

        // Create new triangles from boundary edges to new vertex
        for &(ea, eb) in &boundary {
            triangles.push(Triangle {
                v0: ea,
                v1: eb,
                v2: vi,
            });
        }
    }

    // Remove triangles that reference super-triangle vertices (0, 1, 2)
    // and slivers with no area
    triangles.retain(|tri| {
        tri.v0 >= 3
            && tri.v1 >= 3
            && tri.v2 >= 3
            && twice_area(&vertices[tri.v0], &vertices[tri.v1], &vertices[tri.v2]).abs()
                > 1e-12 * delta * delta
    });

    // Remap vertex indices (subtract 3 for the super-triangle offset)
    for tri in &mut triangles {
        tri.v0 -= 3;
        tri.v1 -= 3;
        tri.v2 -= 3;
    }

    triangles
}

/// Split segments at any vertex lying strictly inside them, so that no
/// breakline passes through a vertex without stopping there.
fn split_through_vertices(
    vertices: &[SamplePoint],
    segments: Vec<(usize, usize)>,
) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(segments.len());
    for (a, b) in segments {
        let (pa, pb) = (vertices[a], vertices[b]);
        let (sx, sy) = (pb.x - pa.x, pb.y - pa.y);
        let len_sq = sx * sx + sy * sy;

        let mut stops: Vec<(f64, usize)> = vertices
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != a && i != b)
            .filter_map(|(i, p)| {
                let (px, py) = (p.x - pa.x, p.y - pa.y);
                let t = (px * sx + py * sy) / len_sq;
                let cross = px * sy - py * sx;
                (t > 1e-9 && t < 1.0 - 1e-9 && cross.abs() <= 1e-9 * len_sq).then_some((t, i))
            })
            .collect();
        stops.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut from = a;
        for (_, i) in stops {
            out.push((from, i));
            from = i;
        }
        out.push((from, b));
    }
    out
}

/// Build a conforming Delaunay TIN.
///
/// Every breakline vertex (deduplicated by coordinates) and every mass point
/// becomes a TIN vertex. Breakline segments missing from the Delaunay
/// triangulation are split at their midpoint, with the elevation
/// interpolated along the segment, and the triangulation is rebuilt. After
/// [`MAX_SPLIT_DEPTH`] rounds the TIN is returned as is with
/// [`Tin::is_conforming`] false (crossing breaklines cannot both be honoured).
///
/// # Errors
/// `InsufficientSamples` when fewer than 3 non-collinear vertices are given.
pub fn tin_from_breaklines(breaklines: &[Breakline], mass_points: &[SamplePoint]) -> Result<Tin> {
    let mut index = VertexIndex::default();
    let mut segments = Vec::new();

    for line in breaklines {
        let ids: Vec<usize> = line.vertices.iter().map(|p| index.intern(*p)).collect();
        segments.extend(
            ids.windows(2)
                .filter(|w| w[0] != w[1])
                .map(|w| (w[0], w[1])),
        );
    }
    for p in mass_points {
        index.intern(*p);
    }

    let mut vertices = index.vertices;
    let insufficient = |found| Error::InsufficientSamples {
        estimator: "TIN",
        required: 3,
        found,
    };
    if vertices.len() < 3 {
        return Err(insufficient(vertices.len()));
    }

    let mut segments = split_through_vertices(&vertices, segments);
    let mut depth = 0;

    loop {
        let triangles = delaunay(&vertices);
        if triangles.is_empty() {
            // Every vertex on one line
            return Err(insufficient(vertices.len()));
        }

        let edges: HashSet<(usize, usize)> = triangles.iter().flat_map(|t| t.edges()).collect();
        let (present, missing): (Vec<_>, Vec<_>) = segments
            .into_iter()
            .partition(|&(a, b)| edges.contains(&undirected(a, b)));

        if missing.is_empty() || depth == MAX_SPLIT_DEPTH {
            let conforming = missing.is_empty();
            if !conforming {
                warn!(
                    segments = missing.len(),
                    depth, "breakline segments could not be enforced in the TIN"
                );
            }
            debug!(
                vertices = vertices.len(),
                triangles = triangles.len(),
                splits = depth,
                "built TIN"
            );
            return Ok(Tin {
                vertices,
                triangles,
                conforming,
            });
        }

        depth += 1;
        segments = present;
        for (a, b) in missing {
            let (pa, pb) = (vertices[a], vertices[b]);
            let mid = vertices.len();
            vertices.push(SamplePoint::new(
                0.5 * (pa.x + pb.x),
                0.5 * (pa.y + pb.y),
                0.5 * (pa.value + pb.value),
            ));
            segments.push((a, mid));
            segments.push((mid, b));
        }
    }
}

/// Rasterize a TIN onto an explicit grid.
///
/// Each cell centre is interpolated linearly within its enclosing triangle.
/// Cells outside the triangulation are NaN.
pub fn tin_to_grid(tin: &Tin, params: &TinParams) -> Result<Raster<f64>> {
    let TinParams {
        rows,
        cols,
        transform,
    } = *params;

    let boxes: Vec<(f64, f64, f64, f64)> = tin
        .triangles
        .iter()
        .map(|t| {
            let [p0, p1, p2] = tin.corners(t);
            (
                p0.x.min(p1.x).min(p2.x),
                p0.y.min(p1.y).min(p2.y),
                p0.x.max(p1.x).max(p2.x),
                p0.y.max(p1.y).max(p2.y),
            )
        })
        .collect();

    let data = fill_rows(rows, cols, |row, out| {
        let (_, cy) = transform.pixel_to_geo(0, row);

        for (tri, &(bx0, by0, bx1, by1)) in tin.triangles.iter().zip(&boxes) {
            if cy < by0 || cy > by1 {
                continue;
            }
            // Columns whose centres fall within the triangle's x-range
            let (c0, _) = transform.geo_to_pixel(bx0, cy);
            let (c1, _) = transform.geo_to_pixel(bx1, cy);
            let first = (c0 - 0.5).ceil().max(0.0) as usize;
            let last = (c1 - 0.5).floor();
            if last < 0.0 {
                continue;
            }
            let last = (last as usize).min(cols.saturating_sub(1));

            let [p0, p1, p2] = tin.corners(tri);
            for col in first..=last {
                if !out[col].is_nan() {
                    continue;
                }
                let (cx, _) = transform.pixel_to_geo(col, row);
                let (u, v, w) = barycentric(cx, cy, &p0, &p1, &p2);
                if inside(u, v, w) {
                    out[col] = u * p0.value + v * p1.value + w * p2.value;
                }
            }
        }
    });

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(transform);
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// Rasterize a TIN over its own extent at the given sampling
pub fn tin_to_raster(tin: &Tin, sampling: TinSampling) -> Result<Raster<f64>> {
    let params = sampling.grid_for(tin.extent())?;
    debug!(
        rows = params.rows,
        cols = params.cols,
        cell = params.transform.cell_size_x(),
        "rasterizing TIN"
    );
    tin_to_grid(tin, &params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_points() -> Vec<SamplePoint> {
        vec![
            SamplePoint::new(0.0, 10.0, 10.0),  // top-left
            SamplePoint::new(10.0, 10.0, 20.0), // top-right
            SamplePoint::new(0.0, 0.0, 30.0),   // bottom-left
            SamplePoint::new(10.0, 0.0, 40.0),  // bottom-right
        ]
    }

    /// Two level cross-sections: z = 0 along y = 0 and z = 10 along y = 10
    fn two_sections() -> Vec<Breakline> {
        vec![
            Breakline::level([(0.0, 0.0), (10.0, 0.0)], 0.0),
            Breakline::level([(0.0, 10.0), (10.0, 10.0)], 10.0),
        ]
    }

    #[test]
    fn test_delaunay_basic() {
        let tris = delaunay(&corner_points());

        // 4 points should produce 2 triangles
        assert_eq!(tris.len(), 2, "Expected 2 triangles, got {}", tris.len());
    }

    #[test]
    fn test_delaunay_large_coordinates() {
        let pts: Vec<SamplePoint> = corner_points()
            .into_iter()
            .map(|p| SamplePoint::new(p.x + 450_000.0, p.y + 5_200_000.0, p.value))
            .collect();
        assert_eq!(delaunay(&pts).len(), 2);
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let p0 = SamplePoint::new(0.0, 0.0, 1.0);
        let p1 = SamplePoint::new(10.0, 0.0, 2.0);
        let p2 = SamplePoint::new(0.0, 10.0, 3.0);

        let (u, v, w) = barycentric(0.0, 0.0, &p0, &p1, &p2);
        assert!((u - 1.0).abs() < 1e-10);
        assert!(v.abs() < 1e-10);
        assert!(w.abs() < 1e-10);

        let (u, v, w) = barycentric(10.0 / 3.0, 10.0 / 3.0, &p0, &p1, &p2);
        assert!((u - 1.0 / 3.0).abs() < 1e-10);
        assert!((v - 1.0 / 3.0).abs() < 1e-10);
        assert!((w - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_interpolates_between_sections() {
        let tin = tin_from_breaklines(&two_sections(), &[]).unwrap();
        assert!(tin.is_conforming());
        assert_eq!(tin.vertices().len(), 4);
        assert_eq!(tin.triangles().len(), 2);

        let z = tin.interpolate(5.0, 2.5).unwrap();
        assert!((z - 2.5).abs() < 1e-9, "got {z}");
        assert!(tin.interpolate(5.0, 11.0).is_none());
    }

    #[test]
    fn test_breakline_is_enforced() {
        // Plain Delaunay joins the two mass points across the breakline.
        let lines = vec![Breakline::level([(0.0, 0.0), (10.0, 0.0)], 5.0)];
        let mass = [
            SamplePoint::new(5.0, 1.0, 100.0),
            SamplePoint::new(5.0, -1.0, 0.0),
        ];

        let plain = delaunay(&[lines[0].vertices[0], lines[0].vertices[1], mass[0], mass[1]]);
        assert!(!plain
            .iter()
            .flat_map(|t| t.edges())
            .any(|e| e == (0, 1)));

        let tin = tin_from_breaklines(&lines, &mass).unwrap();
        assert!(tin.is_conforming());
        // One midpoint was inserted
        assert_eq!(tin.vertices().len(), 5);
        for x in [1.0, 2.5, 5.0, 7.5, 9.0] {
            let z = tin.interpolate(x, 0.0).unwrap();
            assert!((z - 5.0).abs() < 1e-9, "z({x}, 0) = {z}");
        }
    }

    #[test]
    fn test_shared_vertices_are_merged() {
        let lines = vec![
            Breakline::level([(0.0, 0.0), (10.0, 0.0)], 1.0),
            Breakline::level([(10.0, 0.0), (10.0, 10.0)], 1.0),
            Breakline::level([(-0.0, 0.0), (0.0, 10.0)], 1.0),
        ];
        let tin = tin_from_breaklines(&lines, &[]).unwrap();
        assert_eq!(tin.vertices().len(), 4);
    }

    #[test]
    fn test_vertex_on_breakline_splits_it() {
        let lines = vec![Breakline::level([(0.0, 0.0), (10.0, 0.0)], 2.0)];
        let mass = [
            SamplePoint::new(5.0, 0.0, 2.0),
            SamplePoint::new(5.0, 5.0, 7.0),
        ];
        let tin = tin_from_breaklines(&lines, &mass).unwrap();
        assert!(tin.is_conforming());
        assert_eq!(tin.vertices().len(), 4);
    }

    #[test]
    fn test_collinear_input_is_insufficient() {
        let lines = vec![Breakline::level([(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)], 3.0)];
        let err = tin_from_breaklines(&lines, &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientSamples { required: 3, found: 3, .. }
        ));

        let err = tin_from_breaklines(&[], &[SamplePoint::new(0.0, 0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, Error::InsufficientSamples { found: 1, .. }));
    }

    #[test]
    fn test_tin_to_raster_observations() {
        let tin = tin_from_breaklines(&two_sections(), &[]).unwrap();
        let raster = tin_to_raster(&tin, TinSampling::Observations(10)).unwrap();

        assert_eq!(raster.shape(), (10, 10));
        assert_eq!(raster.cell_size_x(), 1.0);
        // Row 2 centre is y = 7.5; the surface is z = y
        for col in 0..10 {
            let z = raster.get(2, col).unwrap();
            assert!((z - 7.5).abs() < 1e-9, "col {col}: {z}");
        }
    }

    #[test]
    fn test_tin_to_grid_outside_hull_is_nan() {
        let tin = tin_from_breaklines(&two_sections(), &[]).unwrap();
        let params = TinParams {
            rows: 12,
            cols: 12,
            transform: GeoTransform::new(-1.0, 11.0, 1.0, -1.0),
        };
        let raster = tin_to_grid(&tin, &params).unwrap();

        assert!(raster.get(0, 0).unwrap().is_nan());
        assert!(raster.get(5, 11).unwrap().is_nan());
        assert!((raster.get(6, 6).unwrap() - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_sampling_rejects_bad_values() {
        let extent = (0.0, 0.0, 10.0, 5.0);
        assert!(TinSampling::Observations(0).grid_for(extent).is_err());
        assert!(TinSampling::CellSize(-1.0).grid_for(extent).is_err());

        let grid = TinSampling::CellSize(2.0).grid_for(extent).unwrap();
        assert_eq!((grid.rows, grid.cols), (3, 5));
    }
}
