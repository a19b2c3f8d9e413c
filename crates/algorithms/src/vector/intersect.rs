//! Intersection points between line networks

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Centroid, Coord, Intersects, Line, MultiLineString, MultiPoint, Point};

/// Intersection points closer than this (map units) are merged
const MERGE_TOLERANCE: f64 = 1e-9;

/// All points where `a` meets `b`.
///
/// Proper crossings, touches and both ends of collinear overlaps are
/// included. Duplicates (e.g. a crossing exactly at a shared vertex of two
/// segments) are merged. Points are ordered by first occurrence along `a`.
pub fn line_intersections(a: &MultiLineString<f64>, b: &MultiLineString<f64>) -> MultiPoint<f64> {
    let b_segments: Vec<Line<f64>> = b.0.iter().flat_map(|ls| ls.lines()).collect();
    let mut found: Vec<Coord<f64>> = Vec::new();

    let (Some(rect_a), Some(rect_b)) = (a.bounding_rect(), b.bounding_rect()) else {
        return MultiPoint::new(Vec::new());
    };
    if !rect_a.intersects(&rect_b) {
        return MultiPoint::new(Vec::new());
    }

    for seg_a in a.0.iter().flat_map(|ls| ls.lines()) {
        let box_a = seg_a.bounding_rect();
        for seg_b in &b_segments {
            if !box_a.intersects(&seg_b.bounding_rect()) {
                continue;
            }
            match line_intersection(seg_a, *seg_b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    push_unique(&mut found, intersection)
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    push_unique(&mut found, intersection.start);
                    push_unique(&mut found, intersection.end);
                }
                None => {}
            }
        }
    }

    found.into_iter().map(Point::from).collect()
}

fn push_unique(found: &mut Vec<Coord<f64>>, c: Coord<f64>) {
    let seen = found
        .iter()
        .any(|p| (p.x - c.x).abs() <= MERGE_TOLERANCE && (p.y - c.y).abs() <= MERGE_TOLERANCE);
    if !seen {
        found.push(c);
    }
}

/// Collapse a set of intersection points to their centroid
pub fn intersection_centroid(points: &MultiPoint<f64>) -> Option<Point<f64>> {
    points.centroid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::line_string;

    fn assert_point(p: Point<f64>, x: f64, y: f64) {
        assert_abs_diff_eq!(p.x(), x, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y(), y, epsilon = 1e-9);
    }

    fn channel() -> MultiLineString<f64> {
        MultiLineString::new(vec![line_string![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 100.0)
        ]])
    }

    fn xs(coords: Vec<(f64, f64)>) -> MultiLineString<f64> {
        MultiLineString::new(vec![coords.into()])
    }

    #[test]
    fn test_single_crossing() {
        let pts = line_intersections(&channel(), &xs(vec![(40.0, -10.0), (40.0, 10.0)]));
        assert_eq!(pts.0.len(), 1);
        assert_point(pts.0[0], 40.0, 0.0);
    }

    #[test]
    fn test_crossing_at_vertex_is_counted_once() {
        let pts = line_intersections(&channel(), &xs(vec![(90.0, -10.0), (110.0, 10.0)]));
        assert_eq!(pts.0.len(), 1);
        assert_point(pts.0[0], 100.0, 0.0);
    }

    #[test]
    fn test_multiple_crossings_collapse_to_centroid() {
        // Crosses the horizontal leg at x = 80 and the vertical leg at y = 20
        let pts = line_intersections(&channel(), &xs(vec![(80.0, -20.0), (80.0, 20.0), (120.0, 20.0)]));
        assert_eq!(pts.0.len(), 2);
        let c = intersection_centroid(&pts).unwrap();
        assert_point(c, 90.0, 10.0);
    }

    #[test]
    fn test_collinear_overlap_contributes_both_ends() {
        let pts = line_intersections(&channel(), &xs(vec![(20.0, 0.0), (30.0, 0.0)]));
        assert_eq!(pts.0.len(), 2);
        let c = intersection_centroid(&pts).unwrap();
        assert_point(c, 25.0, 0.0);
    }

    #[test]
    fn test_no_intersection() {
        let pts = line_intersections(&channel(), &xs(vec![(-50.0, 50.0), (50.0, 50.0)]));
        assert!(pts.0.is_empty());
        assert!(intersection_centroid(&pts).is_none());
    }
}
