//! 2D k-d tree for fixed-radius and fixed-window queries
//!
//! Every trend estimator visits each output cell and needs the samples
//! within a search radius of it. The tree turns that from a scan over all
//! samples into a walk over the few nearby ones.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use super::SamplePoint;
use std::cmp::Ordering;

/// A 2D k-d tree over sample points.
///
/// Points are stored in tree order: the median of each slice is its
/// subtree root, alternating between x and y splits by depth.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<SamplePoint>,
}

impl KdTree {
    /// Build a tree in O(n log² n)
    pub fn build(points: &[SamplePoint]) -> Self {
        let mut points = points.to_vec();
        arrange(&mut points, 0);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Visit every point within Euclidean distance `radius` of (qx, qy)
    /// (inclusive), passing the squared distance along.
    pub fn for_each_within_radius<F>(&self, qx: f64, qy: f64, radius: f64, mut visit: F)
    where
        F: FnMut(&SamplePoint, f64),
    {
        let radius_sq = radius * radius;
        self.walk(&self.points, 0, qx, qy, radius, radius, &mut |p| {
            let d = p.dist_sq(qx, qy);
            if d <= radius_sq {
                visit(p, d);
            }
        });
    }

    /// Visit every point inside the axis-aligned window centred on
    /// (qx, qy) with half-widths `half_x`, `half_y` (inclusive).
    pub fn for_each_in_window<F>(&self, qx: f64, qy: f64, half_x: f64, half_y: f64, mut visit: F)
    where
        F: FnMut(&SamplePoint),
    {
        self.walk(&self.points, 0, qx, qy, half_x, half_y, &mut |p| {
            if (p.x - qx).abs() <= half_x && (p.y - qy).abs() <= half_y {
                visit(p);
            }
        });
    }

    /// Points within `radius` of (qx, qy) as (squared distance, point)
    pub fn within_radius(&self, qx: f64, qy: f64, radius: f64) -> Vec<(f64, SamplePoint)> {
        let mut found = Vec::new();
        self.for_each_within_radius(qx, qy, radius, |p, d| found.push((d, *p)));
        found
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &self,
        slice: &[SamplePoint],
        depth: usize,
        qx: f64,
        qy: f64,
        reach_x: f64,
        reach_y: f64,
        candidate: &mut dyn FnMut(&SamplePoint),
    ) {
        if slice.is_empty() {
            return;
        }
        let mid = slice.len() / 2;
        let p = &slice[mid];
        candidate(p);

        let (diff, reach) = if depth % 2 == 0 {
            (qx - p.x, reach_x)
        } else {
            (qy - p.y, reach_y)
        };

        // Left holds coordinates <= split, right holds >= split
        if diff <= reach {
            self.walk(&slice[..mid], depth + 1, qx, qy, reach_x, reach_y, candidate);
        }
        if diff >= -reach {
            self.walk(&slice[mid + 1..], depth + 1, qx, qy, reach_x, reach_y, candidate);
        }
    }
}

fn arrange(points: &mut [SamplePoint], depth: usize) {
    if points.len() <= 1 {
        return;
    }
    let key = |p: &SamplePoint| if depth % 2 == 0 { p.x } else { p.y };
    points.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal));
    let mid = points.len() / 2;
    let (left, right) = points.split_at_mut(mid);
    arrange(left, depth + 1);
    arrange(&mut right[1..], depth + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scatter() -> Vec<SamplePoint> {
        // Deterministic pseudo-random layout
        (0..200)
            .map(|i| {
                let x = ((i * 37) % 101) as f64;
                let y = ((i * 53) % 97) as f64;
                SamplePoint::new(x, y, i as f64)
            })
            .collect()
    }

    #[test]
    fn test_radius_matches_brute_force() {
        let points = scatter();
        let tree = KdTree::build(&points);
        assert_eq!(tree.len(), points.len());

        for &(qx, qy, r) in &[(50.0, 50.0, 10.0), (0.0, 0.0, 15.0), (120.0, -5.0, 30.0), (33.3, 71.2, 0.5)] {
            let mut got: Vec<f64> = tree.within_radius(qx, qy, r).iter().map(|(_, p)| p.value).collect();
            let mut expected: Vec<f64> = points
                .iter()
                .filter(|p| p.dist_sq(qx, qy) <= r * r)
                .map(|p| p.value)
                .collect();
            got.sort_by(|a, b| a.partial_cmp(b).unwrap());
            expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(got, expected, "query ({qx}, {qy}, {r})");
        }
    }

    #[test]
    fn test_window_matches_brute_force() {
        let points = scatter();
        let tree = KdTree::build(&points);

        let mut got = Vec::new();
        tree.for_each_in_window(40.0, 20.0, 12.0, 5.0, |p| got.push(p.value));
        let mut expected: Vec<f64> = points
            .iter()
            .filter(|p| (p.x - 40.0).abs() <= 12.0 && (p.y - 20.0).abs() <= 5.0)
            .map(|p| p.value)
            .collect();
        got.sort_by(|a, b| a.partial_cmp(b).unwrap());
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(got, expected);
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.within_radius(0.0, 0.0, 100.0).is_empty());
    }
}
