//! Regularly spaced points along lines

use fluvrem_core::vector::{Feature, FeatureCollection};
use fluvrem_core::{Error, Result};
use geo::{Euclidean, Length, LineString, MultiLineString, Point};

/// Relative slack when deciding whether the last point still fits on a part
const LENGTH_EPSILON: f64 = 1e-9;

/// Upper bound on the points one call may place
const MAX_POINTS: usize = 10_000_000;

/// Place points every `spacing` map units along each part of `lines`.
///
/// Each part is walked from its first vertex; points fall at arc lengths
/// `0, D, 2D, …` up to and including the part length, giving
/// `floor(L / D) + 1` points on a part of length `L`. Points carry the
/// index of their part (`part`) and their arc length along it (`distance`).
pub fn points_along_lines(lines: &MultiLineString<f64>, spacing: f64) -> Result<FeatureCollection> {
    if !(spacing > 0.0 && spacing.is_finite()) {
        return Err(Error::invalid_parameter(
            "point_distance",
            spacing,
            "must be positive and finite",
        ));
    }

    let parts: Vec<(usize, &LineString<f64>, f64, usize)> = lines
        .0
        .iter()
        .enumerate()
        .filter(|(_, part)| !part.0.is_empty())
        .map(|(i, part)| {
            let length = part.length::<Euclidean>();
            let count = (length / spacing * (1.0 + LENGTH_EPSILON)).floor() as usize;
            (i, part, length, count.saturating_add(1))
        })
        .collect();

    let total = parts.iter().fold(0usize, |acc, p| acc.saturating_add(p.3));
    if total > MAX_POINTS {
        return Err(Error::invalid_parameter(
            "point_distance",
            spacing,
            format!("would place {total} points, more than {MAX_POINTS}"),
        ));
    }

    let mut out = FeatureCollection::new();
    for (part_index, part, length, count) in parts {
        let distances = (0..count).map(|k| (k as f64 * spacing).min(length));
        for (distance, point) in distances.clone().zip(walk(part, distances)) {
            out.push(
                Feature::new(point)
                    .with_property("part", part_index as i64)
                    .with_property("distance", distance),
            );
        }
    }
    Ok(out)
}

/// Points at increasing arc lengths along a line string
fn walk<'a>(
    part: &'a LineString<f64>,
    distances: impl Iterator<Item = f64> + 'a,
) -> impl Iterator<Item = Point<f64>> + 'a {
    let mut segments = part.lines().peekable();
    let mut travelled = 0.0;
    let start = part.0[0];

    distances.map(move |target| {
        while let Some(seg) = segments.peek() {
            let seg_len = seg.dx().hypot(seg.dy());
            if travelled + seg_len >= target && seg_len > 0.0 {
                let t = (target - travelled) / seg_len;
                let x = seg.start.x + t * (seg.end.x - seg.start.x);
                let y = seg.start.y + t * (seg.end.y - seg.start.y);
                return Point::new(x, y);
            }
            travelled += seg_len;
            segments.next();
        }
        // Past the last segment (or a single-vertex part): the end point
        part.0.last().map_or(Point::from(start), |c| Point::from(*c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::line_string;

    fn positions(fc: &FeatureCollection) -> Vec<(f64, f64)> {
        fc.iter()
            .map(|f| match &f.geometry {
                Some(geo::Geometry::Point(p)) => (p.x(), p.y()),
                other => panic!("expected point, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_count_is_floor_plus_one() {
        let mls = MultiLineString::new(vec![line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)]]);
        assert_eq!(points_along_lines(&mls, 50.0).unwrap().len(), 21);
        assert_eq!(points_along_lines(&mls, 300.0).unwrap().len(), 4);
        // Spacing longer than the line: just the start point
        assert_eq!(points_along_lines(&mls, 5000.0).unwrap().len(), 1);
    }

    #[test]
    fn test_points_follow_bends() {
        let mls = MultiLineString::new(vec![line_string![
            (x: 0.0, y: 0.0),
            (x: 3.0, y: 0.0),
            (x: 3.0, y: 4.0)
        ]]);
        let pts = points_along_lines(&mls, 2.0).unwrap();
        let xy = positions(&pts);
        assert_eq!(xy.len(), 4);
        assert_eq!(xy[0], (0.0, 0.0));
        assert_relative_eq!(xy[1].0, 2.0);
        assert_relative_eq!(xy[1].1, 0.0);
        assert_relative_eq!(xy[2].0, 3.0);
        assert_relative_eq!(xy[2].1, 1.0);
        assert_relative_eq!(xy[3].1, 3.0);
        assert_eq!(
            pts.features[3].get_property("distance").and_then(|v| v.as_f64()),
            Some(6.0)
        );
    }

    #[test]
    fn test_each_part_starts_at_zero() {
        let mls = MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 25.0, y: 0.0)],
            line_string![(x: 100.0, y: 0.0), (x: 100.0, y: 10.0)],
        ]);
        let pts = points_along_lines(&mls, 10.0).unwrap();
        assert_eq!(pts.len(), 3 + 2);
        assert_eq!(positions(&pts)[3], (100.0, 0.0));
    }

    #[test]
    fn test_rejects_spacing_that_floods_the_line() {
        let mls = MultiLineString::new(vec![line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)]]);
        let err = points_along_lines(&mls, 1e-9).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "point_distance", .. }));

        // A fine but sane spacing is still accepted
        assert_eq!(points_along_lines(&mls, 0.1).unwrap().len(), 10_001);
    }

    #[test]
    fn test_rejects_non_positive_spacing() {
        let mls = MultiLineString::new(vec![line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]]);
        for bad in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                points_along_lines(&mls, bad),
                Err(Error::InvalidParameter { name: "point_distance", .. })
            ));
        }
    }
}
