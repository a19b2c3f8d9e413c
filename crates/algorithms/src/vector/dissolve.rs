//! Dissolve line features into a single multi-part line

use fluvrem_core::vector::FeatureCollection;
use geo::{Coord, Geometry, LineString, MultiLineString};

/// Endpoints closer than this (map units) are treated as the same node
const NODE_TOLERANCE: f64 = 1e-9;

/// Line parts of a geometry; non-linear geometries have none.
///
/// Parts with fewer than two vertices are skipped.
pub fn line_parts(geom: &Geometry<f64>) -> Vec<LineString<f64>> {
    let parts = match geom {
        Geometry::Line(l) => vec![LineString::from(vec![l.start, l.end])],
        Geometry::LineString(ls) => vec![ls.clone()],
        Geometry::MultiLineString(mls) => mls.0.clone(),
        Geometry::GeometryCollection(gc) => gc.iter().flat_map(line_parts).collect(),
        _ => Vec::new(),
    };
    parts.into_iter().filter(|ls| ls.0.len() >= 2).collect()
}

fn same_node(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() <= NODE_TOLERANCE && (a.y - b.y).abs() <= NODE_TOLERANCE
}

/// Merge the line parts of all features into one multi-line.
///
/// Parts sharing an endpoint are stitched into a single polyline, reversing
/// parts where needed. Stitching is greedy in input order: starting from the
/// first unused part, the first part that continues either end is attached
/// until none does. The result is deterministic for a given input order.
pub fn dissolve_lines(features: &FeatureCollection) -> MultiLineString<f64> {
    let mut pending: Vec<Option<Vec<Coord<f64>>>> = features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .flat_map(line_parts)
        .map(|ls| Some(ls.0))
        .collect();

    let mut merged = Vec::new();
    for i in 0..pending.len() {
        let Some(mut current) = pending[i].take() else {
            continue;
        };

        loop {
            let (Some(&head), Some(&tail)) = (current.first(), current.last()) else {
                break;
            };
            let next = pending.iter().enumerate().skip(i + 1).find_map(|(j, slot)| {
                let part = slot.as_ref()?;
                let (first, last) = (part[0], part[part.len() - 1]);
                [
                    same_node(tail, first),
                    same_node(tail, last),
                    same_node(head, last),
                    same_node(head, first),
                ]
                .iter()
                .position(|&hit| hit)
                .map(|how| (j, how))
            });

            let Some((j, how)) = next else {
                break;
            };
            let Some(mut part) = pending[j].take() else {
                break;
            };
            match how {
                // tail -> part
                0 => current.extend_from_slice(&part[1..]),
                // tail -> reversed part
                1 => {
                    part.reverse();
                    current.extend_from_slice(&part[1..]);
                }
                // part -> head
                2 => {
                    part.extend_from_slice(&current[1..]);
                    current = part;
                }
                // reversed part -> head
                _ => {
                    part.reverse();
                    part.extend_from_slice(&current[1..]);
                    current = part;
                }
            }
        }

        merged.push(LineString::new(current));
    }

    MultiLineString::new(merged)
}
