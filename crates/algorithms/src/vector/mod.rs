//! Vector operations on channel and cross-section lines
//!
//! - Dissolve: merge line features into one stitched multi-part line
//! - Points along lines: regularly spaced points by arc length
//! - Intersections: crossing points of two line networks, and their centroid

mod along;
mod dissolve;
mod intersect;

pub use along::points_along_lines;
pub use dissolve::{dissolve_lines, line_parts};
pub use intersect::{intersection_centroid, line_intersections};
