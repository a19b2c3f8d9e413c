//! Scattered-point interpolation onto regular grids
//!
//! The trend estimators turn sparse, elevation-tagged channel samples into
//! continuous surfaces:
//! - IDW: inverse distance weighting within a fixed radius
//! - Kernel density: point and value densities under a fixed kernel
//! - TIN: Delaunay triangulation honouring breaklines, rasterized linearly

mod idw;
pub mod kdtree;
mod kernel_density;
mod tin;

pub use idw::{idw, IdwParams};
pub use kdtree::KdTree;
pub use kernel_density::{kernel_density, KernelDensityGrid, KernelShape};
pub use tin::{
    tin_from_breaklines, tin_to_grid, tin_to_raster, Breakline, Tin, TinParams, TinSampling, Triangle,
    MAX_SPLIT_DEPTH,
};

/// A sample point with x, y coordinates and a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Squared Euclidean distance to another point
    #[inline]
    pub fn dist_sq(&self, other_x: f64, other_y: f64) -> f64 {
        let dx = self.x - other_x;
        let dy = self.y - other_y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn dist(&self, other_x: f64, other_y: f64) -> f64 {
        self.dist_sq(other_x, other_y).sqrt()
    }
}
