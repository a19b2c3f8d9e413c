//! Affine geotransform for north-up rasters

use serde::{Deserialize, Serialize};

/// Tolerance (in cells) used when comparing grid origins and cell sizes.
const GRID_TOLERANCE: f64 = 1e-6;

/// Affine transformation coefficients for georeferencing rasters.
///
/// Converts between pixel coordinates (col, row) and map coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// DEMs are north-up, so `row_rotation` and `col_rotation` are 0 and
/// `pixel_height` is negative. Cells may be rectangular.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    /// Rotation about X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform with no rotation (north-up image)
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Map coordinates of the centre of cell (col, row)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.fractional_to_geo(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Map coordinates of the upper-left corner of cell (col, row)
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        self.fractional_to_geo(col as f64, row as f64)
    }

    fn fractional_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// Convert map coordinates to fractional pixel coordinates (col, row).
    ///
    /// Integer parts index the cell; `(0.5, 0.5)` is the centre of cell (0, 0).
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;

        if det.abs() < 1e-12 {
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        (col, row)
    }

    /// Cell size along X
    pub fn cell_size_x(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Cell size along Y
    pub fn cell_size_y(&self) -> f64 {
        self.pixel_height.abs()
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of a raster of given dimensions
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.pixel_to_geo_corner(0, 0);
        let (x1, y1) = self.pixel_to_geo_corner(width, 0);
        let (x2, y2) = self.pixel_to_geo_corner(0, height);
        let (x3, y3) = self.pixel_to_geo_corner(width, height);

        let min_x = x0.min(x1).min(x2).min(x3);
        let max_x = x0.max(x1).max(x2).max(x3);
        let min_y = y0.min(y1).min(y2).min(y3);
        let max_y = y0.max(y1).max(y2).max(y3);

        (min_x, min_y, max_x, max_y)
    }

    /// Whether two transforms describe the same grid lattice: equal cell
    /// sizes and origins that coincide (to a millionth of a cell).
    pub fn same_grid(&self, other: &GeoTransform) -> bool {
        let tol_x = GRID_TOLERANCE * self.cell_size_x().max(1e-12);
        let tol_y = GRID_TOLERANCE * self.cell_size_y().max(1e-12);
        (self.pixel_width - other.pixel_width).abs() <= tol_x
            && (self.pixel_height - other.pixel_height).abs() <= tol_y
            && (self.origin_x - other.origin_x).abs() <= tol_x
            && (self.origin_y - other.origin_y).abs() <= tol_y
            && (self.row_rotation - other.row_rotation).abs() < 1e-10
            && (self.col_rotation - other.col_rotation).abs() < 1e-10
    }

    /// Build a north-up transform with the given cell sizes whose cell
    /// boundaries line up with this transform's lattice and whose grid
    /// covers the extent `(min_x, min_y, max_x, max_y)`.
    ///
    /// Returns the transform and the (rows, cols) needed to cover the extent.
    pub fn snapped_grid(
        &self,
        extent: (f64, f64, f64, f64),
        cell_x: f64,
        cell_y: f64,
    ) -> (GeoTransform, usize, usize) {
        let (min_x, min_y, max_x, max_y) = extent;
        let snap_x = |v: f64| self.origin_x + ((v - self.origin_x) / cell_x).floor() * cell_x;
        let snap_y = |v: f64| self.origin_y + ((v - self.origin_y) / cell_y).ceil() * cell_y;

        let origin_x = snap_x(min_x);
        let origin_y = snap_y(max_y);
        let cols = (((max_x - origin_x) / cell_x) - GRID_TOLERANCE).ceil().max(1.0) as usize;
        let rows = (((origin_y - min_y) / cell_y) - GRID_TOLERANCE).ceil().max(1.0) as usize;

        (GeoTransform::new(origin_x, origin_y, cell_x, -cell_y), rows, cols)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
