//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;

/// A georeferenced single-band 2D raster grid.
///
/// `Raster<T>` stores cell values of type `T` in row-major order together
/// with its [`GeoTransform`] and an optional no-data sentinel. NaN is
/// always treated as no-data.
///
/// # Example
///
/// ```ignore
/// use fluvrem_core::{GeoTransform, Raster};
///
/// let mut dem: Raster<f64> = Raster::new(100, 100);
/// dem.set_transform(GeoTransform::new(0.0, 1000.0, 10.0, -10.0));
/// dem.set(10, 20, 42.0)?;
/// let z = dem.sample_nearest(205.0, 895.0);
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    /// Affine transformation
    transform: GeoTransform,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a raster from existing data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            transform: GeoTransform::default(),
            nodata: None,
        })
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Cell size along X
    pub fn cell_size_x(&self) -> f64 {
        self.transform.cell_size_x()
    }

    /// Cell size along Y
    pub fn cell_size_y(&self) -> f64 {
        self.transform.cell_size_y()
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    // Coordinate conversion

    /// Convert pixel coordinates to the map coordinates of the cell centre
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Convert map coordinates to fractional pixel coordinates
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.transform.geo_to_pixel(x, y)
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Replace sentinel no-data cells with NaN and record NaN as the
    /// no-data value.
    pub fn normalize_nodata(&mut self) {
        let nodata = self.nodata;
        self.data.mapv_inplace(|v| if v.is_nodata(nodata) { T::nan() } else { v });
        self.nodata = Some(T::nan());
    }

    // Alignment

    /// Whether `other` has the same shape, cell size and origin.
    ///
    /// Cell-by-cell raster algebra between two rasters is only meaningful
    /// when this holds.
    pub fn is_aligned_with<U: RasterElement>(&self, other: &Raster<U>) -> bool {
        self.shape() == other.shape() && self.transform.same_grid(other.transform())
    }

    /// Short human-readable description of the grid, used in error messages
    pub fn grid_description(&self) -> String {
        let t = &self.transform;
        format!(
            "{}x{} cells of {}x{} at ({}, {})",
            self.cols(),
            self.rows(),
            t.cell_size_x(),
            t.cell_size_y(),
            t.origin_x,
            t.origin_y
        )
    }

    // Point sampling

    /// Value of the cell containing map location (x, y).
    ///
    /// The raster extent is closed: a point on the east or south edge reads
    /// the last column or row, as [`Raster::sample_bilinear`] does.
    /// Returns `None` outside the raster or on no-data.
    pub fn sample_nearest(&self, x: f64, y: f64) -> Option<T> {
        let (rows, cols) = self.shape();
        let (col, row) = self.geo_to_pixel(x, y);
        if !(col >= 0.0 && row >= 0.0 && col <= cols as f64 && row <= rows as f64) {
            return None;
        }
        let row = (row.floor() as usize).min(rows.checked_sub(1)?);
        let col = (col.floor() as usize).min(cols.checked_sub(1)?);
        let value = self.data.get((row, col)).copied()?;
        (!self.is_nodata(value)).then_some(value)
    }

    /// Bilinear interpolation between the four cell centres surrounding
    /// map location (x, y).
    ///
    /// Along the outer half-cell border the nearest edge cells are used.
    /// Returns `None` outside the raster or if any contributing cell is
    /// no-data.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> Option<f64> {
        let (rows, cols) = self.shape();
        if rows == 0 || cols == 0 {
            return None;
        }
        let (col, row) = self.geo_to_pixel(x, y);
        if !(col >= 0.0 && row >= 0.0 && col <= cols as f64 && row <= rows as f64) {
            return None;
        }

        // Position relative to cell centres
        let fx = (col - 0.5).clamp(0.0, (cols - 1) as f64);
        let fy = (row - 0.5).clamp(0.0, (rows - 1) as f64);
        let c0 = fx.floor() as usize;
        let r0 = fy.floor() as usize;
        let c1 = (c0 + 1).min(cols - 1);
        let r1 = (r0 + 1).min(rows - 1);
        let dx = fx - c0 as f64;
        let dy = fy - r0 as f64;

        let mut corners = [0.0; 4];
        for (slot, &(r, c)) in corners.iter_mut().zip(&[(r0, c0), (r0, c1), (r1, c0), (r1, c1)]) {
            let v = self.data[(r, c)];
            if self.is_nodata(v) {
                return None;
            }
            *slot = v.to_f64()?;
        }

        let top = corners[0] * (1.0 - dx) + corners[1] * dx;
        let bottom = corners[2] * (1.0 - dx) + corners[3] * dx;
        Some(top * (1.0 - dy) + bottom * dy)
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> RasterStatistics {
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }
            if let Some(v) = value.to_f64() {
                min = Some(min.map_or(v, |m| m.min(v)));
                max = Some(max.map_or(v, |m| m.max(v)));
                sum += v;
                count += 1;
            }
        }

        RasterStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
