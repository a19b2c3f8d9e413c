//! Cell-by-cell raster operations
//!
//! - **algebra**: subtraction and division with no-data propagation
//! - **resample**: bilinear resampling onto a template grid
//! - **extract**: raster values at point locations

mod algebra;
mod extract;
mod resample;

pub use algebra::{divide, raster_math, subtract, RasterOp};
pub use extract::{extract_values, SampleMethod};
pub use resample::resample_to;
