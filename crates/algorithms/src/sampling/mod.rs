//! Point sampling of rasters and of the sphere
//!
//! - **bilinear**: raster values at lon/lat points, NaN where unsampleable
//! - **healpix**: equal-area point distribution used to pool raster values

mod bilinear;
mod healpix;

pub use bilinear::{BilinearParams, BilinearSampler};
pub use healpix::HealpixSampling;

use molchan_core::raster::Raster;
use molchan_core::{GeoPoint, Result};

/// Samples a distance raster at lon/lat points.
///
/// Implementations return exactly one value per point, in point order, with
/// NaN for points that cannot be sampled.
pub trait RasterSampler: Sync {
    fn sample(&self, raster: &Raster<f64>, points: &[GeoPoint]) -> Result<Vec<f64>>;
}

/// A fixed point distribution over the sphere where every point stands for
/// the same surface area.
pub trait SphereSampler {
    fn points(&self) -> Vec<GeoPoint>;
}
