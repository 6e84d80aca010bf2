//! Rasters derived from vector features
//!
//! - **great_circle**: distance from every cell to the nearest target line
//! - **mask**: 1/0 rasterization of permissive polygons

mod great_circle;
mod mask;

pub use great_circle::GreatCircleProximity;
pub use mask::PolygonMask;

use molchan_core::raster::Raster;
use molchan_core::{FeatureCollection, GridSpec, Result};

/// Builds a distance-to-target raster from line features.
pub trait ProximityRasterizer: Sync {
    fn distance_raster(&self, features: &FeatureCollection, grid: &GridSpec) -> Result<Raster<f64>>;
}

/// Rasterizes polygon features: non-zero inside, zero outside.
pub trait PolygonRasterizer: Sync {
    fn rasterize(&self, features: &FeatureCollection, grid: &GridSpec) -> Result<Raster<f64>>;
}
