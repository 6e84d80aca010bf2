//! Raster data structures and operations

mod element;
mod geotransform;
mod grid;
mod region;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use region::{GridSpec, Region};
