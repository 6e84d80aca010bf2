//! Statistics over distance samples and distance rasters
//!
//! - **histogram**: fixed-width binning, cumulative fractions, trapezoidal integral
//! - **contour_area**: surface area at or beyond contour levels of a lon/lat raster

pub mod contour_area;
pub mod histogram;

pub use contour_area::{contour_areas, interpolate_area, ContourArea, ContourVolume, SphericalContourArea};
pub use histogram::{histogram, trapezoid, BinSpec, Histogram};
