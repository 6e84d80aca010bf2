//! # Molchan Core
//!
//! Core types and traits for evaluating raster forecasts against point events.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid type
//! - `GeoTransform`, `Region`, `GridSpec`: lon/lat grid layout
//! - `CRS`: Coordinate Reference System tag
//! - `Feature`, `GeoPoint`, `Observation`: vector inputs
//! - `RasterSequence`: rasters keyed by reconstruction epoch
//! - Algorithm trait for consistent API

pub mod crs;
pub mod error;
pub mod raster;
pub mod sequence;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, GridSpec, Raster, RasterElement, Region};
pub use sequence::RasterSequence;
pub use vector::{AttributeValue, Feature, FeatureCollection, GeoPoint, Observation};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, GridSpec, Raster, RasterElement, Region};
    pub use crate::sequence::RasterSequence;
    pub use crate::vector::{Feature, FeatureCollection, GeoPoint, Observation};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
