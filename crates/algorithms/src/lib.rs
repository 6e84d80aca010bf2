//! # Molchan Algorithms
//!
//! Forecast-skill evaluation of distance-to-target rasters.
//!
//! ## Modules
//!
//! - **molchan**: single-snapshot and space-time Molchan tests, raster sequences
//! - **statistics**: distance histograms and contour areas
//! - **sampling**: raster sampling at points, equal-area sphere points
//! - **proximity**: distance rasters and polygon masks from features
//! - **reconstruction**: features moved to past epochs
//! - **geodesy**: spherical Earth helpers

pub mod geodesy;
pub(crate) mod maybe_rayon;
pub mod molchan;
pub mod proximity;
pub mod reconstruction;
pub mod sampling;
pub mod statistics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::molchan::{
        combine_raster_sequences, generate_distance_raster_sequence,
        generate_raster_sequence_from_polygons, molchan_point, molchan_test,
        space_time_distances, space_time_molchan_test, MolchanParams, MolchanResult,
        MolchanTest, PointPercentile, SequenceParams, SkillCurve, SpaceTimeDistance,
        SpaceTimeMolchanTest, SpaceTimeParams, SpaceTimeResult,
    };
    pub use crate::proximity::{
        GreatCircleProximity, PolygonMask, PolygonRasterizer, ProximityRasterizer,
    };
    pub use crate::reconstruction::{ReconstructionModel, StaticReconstruction};
    pub use crate::sampling::{BilinearSampler, HealpixSampling, RasterSampler, SphereSampler};
    pub use crate::statistics::{ContourVolume, SphericalContourArea};
    pub use molchan_core::prelude::*;
}
