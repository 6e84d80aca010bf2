//! Molchan error diagrams for distance-to-target forecasts
//!
//! - **snapshot**: one raster against a set of observed points
//! - **space_time**: distances pooled over a raster sequence
//! - **sequence**: per-epoch raster generation and combination
//!
//! A Molchan diagram pairs, for every distance threshold, the fraction of the
//! permissible area flagged by the forecast with the fraction of observed
//! events it misses. The skill score integrates that trade-off.

mod sequence;
mod snapshot;
mod space_time;

pub use sequence::{
    combine_raster_sequences, generate_distance_raster_sequence,
    generate_raster_sequence_from_polygons,
};
pub use snapshot::{
    molchan_point, molchan_point_with, molchan_test, molchan_test_with, MolchanResult,
    MolchanTest, PointPercentile,
};
pub use space_time::{
    space_time_distances, space_time_distances_with, space_time_molchan_test,
    space_time_molchan_test_with, SpaceTimeDistance, SpaceTimeMolchanTest, SpaceTimeResult,
};

use crate::statistics::BinSpec;
use molchan_core::{GridSpec, Region, Result};
use serde::{Deserialize, Serialize};

/// Default largest distance threshold (raster distance units, metres)
pub const DEFAULT_DISTANCE_MAX: f64 = 1e7;
/// Default spacing of distance thresholds
pub const DEFAULT_DISTANCE_STEP: f64 = 2e4;
/// Default missing-data search radius of the point sampler (km)
pub const DEFAULT_BUFFER_RADIUS: f64 = 1.0;
/// Default HEALPix resolution for pooling raster samples
pub const DEFAULT_NSIDE: u32 = 128;
/// Default grid spacing of generated rasters (degrees)
pub const DEFAULT_GEOGRAPHIC_SAMPLING: f64 = 0.25;

/// Parameters of the single-snapshot test and of per-point percentiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MolchanParams {
    /// Largest distance threshold
    pub distance_max: f64,
    /// Spacing between distance thresholds
    pub distance_step: f64,
    /// Radius (km) within which a no-data sample may borrow a nearby valid cell
    pub buffer_radius: f64,
}

impl Default for MolchanParams {
    fn default() -> Self {
        Self {
            distance_max: DEFAULT_DISTANCE_MAX,
            distance_step: DEFAULT_DISTANCE_STEP,
            buffer_radius: DEFAULT_BUFFER_RADIUS,
        }
    }
}

impl MolchanParams {
    pub fn bins(&self) -> Result<BinSpec> {
        BinSpec::new(self.distance_max, self.distance_step)
    }
}

/// Parameters of the pooled space-time test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceTimeParams {
    /// HEALPix `nside` of the equal-area sampling points
    pub nside: u32,
    pub distance_max: f64,
    pub distance_step: f64,
}

impl Default for SpaceTimeParams {
    fn default() -> Self {
        Self {
            nside: DEFAULT_NSIDE,
            distance_max: DEFAULT_DISTANCE_MAX,
            distance_step: DEFAULT_DISTANCE_STEP,
        }
    }
}

impl SpaceTimeParams {
    pub fn bins(&self) -> Result<BinSpec> {
        BinSpec::new(self.distance_max, self.distance_step)
    }
}

/// Grid layout of generated raster sequences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceParams {
    /// Cell spacing in degrees
    pub sampling: f64,
    pub region: Region,
}

impl Default for SequenceParams {
    fn default() -> Self {
        Self {
            sampling: DEFAULT_GEOGRAPHIC_SAMPLING,
            region: Region::GLOBAL,
        }
    }
}

impl SequenceParams {
    pub fn grid(&self) -> GridSpec {
        GridSpec::new(self.region, self.sampling)
    }
}

/// The two index-aligned series of a Molchan diagram
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillCurve {
    /// Distance threshold of each entry
    pub thresholds: Vec<f64>,
    /// Area fraction series
    pub grid_fraction: Vec<f64>,
    /// Point fraction series
    pub points_fraction: Vec<f64>,
}

impl SkillCurve {
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Same curve walked in the opposite direction
    pub fn reversed(mut self) -> Self {
        self.thresholds.reverse();
        self.grid_fraction.reverse();
        self.points_fraction.reverse();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let p = MolchanParams::default();
        assert_eq!(p.distance_max, 1e7);
        assert_eq!(p.distance_step, 2e4);
        assert_eq!(p.bins().unwrap().bin_count(), 501);

        let s = SequenceParams::default();
        assert_eq!(s.grid().shape(), (720, 1440));
        assert_eq!(SpaceTimeParams::default().nside, 128);
    }

    #[test]
    fn test_reversed_curve() {
        let curve = SkillCurve {
            thresholds: vec![0.0, 1.0],
            grid_fraction: vec![0.0, 0.5],
            points_fraction: vec![1.0, 0.2],
        }
        .reversed();
        assert_eq!(curve.thresholds, vec![1.0, 0.0]);
        assert_eq!(curve.grid_fraction, vec![0.5, 0.0]);
        assert_eq!(curve.points_fraction, vec![0.2, 1.0]);
    }
}
