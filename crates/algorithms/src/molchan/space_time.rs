//! Space-time Molchan test
//!
//! Instead of one raster, every epoch of a sequence is sampled at the same
//! equal-area points and the samples are pooled into a single distribution.
//! Observed points carry the distance measured on the raster of their own
//! epoch (see [`space_time_distances`]).

use molchan_core::{Algorithm, Error, Observation, RasterSequence, Result};
use tracing::debug;

use super::{molchan_point_with, MolchanParams, SkillCurve, SpaceTimeParams};
use crate::maybe_rayon::*;
use crate::sampling::{BilinearSampler, HealpixSampling, RasterSampler, SphereSampler};
use crate::statistics::{histogram, trapezoid, ContourVolume, SphericalContourArea};

/// Outcome of [`space_time_molchan_test`]
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceTimeResult {
    /// Diagram ordered from threshold zero upwards
    pub curve: SkillCurve,
    /// Non-NaN raster samples pooled over all epochs
    pub pooled_sample_count: usize,
    pub skill: f64,
}

/// Distance and area percentile of one observation on its epoch's raster
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceTimeDistance {
    pub label: Option<String>,
    pub time: f64,
    pub distance: f64,
    pub area_fraction: f64,
}

/// Space-time test as an [`Algorithm`]: input is the sequence and the
/// per-observation distances
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceTimeMolchanTest;

impl Algorithm for SpaceTimeMolchanTest {
    type Input = (RasterSequence, Vec<f64>);
    type Output = SpaceTimeResult;
    type Params = SpaceTimeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "SpaceTimeMolchanTest"
    }

    fn description(&self) -> &'static str {
        "Molchan skill of observed distances against raster samples pooled over epochs"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (sequence, point_distances) = input;
        space_time_molchan_test(&sequence, &point_distances, &params)
    }
}

/// Space-time test on HEALPix points with strict bilinear sampling.
///
/// See [`space_time_molchan_test_with`].
pub fn space_time_molchan_test(
    sequence: &RasterSequence,
    point_distances: &[f64],
    params: &SpaceTimeParams,
) -> Result<SpaceTimeResult> {
    let sphere = HealpixSampling::new(params.nside)?;
    space_time_molchan_test_with(&BilinearSampler::strict(), &sphere, sequence, point_distances, params)
}

/// Space-time test against caller-supplied sampling collaborators.
///
/// Every raster is sampled at the sphere points and the non-NaN samples of
/// all epochs are pooled (`M` values). With `N = point_distances.len()`:
///
/// ```text
/// grid_fraction[i]  = (pooled samples < d_{i+1}) / M
/// point_fraction[i] = 1 - (point distances < d_{i+1}) / N
/// skill             = ∫ (1 - grid_fraction) d(1 - point_fraction) - 0.5
/// ```
///
/// # Errors
/// [`Error::EmptySample`] when no raster sample is valid or there are no
/// point distances.
pub fn space_time_molchan_test_with<S, P>(
    sampler: &S,
    sphere: &P,
    sequence: &RasterSequence,
    point_distances: &[f64],
    params: &SpaceTimeParams,
) -> Result<SpaceTimeResult>
where
    S: RasterSampler + ?Sized,
    P: SphereSampler + ?Sized,
{
    let bins = params.bins()?;
    let sphere_points = sphere.points();

    let mut pooled = Vec::new();
    for (time, raster) in sequence.iter() {
        let before = pooled.len();
        pooled.extend(
            sampler
                .sample(raster, &sphere_points)?
                .into_iter()
                .filter(|v| !v.is_nan()),
        );
        debug!(time, valid = pooled.len() - before, "pooled epoch samples");
    }

    if pooled.is_empty() {
        return Err(Error::EmptySample("pooled raster samples"));
    }
    if point_distances.is_empty() {
        return Err(Error::EmptySample("point distances"));
    }

    let grid_fraction =
        histogram(pooled.iter().copied(), &bins).cumulative_fraction_over(pooled.len())?;
    let points_fraction = histogram(point_distances.iter().copied(), &bins)
        .exceedance_fraction_over(point_distances.len())?;

    let hit_area: Vec<f64> = grid_fraction.iter().map(|f| 1.0 - f).collect();
    let hit_points: Vec<f64> = points_fraction.iter().map(|f| 1.0 - f).collect();
    let skill = trapezoid(&hit_area, &hit_points)? - 0.5;
    debug!(
        epochs = sequence.len(),
        pooled = pooled.len(),
        points = point_distances.len(),
        skill,
        "space-time molchan test"
    );

    Ok(SpaceTimeResult {
        curve: SkillCurve {
            thresholds: bins.contour_levels(),
            grid_fraction,
            points_fraction,
        },
        pooled_sample_count: pooled.len(),
        skill,
    })
}

/// Distances of observations on their own epochs with the default collaborators.
///
/// See [`space_time_distances_with`].
pub fn space_time_distances(
    sequence: &RasterSequence,
    observations: &[Observation],
    params: &MolchanParams,
) -> Result<Vec<SpaceTimeDistance>> {
    let sampler = BilinearSampler::with_radius(params.buffer_radius);
    space_time_distances_with(&sampler, &SphericalContourArea, sequence, observations, params)
}

/// Evaluate each observation with [`molchan_point_with`] on the raster of its epoch.
///
/// Output order follows `observations`.
///
/// # Errors
/// [`Error::MissingEpoch`] when an observation's time has no raster.
pub fn space_time_distances_with<S, C>(
    sampler: &S,
    contour: &C,
    sequence: &RasterSequence,
    observations: &[Observation],
    params: &MolchanParams,
) -> Result<Vec<SpaceTimeDistance>>
where
    S: RasterSampler + ?Sized,
    C: ContourVolume + ?Sized,
{
    // Fail before any sampling work if an epoch is missing
    for obs in observations {
        sequence.require(obs.time)?;
    }

    observations
        .par_iter()
        .map(|obs| -> Result<SpaceTimeDistance> {
            let raster = sequence.require(obs.time)?;
            let p = molchan_point_with(sampler, contour, raster, std::slice::from_ref(&obs.point), params)?;
            Ok(SpaceTimeDistance {
                label: obs.label.clone(),
                time: obs.time,
                distance: p.distance,
                area_fraction: p.area_fraction,
            })
        })
        .collect()
}
