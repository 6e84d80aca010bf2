//! Single-snapshot Molchan test
//!
//! One distance raster is scored against the observed points it is meant to
//! forecast. Thresholds step through distance; at each threshold the area of
//! the permissible domain at or beyond it is compared with the share of points
//! sampled at or beyond it.

use molchan_core::raster::Raster;
use molchan_core::{Algorithm, Error, GeoPoint, Result};
use tracing::{debug, info, warn};

use super::{MolchanParams, SkillCurve};
use crate::geodesy::earth_area_km2;
use crate::sampling::{BilinearSampler, RasterSampler};
use crate::statistics::{
    histogram, interpolate_area, trapezoid, ContourArea, ContourVolume, SphericalContourArea,
};

/// Outcome of [`molchan_test`]
#[derive(Debug, Clone, PartialEq)]
pub struct MolchanResult {
    /// Raster distance sampled at each point, in point order (NaN if unsampled)
    pub distances: Vec<f64>,
    /// Diagram ordered from the largest threshold down to zero
    pub curve: SkillCurve,
    /// Area (km²) of the valid part of the raster
    pub permissible_area_km2: f64,
    pub skill: f64,
}

/// Where a single point falls on a raster's area distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPercentile {
    /// Raster distance sampled at the point
    pub distance: f64,
    /// Share of the permissible area closer to the target than the point
    pub area_fraction: f64,
}

/// Molchan test as an [`Algorithm`]: input is the raster and the observed points
#[derive(Debug, Clone, Copy, Default)]
pub struct MolchanTest;

impl Algorithm for MolchanTest {
    type Input = (Raster<f64>, Vec<GeoPoint>);
    type Output = MolchanResult;
    type Params = MolchanParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "MolchanTest"
    }

    fn description(&self) -> &'static str {
        "Molchan error diagram and skill of a distance raster against observed points"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (raster, points) = input;
        molchan_test(&raster, &points, &params)
    }
}

/// Molchan test with bilinear sampling and spherical contour areas.
///
/// See [`molchan_test_with`].
pub fn molchan_test(
    raster: &Raster<f64>,
    points: &[GeoPoint],
    params: &MolchanParams,
) -> Result<MolchanResult> {
    let sampler = BilinearSampler::with_radius(params.buffer_radius);
    molchan_test_with(&sampler, &SphericalContourArea, raster, points, params)
}

/// Molchan test against caller-supplied sampling and area collaborators.
///
/// With thresholds `0, step, 2·step, …` and `A(d)` the area at or beyond `d`:
///
/// ```text
/// grid_fraction[i]   = 1 - A(d_i) / A(0)
/// points_fraction[i] = 1 - (points with distance < d_{i+1}) / N
/// skill              = 0.5 + ∫ grid_fraction d(points_fraction)
/// ```
///
/// `N` counts every point, so points that could not be sampled are never
/// reached by any threshold. The curve is returned largest threshold first.
///
/// # Errors
/// - [`Error::InvalidParameter`] for a bad threshold layout
/// - [`Error::EmptySample`] when there are no points or the permissible area is zero
pub fn molchan_test_with<S, C>(
    sampler: &S,
    contour: &C,
    raster: &Raster<f64>,
    points: &[GeoPoint],
    params: &MolchanParams,
) -> Result<MolchanResult>
where
    S: RasterSampler + ?Sized,
    C: ContourVolume + ?Sized,
{
    let bins = params.bins()?;
    if points.is_empty() {
        return Err(Error::EmptySample("observed points"));
    }

    let distances = sample_points(sampler, raster, points)?;
    let levels = bins.contour_levels();
    let areas = area_table(contour, raster, &levels)?;
    let permissible = permissible_area(&areas)?;
    report_permissible_area(permissible);

    let grid_fraction: Vec<f64> = areas
        .iter()
        .map(|a| 1.0 - a.area_km2 / permissible)
        .collect();
    let points_fraction =
        histogram(distances.iter().copied(), &bins).exceedance_fraction_over(points.len())?;

    let skill = 0.5 + trapezoid(&grid_fraction, &points_fraction)?;
    debug!(points = points.len(), thresholds = levels.len(), skill, "molchan test");

    let curve = SkillCurve {
        thresholds: levels,
        grid_fraction,
        points_fraction,
    }
    .reversed();

    Ok(MolchanResult {
        distances,
        curve,
        permissible_area_km2: permissible,
        skill,
    })
}

/// Percentile of a single point with the default collaborators.
///
/// See [`molchan_point_with`].
pub fn molchan_point(
    raster: &Raster<f64>,
    points: &[GeoPoint],
    params: &MolchanParams,
) -> Result<PointPercentile> {
    let sampler = BilinearSampler::with_radius(params.buffer_radius);
    molchan_point_with(&sampler, &SphericalContourArea, raster, points, params)
}

/// Sample one point and place it on the raster's area curve.
///
/// `area_fraction = 1 - A(distance) / A(0)`, with `A` linearly interpolated
/// between thresholds and clamped at both ends. An unsampleable point gives
/// NaN for both fields.
///
/// # Errors
/// [`Error::InvalidInput`] unless `points` holds exactly one point.
pub fn molchan_point_with<S, C>(
    sampler: &S,
    contour: &C,
    raster: &Raster<f64>,
    points: &[GeoPoint],
    params: &MolchanParams,
) -> Result<PointPercentile>
where
    S: RasterSampler + ?Sized,
    C: ContourVolume + ?Sized,
{
    if points.len() != 1 {
        return Err(Error::InvalidInput(format!(
            "molchan_point takes exactly one point, got {}",
            points.len()
        )));
    }
    let bins = params.bins()?;

    let distances = sample_points(sampler, raster, points)?;
    let distance = distances[0];
    let areas = area_table(contour, raster, &bins.contour_levels())?;
    let permissible = permissible_area(&areas)?;
    report_permissible_area(permissible);

    let area_fraction = 1.0 - interpolate_area(&areas, distance) / permissible;
    Ok(PointPercentile {
        distance,
        area_fraction,
    })
}

fn sample_points<S>(sampler: &S, raster: &Raster<f64>, points: &[GeoPoint]) -> Result<Vec<f64>>
where
    S: RasterSampler + ?Sized,
{
    let distances = sampler.sample(raster, points)?;
    if distances.len() != points.len() {
        return Err(Error::InvalidInput(format!(
            "sampler returned {} values for {} points",
            distances.len(),
            points.len()
        )));
    }
    Ok(distances)
}

fn area_table<C>(contour: &C, raster: &Raster<f64>, levels: &[f64]) -> Result<Vec<ContourArea>>
where
    C: ContourVolume + ?Sized,
{
    let areas = contour.contour_areas(raster, levels)?;
    if areas.len() != levels.len() {
        return Err(Error::InvalidInput(format!(
            "contour area table has {} entries for {} levels",
            areas.len(),
            levels.len()
        )));
    }
    Ok(areas)
}

/// Area at the zero level, which covers the whole valid domain.
///
/// Only an exact zero is rejected. Negative or NaN areas from a collaborator
/// flow through the fractions unchanged.
fn permissible_area(areas: &[ContourArea]) -> Result<f64> {
    let permissible = areas.first().map_or(0.0, |a| a.area_km2);
    if permissible == 0.0 {
        return Err(Error::EmptySample("permissible area"));
    }
    Ok(permissible)
}

fn report_permissible_area(permissible: f64) {
    let percent = 100.0 * permissible / earth_area_km2();
    if percent.is_finite() {
        info!(
            permissible_area_km2 = permissible,
            "total permissible area is {:.1}% of the Earth's surface", percent
        );
    } else {
        warn!(permissible_area_km2 = permissible, "non-finite permissible area");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use molchan_core::{GridSpec, Region};

    /// Returns fixed distances regardless of the raster
    struct Preset(Vec<f64>);

    impl RasterSampler for Preset {
        fn sample(&self, _raster: &Raster<f64>, points: &[GeoPoint]) -> Result<Vec<f64>> {
            Ok(self.0.iter().copied().take(points.len()).collect())
        }
    }

    /// Returns a fixed area table regardless of the raster
    struct Table(Vec<f64>);

    impl ContourVolume for Table {
        fn contour_areas(&self, _raster: &Raster<f64>, levels: &[f64]) -> Result<Vec<ContourArea>> {
            Ok(levels
                .iter()
                .zip(&self.0)
                .map(|(&threshold, &area_km2)| ContourArea {
                    threshold,
                    area_km2,
                })
                .collect())
        }
    }

    fn small_params() -> MolchanParams {
        // Levels 0, 1, 2, 3
        MolchanParams {
            distance_max: 3.0,
            distance_step: 1.0,
            buffer_radius: 1.0,
        }
    }

    fn dummy_points(n: usize) -> Vec<GeoPoint> {
        (0..n).map(|i| GeoPoint::new(i as f64, 0.0)).collect()
    }

    fn dummy_raster() -> Raster<f64> {
        Raster::filled(2, 2, 0.0)
    }

    #[test]
    fn test_hand_computed_curve() {
        let sampler = Preset(vec![0.5, 1.5, 2.5, f64::NAN]);
        let table = Table(vec![100.0, 60.0, 30.0, 0.0]);
        let result = molchan_test_with(
            &sampler,
            &table,
            &dummy_raster(),
            &dummy_points(4),
            &small_params(),
        )
        .unwrap();

        assert_eq!(result.curve.thresholds, vec![3.0, 2.0, 1.0, 0.0]);
        let expected_grid = [1.0, 0.7, 0.4, 0.0];
        let expected_points = [0.25, 0.5, 0.75, 1.0];
        for i in 0..4 {
            assert_relative_eq!(result.curve.grid_fraction[i], expected_grid[i], epsilon = 1e-12);
            assert_relative_eq!(result.curve.points_fraction[i], expected_points[i], epsilon = 1e-12);
        }
        assert_relative_eq!(result.skill, 0.1, epsilon = 1e-12);
        assert_relative_eq!(result.permissible_area_km2, 100.0);
        assert!(result.distances[3].is_nan());
    }

    #[test]
    fn test_no_points_is_empty_sample() {
        let err = molchan_test_with(
            &Preset(vec![]),
            &Table(vec![1.0, 1.0, 1.0, 1.0]),
            &dummy_raster(),
            &[],
            &small_params(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptySample(_)));
    }

    #[test]
    fn test_zero_permissible_area() {
        let err = molchan_test_with(
            &Preset(vec![0.0]),
            &Table(vec![0.0, 0.0, 0.0, 0.0]),
            &dummy_raster(),
            &dummy_points(1),
            &small_params(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptySample("permissible area")));
    }

    #[test]
    fn test_negative_area_table_flows_through() {
        let result = molchan_test_with(
            &Preset(vec![0.5, 1.5, 2.5, f64::NAN]),
            &Table(vec![-100.0, -99.0, -98.0, -97.0]),
            &dummy_raster(),
            &dummy_points(4),
            &small_params(),
        )
        .unwrap();

        assert_relative_eq!(result.permissible_area_km2, -100.0);
        let expected_grid = [0.03, 0.02, 0.01, 0.0];
        for i in 0..4 {
            assert_relative_eq!(result.curve.grid_fraction[i], expected_grid[i], epsilon = 1e-12);
        }
        // 0.5 - 0.25 · (0.005 + 0.015 + 0.025)
        assert_relative_eq!(result.skill, 0.48875, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_area_table_yields_nan_skill() {
        let table = Table(vec![f64::NAN; 4]);
        let result = molchan_test_with(
            &Preset(vec![0.5]),
            &table,
            &dummy_raster(),
            &dummy_points(1),
            &small_params(),
        )
        .unwrap();
        assert!(result.permissible_area_km2.is_nan());
        assert!(result.skill.is_nan());

        let p = molchan_point_with(
            &Preset(vec![0.5]),
            &table,
            &dummy_raster(),
            &dummy_points(1),
            &small_params(),
        )
        .unwrap();
        assert!(p.area_fraction.is_nan());
    }

    /// Sampler whose backing service is down
    struct Offline;

    impl RasterSampler for Offline {
        fn sample(&self, _raster: &Raster<f64>, _points: &[GeoPoint]) -> Result<Vec<f64>> {
            Err(Error::collaborator("grdtrack", "grid service unreachable"))
        }
    }

    #[test]
    fn test_sampler_failure_surfaces_unchanged() {
        let table = Table(vec![1.0, 1.0, 1.0, 1.0]);
        let err = molchan_test_with(&Offline, &table, &dummy_raster(), &dummy_points(2), &small_params())
            .unwrap_err();
        assert!(matches!(err, Error::Collaborator { name: "grdtrack", .. }));
        assert_eq!(err.to_string(), "grdtrack failed: grid service unreachable");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "grid service unreachable");

        let err = molchan_point_with(&Offline, &table, &dummy_raster(), &dummy_points(1), &small_params())
            .unwrap_err();
        assert_eq!(err.to_string(), "grdtrack failed: grid service unreachable");
    }

    #[test]
    fn test_short_sampler_output_rejected() {
        let err = molchan_test_with(
            &Preset(vec![0.0]),
            &Table(vec![1.0, 1.0, 1.0, 1.0]),
            &dummy_raster(),
            &dummy_points(3),
            &small_params(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_point_interpolates_area() {
        let table = Table(vec![100.0, 60.0, 30.0, 0.0]);
        let p = molchan_point_with(
            &Preset(vec![1.5]),
            &table,
            &dummy_raster(),
            &dummy_points(1),
            &small_params(),
        )
        .unwrap();
        assert_relative_eq!(p.distance, 1.5);
        assert_relative_eq!(p.area_fraction, 0.55, epsilon = 1e-12);

        // Beyond the last level the area clamps to the last entry
        let far = molchan_point_with(
            &Preset(vec![10.0]),
            &table,
            &dummy_raster(),
            &dummy_points(1),
            &small_params(),
        )
        .unwrap();
        assert_relative_eq!(far.area_fraction, 1.0);
    }

    #[test]
    fn test_point_requires_exactly_one() {
        let table = Table(vec![1.0, 1.0, 1.0, 1.0]);
        for n in [0, 2] {
            let err = molchan_point_with(
                &Preset(vec![0.0; n]),
                &table,
                &dummy_raster(),
                &dummy_points(n),
                &small_params(),
            )
            .unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
    }

    #[test]
    fn test_uniform_zero_raster() {
        // Every point sits on the target and every cell has distance 0
        let grid = GridSpec::new(Region::GLOBAL, 10.0);
        let raster = Raster::geographic(&grid, 0.0).unwrap();
        let points = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(45.0, 30.0)];

        let result = molchan_test(&raster, &points, &small_params()).unwrap();
        assert_relative_eq!(result.permissible_area_km2, earth_area_km2(), max_relative = 1e-9);
        assert_relative_eq!(result.skill, 0.0, epsilon = 1e-12);
        assert!(result.distances.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_algorithm_trait() {
        let grid = GridSpec::new(Region::GLOBAL, 10.0);
        let raster = Raster::geographic(&grid, 0.0).unwrap();
        let algo = MolchanTest;
        assert_eq!(algo.name(), "MolchanTest");
        let result = algo
            .execute((raster, vec![GeoPoint::new(0.0, 0.0)]), small_params())
            .unwrap();
        assert_eq!(result.curve.len(), 4);
    }
}
