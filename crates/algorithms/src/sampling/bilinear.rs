//! Bilinear raster sampling at lon/lat points
//!
//! Interpolates between the four surrounding cell centres. No-data corners
//! drop out and the remaining weights are renormalised, as long as at least
//! half of the weight is left. Otherwise the sampler falls back to the nearest
//! valid cell centre within a great-circle search radius, or reports NaN.
//! Points are never dropped.

use crate::geodesy::{great_circle_distance_km, EARTH_RADIUS_KM};
use crate::maybe_rayon::*;
use molchan_core::raster::Raster;
use molchan_core::{Error, GeoPoint, Result};
use serde::{Deserialize, Serialize};

use super::RasterSampler;

/// Share of the bilinear weight that must fall on valid corners
const MIN_VALID_WEIGHT: f64 = 0.5;

/// Parameters for bilinear sampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BilinearParams {
    /// Radius (km) searched for a valid cell when interpolation hits no-data.
    /// `None` or 0 disables the search.
    pub search_radius_km: Option<f64>,
}

impl Default for BilinearParams {
    fn default() -> Self {
        Self {
            search_radius_km: Some(1.0),
        }
    }
}

/// Linear interpolation with a missing-data search radius
#[derive(Debug, Clone, Copy, Default)]
pub struct BilinearSampler {
    params: BilinearParams,
}

impl BilinearSampler {
    pub fn new(params: BilinearParams) -> Self {
        Self { params }
    }

    /// Sampler with a search radius in km
    pub fn with_radius(search_radius_km: f64) -> Self {
        Self::new(BilinearParams {
            search_radius_km: Some(search_radius_km),
        })
    }

    /// Sampler without the nearest-cell fallback
    pub fn strict() -> Self {
        Self::new(BilinearParams {
            search_radius_km: None,
        })
    }
}

impl RasterSampler for BilinearSampler {
    fn sample(&self, raster: &Raster<f64>, points: &[GeoPoint]) -> Result<Vec<f64>> {
        if !raster.transform().is_north_up() {
            return Err(Error::InvalidInput(
                "bilinear sampling needs a north-up lon/lat raster".into(),
            ));
        }
        let radius = self.params.search_radius_km.filter(|r| *r > 0.0);

        Ok(points
            .par_iter()
            .map(|p| sample_point(raster, *p, radius))
            .collect())
    }
}

/// Column index for a possibly out-of-range column, wrapping on global grids
#[inline]
fn column(i: isize, cols: usize, wraps: bool) -> usize {
    if wraps {
        i.rem_euclid(cols as isize) as usize
    } else {
        i.clamp(0, cols as isize - 1) as usize
    }
}

fn sample_point(raster: &Raster<f64>, p: GeoPoint, radius_km: Option<f64>) -> f64 {
    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 || p.lon.is_nan() || p.lat.is_nan() {
        return f64::NAN;
    }

    let wraps = raster.wraps_longitude();
    let (min_x, min_y, max_x, max_y) = raster.bounds();
    let lon = if wraps {
        min_x + (p.lon - min_x).rem_euclid(360.0)
    } else {
        p.lon
    };
    if lon < min_x || lon > max_x || p.lat < min_y || p.lat > max_y {
        return f64::NAN;
    }

    // Fractional position relative to cell centres
    let (col_f, row_f) = raster.geo_to_pixel(lon, p.lat);
    let y = (row_f - 0.5).clamp(0.0, (rows - 1) as f64);
    let x = if wraps {
        col_f - 0.5
    } else {
        (col_f - 0.5).clamp(0.0, (cols - 1) as f64)
    };

    let r0 = y.floor();
    let fy = y - r0;
    let r0 = r0 as usize;
    let r1 = (r0 + 1).min(rows - 1);

    let c0f = x.floor();
    let fx = x - c0f;
    let c0 = column(c0f as isize, cols, wraps);
    let c1 = column(c0f as isize + 1, cols, wraps);

    let corners = unsafe {
        [
            raster.get_unchecked(r0, c0),
            raster.get_unchecked(r0, c1),
            raster.get_unchecked(r1, c0),
            raster.get_unchecked(r1, c1),
        ]
    };

    let weights = [
        (1.0 - fx) * (1.0 - fy),
        fx * (1.0 - fy),
        (1.0 - fx) * fy,
        fx * fy,
    ];

    // No-data corners get zero weight; the rest are renormalised
    let (sum_wv, sum_w) = corners
        .iter()
        .zip(weights)
        .filter(|&(&v, _)| !raster.is_nodata(v))
        .fold((0.0, 0.0), |(wv, w), (&v, wt)| (wv + wt * v, w + wt));
    if sum_w >= MIN_VALID_WEIGHT {
        return sum_wv / sum_w;
    }

    match radius_km {
        Some(radius) => nearest_valid(raster, GeoPoint::new(lon, p.lat), r0, c0, radius, wraps),
        None => f64::NAN,
    }
}

/// Value of the closest valid cell centre within `radius_km`, or NaN
fn nearest_valid(
    raster: &Raster<f64>,
    p: GeoPoint,
    row: usize,
    col: usize,
    radius_km: f64,
    wraps: bool,
) -> f64 {
    let (rows, cols) = raster.shape();
    let tf = raster.transform();

    let radius_deg = (radius_km / EARTH_RADIUS_KM).to_degrees();
    let dr = (radius_deg / tf.pixel_height.abs()).ceil() as isize + 1;
    let cos_lat = p.lat.to_radians().cos().max(1e-6);
    let dc = ((radius_deg / cos_lat / tf.pixel_width.abs()).ceil() as isize + 1).min(cols as isize);

    let mut best = f64::NAN;
    let mut best_dist = f64::INFINITY;

    for r in (row as isize - dr)..=(row as isize + dr) {
        if r < 0 || r >= rows as isize {
            continue;
        }
        let r = r as usize;
        for c in (col as isize - dc)..=(col as isize + dc) {
            if !wraps && (c < 0 || c >= cols as isize) {
                continue;
            }
            let c = column(c, cols, wraps);
            let v = unsafe { raster.get_unchecked(r, c) };
            if raster.is_nodata(v) {
                continue;
            }
            let (cx, cy) = raster.pixel_to_geo(c, r);
            let d = great_circle_distance_km(p, GeoPoint::new(cx, cy));
            if d <= radius_km && d < best_dist {
                best_dist = d;
                best = v;
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use molchan_core::{GridSpec, Region};

    /// Global 1° grid whose value is the longitude of the cell centre
    fn lon_ramp() -> Raster<f64> {
        let mut raster = Raster::geographic(&GridSpec::new(Region::GLOBAL, 1.0), 0.0).unwrap();
        for row in 0..180 {
            for col in 0..360 {
                let (x, _) = raster.pixel_to_geo(col, row);
                raster.set(row, col, x).unwrap();
            }
        }
        raster
    }

    #[test]
    fn test_bilinear_between_centres() {
        let raster = lon_ramp();
        let out = BilinearSampler::strict()
            .sample(&raster, &[GeoPoint::new(10.25, 5.0), GeoPoint::new(-42.5, -60.0)])
            .unwrap();
        assert_relative_eq!(out[0], 10.25, epsilon = 1e-9);
        assert_relative_eq!(out[1], -42.5, epsilon = 1e-9);
    }

    #[test]
    fn test_longitude_wraps() {
        let raster = Raster::geographic(&GridSpec::new(Region::GLOBAL, 1.0), 7.0).unwrap();
        let out = BilinearSampler::strict()
            .sample(&raster, &[GeoPoint::new(179.9, 0.0), GeoPoint::new(540.0, 0.0)])
            .unwrap();
        assert_relative_eq!(out[0], 7.0);
        assert_relative_eq!(out[1], 7.0);
    }

    #[test]
    fn test_outside_regional_grid_is_nan() {
        let raster = Raster::geographic(&GridSpec::new(Region::new(0.0, 10.0, 0.0, 10.0), 1.0), 1.0).unwrap();
        let out = BilinearSampler::default()
            .sample(&raster, &[GeoPoint::new(20.0, 5.0), GeoPoint::new(5.0, 5.0)])
            .unwrap();
        assert!(out[0].is_nan());
        assert_relative_eq!(out[1], 1.0);
    }

    #[test]
    fn test_nodata_corner_uses_search_radius() {
        let mut raster = Raster::geographic(&GridSpec::new(Region::GLOBAL, 1.0), f64::NAN).unwrap();
        // Only the cell centred on (0.5, 0.5) is valid
        raster.set(89, 180, 3.0).unwrap();
        // The valid corner carries 0.36 of the bilinear weight
        let query = [GeoPoint::new(0.9, 0.9)];

        assert!(BilinearSampler::strict().sample(&raster, &query).unwrap()[0].is_nan());
        assert!(BilinearSampler::with_radius(1.0).sample(&raster, &query).unwrap()[0].is_nan());

        let found = BilinearSampler::with_radius(100.0).sample(&raster, &query).unwrap();
        assert_relative_eq!(found[0], 3.0);
    }

    #[test]
    fn test_nodata_corner_renormalised() {
        let mut raster = Raster::geographic(&GridSpec::new(Region::GLOBAL, 1.0), 5.0).unwrap();
        raster.set_nodata(Some(f64::NAN));
        // Cell centred on (1.5, 0.5)
        raster.set(89, 181, f64::NAN).unwrap();

        let out = BilinearSampler::strict()
            .sample(&raster, &[GeoPoint::new(0.6, 0.4)])
            .unwrap();
        assert_relative_eq!(out[0], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_renormalised_weights_on_ramp() {
        let mut raster = lon_ramp();
        raster.set(89, 181, f64::NAN).unwrap();

        // Corner weights 0.81, 0.09 (no-data), 0.09, 0.01
        let out = BilinearSampler::strict()
            .sample(&raster, &[GeoPoint::new(0.6, 0.4)])
            .unwrap();
        let expected = (0.81 * 0.5 + 0.09 * 0.5 + 0.01 * 1.5) / 0.91;
        assert_relative_eq!(out[0], expected, epsilon = 1e-9);
    }

    #[test]
    fn test_edge_cell_of_masked_raster() {
        // Valid only north of the equator, as after masking with a polygon
        let mut raster = Raster::geographic(&GridSpec::new(Region::GLOBAL, 1.0), f64::NAN).unwrap();
        raster.set_nodata(Some(f64::NAN));
        for row in 0..90 {
            for col in 0..360 {
                raster.set(row, col, 2.0).unwrap();
            }
        }

        let out = BilinearSampler::strict()
            .sample(
                &raster,
                &[GeoPoint::new(10.0, 0.3), GeoPoint::new(10.0, 0.0), GeoPoint::new(10.0, -0.3)],
            )
            .unwrap();
        // Inside the last valid row
        assert_relative_eq!(out[0], 2.0);
        // On the domain edge half of the weight is still valid
        assert_relative_eq!(out[1], 2.0);
        // Inside an invalid cell
        assert!(out[2].is_nan());
    }

    #[test]
    fn test_no_rows_dropped() {
        let raster = Raster::geographic(&GridSpec::new(Region::GLOBAL, 1.0), f64::NAN).unwrap();
        let points = vec![GeoPoint::new(0.0, 0.0); 17];
        let out = BilinearSampler::default().sample(&raster, &points).unwrap();
        assert_eq!(out.len(), 17);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
