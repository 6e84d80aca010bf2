//! Surface area of a lon/lat raster at or beyond contour levels
//!
//! For a distance raster, the area at level `d` is the part of the valid
//! (permissible) domain lying at least `d` away from the target. Level 0 is
//! therefore the whole permissible area, and areas shrink as `d` grows.

use crate::geodesy::cell_area_km2;
use crate::maybe_rayon::*;
use molchan_core::raster::Raster;
use molchan_core::{Error, Result};

/// Area (km²) of valid cells whose value is at or above `threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourArea {
    pub threshold: f64,
    pub area_km2: f64,
}

/// Computes the area table of a raster for ascending contour levels.
pub trait ContourVolume: Sync {
    fn contour_areas(&self, raster: &Raster<f64>, levels: &[f64]) -> Result<Vec<ContourArea>>;
}

/// Contour areas on a sphere of mean Earth radius, one lon/lat cell at a time.
///
/// Each valid cell contributes its full spherical area to every level not
/// exceeding its value (cells are not split along contour lines).
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalContourArea;

impl ContourVolume for SphericalContourArea {
    fn contour_areas(&self, raster: &Raster<f64>, levels: &[f64]) -> Result<Vec<ContourArea>> {
        contour_areas(raster, levels)
    }
}

/// Area (km²) at or beyond each of the ascending `levels`.
pub fn contour_areas(raster: &Raster<f64>, levels: &[f64]) -> Result<Vec<ContourArea>> {
    if levels.is_empty() {
        return Err(Error::InvalidParameter {
            name: "levels",
            value: "[]".into(),
            reason: "at least one contour level is required".into(),
        });
    }
    if levels.iter().any(|l| l.is_nan()) || levels.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidParameter {
            name: "levels",
            value: format!("{} levels", levels.len()),
            reason: "contour levels must be strictly ascending".into(),
        });
    }

    let (rows, cols) = raster.shape();
    let tf = *raster.transform();
    if !tf.is_north_up() {
        return Err(Error::InvalidInput(
            "contour areas need a north-up lon/lat raster".into(),
        ));
    }
    let d_lon = tf.pixel_width.abs();
    let nlevels = levels.len();

    // Per row: area of cells whose highest reached level is i
    let row_buckets: Vec<Vec<f64>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            let mut bucket = vec![0.0; nlevels];
            let (north, south) = tf.row_latitudes(row);
            let cell_area = cell_area_km2(north, south, d_lon);

            for col in 0..cols {
                let v = unsafe { raster.get_unchecked(row, col) };
                if raster.is_nodata(v) {
                    continue;
                }
                let reached = levels.partition_point(|&l| l <= v);
                if reached > 0 {
                    bucket[reached - 1] += cell_area;
                }
            }
            bucket
        })
        .collect();

    let mut highest = vec![0.0; nlevels];
    for bucket in &row_buckets {
        for (acc, a) in highest.iter_mut().zip(bucket) {
            *acc += a;
        }
    }

    // Suffix sums: a cell reaching level i also counts for every lower level
    let mut areas = vec![0.0; nlevels];
    let mut running = 0.0;
    for i in (0..nlevels).rev() {
        running += highest[i];
        areas[i] = running;
    }

    Ok(levels
        .iter()
        .zip(areas)
        .map(|(&threshold, area_km2)| ContourArea {
            threshold,
            area_km2,
        })
        .collect())
}

/// Linear interpolation of the area table at `distance`, clamped at both ends.
///
/// NaN distances yield NaN.
pub fn interpolate_area(table: &[ContourArea], distance: f64) -> f64 {
    if distance.is_nan() || table.is_empty() {
        return f64::NAN;
    }
    let first = table[0];
    let last = table[table.len() - 1];
    if distance <= first.threshold {
        return first.area_km2;
    }
    if distance >= last.threshold {
        return last.area_km2;
    }

    let upper = table.partition_point(|c| c.threshold <= distance);
    let lo = table[upper - 1];
    let hi = table[upper];
    let t = (distance - lo.threshold) / (hi.threshold - lo.threshold);
    lo.area_km2 + t * (hi.area_km2 - lo.area_km2)
}
