//! Raster sequences over reconstruction epochs
//!
//! Epochs are generated independently (in parallel with the `parallel`
//! feature) and collected back in the order the times were given.

use molchan_core::raster::Raster;
use molchan_core::{Error, FeatureCollection, RasterSequence, Result};
use tracing::debug;

use super::SequenceParams;
use crate::maybe_rayon::*;
use crate::proximity::{PolygonRasterizer, ProximityRasterizer};
use crate::reconstruction::{reconstruct_and_rasterize_polygons, ReconstructionModel};

/// Permissive-area masks through time.
///
/// Each epoch rasterizes the reconstructed polygons and turns zero (outside)
/// cells into NaN, so only the permissive area stays valid.
pub fn generate_raster_sequence_from_polygons<M, R>(
    polygons: &FeatureCollection,
    model: &M,
    rasterizer: &R,
    times: &[f64],
    params: &SequenceParams,
) -> Result<RasterSequence>
where
    M: ReconstructionModel + ?Sized,
    R: PolygonRasterizer + ?Sized,
{
    let grid = params.grid();
    grid.validate()?;

    let rasters: Vec<Result<Raster<f64>>> = times
        .par_iter()
        .map(|&time| -> Result<Raster<f64>> {
            let mask = reconstruct_and_rasterize_polygons(polygons, model, rasterizer, time, &grid)?;
            let mut masked = mask.map(|v| if v == 0.0 { f64::NAN } else { v });
            masked.set_nodata(Some(f64::NAN));
            debug!(time, valid = masked.valid_count(), "polygon mask");
            Ok(masked)
        })
        .collect();

    collect_sequence(times, rasters)
}

/// Distance-to-target rasters through time.
///
/// An epoch where the model has nothing to reconstruct gets an all-NaN raster.
pub fn generate_distance_raster_sequence<M, P>(
    targets: &FeatureCollection,
    model: &M,
    proximity: &P,
    times: &[f64],
    params: &SequenceParams,
) -> Result<RasterSequence>
where
    M: ReconstructionModel + ?Sized,
    P: ProximityRasterizer + ?Sized,
{
    let grid = params.grid();
    grid.validate()?;

    let rasters: Vec<Result<Raster<f64>>> = times
        .par_iter()
        .map(|&time| -> Result<Raster<f64>> {
            match model.reconstruct(targets, time)? {
                Some(reconstructed) => proximity.distance_raster(&reconstructed, &grid),
                None => {
                    debug!(time, "no target geometry, epoch left empty");
                    let mut empty = Raster::geographic(&grid, f64::NAN)?;
                    empty.set_nodata(Some(f64::NAN));
                    Ok(empty)
                }
            }
        })
        .collect();

    collect_sequence(times, rasters)
}

/// Cell-wise product of two sequences with the same epochs.
///
/// NaN or no-data in either operand gives NaN. The result keeps the epoch
/// order of `a`.
///
/// # Errors
/// - [`Error::KeyMismatch`] when the epoch sets differ
/// - [`Error::SizeMismatch`] when rasters of an epoch differ in shape
/// - [`Error::CrsMismatch`] when rasters of an epoch disagree on CRS
pub fn combine_raster_sequences(a: &RasterSequence, b: &RasterSequence) -> Result<RasterSequence> {
    if !a.same_times(b) {
        return Err(Error::KeyMismatch {
            left: a.times().collect(),
            right: b.times().collect(),
        });
    }

    let mut combined = RasterSequence::with_capacity(a.len());
    for (time, ra) in a.iter() {
        let rb = b.require(time)?;
        if let (Some(ca), Some(cb)) = (ra.crs(), rb.crs()) {
            if !ca.is_equivalent(cb) {
                return Err(Error::CrsMismatch(ca.to_string(), cb.to_string()));
            }
        }

        let mut product = ra.zip_map(rb, |x, y| {
            if ra.is_nodata(x) || rb.is_nodata(y) {
                f64::NAN
            } else {
                x * y
            }
        })?;
        product.set_nodata(Some(f64::NAN));
        combined.insert(time, product);
    }

    Ok(combined)
}

fn collect_sequence(times: &[f64], rasters: Vec<Result<Raster<f64>>>) -> Result<RasterSequence> {
    let mut sequence = RasterSequence::with_capacity(times.len());
    for (&time, raster) in times.iter().zip(rasters) {
        sequence.insert(time, raster?);
    }
    Ok(sequence)
}
