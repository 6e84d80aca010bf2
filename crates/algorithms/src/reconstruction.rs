//! Reconstruction of features to past epochs
//!
//! Plate rotation models live outside this crate; they plug in through
//! [`ReconstructionModel`]. A model answers `None` when nothing exists at the
//! requested epoch, which is a normal state and not an error.

use molchan_core::raster::Raster;
use molchan_core::{FeatureCollection, GridSpec, Result};

use crate::proximity::PolygonRasterizer;

/// Moves features to their positions at `time`.
pub trait ReconstructionModel: Sync {
    fn reconstruct(&self, features: &FeatureCollection, time: f64) -> Result<Option<FeatureCollection>>;
}

/// Keeps present-day geometry and drops features outside their validity window.
///
/// Validity is read from the `begin_time`/`end_time` feature attributes.
/// Features without geometry are dropped as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticReconstruction;

impl ReconstructionModel for StaticReconstruction {
    fn reconstruct(&self, features: &FeatureCollection, time: f64) -> Result<Option<FeatureCollection>> {
        let alive: FeatureCollection = features
            .iter()
            .filter(|f| f.geometry.is_some() && f.is_valid_at(time))
            .cloned()
            .collect();

        Ok(if alive.is_empty() { None } else { Some(alive) })
    }
}

/// Reconstruct polygons to `time` and rasterize them on `grid`.
///
/// An epoch with nothing to reconstruct rasterizes an empty collection.
pub fn reconstruct_and_rasterize_polygons<M, R>(
    features: &FeatureCollection,
    model: &M,
    rasterizer: &R,
    time: f64,
    grid: &GridSpec,
) -> Result<Raster<f64>>
where
    M: ReconstructionModel + ?Sized,
    R: PolygonRasterizer + ?Sized,
{
    match model.reconstruct(features, time)? {
        Some(reconstructed) => rasterizer.rasterize(&reconstructed, grid),
        None => rasterizer.rasterize(&FeatureCollection::new(), grid),
    }
}
