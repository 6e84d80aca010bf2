//! Polygon masks on lon/lat grids
//!
//! Cells whose centre lies inside any polygon get 1.0, all others 0.0.
//! Containment is planar in lon/lat degrees; polygons crossing the
//! antimeridian must be split by the caller.

use ndarray::Array2;
use crate::maybe_rayon::*;
use geo::Contains;
use geo_types::{Geometry, MultiPolygon, Point, Polygon};
use molchan_core::raster::Raster;
use molchan_core::{Error, FeatureCollection, GridSpec, Result};

use super::PolygonRasterizer;

/// Value written inside polygons
const INSIDE: f64 = 1.0;

/// 1/0 polygon rasterizer
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonMask;

impl PolygonRasterizer for PolygonMask {
    fn rasterize(&self, features: &FeatureCollection, grid: &GridSpec) -> Result<Raster<f64>> {
        let mut polygons = Vec::new();
        for geometry in features.geometries() {
            collect_polygons(geometry, &mut polygons);
        }
        let polygons = MultiPolygon::new(polygons);

        let mut output = Raster::geographic(grid, 0.0)?;
        if polygons.0.is_empty() {
            return Ok(output);
        }

        let (rows, cols) = output.shape();
        let tf = *output.transform();

        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![0.0; cols];
                for (col, cell) in row_data.iter_mut().enumerate() {
                    let (x, y) = tf.pixel_to_geo(col, row);
                    if polygons.contains(&Point::new(x, y)) {
                        *cell = INSIDE;
                    }
                }
                row_data
            })
            .collect();

        *output.data_mut() =
            Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

        Ok(output)
    }
}

fn collect_polygons(geometry: &Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_polygons(g, out);
            }
        }
        // Points and lines cover no area
        _ => {}
    }
}
