//! Great-circle proximity rasters
//!
//! Every cell centre gets the distance (metres) along the sphere to the
//! closest segment of any target geometry. Segments are great-circle arcs
//! between consecutive vertices. Brute force over all segments per cell.

use ndarray::Array2;
use crate::geodesy::{angle_to_arc, to_unit_vector, EARTH_RADIUS_KM};
use crate::maybe_rayon::*;
use geo_types::{Coord, Geometry, LineString};
use molchan_core::raster::Raster;
use molchan_core::{Error, FeatureCollection, GeoPoint, GridSpec, Result};

use super::ProximityRasterizer;

/// Distance to the nearest target line on a sphere, in metres
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircleProximity;

impl ProximityRasterizer for GreatCircleProximity {
    fn distance_raster(&self, features: &FeatureCollection, grid: &GridSpec) -> Result<Raster<f64>> {
        let mut segments = Vec::new();
        for geometry in features.geometries() {
            collect_segments(geometry, &mut segments);
        }

        let mut output = Raster::geographic(grid, f64::NAN)?;
        output.set_nodata(Some(f64::NAN));
        if segments.is_empty() {
            return Ok(output);
        }

        let (rows, cols) = output.shape();
        let tf = *output.transform();
        let metres_per_radian = EARTH_RADIUS_KM * 1000.0;

        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![f64::NAN; cols];
                for (col, cell) in row_data.iter_mut().enumerate() {
                    let (x, y) = tf.pixel_to_geo(col, row);
                    let p = to_unit_vector(GeoPoint::new(x, y));
                    let angle = segments
                        .iter()
                        .map(|&(a, b)| angle_to_arc(p, a, b))
                        .fold(f64::INFINITY, f64::min);
                    *cell = angle * metres_per_radian;
                }
                row_data
            })
            .collect();

        *output.data_mut() =
            Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

        Ok(output)
    }
}

type Segment = ([f64; 3], [f64; 3]);

fn unit(c: Coord<f64>) -> [f64; 3] {
    to_unit_vector(GeoPoint::new(c.x, c.y))
}

fn push_line(line: &LineString<f64>, out: &mut Vec<Segment>) {
    match line.0.len() {
        0 => {}
        1 => {
            let p = unit(line.0[0]);
            out.push((p, p));
        }
        _ => out.extend(line.0.windows(2).map(|w| (unit(w[0]), unit(w[1])))),
    }
}

fn collect_segments(geometry: &Geometry<f64>, out: &mut Vec<Segment>) {
    match geometry {
        Geometry::Point(p) => {
            let v = unit(p.0);
            out.push((v, v));
        }
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                let v = unit(p.0);
                out.push((v, v));
            }
        }
        Geometry::Line(l) => out.push((unit(l.start), unit(l.end))),
        Geometry::LineString(ls) => push_line(ls, out),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                push_line(ls, out);
            }
        }
        Geometry::Polygon(poly) => {
            push_line(poly.exterior(), out);
            for ring in poly.interiors() {
                push_line(ring, out);
            }
        }
        Geometry::MultiPolygon(mp) => {
            for poly in &mp.0 {
                collect_segments(&Geometry::Polygon(poly.clone()), out);
            }
        }
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_segments(g, out);
            }
        }
        Geometry::Rect(r) => collect_segments(&Geometry::Polygon(r.to_polygon()), out),
        Geometry::Triangle(t) => collect_segments(&Geometry::Polygon(t.to_polygon()), out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::line_string;
    use molchan_core::{Feature, Region};

    fn equator() -> FeatureCollection {
        let mut fc = FeatureCollection::new();
        fc.push(Feature::new(line_string![
            (x: -180.0, y: 0.0),
            (x: -60.0, y: 0.0),
            (x: 60.0, y: 0.0),
            (x: 180.0, y: 0.0),
        ]));
        fc
    }

    #[test]
    fn test_distance_grows_with_latitude() {
        let grid = GridSpec::new(Region::GLOBAL, 10.0);
        let raster = GreatCircleProximity.distance_raster(&equator(), &grid).unwrap();
        assert_eq!(raster.shape(), (18, 36));

        // Row 8 is centred on 5°N
        let expected = 5.0_f64.to_radians() * EARTH_RADIUS_KM * 1000.0;
        assert_relative_eq!(raster.get(8, 3).unwrap(), expected, max_relative = 1e-9);

        // Row 0 is centred on 85°N
        let polar = raster.get(0, 0).unwrap();
        assert!(polar > raster.get(8, 0).unwrap());
    }

    #[test]
    fn test_no_geometry_is_all_nan() {
        let grid = GridSpec::new(Region::GLOBAL, 30.0);
        let raster = GreatCircleProximity
            .distance_raster(&FeatureCollection::new(), &grid)
            .unwrap();
        assert_eq!(raster.valid_count(), 0);
    }

    #[test]
    fn test_point_target() {
        let mut fc = FeatureCollection::new();
        fc.push(Feature::new(geo_types::Point::new(5.0, 5.0)));
        let grid = GridSpec::new(Region::new(0.0, 10.0, 0.0, 10.0), 10.0);
        let raster = GreatCircleProximity.distance_raster(&fc, &grid).unwrap();
        assert_eq!(raster.shape(), (1, 1));
        assert!(raster.get(0, 0).unwrap().abs() < 1e-6);
    }
}
