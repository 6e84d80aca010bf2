//! HEALPix equal-area point distribution on the sphere
//!
//! Pixel centres of the ring scheme: `12·nside²` points, each standing for
//! the same surface area, so point counts can stand in for area integrals.
//!
//! Rings are indexed `i = 1 ..= 4·nside − 1` from north to south:
//! - polar caps (`i < nside`): `z = 1 − i²/(3·nside²)`, `4·i` pixels,
//!   `φ = (j − ½)·π/(2i)`
//! - equatorial belt: `z = 4/3 − 2i/(3·nside)`, `4·nside` pixels,
//!   `φ = (j − s/2)·π/(2·nside)` with `s = (i − nside + 1) mod 2`

use molchan_core::{Error, GeoPoint, Result};
use std::f64::consts::PI;

use super::SphereSampler;

/// HEALPix sampling at a given resolution parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealpixSampling {
    nside: u32,
}

impl HealpixSampling {
    pub fn new(nside: u32) -> Result<Self> {
        if nside == 0 {
            return Err(Error::InvalidParameter {
                name: "nside",
                value: nside.to_string(),
                reason: "must be >= 1".into(),
            });
        }
        Ok(Self { nside })
    }

    pub fn nside(&self) -> u32 {
        self.nside
    }

    /// Number of points, `12·nside²`
    pub fn len(&self) -> usize {
        12 * (self.nside as usize).pow(2)
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl SphereSampler for HealpixSampling {
    fn points(&self) -> Vec<GeoPoint> {
        let n = self.nside as usize;
        let nf = n as f64;
        let mut points = Vec::with_capacity(self.len());

        for i in 1..4 * n {
            // (z, pixels in ring, azimuth offset, azimuth step)
            let (z, ring_pixels, offset, step) = if i < n {
                let fi = i as f64;
                (1.0 - fi * fi / (3.0 * nf * nf), 4 * i, 0.5, PI / (2.0 * fi))
            } else if i <= 3 * n {
                let s = ((i - n + 1) % 2) as f64;
                (4.0 / 3.0 - 2.0 * i as f64 / (3.0 * nf), 4 * n, s / 2.0, PI / (2.0 * nf))
            } else {
                let fi = (4 * n - i) as f64;
                (fi * fi / (3.0 * nf * nf) - 1.0, 4 * (4 * n - i), 0.5, PI / (2.0 * fi))
            };

            let lat = z.clamp(-1.0, 1.0).asin().to_degrees();
            for j in 1..=ring_pixels {
                let mut lon = ((j as f64 - offset) * step).to_degrees();
                if lon >= 180.0 {
                    lon -= 360.0;
                }
                points.push(GeoPoint::new(lon, lat));
            }
        }

        points
    }
}
