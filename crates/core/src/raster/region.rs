//! Geographic extents and grid layouts

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longitude/latitude extent in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Region {
    /// The whole globe, `[-180, 180, -90, 90]`
    pub const GLOBAL: Region = Region {
        west: -180.0,
        east: 180.0,
        south: -90.0,
        north: 90.0,
    };

    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self { west, east, south, north }
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Whether the region wraps all the way around in longitude
    pub fn is_global_longitude(&self) -> bool {
        (self.width() - 360.0).abs() < 1e-9
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::GLOBAL
    }
}

/// A pixel-registered lon/lat grid: an extent plus a square cell spacing in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub region: Region,
    pub spacing: f64,
}

impl GridSpec {
    pub fn new(region: Region, spacing: f64) -> Self {
        Self { region, spacing }
    }

    /// Check the spacing and extent describe at least one cell
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing > 0.0) {
            return Err(Error::InvalidParameter {
                name: "spacing",
                value: self.spacing.to_string(),
                reason: "must be > 0".into(),
            });
        }
        if !(self.region.width() > 0.0 && self.region.height() > 0.0) {
            return Err(Error::InvalidParameter {
                name: "region",
                value: format!("{:?}", self.region),
                reason: "must have positive width and height".into(),
            });
        }
        Ok(())
    }

    /// Grid dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let rows = (self.region.height() / self.spacing).round().max(1.0) as usize;
        let cols = (self.region.width() / self.spacing).round().max(1.0) as usize;
        (rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_quarter_degree_shape() {
        let spec = GridSpec::new(Region::GLOBAL, 0.25);
        assert_eq!(spec.shape(), (720, 1440));
        assert!(spec.region.is_global_longitude());
    }

    #[test]
    fn test_invalid_spacing() {
        assert!(GridSpec::new(Region::GLOBAL, 0.0).validate().is_err());
        assert!(GridSpec::new(Region::new(10.0, 10.0, 0.0, 5.0), 1.0).validate().is_err());
    }
}
