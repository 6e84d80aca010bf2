//! Main Raster type

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, GridSpec, RasterElement};
use ndarray::{Array2, Zip};

/// A georeferenced 2D raster grid.
///
/// `Raster<T>` stores values of type `T` in a 2D grid with associated
/// geographic metadata (transform and CRS). Distance-to-target models are
/// `Raster<f64>` over lon/lat, with NaN marking cells outside the
/// permissible domain.
///
/// # Example
///
/// ```ignore
/// use molchan_core::{GridSpec, Raster, Region};
///
/// // Global 1° grid, every cell 0 km from the target
/// let raster: Raster<f64> = Raster::geographic(&GridSpec::new(Region::GLOBAL, 1.0), 0.0)?;
/// assert_eq!(raster.shape(), (180, 360));
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
    /// Affine transformation
    transform: GeoTransform,
    /// Coordinate reference system
    crs: Option<CRS>,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from existing data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        }
    }

    /// Create a WGS84 lon/lat raster covering `spec`, filled with `value`
    pub fn geographic(spec: &GridSpec, value: T) -> Result<Self> {
        spec.validate()?;
        let (rows, cols) = spec.shape();
        let mut raster = Self::filled(rows, cols, value);
        raster.transform = GeoTransform::from_grid_spec(spec);
        raster.crs = Some(CRS::wgs84());
        Ok(raster)
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Get the CRS
    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Set the CRS
    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Whether the columns span a full 360° of longitude
    pub fn wraps_longitude(&self) -> bool {
        let span = (self.transform.pixel_width * self.cols() as f64).abs();
        (span - 360.0).abs() < 1e-6
    }

    // Coordinate conversion

    /// Convert pixel coordinates to geographic coordinates
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Convert geographic coordinates to pixel coordinates
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.transform.geo_to_pixel(x, y)
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Number of cells holding valid (non no-data) values
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| !self.is_nodata(v)).count()
    }

    // Cell-wise transforms

    /// Apply `f` to every cell, keeping the georeferencing
    pub fn map<U, F>(&self, f: F) -> Raster<U>
    where
        U: RasterElement,
        F: Fn(T) -> U,
    {
        Raster {
            data: self.data.mapv(f),
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: None,
        }
    }

    /// Combine two equally shaped rasters cell by cell
    ///
    /// The output keeps the georeferencing of `self`.
    pub fn zip_map<U, F>(&self, other: &Raster<T>, f: F) -> Result<Raster<U>>
    where
        U: RasterElement,
        F: Fn(T, T) -> U,
    {
        if self.shape() != other.shape() {
            return Err(Error::SizeMismatch {
                er: self.rows(),
                ec: self.cols(),
                ar: other.rows(),
                ac: other.cols(),
            });
        }

        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| f(a, b));

        Ok(Raster {
            data,
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: None,
        })
    }
}

impl Raster<f64> {
    /// Iterate over the finite cell values
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        let nodata = self.nodata;
        self.data.iter().copied().filter(move |v| !v.is_nodata(nodata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Region;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::new(100, 200);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<f64> = Raster::new(10, 10);
        raster.set(5, 5, 42.0).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42.0);
        assert!(raster.set(10, 0, 1.0).is_err());
    }

    #[test]
    fn test_geographic_raster() {
        let raster = Raster::geographic(&GridSpec::new(Region::GLOBAL, 2.0), f64::NAN).unwrap();
        assert_eq!(raster.shape(), (90, 180));
        assert!(raster.wraps_longitude());
        assert_eq!(raster.valid_count(), 0);
        assert_eq!(raster.crs().and_then(|c| c.epsg()), Some(4326));
    }

    #[test]
    fn test_zip_map_multiplies() {
        let a = Raster::filled(2, 3, 2.0_f64);
        let b = Raster::filled(2, 3, 4.0_f64);
        let c = a.zip_map(&b, |x, y| x * y).unwrap();
        assert!(c.data().iter().all(|&v| v == 8.0));

        let d = Raster::filled(3, 3, 1.0_f64);
        assert!(a.zip_map(&d, |x, y| x * y).is_err());
    }

    #[test]
    fn test_valid_values_skip_nan() {
        let mut raster = Raster::filled(2, 2, 1.0_f64);
        raster.set(0, 1, f64::NAN).unwrap();
        assert_eq!(raster.valid_values().count(), 3);
        assert_eq!(raster.valid_count(), 3);
    }
}
