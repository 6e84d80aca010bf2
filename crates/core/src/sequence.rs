//! Time-indexed raster collections
//!
//! A [`RasterSequence`] maps reconstruction epochs to rasters and iterates in
//! insertion order, which is the order the epochs were generated in.

use crate::error::{Error, Result};
use crate::raster::Raster;

/// Ordered `(time, raster)` pairs with distinct times.
#[derive(Debug, Clone, Default)]
pub struct RasterSequence {
    entries: Vec<(f64, Raster<f64>)>,
}

impl RasterSequence {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a raster for `time`.
    ///
    /// A new time is appended at the end. An existing time keeps its position
    /// and the previous raster is returned.
    pub fn insert(&mut self, time: f64, raster: Raster<f64>) -> Option<Raster<f64>> {
        match self.position(time) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, raster)),
            None => {
                self.entries.push((time, raster));
                None
            }
        }
    }

    fn position(&self, time: f64) -> Option<usize> {
        self.entries.iter().position(|(t, _)| *t == time)
    }

    /// Raster for exactly `time`, if present
    pub fn get(&self, time: f64) -> Option<&Raster<f64>> {
        self.position(time).map(|i| &self.entries[i].1)
    }

    /// Raster for exactly `time`, or [`Error::MissingEpoch`]
    pub fn require(&self, time: f64) -> Result<&Raster<f64>> {
        self.get(time).ok_or(Error::MissingEpoch { time })
    }

    pub fn contains(&self, time: f64) -> bool {
        self.position(time).is_some()
    }

    /// Epochs in insertion order
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Rasters in insertion order
    pub fn rasters(&self) -> impl Iterator<Item = &Raster<f64>> {
        self.entries.iter().map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &Raster<f64>)> {
        self.entries.iter().map(|(t, r)| (*t, r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both sequences hold the same set of epochs, in any order
    pub fn same_times(&self, other: &RasterSequence) -> bool {
        self.len() == other.len() && self.times().all(|t| other.contains(t))
    }
}

impl FromIterator<(f64, Raster<f64>)> for RasterSequence {
    fn from_iter<I: IntoIterator<Item = (f64, Raster<f64>)>>(iter: I) -> Self {
        let mut seq = RasterSequence::new();
        for (time, raster) in iter {
            seq.insert(time, raster);
        }
        seq
    }
}

impl IntoIterator for RasterSequence {
    type Item = (f64, Raster<f64>);
    type IntoIter = std::vec::IntoIter<(f64, Raster<f64>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(v: f64) -> Raster<f64> {
        Raster::filled(2, 2, v)
    }

    #[test]
    fn test_insertion_order_preserved() {
        let seq: RasterSequence = [(10.0, raster(1.0)), (0.0, raster(2.0)), (5.0, raster(3.0))]
            .into_iter()
            .collect();
        assert_eq!(seq.times().collect::<Vec<_>>(), vec![10.0, 0.0, 5.0]);
    }

    #[test]
    fn test_reinsert_replaces_in_place() {
        let mut seq = RasterSequence::new();
        seq.insert(0.0, raster(1.0));
        seq.insert(5.0, raster(2.0));
        let old = seq.insert(0.0, raster(9.0));

        assert_eq!(old.unwrap().get(0, 0).unwrap(), 1.0);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.times().collect::<Vec<_>>(), vec![0.0, 5.0]);
        assert_eq!(seq.get(0.0).unwrap().get(0, 0).unwrap(), 9.0);
    }

    #[test]
    fn test_require_missing_epoch() {
        let mut seq = RasterSequence::new();
        seq.insert(0.0, raster(1.0));
        assert!(seq.require(0.0).is_ok());
        assert!(matches!(
            seq.require(15.0),
            Err(Error::MissingEpoch { time }) if time == 15.0
        ));
    }

    #[test]
    fn test_same_times_ignores_order() {
        let a: RasterSequence = [(0.0, raster(1.0)), (5.0, raster(1.0))].into_iter().collect();
        let b: RasterSequence = [(5.0, raster(1.0)), (0.0, raster(1.0))].into_iter().collect();
        let c: RasterSequence = [(5.0, raster(1.0))].into_iter().collect();
        assert!(a.same_times(&b));
        assert!(!a.same_times(&c));
    }
}
