//! Fixed-width distance histograms and cumulative fractions
//!
//! Bin edges run `-step, 0, step, 2·step, …` up to the first edge at or past
//! `distance_max`, following numpy's `arange(-step, max + step, step)`
//! length rule. The leading `[-step, 0)` bin keeps slightly negative
//! distances instead of discarding them. Bins are half-open except the last,
//! which also includes its right edge. NaN values are never binned.

use molchan_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Binning of distances shared by grid and point histograms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    distance_max: f64,
    distance_step: f64,
}

impl BinSpec {
    /// Validate and build a bin layout
    pub fn new(distance_max: f64, distance_step: f64) -> Result<Self> {
        if !(distance_max > 0.0) || !distance_max.is_finite() {
            return Err(Error::InvalidParameter {
                name: "distance_max",
                value: distance_max.to_string(),
                reason: "must be a finite value > 0".into(),
            });
        }
        if !(distance_step > 0.0) || !distance_step.is_finite() {
            return Err(Error::InvalidParameter {
                name: "distance_step",
                value: distance_step.to_string(),
                reason: "must be a finite value > 0".into(),
            });
        }
        Ok(Self {
            distance_max,
            distance_step,
        })
    }

    pub fn distance_max(&self) -> f64 {
        self.distance_max
    }

    pub fn distance_step(&self) -> f64 {
        self.distance_step
    }

    /// Number of bin edges
    pub fn edge_count(&self) -> usize {
        let span = self.distance_max + 2.0 * self.distance_step;
        (span / self.distance_step).ceil() as usize
    }

    /// Number of bins (one fewer than edges)
    pub fn bin_count(&self) -> usize {
        self.edge_count() - 1
    }

    /// Bin edges, starting at `-step`
    pub fn edges(&self) -> Vec<f64> {
        let start = -self.distance_step;
        (0..self.edge_count())
            .map(|i| start + i as f64 * self.distance_step)
            .collect()
    }

    /// Contour thresholds aligned index-for-index with the bins: `0, step, …`
    ///
    /// Threshold `i` is the right edge of bin `i`, so the cumulative count up
    /// to bin `i` is the number of distances below threshold `i`.
    pub fn contour_levels(&self) -> Vec<f64> {
        let mut edges = self.edges();
        edges.remove(0);
        edges
    }
}

/// Counts of distances per bin
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<usize>,
    sample_count: usize,
    valid_count: usize,
}

/// Bin a sequence of distances.
///
/// NaN values count towards [`Histogram::sample_count`] only. Finite values
/// outside the edges count towards [`Histogram::valid_count`] but fall in no bin.
pub fn histogram<I>(values: I, spec: &BinSpec) -> Histogram
where
    I: IntoIterator<Item = f64>,
{
    let edges = spec.edges();
    let nbins = edges.len() - 1;
    let first = edges[0];
    let last = edges[nbins];
    let step = spec.distance_step();

    let mut counts = vec![0usize; nbins];
    let mut sample_count = 0;
    let mut valid_count = 0;

    for v in values {
        sample_count += 1;
        if v.is_nan() {
            continue;
        }
        valid_count += 1;
        if v < first || v > last {
            continue;
        }

        let mut idx = (((v - first) / step).floor() as usize).min(nbins - 1);
        // Correct for rounding in the division against the stored edges
        if v < edges[idx] {
            idx = idx.saturating_sub(1);
        } else if idx + 1 < nbins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Histogram {
        edges,
        counts,
        sample_count,
        valid_count,
    }
}

impl Histogram {
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// All values offered, NaN included
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Non-NaN values offered, binned or not
    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    /// Values that landed in a bin
    pub fn binned_count(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Running totals of the bin counts
    pub fn cumulative_counts(&self) -> Vec<usize> {
        self.counts
            .iter()
            .scan(0usize, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect()
    }

    /// Fraction of valid values at or below each bin: `cumsum / valid_count`
    pub fn cumulative_fraction(&self) -> Result<Vec<f64>> {
        self.cumulative_fraction_over(self.valid_count)
    }

    /// `cumsum / total` for a caller-chosen denominator.
    ///
    /// Passing the full sample count makes NaN samples count as never reached.
    pub fn cumulative_fraction_over(&self, total: usize) -> Result<Vec<f64>> {
        if total == 0 {
            return Err(Error::EmptySample("histogram"));
        }
        let total = total as f64;
        Ok(self
            .cumulative_counts()
            .into_iter()
            .map(|c| c as f64 / total)
            .collect())
    }

    /// `1 - cumsum / total`: the fraction still beyond each bin
    pub fn exceedance_fraction_over(&self, total: usize) -> Result<Vec<f64>> {
        Ok(self
            .cumulative_fraction_over(total)?
            .into_iter()
            .map(|f| 1.0 - f)
            .collect())
    }
}

/// Trapezoidal integral of `y` over `x`, `Σ (x[i+1] - x[i]) · (y[i] + y[i+1]) / 2`.
///
/// `x` need not be increasing; a decreasing `x` yields a negated area.
pub fn trapezoid(y: &[f64], x: &[f64]) -> Result<f64> {
    if y.len() != x.len() {
        return Err(Error::InvalidInput(format!(
            "trapezoid needs equal lengths, got y = {} and x = {}",
            y.len(),
            x.len()
        )));
    }
    Ok(y.windows(2)
        .zip(x.windows(2))
        .map(|(yw, xw)| (xw[1] - xw[0]) * (yw[0] + yw[1]) / 2.0)
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_edges_align_with_levels() {
        let spec = BinSpec::new(1e7, 2e4).unwrap();
        let edges = spec.edges();
        assert_eq!(edges.len(), 502);
        assert_relative_eq!(edges[0], -2e4);
        assert_relative_eq!(edges[501], 1e7);
        assert_eq!(spec.bin_count(), 501);
        assert_eq!(spec.contour_levels().len(), spec.bin_count());
        assert_relative_eq!(spec.contour_levels()[0], 0.0);
    }

    #[test]
    fn test_uneven_max_rounds_up() {
        // numpy: arange(-3, 13, 3) -> [-3, 0, 3, 6, 9, 12]
        let spec = BinSpec::new(10.0, 3.0).unwrap();
        assert_eq!(spec.edges(), vec![-3.0, 0.0, 3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_invalid_bins() {
        assert!(BinSpec::new(0.0, 1.0).is_err());
        assert!(BinSpec::new(10.0, -1.0).is_err());
        assert!(BinSpec::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_counts_sum_to_in_range_valid_values() {
        let spec = BinSpec::new(10.0, 1.0).unwrap();
        let values = [-0.5, 0.0, 0.3, 2.7, 10.0, 11.0, -2.0, f64::NAN, 5.0, f64::NAN];
        let h = histogram(values, &spec);

        assert_eq!(h.sample_count(), 10);
        assert_eq!(h.valid_count(), 8);
        // -2.0 and 11.0 are outside [-1, 10]
        assert_eq!(h.binned_count(), 6);
    }

    #[test]
    fn test_bin_placement() {
        let spec = BinSpec::new(3.0, 1.0).unwrap();
        let h = histogram([-1.0, -0.1, 0.0, 0.99, 1.0, 3.0], &spec);
        // bins: [-1,0) [0,1) [1,2) [2,3]
        assert_eq!(h.counts(), &[2, 2, 1, 1]);
    }

    #[test]
    fn test_cumulative_fractions() {
        let spec = BinSpec::new(3.0, 1.0).unwrap();
        let h = histogram([0.5, 1.5, 1.5, f64::NAN], &spec);

        assert_eq!(h.cumulative_counts(), vec![0, 1, 3, 3]);

        let valid = h.cumulative_fraction().unwrap();
        assert_relative_eq!(valid[1], 1.0 / 3.0);
        assert_relative_eq!(valid[3], 1.0);

        let missed = h.exceedance_fraction_over(h.sample_count()).unwrap();
        assert_relative_eq!(missed[0], 1.0);
        assert_relative_eq!(missed[3], 0.25);
    }

    #[test]
    fn test_empty_sample_is_an_error() {
        let spec = BinSpec::new(3.0, 1.0).unwrap();
        let h = histogram([f64::NAN, f64::NAN], &spec);
        assert!(matches!(h.cumulative_fraction(), Err(Error::EmptySample(_))));

        let h = histogram(std::iter::empty(), &spec);
        assert!(h.exceedance_fraction_over(0).is_err());
    }

    #[test]
    fn test_trapezoid() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 1.0, 2.0];
        assert_relative_eq!(trapezoid(&y, &x).unwrap(), 2.0);

        // Reversed abscissa flips the sign
        let xr = [2.0, 1.0, 0.0];
        let yr = [2.0, 1.0, 0.0];
        assert_relative_eq!(trapezoid(&yr, &xr).unwrap(), -2.0);

        assert!(trapezoid(&[1.0], &[1.0, 2.0]).is_err());
    }
}
