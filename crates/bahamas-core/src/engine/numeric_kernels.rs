//! Numeric kernels over Monte-Carlo sample vectors.
//!
//! Every stage, defect and UCA quantity in the network is carried as a
//! fixed-length vector of draws. Reductions use Kahan summation so long
//! vectors of tiny probabilities do not lose precision.

use std::ops::Index;

/// Compensated (Kahan) sum.
pub fn kahan_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for v in values {
        let y = v - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Immutable vector of Monte-Carlo draws.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SampleVector(Vec<f64>);

impl SampleVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn filled(len: usize, value: f64) -> Self {
        Self(vec![value; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Arithmetic mean; `NaN` for an empty vector.
    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            return f64::NAN;
        }
        kahan_sum(self.0.iter().copied()) / self.0.len() as f64
    }

    /// Population standard deviation (divisor `n`).
    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Population variance (divisor `n`).
    pub fn variance(&self) -> f64 {
        if self.0.is_empty() {
            return f64::NAN;
        }
        let mean = self.mean();
        kahan_sum(self.0.iter().map(|&x| (x - mean) * (x - mean))) / self.0.len() as f64
    }

    /// Median (average of the two middle values for even lengths).
    pub fn median(&self) -> f64 {
        if self.0.is_empty() {
            return f64::NAN;
        }
        let mut sorted = self.0.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            0.5 * (sorted[mid - 1] + sorted[mid])
        } else {
            sorted[mid]
        }
    }

    /// `(min, max)`; `None` for an empty vector.
    pub fn range(&self) -> Option<(f64, f64)> {
        let mut iter = self.0.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
    }

    /// Elementwise product.
    pub fn mul(&self, other: &SampleVector) -> SampleVector {
        debug_assert_eq!(self.len(), other.len());
        self.0.iter().zip(other.iter()).map(|(a, b)| a * b).collect()
    }

    /// Multiply every element by `k`.
    pub fn scale(&self, k: f64) -> SampleVector {
        self.0.iter().map(|x| x * k).collect()
    }

    /// Elementwise `1 - x`.
    pub fn complement(&self) -> SampleVector {
        self.0.iter().map(|x| 1.0 - x).collect()
    }

    /// Elementwise in-place addition.
    pub fn add_assign(&mut self, other: &SampleVector) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.0.iter_mut().zip(other.iter()) {
            *a += b;
        }
    }

    /// Elementwise in-place multiplication.
    pub fn mul_assign(&mut self, other: &SampleVector) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.0.iter_mut().zip(other.iter()) {
            *a *= b;
        }
    }

    /// Elementwise sum of several equally long vectors.
    pub fn sum_of<'a, I>(len: usize, vectors: I) -> SampleVector
    where
        I: IntoIterator<Item = &'a SampleVector>,
    {
        let mut acc = SampleVector::zeros(len);
        for v in vectors {
            acc.add_assign(v);
        }
        acc
    }
}

impl FromIterator<f64> for SampleVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<f64>> for SampleVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for SampleVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl Index<usize> for SampleVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a SampleVector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
