//! Nonparametric tail probabilities from a sample.
//!
//! A [`TailDistribution`] is built once from a raw sample: the sample is
//! sorted, exact repeats are collapsed, and every distinct value gets
//!
//! - a left tail probability, the fraction of the sample `<=` the value
//!   (taken at the end of the run of repeats), and
//! - a right tail probability, the fraction of the sample `>=` the value
//!   (taken at the start of the run).
//!
//! It also carries `ks_error`, a Kolmogorov-Smirnov band for a chosen type I
//! error level `ks_alpha`: with probability `1 - ks_alpha` the true tail
//! probabilities are within `ks_error` of the estimates. The bound is always
//! conservative; close for n >= 35 and essentially exact for n >= 100.
//!
//! # Confidence queries
//!
//! [`TailDistribution::left_confidence`] returns the confidence (percent) for
//! rejecting "observed came from this distribution" in favor of an
//! alternative that favors smaller values; [`TailDistribution::right_confidence`]
//! is the mirror image for larger values. Between sample points the tail
//! probability is linearly interpolated.
//!
//! # Example
//!
//! ```rust
//! use ns_math::math::tailprob::{TailConfig, TailDistribution};
//!
//! let dist = TailDistribution::new(vec![3.0, 1.0, 2.0, 2.0, 1.0], &TailConfig::default()).unwrap();
//! assert_eq!(dist.values(), &[1.0, 2.0, 3.0]);
//! assert!((dist.left_confidence(2.5) - 10.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Configuration for building a tail distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailConfig {
    /// Type I error level for the KS band (default 0.05).
    pub ks_alpha: f64,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self { ks_alpha: 0.05 }
    }
}

impl TailConfig {
    /// KS band at the 1% level.
    pub fn alpha_01() -> Self {
        Self { ks_alpha: 0.01 }
    }

    /// KS band at the 10% level.
    pub fn alpha_10() -> Self {
        Self { ks_alpha: 0.10 }
    }

    /// Check that `ks_alpha` lies in the open interval (0, 1).
    pub fn validate(&self) -> Result<(), TailError> {
        if self.ks_alpha > 0.0 && self.ks_alpha < 1.0 {
            Ok(())
        } else {
            Err(TailError::InvalidAlpha {
                alpha: self.ks_alpha,
            })
        }
    }
}

/// Errors from building a tail distribution.
#[derive(Debug, Error, PartialEq)]
pub enum TailError {
    #[error("empty sample")]
    EmptySample,

    #[error("non-finite value {value} at sample index {index}")]
    NonFiniteSample { index: usize, value: f64 },

    #[error("invalid ks_alpha: {alpha}, must be in (0, 1)")]
    InvalidAlpha { alpha: f64 },
}

impl From<TailError> for ns_common::Error {
    fn from(err: TailError) -> Self {
        match err {
            TailError::EmptySample => ns_common::Error::EmptyInput("tail sample".to_string()),
            TailError::NonFiniteSample { .. } => ns_common::Error::NonFiniteInput(err.to_string()),
            TailError::InvalidAlpha { alpha } => ns_common::Error::InvalidParameter {
                name: "ks_alpha".to_string(),
                message: format!("must be in (0, 1), got {alpha}"),
            },
        }
    }
}

/// Empirical distribution of a sample with left/right tail probabilities.
///
/// Invariants (established by construction):
/// - `values` is non-empty and strictly increasing
/// - `left_probs` is non-decreasing and ends at exactly 1.0
/// - `right_probs` is non-increasing and starts at exactly 1.0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailDistribution {
    values: Vec<f64>,
    left_probs: Vec<f64>,
    right_probs: Vec<f64>,
    ks_error: f64,
    ks_alpha: f64,
    sample_size: usize,
}

impl TailDistribution {
    /// Build a distribution from a raw sample.
    ///
    /// The sample is consumed; its buffer is reused for the sorted, deduplicated
    /// values.
    pub fn new(sample: Vec<f64>, config: &TailConfig) -> Result<Self, TailError> {
        config.validate()?;
        if sample.is_empty() {
            return Err(TailError::EmptySample);
        }
        if let Some((index, &value)) = sample.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(TailError::NonFiniteSample { index, value });
        }

        let mut x = sample;
        x.sort_unstable_by(f64::total_cmp);

        let n = x.len();
        let total = n as f64;
        let mut left_probs = Vec::with_capacity(n);
        let mut right_probs = Vec::with_capacity(n);

        // i walks the sorted sample, j is the write position for distinct values
        let mut i = 0;
        let mut j = 0;
        while i < n {
            let value = x[i];
            x[j] = value;
            right_probs.push((n - i) as f64 / total);
            i += 1;
            while i < n && x[i] == value {
                i += 1;
            }
            left_probs.push(i as f64 / total);
            j += 1;
        }
        x.truncate(j);

        let ks_error = ks_error(n, config.ks_alpha);

        debug!(
            sample_size = n,
            distinct = j,
            ks_alpha = config.ks_alpha,
            ks_error,
            "built tail distribution"
        );
        if j == 1 {
            debug!(value = x[0], "tail sample has a single distinct value");
        }

        Ok(Self {
            values: x,
            left_probs,
            right_probs,
            ks_error,
            ks_alpha: config.ks_alpha,
            sample_size: n,
        })
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: construction rejects empty samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Distinct sample values in ascending order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Fraction of the sample less than or equal to each value.
    pub fn left_probs(&self) -> &[f64] {
        &self.left_probs
    }

    /// Fraction of the sample greater than or equal to each value.
    pub fn right_probs(&self) -> &[f64] {
        &self.right_probs
    }

    /// KS error band half-width for [`Self::ks_alpha`].
    pub fn ks_error(&self) -> f64 {
        self.ks_error
    }

    /// Type I error level the KS band was built for.
    pub fn ks_alpha(&self) -> f64 {
        self.ks_alpha
    }

    /// Length of the raw sample, before repeats were removed.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Confidence (0-100) for rejecting this distribution in favor of one
    /// that favors smaller values.
    ///
    /// Returns 0 above the largest sample value. NaN propagates.
    pub fn left_confidence(&self, observed: f64) -> f64 {
        if observed.is_nan() {
            return f64::NAN;
        }
        let last = self.values.len() - 1;
        if observed > self.values[last] {
            return 0.0;
        }
        if observed <= self.values[0] {
            return 100.0 * (1.0 - self.left_probs[0]);
        }
        let p = self.interpolate(&self.left_probs, observed);
        trace!(observed, p, "left tail interpolation");
        100.0 * (1.0 - p)
    }

    /// Confidence (0-100) for rejecting this distribution in favor of one
    /// that favors larger values.
    ///
    /// Returns 0 at or below the smallest sample value. NaN propagates.
    pub fn right_confidence(&self, observed: f64) -> f64 {
        if observed.is_nan() {
            return f64::NAN;
        }
        let last = self.values.len() - 1;
        if observed > self.values[last] {
            return 100.0 * (1.0 - self.right_probs[last]);
        }
        if observed <= self.values[0] {
            return 0.0;
        }
        let p = self.interpolate(&self.right_probs, observed);
        trace!(observed, p, "right tail interpolation");
        100.0 * (1.0 - p)
    }

    /// KS band `(lower, upper)` around the left tail probability at `index`,
    /// clamped to [0, 1].
    pub fn left_band(&self, index: usize) -> Option<(f64, f64)> {
        self.left_probs
            .get(index)
            .map(|&p| band(p, self.ks_error))
    }

    /// KS band `(lower, upper)` around the right tail probability at `index`,
    /// clamped to [0, 1].
    pub fn right_band(&self, index: usize) -> Option<(f64, f64)> {
        self.right_probs
            .get(index)
            .map(|&p| band(p, self.ks_error))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> ns_common::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Linear interpolation of `probs` at an observation strictly inside
    /// `(values[0], values[last]]`.
    fn interpolate(&self, probs: &[f64], observed: f64) -> f64 {
        // First index with values[hi] >= observed; values[0] < observed keeps hi >= 1
        let hi = self.values.partition_point(|&v| v < observed);
        let (x0, x1) = (self.values[hi - 1], self.values[hi]);
        if observed == x1 {
            return probs[hi];
        }
        let fraction = (observed - x0) / (x1 - x0);
        fraction * (probs[hi] - probs[hi - 1]) + probs[hi - 1]
    }
}

/// Build a tail distribution with the given KS alpha.
pub fn tailprob(sample: Vec<f64>, ks_alpha: f64) -> Result<TailDistribution, TailError> {
    TailDistribution::new(sample, &TailConfig { ks_alpha })
}

/// Conservative KS band half-width for a sample of size `n`.
fn ks_error(n: usize, ks_alpha: f64) -> f64 {
    (-0.5 * (0.5 * ks_alpha).ln() / n as f64).sqrt()
}

fn band(p: f64, err: f64) -> (f64, f64) {
    ((p - err).max(0.0), (p + err).min(1.0))
}
