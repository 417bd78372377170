//! Autoassociative filtering over sliding windows.
//!
//! A trained autoassociative network maps a window of `width` consecutive
//! samples onto a cleaned-up window of the same width. Sliding it over a
//! series of length `len` gives `len - width + 1` overlapping presentations;
//! each output position is the mean of every presentation that covered it.
//!
//! The network itself is injected through [`WindowEvaluator`].
//!
//! # Example
//!
//! ```rust
//! use ns_math::math::autofilt::{IdentityEvaluator, WindowAverager};
//!
//! let mut filter = WindowAverager::new(2, IdentityEvaluator).unwrap();
//! let out = filter.apply(&[5.0, 5.0, 5.0, 5.0]).unwrap();
//! assert_eq!(out, vec![5.0, 5.0, 5.0, 5.0]);
//! ```

use thiserror::Error;
use tracing::debug;

/// A trained network (or any other window-to-window map).
///
/// `window` and `output` always have the same length, the averager's width.
pub trait WindowEvaluator {
    fn evaluate(&self, window: &[f64], output: &mut [f64]);
}

impl<F> WindowEvaluator for F
where
    F: Fn(&[f64], &mut [f64]),
{
    fn evaluate(&self, window: &[f64], output: &mut [f64]) {
        self(window, output)
    }
}

/// Evaluator that reproduces its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEvaluator;

impl WindowEvaluator for IdentityEvaluator {
    fn evaluate(&self, window: &[f64], output: &mut [f64]) {
        output.copy_from_slice(window);
    }
}

/// Errors from autoassociative filtering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("window width must be at least 1")]
    ZeroWidth,

    #[error("window width {width} exceeds series length {len}")]
    WindowTooWide { width: usize, len: usize },

    #[error("output buffer has length {actual}, expected {expected}")]
    OutputLength { expected: usize, actual: usize },
}

impl From<WindowError> for ns_common::Error {
    fn from(err: WindowError) -> Self {
        match err {
            WindowError::ZeroWidth => ns_common::Error::InvalidParameter {
                name: "width".to_string(),
                message: err.to_string(),
            },
            WindowError::WindowTooWide { width, len } => {
                ns_common::Error::WindowTooWide { width, len }
            }
            WindowError::OutputLength { expected, actual } => {
                ns_common::Error::DimensionMismatch {
                    what: "output buffer".to_string(),
                    expected,
                    actual,
                }
            }
        }
    }
}

/// Sliding-window averager around an injected evaluator.
#[derive(Debug, Clone)]
pub struct WindowAverager<E> {
    width: usize,
    evaluator: E,
    scratch: Vec<f64>,
}

impl<E: WindowEvaluator> WindowAverager<E> {
    pub fn new(width: usize, evaluator: E) -> Result<Self, WindowError> {
        if width == 0 {
            return Err(WindowError::ZeroWidth);
        }
        Ok(Self {
            width,
            evaluator,
            scratch: vec![0.0; width],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Filter `input` into a freshly allocated series.
    pub fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>, WindowError> {
        let mut out = vec![0.0; input.len()];
        self.apply_into(input, &mut out)?;
        Ok(out)
    }

    /// Filter `input` into `out`, which must have the same length.
    ///
    /// `out` is overwritten; `input` is left untouched.
    pub fn apply_into(&mut self, input: &[f64], out: &mut [f64]) -> Result<(), WindowError> {
        let width = self.width;
        let len = input.len();
        if width > len {
            return Err(WindowError::WindowTooWide { width, len });
        }
        if out.len() != len {
            return Err(WindowError::OutputLength {
                expected: len,
                actual: out.len(),
            });
        }

        out.fill(0.0);
        let presentations = len - width + 1;

        for (start, window) in input.windows(width).enumerate() {
            self.evaluator.evaluate(window, &mut self.scratch);
            for (acc, value) in out[start..start + width].iter_mut().zip(&self.scratch) {
                *acc += value;
            }
        }

        if presentations > 1 {
            // Interior positions are covered by min(width, presentations) windows
            let limit = presentations.min(width);
            for (i, acc) in out.iter_mut().enumerate() {
                let count = (i + 1).min(len - i).min(limit);
                *acc /= count as f64;
            }
        } else {
            debug!(width, "single presentation; output is the raw window");
        }

        debug!(width, len, presentations, "autoassociative filter applied");
        Ok(())
    }
}

/// Filter `input` with a one-off averager.
pub fn aut_filt<E: WindowEvaluator>(
    width: usize,
    input: &[f64],
    evaluator: E,
) -> Result<Vec<f64>, WindowError> {
    WindowAverager::new(width, evaluator)?.apply(input)
}
