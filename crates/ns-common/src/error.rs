//! Error types for Neurostat.
//!
//! The numerical routines run under caller-enforced preconditions. Rather
//! than producing garbage when those are violated, every entry point checks
//! them and reports a typed error with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Invalid Parameter
//!   Reason: invalid ks_alpha: must be in (0, 1), got 1.5
//!   Fix: Check the parameter against its documented range.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 20,
//!   "category": "parameter",
//!   "message": "invalid ks_alpha: must be in (0, 1), got 1.5",
//!   "recoverable": true,
//!   "context": { "parameter": "ks_alpha" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Neurostat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed input data (empty, wrong shape, NaN).
    Input,
    /// Out-of-range tuning parameters.
    Parameter,
    /// Numerical failures during computation.
    Numerical,
    /// Serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Parameter => write!(f, "parameter"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Neurostat.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("non-finite input: {0}")]
    NonFiniteInput(String),

    // Parameter errors (20-29)
    #[error("invalid {name}: {message}")]
    InvalidParameter { name: String, message: String },

    #[error("window width {width} exceeds series length {len}")]
    WindowTooWide { width: usize, len: usize },

    // Numerical errors (30-39)
    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    // I/O errors (60-69)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Parameter errors
    /// - 30-39: Numerical errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::EmptyInput(_) => 10,
            Error::DimensionMismatch { .. } => 11,
            Error::NonFiniteInput(_) => 12,
            Error::InvalidParameter { .. } => 20,
            Error::WindowTooWide { .. } => 21,
            Error::NumericalInstability(_) => 30,
            Error::Json(_) => 60,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EmptyInput(_) | Error::DimensionMismatch { .. } | Error::NonFiniteInput(_) => {
                ErrorCategory::Input
            }
            Error::InvalidParameter { .. } | Error::WindowTooWide { .. } => {
                ErrorCategory::Parameter
            }
            Error::NumericalInstability(_) => ErrorCategory::Numerical,
            Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Input and parameter errors are recoverable by the caller fixing the
    /// call; numerical instability usually means the data itself is unusable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::EmptyInput(_) => true,
            Error::DimensionMismatch { .. } => true,
            Error::NonFiniteInput(_) => true,
            Error::InvalidParameter { .. } => true,
            Error::WindowTooWide { .. } => true,
            Error::NumericalInstability(_) => false,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::EmptyInput(_) => "Supply at least one observation.",
            Error::DimensionMismatch { .. } => {
                "Resize the input so its length matches the expected length."
            }
            Error::NonFiniteInput(_) => "Filter NaN and infinite values out of the sample before building.",
            Error::InvalidParameter { .. } => "Check the parameter against its documented range.",
            Error::WindowTooWide { .. } => {
                "Use a window no wider than the series, or supply a longer series."
            }
            Error::NumericalInstability(_) => {
                "Rescale the inputs or pick a larger scale parameter."
            }
            Error::Json(_) => "Check the serialized payload for syntax errors.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::EmptyInput(_) => "Empty Input",
            Error::DimensionMismatch { .. } => "Dimension Mismatch",
            Error::NonFiniteInput(_) => "Non-Finite Input",
            Error::InvalidParameter { .. } => "Invalid Parameter",
            Error::WindowTooWide { .. } => "Window Too Wide",
            Error::NumericalInstability(_) => "Numerical Instability",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., parameter name, dimensions).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::DimensionMismatch {
                what,
                expected,
                actual,
            } => {
                context.insert("what".to_string(), serde_json::json!(what));
                context.insert("expected".to_string(), serde_json::json!(expected));
                context.insert("actual".to_string(), serde_json::json!(actual));
            }
            Error::InvalidParameter { name, .. } => {
                context.insert("parameter".to_string(), serde_json::json!(name));
            }
            Error::WindowTooWide { width, len } => {
                context.insert("width".to_string(), serde_json::json!(width));
                context.insert("len".to_string(), serde_json::json!(len));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };
    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
