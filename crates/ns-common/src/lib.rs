//! Neurostat common types.
//!
//! This crate provides the error taxonomy shared by the numerical crates:
//! - A unified [`Error`] with stable codes and categories
//! - A serializable [`StructuredError`] for machine-readable reporting

pub mod error;

pub use error::{Error, ErrorCategory, Result, StructuredError};
