//! Neurostat numerical routines.
//!
//! Three independent components:
//! - [`math::tailprob`]: empirical tail probabilities with a
//!   Kolmogorov-Smirnov error band and left/right confidence lookup
//! - [`math::pnn`]: probabilistic neural network classification
//! - [`math::autofilt`]: sliding-window autoassociative filtering
//!
//! Plus [`logging`] for installing a `tracing` subscriber.

pub mod logging;
pub mod math;

pub use math::autofilt::{
    aut_filt, IdentityEvaluator, WindowAverager, WindowError, WindowEvaluator,
};
pub use math::pnn::{pnn, KernelModel, PnnClassification, PnnClassifier, PnnConfig, PnnError};
pub use math::tailprob::{tailprob, TailConfig, TailDistribution, TailError};
