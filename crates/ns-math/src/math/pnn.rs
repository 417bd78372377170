//! Probabilistic neural network (PNN) classification.
//!
//! Each population is a set of training vectors. An unknown vector is scored
//! against every population by the mean kernel weight over that population's
//! samples, and the population with the largest mean wins.
//!
//! # Models
//!
//! | Model | Distance | Weight |
//! |-------|----------|--------|
//! | [`KernelModel::Gaussian`] | `sum (u - t)^2 / s^2` | `exp(-d)` |
//! | [`KernelModel::Exponential`] | `sum abs(u - t) / s` | `exp(-d)` |
//! | [`KernelModel::InverseQuadratic`] | `sum (u - t)^2 / s^2` | `1 / (1 + d)` |
//!
//! where `s = sigma * nvars`, so `sigma` keeps the same meaning as the number
//! of variables grows. Note the linear scaling for the absolute-difference
//! distance versus quadratic scaling for the squared ones.
//!
//! The per-population outputs are returned alongside the winner so callers
//! can fold in prior probabilities or misclassification costs
//! ([`PnnClassification::with_priors`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Distance measure and weighting function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelModel {
    /// Squared Euclidean distance, Gaussian weight (legacy model 1).
    #[default]
    Gaussian,
    /// Sum of absolute differences, exponential weight (legacy model 2).
    Exponential,
    /// Squared Euclidean distance, `1 / (1 + d)` weight (legacy model 3).
    InverseQuadratic,
}

impl KernelModel {
    /// Map a legacy integer selector to a model.
    ///
    /// 2 selects [`Self::Exponential`], anything 3 or above selects
    /// [`Self::InverseQuadratic`], everything else is [`Self::Gaussian`].
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => KernelModel::Exponential,
            c if c >= 3 => KernelModel::InverseQuadratic,
            _ => KernelModel::Gaussian,
        }
    }

    /// Legacy integer selector for this model.
    pub fn code(self) -> i32 {
        match self {
            KernelModel::Gaussian => 1,
            KernelModel::Exponential => 2,
            KernelModel::InverseQuadratic => 3,
        }
    }

    fn distance(self, unknown: &[f64], sample: &[f64], scale: f64) -> f64 {
        match self {
            KernelModel::Exponential => {
                let sum: f64 = unknown
                    .iter()
                    .zip(sample)
                    .map(|(u, t)| (u - t).abs())
                    .sum();
                sum / scale
            }
            KernelModel::Gaussian | KernelModel::InverseQuadratic => {
                let sum: f64 = unknown
                    .iter()
                    .zip(sample)
                    .map(|(u, t)| {
                        let diff = u - t;
                        diff * diff
                    })
                    .sum();
                sum / (scale * scale)
            }
        }
    }

    fn weight(self, dist: f64) -> f64 {
        match self {
            KernelModel::Gaussian | KernelModel::Exponential => (-dist).exp(),
            KernelModel::InverseQuadratic => 1.0 / (1.0 + dist),
        }
    }
}

impl std::str::FromStr for KernelModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gaussian" | "1" => Ok(KernelModel::Gaussian),
            "exponential" | "laplace" | "2" => Ok(KernelModel::Exponential),
            "inverse_quadratic" | "cauchy" | "3" => Ok(KernelModel::InverseQuadratic),
            _ => Err(format!("unknown kernel model: {}", s)),
        }
    }
}

impl std::fmt::Display for KernelModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelModel::Gaussian => write!(f, "gaussian"),
            KernelModel::Exponential => write!(f, "exponential"),
            KernelModel::InverseQuadratic => write!(f, "inverse_quadratic"),
        }
    }
}

/// Configuration for PNN classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnnConfig {
    /// Distance/weight model (default Gaussian).
    pub model: KernelModel,
    /// Scale parameter; multiplied by the number of variables before use.
    pub sigma: f64,
}

impl Default for PnnConfig {
    fn default() -> Self {
        Self {
            model: KernelModel::Gaussian,
            sigma: 1.0,
        }
    }
}

impl PnnConfig {
    pub fn new(model: KernelModel, sigma: f64) -> Self {
        Self { model, sigma }
    }

    /// Check that `sigma` is finite and positive.
    pub fn validate(&self) -> Result<(), PnnError> {
        if self.sigma.is_finite() && self.sigma > 0.0 {
            Ok(())
        } else {
            Err(PnnError::InvalidSigma { sigma: self.sigma })
        }
    }
}

/// Errors from PNN classification.
#[derive(Debug, Error, PartialEq)]
pub enum PnnError {
    #[error("no training populations")]
    NoPopulations,

    #[error("population {population} has no training samples")]
    EmptyPopulation { population: usize },

    #[error("unknown vector is empty")]
    EmptyUnknown,

    #[error("population {population} sample {sample} has no variables")]
    EmptyTrainingVector { population: usize, sample: usize },

    #[error(
        "population {population} sample {sample} has {actual} variables, expected {expected}"
    )]
    DimensionMismatch {
        population: usize,
        sample: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown vector has {actual} variables, classifier expects {expected}")]
    UnknownLength { expected: usize, actual: usize },

    #[error("invalid sigma: {sigma}, must be finite and positive")]
    InvalidSigma { sigma: f64 },

    #[error("expected {expected} prior weights, got {actual}")]
    PriorLength { expected: usize, actual: usize },

    #[error("invalid prior weight {weight} for population {population}")]
    InvalidPrior { population: usize, weight: f64 },

    #[error("no population produced a finite output")]
    NoFiniteOutput,
}

impl From<PnnError> for ns_common::Error {
    fn from(err: PnnError) -> Self {
        match err {
            PnnError::NoPopulations => {
                ns_common::Error::EmptyInput("training populations".to_string())
            }
            PnnError::EmptyPopulation { .. }
            | PnnError::EmptyUnknown
            | PnnError::EmptyTrainingVector { .. } => {
                ns_common::Error::EmptyInput(err.to_string())
            }
            PnnError::DimensionMismatch {
                expected, actual, ..
            } => ns_common::Error::DimensionMismatch {
                what: "training vector".to_string(),
                expected,
                actual,
            },
            PnnError::UnknownLength { expected, actual } => ns_common::Error::DimensionMismatch {
                what: "unknown vector".to_string(),
                expected,
                actual,
            },
            PnnError::PriorLength { expected, actual } => ns_common::Error::DimensionMismatch {
                what: "prior weights".to_string(),
                expected,
                actual,
            },
            PnnError::InvalidSigma { sigma } => ns_common::Error::InvalidParameter {
                name: "sigma".to_string(),
                message: format!("must be finite and positive, got {sigma}"),
            },
            PnnError::InvalidPrior { .. } => ns_common::Error::InvalidParameter {
                name: "prior".to_string(),
                message: err.to_string(),
            },
            PnnError::NoFiniteOutput => ns_common::Error::NumericalInstability(err.to_string()),
        }
    }
}

/// Result of classifying one unknown vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnnClassification {
    /// Mean kernel weight per population.
    pub outputs: Vec<f64>,
    /// Index of the population with the largest output.
    pub winner: usize,
}

impl PnnClassification {
    /// Re-rank after multiplying each output by a per-population weight
    /// (prior probability, or prior times misclassification cost).
    ///
    /// Ties keep the earliest population, as in the unweighted ranking.
    pub fn with_priors(&self, priors: &[f64]) -> Result<PnnClassification, PnnError> {
        if priors.len() != self.outputs.len() {
            return Err(PnnError::PriorLength {
                expected: self.outputs.len(),
                actual: priors.len(),
            });
        }
        if let Some((population, &weight)) = priors
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(PnnError::InvalidPrior { population, weight });
        }

        let outputs: Vec<f64> = self
            .outputs
            .iter()
            .zip(priors)
            .map(|(o, p)| o * p)
            .collect();
        let winner = select_winner(&outputs).ok_or(PnnError::NoFiniteOutput)?;
        Ok(PnnClassification { outputs, winner })
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> ns_common::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A PNN with validated training populations.
#[derive(Debug, Clone)]
pub struct PnnClassifier {
    config: PnnConfig,
    populations: Vec<Vec<Vec<f64>>>,
    nvars: usize,
}

impl PnnClassifier {
    /// Create a classifier; every training vector must have the same length.
    pub fn new(populations: Vec<Vec<Vec<f64>>>, config: PnnConfig) -> Result<Self, PnnError> {
        config.validate()?;
        if populations.is_empty() {
            return Err(PnnError::NoPopulations);
        }
        let nvars = populations[0]
            .first()
            .map(Vec::len)
            .ok_or(PnnError::EmptyPopulation { population: 0 })?;
        if nvars == 0 {
            return Err(PnnError::EmptyTrainingVector {
                population: 0,
                sample: 0,
            });
        }
        validate_populations(&populations, nvars)?;
        Ok(Self {
            config,
            populations,
            nvars,
        })
    }

    pub fn config(&self) -> &PnnConfig {
        &self.config
    }

    /// Number of variables per vector.
    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn population_count(&self) -> usize {
        self.populations.len()
    }

    /// Classify an unknown vector.
    pub fn classify(&self, unknown: &[f64]) -> Result<PnnClassification, PnnError> {
        if unknown.len() != self.nvars {
            return Err(PnnError::UnknownLength {
                expected: self.nvars,
                actual: unknown.len(),
            });
        }
        score(unknown, &self.populations, &self.config)
    }
}

/// Classify `unknown` against `populations` in one call.
///
/// `model` is the legacy integer selector (see [`KernelModel::from_code`]).
pub fn pnn(
    unknown: &[f64],
    populations: &[Vec<Vec<f64>>],
    model: i32,
    sigma: f64,
) -> Result<PnnClassification, PnnError> {
    let config = PnnConfig::new(KernelModel::from_code(model), sigma);
    config.validate()?;
    validate_populations(populations, unknown.len())?;
    score(unknown, populations, &config)
}

fn validate_populations(populations: &[Vec<Vec<f64>>], nvars: usize) -> Result<(), PnnError> {
    if populations.is_empty() {
        return Err(PnnError::NoPopulations);
    }
    if nvars == 0 {
        return Err(PnnError::EmptyUnknown);
    }
    for (population, samples) in populations.iter().enumerate() {
        if samples.is_empty() {
            return Err(PnnError::EmptyPopulation { population });
        }
        for (sample, vector) in samples.iter().enumerate() {
            if vector.len() != nvars {
                return Err(PnnError::DimensionMismatch {
                    population,
                    sample,
                    expected: nvars,
                    actual: vector.len(),
                });
            }
        }
    }
    Ok(())
}

/// Score already-validated populations.
fn score(
    unknown: &[f64],
    populations: &[Vec<Vec<f64>>],
    config: &PnnConfig,
) -> Result<PnnClassification, PnnError> {
    let model = config.model;
    let scale = config.sigma * unknown.len() as f64;

    let outputs: Vec<f64> = populations
        .iter()
        .map(|samples| {
            let total: f64 = samples
                .iter()
                .map(|sample| model.weight(model.distance(unknown, sample, scale)))
                .sum();
            total / samples.len() as f64
        })
        .collect();

    let winner = select_winner(&outputs).ok_or(PnnError::NoFiniteOutput)?;
    debug!(
        model = %model,
        sigma = config.sigma,
        populations = outputs.len(),
        winner,
        best = outputs[winner],
        "pnn classification"
    );
    if outputs[winner] == 0.0 {
        debug!("all kernel weights underflowed to zero; sigma may be too small");
    }

    Ok(PnnClassification { outputs, winner })
}

/// Index of the first strictly largest output, ignoring NaN.
fn select_winner(outputs: &[f64]) -> Option<usize> {
    let mut best = -1.0;
    let mut winner = None;
    for (i, &value) in outputs.iter().enumerate() {
        if value > best {
            best = value;
            winner = Some(i);
        }
    }
    winner
}
