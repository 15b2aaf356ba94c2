use thiserror::Error;

/// Failures that surface to the caller of the engine.
///
/// Malformed odds are deliberately absent: a market priced at zero or below is
/// simply not assessed, it never aborts a batch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A scoring-rate parameter was not finite, not positive, or above the
    /// simulator's configured ceiling.
    #[error("invalid rate for {field}: {value} (must be positive, finite and within the rate ceiling)")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("sample count must be at least 1")]
    InvalidSampleCount,

    /// Model mode was requested but no model was injected into the estimator.
    #[error("model estimation requested but no match model is configured")]
    ModelUnavailable,

    /// The injected model reported a failure of its own.
    #[error("match model failed: {0}")]
    Model(String),

    #[error("result probabilities cannot be normalised: {0}")]
    InvalidProbabilities(String),

    #[error("invalid engine settings: {0}")]
    Settings(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
