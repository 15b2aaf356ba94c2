//! Probability and value engine.
//!
//! Data flows one way: variates → parameter estimation → outcome simulation
//! → market translation → value assessment. Nothing here holds state between
//! calls apart from the caller-owned [`VariateSource`].

pub mod error;
pub mod estimator;
pub mod goal_line;
pub mod handicap;
pub mod markets;
pub mod predictor;
pub mod settings;
pub mod simulator;
pub mod types;
pub mod value;
pub mod variates;

pub use error::{EngineError, EngineResult};
pub use estimator::{EstimationMode, MatchModel, MatchParameterEstimator};
pub use markets::OddsSheet;
pub use predictor::MatchPredictor;
pub use settings::{EngineSettings, ResultSource};
pub use types::{
    MarketQuote, MatchOutcome, MatchParameters, MatchPrediction, OutcomeDistribution,
    ResultProbabilities, ValueAssessment,
};
pub use value::ValueCriteria;
pub use variates::VariateSource;

/// Bounds applied to heuristic (sigmoid or blend) probabilities so a
/// near-certain estimate cannot produce a degenerate EV. Simulated
/// frequencies are not clamped.
pub const PROBABILITY_FLOOR: f64 = 0.05;
pub const PROBABILITY_CEILING: f64 = 0.95;

// ── Math utilities ───────────────────────────────────────────────────────────

/// Numerically stable logistic sigmoid.
pub(crate) fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

pub(crate) fn clamp_heuristic(p: f64) -> f64 {
    p.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING)
}
