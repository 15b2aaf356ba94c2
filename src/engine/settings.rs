use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::estimator::{FormSettings, HeuristicRanges};
use super::goal_line::{GoalLineStrategy, GOAL_LINE_SIGMOID_STEEPNESS};
use super::handicap::HandicapSettings;
use super::simulator::SimulationConfig;

/// Where the headline 1X2 probabilities come from when no external
/// classifier is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Win/draw/loss frequencies of the Monte Carlo run.
    #[default]
    Simulated,
    /// Form-weighted heuristic with a home-advantage base.
    FormHeuristic,
}

/// Every tunable constant of the engine, recalibratable without a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub simulation: SimulationConfig,
    pub heuristic_ranges: HeuristicRanges,
    pub result_source: ResultSource,
    pub form: FormSettings,
    pub handicap: HandicapSettings,
    pub goal_line_strategy: GoalLineStrategy,
    pub goal_line_steepness: f64,
    /// A market is only recommended when `max(p, 1 - p)` reaches this.
    /// Zero disables the gate.
    pub min_confidence: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            heuristic_ranges: HeuristicRanges::default(),
            result_source: ResultSource::default(),
            form: FormSettings::default(),
            handicap: HandicapSettings::default(),
            goal_line_strategy: GoalLineStrategy::default(),
            goal_line_steepness: GOAL_LINE_SIGMOID_STEEPNESS,
            min_confidence: 0.0,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> EngineResult<()> {
        self.simulation.validate()?;
        self.heuristic_ranges.validate()?;
        self.form.validate()?;
        self.handicap.validate()?;
        if !(self.goal_line_steepness.is_finite() && self.goal_line_steepness > 0.0) {
            return Err(EngineError::Settings(format!(
                "goal line steepness must be positive, got {}",
                self.goal_line_steepness
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(EngineError::Settings(format!(
                "min_confidence must lie in [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}
