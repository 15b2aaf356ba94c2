//! Per-match scoring-rate estimation.
//!
//! Two modes: a heuristic that draws each rate uniformly from a documented
//! range (a placeholder until real team statistics are wired in), and a model
//! mode that defers to an injected [`MatchModel`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{EngineError, EngineResult};
use super::types::{MatchParameters, ResultProbabilities};
use super::variates::VariateSource;
use super::PROBABILITY_FLOOR;

// ── Heuristic ranges ─────────────────────────────────────────────────────────
//
// Per-side Poisson means. The home range sits above the away range, which is
// where home advantage enters the heuristic.

pub const HOME_GOALS_RANGE: RateRange = RateRange::new(1.0, 2.9);
pub const AWAY_GOALS_RANGE: RateRange = RateRange::new(0.7, 2.5);
pub const CORNERS_RANGE: RateRange = RateRange::new(3.5, 7.0);
pub const YELLOW_CARDS_RANGE: RateRange = RateRange::new(1.5, 2.8);
pub const RED_CARDS_RANGE: RateRange = RateRange::new(0.05, 0.15);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    pub low: f64,
    pub high: f64,
}

impl RateRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn draw(&self, source: &mut VariateSource) -> f64 {
        source.uniform(self.low, self.high)
    }

    fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low > 0.0 && self.low <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicRanges {
    pub home_goals: RateRange,
    pub away_goals: RateRange,
    pub corners: RateRange,
    pub yellow_cards: RateRange,
    pub red_cards: RateRange,
}

impl Default for HeuristicRanges {
    fn default() -> Self {
        Self {
            home_goals: HOME_GOALS_RANGE,
            away_goals: AWAY_GOALS_RANGE,
            corners: CORNERS_RANGE,
            yellow_cards: YELLOW_CARDS_RANGE,
            red_cards: RED_CARDS_RANGE,
        }
    }
}

impl HeuristicRanges {
    pub fn validate(&self) -> EngineResult<()> {
        let named = [
            ("home_goals", self.home_goals),
            ("away_goals", self.away_goals),
            ("corners", self.corners),
            ("yellow_cards", self.yellow_cards),
            ("red_cards", self.red_cards),
        ];
        for (name, range) in named {
            if !range.is_valid() {
                return Err(EngineError::Settings(format!(
                    "heuristic range {name} must satisfy 0 < low <= high, got [{}, {}]",
                    range.low, range.high
                )));
            }
        }
        Ok(())
    }
}

// ── Form-based result heuristic ──────────────────────────────────────────────
//
// home = HOME_ADVANTAGE + (home_form − away_form) · FORM_WEIGHT
// draw = DRAW_BASE, away = the remainder. Each outcome then gets uniform noise
// of ±FORM_NOISE, is floored and renormalised.

pub const HOME_ADVANTAGE: f64 = 0.42;
pub const DRAW_BASE: f64 = 0.27;
pub const FORM_WEIGHT: f64 = 0.15;
pub const FORM_NOISE: f64 = 0.05;
pub const FORM_RANGE: RateRange = RateRange::new(0.3, 0.9);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Home-win base before form is applied.
    pub home_advantage: f64,
    pub draw_base: f64,
    pub form_weight: f64,
    /// Range a team's form score is drawn from.
    pub form_range: RateRange,
    pub noise: f64,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            home_advantage: HOME_ADVANTAGE,
            draw_base: DRAW_BASE,
            form_weight: FORM_WEIGHT,
            form_range: FORM_RANGE,
            noise: FORM_NOISE,
        }
    }
}

impl FormSettings {
    pub fn validate(&self) -> EngineResult<()> {
        let bases_ok = self.home_advantage > 0.0
            && self.draw_base > 0.0
            && self.home_advantage + self.draw_base < 1.0;
        if !bases_ok {
            return Err(EngineError::Settings(format!(
                "form bases must be positive and leave room for an away win: home {} draw {}",
                self.home_advantage, self.draw_base
            )));
        }
        if !(self.form_weight.is_finite() && self.form_weight >= 0.0) {
            return Err(EngineError::Settings(format!(
                "form weight must be non-negative, got {}",
                self.form_weight
            )));
        }
        if !(self.noise >= 0.0 && self.noise < 0.5) {
            return Err(EngineError::Settings(format!(
                "form noise must lie in [0, 0.5), got {}",
                self.noise
            )));
        }
        if !self.form_range.is_valid() {
            return Err(EngineError::Settings(format!(
                "form range must satisfy 0 < low <= high, got [{}, {}]",
                self.form_range.low, self.form_range.high
            )));
        }
        Ok(())
    }

    /// 1X2 probabilities for the given form scores, before noise.
    pub fn base_result(&self, home_form: f64, away_form: f64) -> [f64; 3] {
        let home = self.home_advantage + (home_form - away_form) * self.form_weight;
        [home, self.draw_base, 1.0 - home - self.draw_base]
    }
}

// ── Model collaborator ───────────────────────────────────────────────────────

/// External trained model producing scoring rates for a fixture.
///
/// The estimator treats it as a black box; the simulator still validates the
/// rates it returns.
pub trait MatchModel: Send + Sync {
    fn estimate(&self, home_team: &str, away_team: &str, league: &str)
        -> EngineResult<MatchParameters>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    #[default]
    Heuristic,
    Model,
}

// ── Estimator ────────────────────────────────────────────────────────────────

pub struct MatchParameterEstimator {
    ranges: HeuristicRanges,
    form: FormSettings,
    model: Option<Box<dyn MatchModel>>,
}

impl MatchParameterEstimator {
    pub fn new(ranges: HeuristicRanges) -> Self {
        Self {
            ranges,
            form: FormSettings::default(),
            model: None,
        }
    }

    pub fn with_form(mut self, form: FormSettings) -> Self {
        self.form = form;
        self
    }

    pub fn with_model(mut self, model: Box<dyn MatchModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Estimate rates for one fixture. Randomness is consumed only in
    /// heuristic mode.
    pub fn estimate(
        &self,
        home_team: &str,
        away_team: &str,
        league: &str,
        mode: EstimationMode,
        source: &mut VariateSource,
    ) -> EngineResult<MatchParameters> {
        let params = match mode {
            EstimationMode::Heuristic => self.heuristic(source),
            EstimationMode::Model => {
                let model = self.model.as_ref().ok_or(EngineError::ModelUnavailable)?;
                model.estimate(home_team, away_team, league)?
            }
        };
        debug!(
            home = home_team,
            away = away_team,
            league,
            ?mode,
            home_xg = params.home_expected_goals,
            away_xg = params.away_expected_goals,
            "estimated match parameters"
        );
        Ok(params)
    }

    /// Form-weighted 1X2 estimate with home advantage.
    ///
    /// Form scores are placeholders drawn from `form_range` until real
    /// recent-results data is wired in.
    pub fn form_result(
        &self,
        home_team: &str,
        away_team: &str,
        source: &mut VariateSource,
    ) -> EngineResult<ResultProbabilities> {
        let home_form = self.form.form_range.draw(source);
        let away_form = self.form.form_range.draw(source);
        let noisy = self
            .form
            .base_result(home_form, away_form)
            .map(|p| (p + source.uniform(-self.form.noise, self.form.noise)).max(PROBABILITY_FLOOR));
        let result = ResultProbabilities::from_classifier(noisy[0], noisy[1], noisy[2])?;
        debug!(
            home = home_team,
            away = away_team,
            home_form,
            away_form,
            home_win = result.home_win,
            "form-based result estimate"
        );
        Ok(result)
    }

    fn heuristic(&self, source: &mut VariateSource) -> MatchParameters {
        let r = &self.ranges;
        MatchParameters {
            home_expected_goals: r.home_goals.draw(source),
            away_expected_goals: r.away_goals.draw(source),
            home_expected_corners: r.corners.draw(source),
            away_expected_corners: r.corners.draw(source),
            home_expected_yellow_cards: r.yellow_cards.draw(source),
            away_expected_yellow_cards: r.yellow_cards.draw(source),
            home_expected_red_cards: r.red_cards.draw(source),
            away_expected_red_cards: r.red_cards.draw(source),
        }
    }
}

impl Default for MatchParameterEstimator {
    fn default() -> Self {
        Self::new(HeuristicRanges::default())
    }
}
